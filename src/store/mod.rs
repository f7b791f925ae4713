use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::Sender,
};

use crate::fs::{Disk, Result};

pub mod init;

/// 快照变更事件，发给其他观察者让它们重新加载
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotEvent {
    Saved,
}

/// 磁盘快照存取器。
///
/// 整个 Disk 聚合体经 bincode 序列化后整体落盘，读回即恢复。
/// 不做额外校验，快照的完好由写它的人保证。
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    notify: Option<Sender<SnapshotEvent>>,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path, notify: None }
    }

    /// 默认快照位置：home 目录下的隐藏文件
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fssim_disk.bin")
    }

    /// 挂一个变更通知的发送端
    pub fn with_notifier(mut self, tx: Sender<SnapshotEvent>) -> Self {
        self.notify = Some(tx);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// 序列化并写盘，然后广播变更事件
    pub fn save(&self, disk: &Disk) -> Result<()> {
        let bytes = bincode::serialize(disk)?;
        fs::write(&self.path, bytes)?;
        if let Some(tx) = &self.notify {
            // 观察者可能已经退出，发不出去就算了
            let _ = tx.send(SnapshotEvent::Saved);
        }
        Ok(())
    }

    /// 读盘并反序列化出完整的磁盘状态
    pub fn load(&self) -> Result<Disk> {
        let bytes = fs::read(&self.path)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}

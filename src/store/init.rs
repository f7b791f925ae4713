use std::{path::PathBuf, sync::mpsc::Sender, thread, time::Duration};

use crate::{
    fs::{config::DEFAULT_TOTAL_BLOCKS, Disk},
    shell::BootProgress,
    store::SnapshotStore,
};

/// 启动时恢复磁盘快照。
///
/// 在工作线程里执行，进度通过通道汇报给启动画面。
/// 没有快照、或快照读不出来时退回一块新的空盘，
/// 启动流程本身永远不失败。
pub fn perform_snapshot_restore(snapshot_path: PathBuf, tx: Sender<BootProgress>) {
    let store = SnapshotStore::new(snapshot_path);

    let _ = tx.send(BootProgress::Step("🧠 Initializing virtual disk..."));
    for i in 0..=40 {
        let _ = tx.send(BootProgress::Progress(i));
        thread::sleep(Duration::from_millis(5));
    }

    let disk = if store.exists() {
        let _ = tx.send(BootProgress::Step("⚙️  Restoring disk snapshot..."));
        match store.load() {
            Ok(disk) => disk,
            Err(_) => {
                // 快照读不出来只能换新盘，旧文件留在原地不动
                let _ = tx.send(BootProgress::Step(
                    "⚠️  Snapshot unreadable, formatting a fresh disk...",
                ));
                Disk::new(DEFAULT_TOTAL_BLOCKS)
            }
        }
    } else {
        let _ = tx.send(BootProgress::Step(
            "🔧 No snapshot found, formatting a fresh disk...",
        ));
        Disk::new(DEFAULT_TOTAL_BLOCKS)
    };

    for i in 41..=100 {
        let _ = tx.send(BootProgress::Progress(i));
        thread::sleep(Duration::from_millis(5));
    }

    let _ = tx.send(BootProgress::Finished(disk));
}

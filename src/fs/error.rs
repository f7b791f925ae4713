use std::fmt;

/// 磁盘模拟器错误类型
#[derive(Debug)]
pub enum DiskError {
    Io(std::io::Error),       // 底层 I/O 错误（快照读写）
    Snapshot(bincode::Error), // 快照编解码错误
    InsufficientSpace {
        // 空闲块总数不足
        requested: usize,
        available: usize,
    },
    InsufficientContiguousSpace {
        // 从指定位置向后扫描找不到足够的空闲块
        requested: usize,
        found: usize,
        start: usize,
    },
    ParentNotFound(String),   // 父目录不存在，带 id
    ParentNotAFolder(String), // 父节点是文件而不是目录
    ItemNotFound(String),     // 目录项不存在
    RootDeletionRejected,     // 根目录不可删除
}

impl From<std::io::Error> for DiskError {
    fn from(e: std::io::Error) -> Self {
        DiskError::Io(e)
    }
}

impl From<bincode::Error> for DiskError {
    fn from(e: bincode::Error) -> Self {
        DiskError::Snapshot(e)
    }
}

// 实现 Display trait，用于打印错误信息
impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Snapshot I/O error: {}", e),
            Self::Snapshot(e) => write!(f, "Snapshot encoding error: {}", e),
            Self::InsufficientSpace {
                requested,
                available,
            } => write!(
                f,
                "Not enough free blocks: requested {}, available {}",
                requested, available
            ),
            Self::InsufficientContiguousSpace {
                requested,
                found,
                start,
            } => write!(
                f,
                "Not enough free blocks from position {}: requested {}, found {}",
                start, requested, found
            ),
            Self::ParentNotFound(id) => write!(f, "Parent folder not found: {}", id),
            Self::ParentNotAFolder(id) => write!(f, "Parent is a file, not a folder: {}", id),
            Self::ItemNotFound(id) => write!(f, "File or folder not found: {}", id),
            Self::RootDeletionRejected => write!(f, "The root folder cannot be deleted"),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for DiskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Snapshot(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// 磁盘模拟器统一结果类型
pub type Result<T> = std::result::Result<T, DiskError>;

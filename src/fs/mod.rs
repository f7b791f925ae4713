use serde::{Deserialize, Serialize};

pub mod alloc;
pub mod block;
pub mod config;
pub mod defrag;
pub mod demo;
pub mod directory;
pub mod error;
pub mod fault;
pub mod fragmentation;
pub mod journal;

pub use block::{Block, BlockStatus};
pub use directory::{DirectoryItem, ItemKind};
pub use error::{DiskError, Result};
pub use fault::CrashSeverity;
pub use journal::{Journal, JournalEntry, JournalKind, Outcome};

/// 模拟磁盘聚合体：块表 + 目录树 + 操作日志 + 统计计数。
///
/// 所有变更操作都是同步的原子状态迁移，整个聚合体就是可序列化的快照，
/// 由 store 层负责落盘和恢复。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Disk {
    pub blocks: Vec<Block>,    // 块表，长度在初始化后固定
    pub root: DirectoryItem,   // 目录树根节点
    pub journal: Journal,      // 展示用操作日志
    pub total_blocks: usize,   // 总块数
    pub used_blocks: usize,    // 以下三个计数恒等于扫描块表的结果
    pub free_blocks: usize,
    pub corrupted_blocks: usize,
}

impl Disk {
    pub fn new(total_blocks: usize) -> Self {
        Self {
            blocks: (0..total_blocks).map(Block::free).collect(),
            root: DirectoryItem::root(),
            journal: Journal::new(),
            total_blocks,
            used_blocks: 0,
            free_blocks: total_blocks,
            corrupted_blocks: 0,
        }
    }

    /// 全量重置：块表、目录树、日志、计数一起回到空盘状态
    pub fn initialize(&mut self, total_blocks: usize) {
        *self = Disk::new(total_blocks);
    }

    /// 按 id 查找目录项
    pub fn find_item(&self, item_id: &str) -> Option<&DirectoryItem> {
        self.root.find(item_id)
    }

    /// 扫描块表重算三个计数
    pub(crate) fn recount(&mut self) {
        self.used_blocks = self.count_status(BlockStatus::Used);
        self.free_blocks = self.count_status(BlockStatus::Free);
        self.corrupted_blocks = self.count_status(BlockStatus::Bad);
    }

    pub fn count_status(&self, status: BlockStatus) -> usize {
        self.blocks.iter().filter(|b| b.status == status).count()
    }

    /// 校验块表与目录树的一致性，测试用
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.blocks.len(), self.total_blocks);
        assert_eq!(self.used_blocks, self.count_status(BlockStatus::Used));
        assert_eq!(self.free_blocks, self.count_status(BlockStatus::Free));
        assert_eq!(self.corrupted_blocks, self.count_status(BlockStatus::Bad));

        // 空闲块不得携带归属，每个文件的块都要指回文件自身
        for block in &self.blocks {
            if block.is_free() {
                assert!(block.file_id.is_none(), "free block {} has an owner", block.id);
            }
        }
        let mut stack = vec![&self.root];
        while let Some(item) = stack.pop() {
            if item.is_file() {
                assert_eq!(item.block_ids.len(), item.size_blocks, "{}", item.name);
                for &id in &item.block_ids {
                    let block = &self.blocks[id];
                    assert!(
                        matches!(block.status, BlockStatus::Used | BlockStatus::Bad),
                        "block {} of {} is neither used nor bad",
                        id,
                        item.name
                    );
                    assert_eq!(block.file_id.as_deref(), Some(item.id.as_str()));
                }
            }
            stack.extend(item.children.iter());
        }
    }
}

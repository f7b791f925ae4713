use serde::{Deserialize, Serialize};

/// 块状态
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Free,     // 空闲
    Used,     // 已分配给某个文件
    Metadata, // 元数据
    Bad,      // 损坏
    Cached,   // 缓存
}

/// 一个逻辑块。id 就是它在块表中的位置。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Block {
    pub id: usize,
    pub status: BlockStatus,
    pub file_id: Option<String>,   // 所属文件 id
    pub file_name: Option<String>, // 所属文件名（冗余，仅用于展示）
}

impl Block {
    /// 创建一个空闲块
    pub fn free(id: usize) -> Self {
        Self {
            id,
            status: BlockStatus::Free,
            file_id: None,
            file_name: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == BlockStatus::Free
    }

    pub fn is_used(&self) -> bool {
        self.status == BlockStatus::Used
    }

    /// 块是否仍归属于某个文件（已用块，或崩溃后尚未修复的坏块）
    pub fn has_owner(&self) -> bool {
        self.file_id.is_some()
    }

    /// 标记为已用并记录归属
    pub fn assign(&mut self, file_id: &str, file_name: &str) {
        self.status = BlockStatus::Used;
        self.file_id = Some(file_id.to_string());
        self.file_name = Some(file_name.to_string());
    }

    /// 释放并清除归属
    pub fn release(&mut self) {
        self.status = BlockStatus::Free;
        self.file_id = None;
        self.file_name = None;
    }
}

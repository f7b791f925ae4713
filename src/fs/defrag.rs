use std::collections::HashMap;

use crate::fs::{
    block::Block,
    journal::{JournalKind, Outcome},
    Disk,
};

impl Disk {
    /// 碎片整理：把所有仍有归属的块搬到块表前端，按文件聚拢。
    ///
    /// 按文件 id 做稳定排序，同一文件的块保持原有相对顺序地连到一起，
    /// 之后的表尾全部填充新的空闲块。搬迁后每个文件记录的块号
    /// 必须同步改写成新位置，否则目录树和块表就对不上了。
    /// 坏块只要还有归属也一并搬迁，状态原样保留，等恢复操作处理。
    ///
    /// 返回搬迁的块数。空盘（没有归属块）是静默 no-op。
    pub fn defragment(&mut self) -> usize {
        let mut owned: Vec<Block> = self
            .blocks
            .iter()
            .filter(|b| b.has_owner())
            .cloned()
            .collect();
        if owned.is_empty() {
            return 0;
        }

        // 稳定排序：文件之间按 id 排，文件内部保持块号升序
        owned.sort_by(|a, b| a.file_id.cmp(&b.file_id));
        let relocated = owned.len();

        // 重建块表：归属块重编号后放到前端，剩余位置填新的空闲块
        let mut blocks = Vec::with_capacity(self.total_blocks);
        for (new_id, mut block) in owned.into_iter().enumerate() {
            block.id = new_id;
            blocks.push(block);
        }
        for id in relocated..self.total_blocks {
            blocks.push(Block::free(id));
        }
        self.blocks = blocks;

        // 目录树同步：每个文件的块号改写为搬迁后的新位置
        let mut new_positions: HashMap<&str, Vec<usize>> = HashMap::new();
        for block in &self.blocks {
            if let Some(file_id) = block.file_id.as_deref() {
                new_positions.entry(file_id).or_default().push(block.id);
            }
        }
        self.root.for_each_file_mut(&mut |file| {
            if let Some(ids) = new_positions.get(file.id.as_str()) {
                file.block_ids = ids.clone();
            }
        });

        self.journal.record(
            JournalKind::Defrag,
            format!("{} blocks reorganized", relocated),
            Outcome::Done,
        );
        self.recount();
        relocated
    }
}

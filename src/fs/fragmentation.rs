use std::collections::HashMap;

use crate::fs::{block::BlockStatus, Disk};

impl Disk {
    /// 碎片化程度评分（0–100）。只读启发式，只用于展示，
    /// 不被任何引擎消费；相同状态下结果恒定。
    ///
    /// 由两部分组成：文件内部的分段程度（最多 40 分），
    /// 加上已用块在全盘上的散布程度（最多 60 分）。
    pub fn fragmentation_score(&self) -> u32 {
        // 按文件聚合已用块的块号
        let mut file_blocks: HashMap<&str, Vec<usize>> = HashMap::new();
        for block in &self.blocks {
            if block.status == BlockStatus::Used {
                if let Some(file_id) = block.file_id.as_deref() {
                    file_blocks.entry(file_id).or_default().push(block.id);
                }
            }
        }
        if file_blocks.is_empty() {
            return 0;
        }
        let files = file_blocks.len();

        // 每个文件的连续段数，全部相邻时是 1 段
        let mut total_fragments = 0usize;
        for ids in file_blocks.values_mut() {
            ids.sort_unstable();
            total_fragments += count_runs(ids);
        }
        let avg_fragments = total_fragments as f64 / files as f64;
        let file_term = if avg_fragments <= 1.0 {
            0.0
        } else {
            (((avg_fragments - 1.0) / 2.0) * 40.0).min(40.0)
        };

        // 全盘散布：所有已用块排序后，相邻但不连号的对数
        let mut used_ids: Vec<usize> = self
            .blocks
            .iter()
            .filter(|b| b.is_used())
            .map(|b| b.id)
            .collect();
        used_ids.sort_unstable();
        let disk_gaps = used_ids
            .windows(2)
            .filter(|pair| pair[1] != pair[0] + 1)
            .count();
        let gap_ratio = disk_gaps as f64 / files.max(1) as f64;
        let scatter_term = (gap_ratio * 10.0).min(60.0);

        (file_term + scatter_term).min(100.0).round() as u32
    }
}

// 升序块号里的连续段数
fn count_runs(sorted_ids: &[usize]) -> usize {
    if sorted_ids.is_empty() {
        return 0;
    }
    1 + sorted_ids
        .windows(2)
        .filter(|pair| pair[1] != pair[0] + 1)
        .count()
}

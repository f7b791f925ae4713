use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::fs::{
    block::BlockStatus,
    config::{CATASTROPHIC_CRASH_BLOCKS, MAJOR_CRASH_BLOCKS, MINOR_CRASH_BLOCKS},
    journal::{JournalKind, Outcome},
    Disk,
};

/// 崩溃等级，决定目标损坏块数
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CrashSeverity {
    Minor,
    Major,
    Catastrophic,
}

impl CrashSeverity {
    pub fn target_blocks(self) -> usize {
        match self {
            Self::Minor => MINOR_CRASH_BLOCKS,
            Self::Major => MAJOR_CRASH_BLOCKS,
            Self::Catastrophic => CATASTROPHIC_CRASH_BLOCKS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Catastrophic => "CATASTROPHIC",
        }
    }
}

impl Disk {
    /// 注入一次随机损坏，模拟硬件故障。
    ///
    /// 从已用块里均匀随机选出 min(目标数, 已用块数) 个置为坏块，
    /// 归属信息保留，恢复时才能区分"属于文件"和"本来就是空闲"。
    /// 随机源由调用方注入，测试固定种子就能断言选中的块。
    /// 这个操作不会失败：没有已用块时损坏 0 个，日志照记。
    pub fn crash<R: Rng>(&mut self, severity: CrashSeverity, rng: &mut R) -> usize {
        let used: Vec<usize> = self
            .blocks
            .iter()
            .filter(|b| b.is_used())
            .map(|b| b.id)
            .collect();
        let count = severity.target_blocks().min(used.len());

        let picked: Vec<usize> = used.choose_multiple(rng, count).copied().collect();
        for &i in &picked {
            self.blocks[i].status = BlockStatus::Bad;
        }

        self.journal.record(
            JournalKind::Crash,
            format!("{} - {} blocks", severity.label(), count),
            Outcome::Failed,
        );
        self.recount();
        count
    }

    /// 全量修复：一趟扫过所有坏块，有归属的恢复为已用，
    /// 没有归属的清为空闲。总是成功，没有修不好的块。
    pub fn recover(&mut self) {
        for block in &mut self.blocks {
            if block.status == BlockStatus::Bad {
                if block.has_owner() {
                    block.status = BlockStatus::Used;
                } else {
                    block.release();
                }
            }
        }
        self.journal
            .record(JournalKind::Recover, "SYSTEM", Outcome::Done);
        self.recount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::config::ROOT_ID;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn crash_corrupts_min_of_target_and_used() {
        let mut disk = Disk::new(20);
        disk.create_file("a.txt", 10, ROOT_ID, None).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let corrupted = disk.crash(CrashSeverity::Minor, &mut rng);

        assert_eq!(corrupted, 5);
        assert_eq!(disk.corrupted_blocks, 5);
        assert_eq!(disk.used_blocks, 5);
        let entry = &disk.journal.entries()[0];
        assert_eq!(entry.kind, JournalKind::Crash);
        assert_eq!(entry.outcome, Outcome::Failed);
        assert_eq!(entry.target, "MINOR - 5 blocks");
        disk.assert_consistent();
    }

    #[test]
    fn crash_is_capped_by_used_count() {
        let mut disk = Disk::new(20);
        disk.create_file("small.txt", 3, ROOT_ID, None).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let corrupted = disk.crash(CrashSeverity::Catastrophic, &mut rng);
        assert_eq!(corrupted, 3);
        assert_eq!(disk.corrupted_blocks, 3);
        disk.assert_consistent();
    }

    #[test]
    fn crash_on_empty_disk_corrupts_nothing_but_logs() {
        let mut disk = Disk::new(10);
        let mut rng = StdRng::seed_from_u64(0);
        let corrupted = disk.crash(CrashSeverity::Major, &mut rng);

        assert_eq!(corrupted, 0);
        assert_eq!(disk.corrupted_blocks, 0);
        assert_eq!(disk.journal.entries()[0].target, "MAJOR - 0 blocks");
        disk.assert_consistent();
    }

    #[test]
    fn same_seed_picks_same_blocks() {
        let make_crashed = || {
            let mut disk = Disk::new(64);
            disk.create_file("a.txt", 20, ROOT_ID, None).unwrap();
            let mut rng = StdRng::seed_from_u64(99);
            disk.crash(CrashSeverity::Major, &mut rng);
            disk.blocks
                .iter()
                .filter(|b| b.status == BlockStatus::Bad)
                .map(|b| b.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(make_crashed(), make_crashed());
    }

    #[test]
    fn crash_preserves_owner_on_bad_blocks() {
        let mut disk = Disk::new(20);
        let id = disk.create_file("a.txt", 10, ROOT_ID, None).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        disk.crash(CrashSeverity::Minor, &mut rng);

        for block in disk.blocks.iter().filter(|b| b.status == BlockStatus::Bad) {
            assert_eq!(block.file_id.as_deref(), Some(id.as_str()));
        }
        disk.assert_consistent();
    }

    #[test]
    fn recovery_restores_owned_blocks_to_used() {
        let mut disk = Disk::new(20);
        disk.create_file("a.txt", 10, ROOT_ID, None).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        disk.crash(CrashSeverity::Minor, &mut rng);
        assert_eq!(disk.corrupted_blocks, 5);

        disk.recover();
        assert_eq!(disk.corrupted_blocks, 0);
        assert_eq!(disk.used_blocks, 10);
        assert_eq!(disk.free_blocks, 10);
        let entry = &disk.journal.entries()[0];
        assert_eq!(entry.kind, JournalKind::Recover);
        assert_eq!(entry.target, "SYSTEM");
        disk.assert_consistent();
    }

    #[test]
    fn recovery_frees_ownerless_bad_blocks() {
        let mut disk = Disk::new(10);
        // 人为放一个没有归属的坏块，模拟快照里带来的脏状态
        disk.blocks[4].status = BlockStatus::Bad;
        disk.recount();
        assert_eq!(disk.corrupted_blocks, 1);

        disk.recover();
        assert_eq!(disk.corrupted_blocks, 0);
        assert_eq!(disk.free_blocks, 10);
        disk.assert_consistent();
    }

    #[test]
    fn recovery_is_idempotent() {
        let mut disk = Disk::new(20);
        disk.create_file("a.txt", 8, ROOT_ID, None).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        disk.crash(CrashSeverity::Minor, &mut rng);

        disk.recover();
        let used = disk.used_blocks;
        let free = disk.free_blocks;

        disk.recover();
        assert_eq!(disk.used_blocks, used);
        assert_eq!(disk.free_blocks, free);
        assert_eq!(disk.corrupted_blocks, 0);
        disk.assert_consistent();
    }
}

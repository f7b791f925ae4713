use crate::fs::{
    config::ROOT_ID,
    directory::DirectoryItem,
    error::{DiskError, Result},
    journal::{JournalKind, Outcome},
    Disk,
};

impl Disk {
    /// 创建文件并为它分配 `size_blocks` 个空闲块。
    ///
    /// 不带 `start_block` 时按块号升序取最先遇到的空闲块（first-fit）；
    /// 带 `start_block` 时从该位置向后扫描，跳过非空闲块继续收集，
    /// 扫到表尾仍不够就失败——这条路径就是用来人为制造碎片的。
    ///
    /// 任何一步校验失败都不改动磁盘。
    pub fn create_file(
        &mut self,
        name: &str,
        size_blocks: usize,
        parent_id: &str,
        start_block: Option<usize>,
    ) -> Result<String> {
        // 1. 选块，只收集下标，校验全部通过之前不动任何状态
        let picked = match start_block {
            Some(start) => self.pick_from(start, size_blocks)?,
            None => self.pick_first_fit(size_blocks)?,
        };

        // 2. 挂到目录树上，父节点校验失败直接返回
        let file = DirectoryItem::new_file(name, size_blocks, parent_id, picked.clone());
        let file_id = file.id.clone();
        self.attach(parent_id, file)?;

        // 3. 生效：标记块归属、记日志、更新计数
        for &i in &picked {
            self.blocks[i].assign(&file_id, name);
        }
        self.used_blocks += size_blocks;
        self.free_blocks -= size_blocks;
        self.journal.record(JournalKind::Create, name, Outcome::Done);

        Ok(file_id)
    }

    /// 创建目录。不占用块，只会因为父节点问题失败。
    pub fn create_folder(&mut self, name: &str, parent_id: &str) -> Result<String> {
        let folder = DirectoryItem::new_folder(name, parent_id);
        let folder_id = folder.id.clone();
        self.attach(parent_id, folder)?;
        self.journal.record(JournalKind::Create, name, Outcome::Done);
        Ok(folder_id)
    }

    /// 删除文件或目录。目录会连同整棵子树一起删除，
    /// 所有后代文件占用的块都被释放。
    pub fn delete_item(&mut self, item_id: &str) -> Result<()> {
        if item_id == ROOT_ID {
            return Err(DiskError::RootDeletionRejected);
        }
        let removed = self
            .root
            .remove(item_id)
            .ok_or_else(|| DiskError::ItemNotFound(item_id.to_string()))?;

        let mut freed = Vec::new();
        removed.collect_block_ids(&mut freed);
        for &i in &freed {
            self.blocks[i].release();
        }
        // 被删文件可能还带着崩溃后的坏块，重扫一遍计数最稳妥
        self.recount();
        self.journal
            .record(JournalKind::Delete, removed.name, Outcome::Done);
        Ok(())
    }

    // first-fit：按块号升序取最先遇到的空闲块
    fn pick_first_fit(&self, size_blocks: usize) -> Result<Vec<usize>> {
        if self.free_blocks < size_blocks {
            return Err(DiskError::InsufficientSpace {
                requested: size_blocks,
                available: self.free_blocks,
            });
        }
        Ok(self
            .blocks
            .iter()
            .filter(|b| b.is_free())
            .take(size_blocks)
            .map(|b| b.id)
            .collect())
    }

    // 从 start 向后扫描收集空闲块，跳过非空闲块，直到凑够或者扫到表尾
    fn pick_from(&self, start: usize, size_blocks: usize) -> Result<Vec<usize>> {
        let mut picked = Vec::with_capacity(size_blocks);
        for block in self.blocks.iter().skip(start) {
            if block.is_free() {
                picked.push(block.id);
                if picked.len() == size_blocks {
                    return Ok(picked);
                }
            }
        }
        Err(DiskError::InsufficientContiguousSpace {
            requested: size_blocks,
            found: picked.len(),
            start,
        })
    }

    // 把新节点挂到父目录下，父节点不存在或不是目录都报错
    fn attach(&mut self, parent_id: &str, item: DirectoryItem) -> Result<()> {
        match self.root.find_mut(parent_id) {
            Some(parent) if parent.is_folder() => {
                parent.children.push(item);
                Ok(())
            }
            Some(_) => Err(DiskError::ParentNotAFolder(parent_id.to_string())),
            None => Err(DiskError::ParentNotFound(parent_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fit_takes_lowest_free_blocks() {
        let mut disk = Disk::new(16);
        let id = disk.create_file("a.txt", 4, ROOT_ID, None).unwrap();

        let file = disk.find_item(&id).unwrap();
        assert_eq!(file.block_ids, vec![0, 1, 2, 3]);
        assert_eq!(disk.used_blocks, 4);
        assert_eq!(disk.free_blocks, 12);
        assert_eq!(disk.journal.entries()[0].kind, JournalKind::Create);
        disk.assert_consistent();
    }

    #[test]
    fn first_fit_reuses_holes_left_by_deletes() {
        let mut disk = Disk::new(16);
        let a = disk.create_file("a.txt", 3, ROOT_ID, None).unwrap();
        disk.create_file("b.txt", 3, ROOT_ID, None).unwrap();
        disk.delete_item(&a).unwrap();

        let c = disk.create_file("c.txt", 5, ROOT_ID, None).unwrap();
        let file = disk.find_item(&c).unwrap();
        // 先填补 0..3 的空洞，再接着用 b 之后的块
        assert_eq!(file.block_ids, vec![0, 1, 2, 6, 7]);
        disk.assert_consistent();
    }

    #[test]
    fn allocation_exhaustion_leaves_state_unchanged() {
        let mut disk = Disk::new(10);
        disk.create_file("a", 6, ROOT_ID, None).unwrap();

        let err = disk.create_file("b", 6, ROOT_ID, None).unwrap_err();
        assert!(matches!(
            err,
            DiskError::InsufficientSpace {
                requested: 6,
                available: 4
            }
        ));
        assert_eq!(disk.used_blocks, 6);
        assert_eq!(disk.free_blocks, 4);
        // 失败的操作不留日志，也不挂半个节点
        assert_eq!(disk.journal.len(), 1);
        assert_eq!(disk.root.children.len(), 1);
        disk.assert_consistent();
    }

    #[test]
    fn placement_scan_skips_over_used_blocks() {
        let mut disk = Disk::new(16);
        // 先在 4..8 占一段，再要求从 2 开始放 6 块
        disk.create_file("wall", 4, ROOT_ID, Some(4)).unwrap();
        let id = disk.create_file("frag.txt", 6, ROOT_ID, Some(2)).unwrap();

        let file = disk.find_item(&id).unwrap();
        assert_eq!(file.block_ids, vec![2, 3, 8, 9, 10, 11]);
        disk.assert_consistent();
    }

    #[test]
    fn placement_scan_fails_when_table_ends_short() {
        let mut disk = Disk::new(10);
        let err = disk
            .create_file("a", 4, ROOT_ID, Some(8))
            .unwrap_err();
        assert!(matches!(
            err,
            DiskError::InsufficientContiguousSpace {
                requested: 4,
                found: 2,
                start: 8
            }
        ));
        assert_eq!(disk.free_blocks, 10);
        disk.assert_consistent();
    }

    #[test]
    fn create_under_missing_or_file_parent_fails() {
        let mut disk = Disk::new(16);
        let file_id = disk.create_file("a.txt", 2, ROOT_ID, None).unwrap();

        assert!(matches!(
            disk.create_file("b.txt", 2, "nope", None).unwrap_err(),
            DiskError::ParentNotFound(_)
        ));
        assert!(matches!(
            disk.create_file("c.txt", 2, &file_id, None).unwrap_err(),
            DiskError::ParentNotAFolder(_)
        ));
        assert!(matches!(
            disk.create_folder("d", &file_id).unwrap_err(),
            DiskError::ParentNotAFolder(_)
        ));
        // 失败的分配没有吃掉任何块
        assert_eq!(disk.used_blocks, 2);
        disk.assert_consistent();
    }

    #[test]
    fn create_then_delete_round_trips_counters() {
        let mut disk = Disk::new(32);
        let used_before = disk.used_blocks;
        let free_before = disk.free_blocks;

        let id = disk.create_file("a.txt", 5, ROOT_ID, None).unwrap();
        disk.delete_item(&id).unwrap();

        assert_eq!(disk.used_blocks, used_before);
        assert_eq!(disk.free_blocks, free_before);
        assert!(disk.find_item(&id).is_none());
        assert_eq!(disk.journal.entries()[0].kind, JournalKind::Delete);
        disk.assert_consistent();
    }

    #[test]
    fn deleting_folder_frees_descendant_blocks() {
        let mut disk = Disk::new(32);
        let docs = disk.create_folder("docs", ROOT_ID).unwrap();
        let sub = disk.create_folder("sub", &docs).unwrap();
        disk.create_file("a.txt", 3, &docs, None).unwrap();
        disk.create_file("b.txt", 4, &sub, None).unwrap();
        assert_eq!(disk.used_blocks, 7);

        disk.delete_item(&docs).unwrap();
        assert_eq!(disk.used_blocks, 0);
        assert_eq!(disk.free_blocks, 32);
        assert!(disk.find_item(&sub).is_none());
        disk.assert_consistent();
    }

    #[test]
    fn root_cannot_be_deleted() {
        let mut disk = Disk::new(8);
        assert!(matches!(
            disk.delete_item(ROOT_ID).unwrap_err(),
            DiskError::RootDeletionRejected
        ));
        assert!(matches!(
            disk.delete_item("missing").unwrap_err(),
            DiskError::ItemNotFound(_)
        ));
        disk.assert_consistent();
    }

    #[test]
    fn deleting_file_with_corrupted_blocks_keeps_counts_consistent() {
        use rand::{rngs::StdRng, SeedableRng};

        let mut disk = Disk::new(32);
        let id = disk.create_file("a.txt", 10, ROOT_ID, None).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        disk.crash(crate::fs::CrashSeverity::Minor, &mut rng);
        assert_eq!(disk.corrupted_blocks, 5);

        disk.delete_item(&id).unwrap();
        assert_eq!(disk.used_blocks, 0);
        assert_eq!(disk.corrupted_blocks, 0);
        assert_eq!(disk.free_blocks, 32);
        disk.assert_consistent();
    }

    #[test]
    fn folder_creation_is_journaled_without_blocks() {
        let mut disk = Disk::new(8);
        disk.create_folder("docs", ROOT_ID).unwrap();
        assert_eq!(disk.free_blocks, 8);
        assert_eq!(disk.journal.len(), 1);
        assert_eq!(disk.journal.entries()[0].outcome, Outcome::Done);
        disk.assert_consistent();
    }
}

use serde::{Deserialize, Serialize};

use crate::{fs::config::ROOT_ID, utils::generate_uuid};

/// 目录项类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
}

/// 目录树节点。文件持有块号列表，目录持有子节点。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DirectoryItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub size_blocks: usize,           // 文件占用的块数，目录恒为 0
    pub parent_id: Option<String>,    // 只有根目录是 None
    pub block_ids: Vec<usize>,        // 文件的块号，不要求连续
    pub children: Vec<DirectoryItem>, // 目录的子节点，文件恒为空
}

impl DirectoryItem {
    /// 根目录，id 固定为 "root"
    pub fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            name: "/".to_string(),
            kind: ItemKind::Folder,
            size_blocks: 0,
            parent_id: None,
            block_ids: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn new_file(
        name: &str,
        size_blocks: usize,
        parent_id: &str,
        block_ids: Vec<usize>,
    ) -> Self {
        Self {
            id: generate_uuid(),
            name: name.to_string(),
            kind: ItemKind::File,
            size_blocks,
            parent_id: Some(parent_id.to_string()),
            block_ids,
            children: Vec::new(),
        }
    }

    pub fn new_folder(name: &str, parent_id: &str) -> Self {
        Self {
            id: generate_uuid(),
            name: name.to_string(),
            kind: ItemKind::Folder,
            size_blocks: 0,
            parent_id: Some(parent_id.to_string()),
            block_ids: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }

    // 深度优先按 id 查找
    pub fn find(&self, id: &str) -> Option<&DirectoryItem> {
        if self.id == id {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find(id) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut DirectoryItem> {
        if self.id == id {
            return Some(self);
        }
        for child in &mut self.children {
            if let Some(found) = child.find_mut(id) {
                return Some(found);
            }
        }
        None
    }

    // 深度优先按名字查找，返回第一个匹配
    pub fn find_by_name(&self, name: &str) -> Option<&DirectoryItem> {
        if self.name == name {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find_by_name(name) {
                return Some(found);
            }
        }
        None
    }

    /// 从子树中摘除指定节点，返回被摘除的节点（连同它的整棵子树）
    pub fn remove(&mut self, id: &str) -> Option<DirectoryItem> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(pos));
        }
        for child in &mut self.children {
            if let Some(removed) = child.remove(id) {
                return Some(removed);
            }
        }
        None
    }

    /// 递归收集本节点及所有后代文件持有的块号
    pub fn collect_block_ids(&self, out: &mut Vec<usize>) {
        out.extend_from_slice(&self.block_ids);
        for child in &self.children {
            child.collect_block_ids(out);
        }
    }

    /// 对子树里的每个文件节点执行一次回调
    pub fn for_each_file_mut<F: FnMut(&mut DirectoryItem)>(&mut self, f: &mut F) {
        if self.is_file() {
            f(self);
        }
        for child in &mut self.children {
            child.for_each_file_mut(f);
        }
    }
}

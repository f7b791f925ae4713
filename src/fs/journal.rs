use serde::{Deserialize, Serialize};

use crate::{
    fs::config::JOURNAL_CAPACITY,
    utils::{current_timestamp, generate_uuid},
};

/// 日志条目对应的操作种类
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum JournalKind {
    Create,
    Delete,
    Crash,
    Recover,
    Defrag,
}

impl JournalKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Crash => "crash",
            Self::Recover => "recover",
            Self::Defrag => "defrag",
        }
    }
}

/// 操作结果
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Pending,
    Failed,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JournalEntry {
    pub id: String,
    pub kind: JournalKind,
    pub target: String, // 操作对象的可读描述
    pub outcome: Outcome,
    pub timestamp: u64, // unix 秒
}

/// 展示用操作日志。新条目在前，容量固定，不参与任何恢复逻辑。
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Journal {
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次操作。超出容量时最旧的条目被静默丢弃。
    pub fn record(&mut self, kind: JournalKind, target: impl Into<String>, outcome: Outcome) {
        self.entries.insert(
            0,
            JournalEntry {
                id: generate_uuid(),
                kind,
                target: target.into(),
                outcome,
                timestamp: current_timestamp(),
            },
        );
        self.entries.truncate(JOURNAL_CAPACITY);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

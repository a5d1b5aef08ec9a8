use std::collections::VecDeque;

use crate::file_map::FileMap;

/// Default number of snapshots kept by [`UndoLog`].
pub const DEFAULT_UNDO_DEPTH: usize = 10;

/// Captured project state restored by undo.
/// 復原時還原的專案狀態快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSnapshot {
    pub files: FileMap,
    pub raw_text: String,
}

impl UndoSnapshot {
    pub fn new(files: &FileMap, raw_text: &str) -> Self {
        Self {
            files: files.clone(),
            raw_text: raw_text.to_string(),
        }
    }
}

/// 有上限的復原堆疊，超出容量時捨棄最舊的快照。 / Bounded undo stack that evicts the oldest snapshot.
#[derive(Debug, Clone)]
pub struct UndoLog {
    capacity: usize,
    entries: VecDeque<UndoSnapshot>,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl UndoLog {
    /// 建立指定容量的復原紀錄。 / Creates a log holding at most `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// 推入新快照。 / Pushes a snapshot, evicting the oldest one beyond capacity.
    pub fn push(&mut self, snapshot: UndoSnapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// 取出最新快照。 / Pops the newest snapshot.
    pub fn pop(&mut self) -> Option<UndoSnapshot> {
        self.entries.pop_back()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

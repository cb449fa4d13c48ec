use std::collections::VecDeque;

use floorwatch_bridge::notification::NotificationRecord;

/// In-memory notification list, newest first.
///
/// Every effective mutation bumps [`NotificationStore::revision`], which lets
/// observers detect changes without diffing the list.
#[derive(Debug, Default)]
pub struct NotificationStore {
    records: VecDeque<NotificationRecord>,
    revision: u64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` at the head. Duplicate ids are not rejected; lookups
    /// return the newest match.
    pub fn add(&mut self, record: NotificationRecord) {
        self.records.push_front(record);
        self.revision += 1;
    }

    pub fn mark_read(&mut self, id: &str) {
        if let Some(record) = self.records.iter_mut().find(|record| record.id == id) {
            if !record.read {
                record.read = true;
                self.revision += 1;
            }
        }
    }

    pub fn mark_all_read(&mut self) {
        let mut changed = false;
        for record in self.records.iter_mut().filter(|record| !record.read) {
            record.read = true;
            changed = true;
        }
        if changed {
            self.revision += 1;
        }
    }

    /// Removes the newest record with `id`, if any.
    pub fn remove(&mut self, id: &str) {
        if let Some(index) = self.records.iter().position(|record| record.id == id) {
            self.records.remove(index);
            self.revision += 1;
        }
    }

    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            self.records.clear();
            self.revision += 1;
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&NotificationRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|record| !record.read).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    /// Copy of the list, newest first.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

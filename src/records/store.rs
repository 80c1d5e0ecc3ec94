use std::convert::Infallible;

use crate::{
    catalog::{Catalog, User},
    records::{NewRecord, Record, RecordSource},
};

/// Append-only record log kept in memory. Ids are handed out in insertion order
/// so they double as the creation sequence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
    next_id: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Wraps rows that already carry ids, e.g. a dump from the database.
    pub fn from_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        MemoryStore {
            records: records,
            next_id: next_id,
        }
    }

    pub fn insert(&mut self, new_record: NewRecord) -> &Record {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.records.push(new_record.into_record(id));
        debug!("Stored record {} in memory", id);

        // we just pushed so there's a last element
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes a user and every record they own.
    pub fn delete_user(&mut self, catalog: &mut Catalog, user_id: u32) -> Option<(User, usize)> {
        let user = catalog.remove_user(user_id)?;
        let before = self.records.len();
        self.records.retain(|r| r.user_id != user_id);
        let removed = before - self.records.len();
        info!(
            "Deleted user \"{}\" along with {} record(s)",
            &user.username, removed
        );

        Some((user, removed))
    }
}

impl RecordSource for MemoryStore {
    type Error = Infallible;

    fn all_records(&self) -> Result<Vec<Record>, Self::Error> {
        Ok(self.records.clone())
    }

    fn records_for_pair(
        &self,
        course_id: u32,
        machine_id: u32,
    ) -> Result<Vec<Record>, Self::Error> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.course_id == course_id && r.machine_id == machine_id)
            .cloned()
            .collect())
    }

    fn records_for_course(&self, course_id: u32) -> Result<Vec<Record>, Self::Error> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect())
    }
}

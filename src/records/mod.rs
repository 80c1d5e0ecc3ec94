use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};

use crate::schema::records;

pub mod db;
pub mod store;
pub mod submission;
pub mod time;

/// (course_id, machine_id), the unit a world record is competed for.
pub type PairKey = (u32, u32);

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[table_name = "records"]
pub struct Record {
    pub id: u32,
    pub course_id: u32,
    pub machine_id: u32,
    pub character_id: u32,
    pub user_id: u32,
    pub time_str: String,
    pub time_ms: u32,
    pub date_set: NaiveDate,
    pub lap1: Option<f32>,
    pub lap2: Option<f32>,
    pub lap3: Option<f32>,
    pub proof_url: String,
    pub created_at: NaiveDateTime,
}

impl Record {
    #[inline]
    pub fn pair(&self) -> PairKey {
        (self.course_id, self.machine_id)
    }

    /// Ids only break ties between identical timestamps.
    #[inline]
    pub fn cmp_creation(&self, other: &Record) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Chronological replay order: the day it was set, then submission order.
    #[inline]
    pub fn cmp_chronological(&self, other: &Record) -> Ordering {
        self.date_set
            .cmp(&other.date_set)
            .then_with(|| self.cmp_creation(other))
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[table_name = "records"]
pub struct NewRecord {
    pub course_id: u32,
    pub machine_id: u32,
    pub character_id: u32,
    pub user_id: u32,
    pub time_str: String,
    pub time_ms: u32,
    pub date_set: NaiveDate,
    pub lap1: Option<f32>,
    pub lap2: Option<f32>,
    pub lap3: Option<f32>,
    pub proof_url: String,
    pub created_at: NaiveDateTime,
}

impl NewRecord {
    pub fn into_record(self, id: u32) -> Record {
        Record {
            id: id,
            course_id: self.course_id,
            machine_id: self.machine_id,
            character_id: self.character_id,
            user_id: self.user_id,
            time_str: self.time_str,
            time_ms: self.time_ms,
            date_set: self.date_set,
            lap1: self.lap1,
            lap2: self.lap2,
            lap3: self.lap3,
            proof_url: self.proof_url,
            created_at: self.created_at,
        }
    }
}

/// Retrieval only. Grouping, ordering and filtering by quality belong to the
/// engine, so implementations hand back rows in whatever order they have them.
pub trait RecordSource {
    type Error;

    fn all_records(&self) -> Result<Vec<Record>, Self::Error>;

    fn records_for_pair(&self, course_id: u32, machine_id: u32)
        -> Result<Vec<Record>, Self::Error>;

    fn records_for_course(&self, course_id: u32) -> Result<Vec<Record>, Self::Error>;
}

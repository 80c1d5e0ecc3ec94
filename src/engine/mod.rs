//! World record resolution and history reconstruction.
//!
//! Everything in here is a pure function of a [`Snapshot`] and an explicit
//! `today`. Nothing reads the clock or goes back to the store mid-computation.

use chrono::NaiveDate;

use crate::{catalog::Catalog, error::InconsistentRecord, records::Record};

pub mod current;
pub mod integrity;
pub mod rankings;
pub mod timeline;

/// One consistent read of the store: the catalog plus every record that
/// survived the integrity screen.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub catalog: Catalog,
    pub records: Vec<Record>,
    pub flagged: Vec<InconsistentRecord>,
}

impl Snapshot {
    pub fn new(catalog: Catalog, records: Vec<Record>) -> Self {
        let screened = integrity::screen(records);
        Snapshot {
            catalog: catalog,
            records: screened.accepted,
            flagged: screened.flagged,
        }
    }

    pub fn records_for_course(&self, course_id: u32) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.course_id == course_id)
    }
}

/// Whole days from `start` to `end`, never negative.
#[inline]
pub fn days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from(days).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn days_between_clamps_at_zero() {
        assert_eq!(days_between(day(1), day(11)), 10);
        assert_eq!(days_between(day(5), day(5)), 0);
        assert_eq!(days_between(day(9), day(2)), 0);
    }

    #[test]
    fn snapshot_keeps_flagged_rows_out() {
        let mut bad = record(2, FLORIA, WARP_STAR, BEA, 1, day(2));
        bad.time_str = "1'00\"000".to_owned();
        let snapshot = Snapshot::new(
            catalog(),
            vec![record(1, FLORIA, WARP_STAR, ASH, 65_780, day(1)), bad],
        );
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.flagged.len(), 1);
        assert_eq!(snapshot.records_for_course(FLORIA).count(), 1);
    }
}

use std::{cmp::Ordering, collections::BTreeMap};

use crate::records::{PairKey, Record};

/// The one ordering every "current WR" view agrees on: fastest time, then the
/// earliest day it was set, then whichever was submitted first.
#[inline]
pub fn wr_order(a: &Record, b: &Record) -> Ordering {
    a.time_ms
        .cmp(&b.time_ms)
        .then_with(|| a.date_set.cmp(&b.date_set))
        .then_with(|| a.cmp_creation(b))
}

pub fn current_best<'a, I>(records: I) -> Option<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().min_by(|a, b| wr_order(a, b))
}

fn best_by<'a, K, I, F>(records: I, key: F) -> BTreeMap<K, &'a Record>
where
    K: Ord,
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> K,
{
    let mut best: BTreeMap<K, &'a Record> = BTreeMap::new();
    for record in records {
        best.entry(key(record))
            .and_modify(|held| {
                if wr_order(record, held) == Ordering::Less {
                    *held = record;
                }
            })
            .or_insert(record);
    }

    best
}

/// Current WR for every (course, machine) pair that has at least one record.
pub fn current_best_all<'a, I>(records: I) -> BTreeMap<PairKey, &'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    best_by(records, Record::pair)
}

/// Current WR per course regardless of machine.
pub fn current_best_by_course<'a, I>(records: I) -> BTreeMap<u32, &'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    best_by(records, |r| r.course_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn empty_group_has_no_record() {
        let none: Vec<Record> = Vec::new();
        assert!(current_best(&none).is_none());
        assert!(current_best_all(&none).is_empty());
    }

    #[test]
    fn fastest_time_wins_regardless_of_order() {
        let records = vec![
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(1)),
            record(2, FLORIA, WARP_STAR, BEA, 60_000, day(5)),
            record(3, FLORIA, WARP_STAR, CAL, 70_000, day(9)),
        ];
        let best = current_best(&records).unwrap();
        assert_eq!(best.id, 2);
        assert!(records.iter().all(|r| best.time_ms <= r.time_ms));
    }

    #[test]
    fn ties_go_to_the_earliest_date_then_first_submitted() {
        let records = vec![
            record(4, FLORIA, WARP_STAR, CAL, 60_000, day(3)),
            record(3, FLORIA, WARP_STAR, BEA, 60_000, day(2)),
            record(2, FLORIA, WARP_STAR, ASH, 60_000, day(2)),
        ];
        assert_eq!(current_best(&records).unwrap().id, 2);

        // same day and same timestamp: the lower id was inserted first
        let same_day = vec![
            record(9, FLORIA, WARP_STAR, BEA, 60_000, day(2)),
            record(8, FLORIA, WARP_STAR, ASH, 60_000, day(2)),
        ];
        assert_eq!(current_best(&same_day).unwrap().user_id, ASH);
    }

    #[test]
    fn creation_timestamp_breaks_ties_before_id() {
        let mut early = record(9, FLORIA, WARP_STAR, BEA, 60_000, day(2));
        early.created_at = noon(day(2)) - chrono::Duration::hours(1);
        let late = record(8, FLORIA, WARP_STAR, ASH, 60_000, day(2));
        assert_eq!(current_best(&[late, early]).unwrap().id, 9);
    }

    // small linear congruential generator so the varied cases are repeatable
    fn varied(seed: u64, count: u32) -> Vec<Record> {
        let mut state = seed;
        let mut next = move |bound: u64| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) % bound
        };
        (1..=count)
            .map(|id| {
                let machine = if next(2) == 0 { WARP_STAR } else { WAGON_STAR };
                let user = next(4) as u32 + 1;
                let ms = 55_000 + next(10_000) as u32;
                let mut rec = record(id, FLORIA, machine, user, ms, day(next(60) as i64));
                rec.created_at = rec.created_at + chrono::Duration::seconds(next(3) as i64);
                rec
            })
            .collect()
    }

    #[test]
    fn best_never_loses_to_any_record_in_varied_logs() {
        for seed in 0..200u64 {
            let records = varied(seed, 1 + (seed % 40) as u32);
            for (&pair, best) in &current_best_all(&records) {
                for r in records.iter().filter(|r| r.pair() == pair) {
                    assert!(best.time_ms <= r.time_ms, "seed {}", seed);
                    assert_ne!(wr_order(r, best), Ordering::Less, "seed {}", seed);
                }
            }

            // adding records can only keep or lower the best time
            let mut running: Option<u32> = None;
            for n in 1..=records.len() {
                let best = current_best(&records[..n]).map(|r| r.time_ms);
                if let (Some(before), Some(now)) = (running, best) {
                    assert!(now <= before, "seed {}", seed);
                }
                running = best;
            }

            // input order doesn't matter
            let mut reversed = records.clone();
            reversed.reverse();
            assert_eq!(
                current_best(&records).map(|r| r.id),
                current_best(&reversed).map(|r| r.id),
                "seed {}",
                seed
            );
        }
    }

    #[test]
    fn groups_by_pair_and_by_course() {
        let records = vec![
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(1)),
            record(2, FLORIA, WAGON_STAR, BEA, 63_000, day(2)),
            record(3, FLORIA, WARP_STAR, CAL, 64_000, day(3)),
            record(4, FLOWER, WARP_STAR, DEE, 31_000, day(1)),
        ];

        let by_pair = current_best_all(&records);
        assert_eq!(by_pair.len(), 3);
        assert_eq!(by_pair[&(FLORIA, WARP_STAR)].id, 3);
        assert_eq!(by_pair[&(FLORIA, WAGON_STAR)].id, 2);
        assert_eq!(by_pair[&(FLOWER, WARP_STAR)].id, 4);

        let by_course = current_best_by_course(&records);
        assert_eq!(by_course.len(), 2);
        assert_eq!(by_course[&FLORIA].id, 2);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    engine::days_between,
    records::{PairKey, Record},
};

/// A stretch of days during which one record was the WR for its pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolderInterval {
    pub user_id: u32,
    pub record_id: u32,
    pub time_ms: u32,
    pub start: NaiveDate,
    /// `None` while the record still stands.
    pub end: Option<NaiveDate>,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTimeline {
    pub pair: PairKey,
    pub intervals: Vec<HolderInterval>,
}

impl GroupTimeline {
    pub fn holder(&self) -> Option<&HolderInterval> {
        self.intervals.last()
    }

    pub fn dethronements(&self) -> usize {
        self.intervals.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderStats {
    pub total_days: u32,
    /// Number of times this player set a new WR, on any pair.
    pub wr_count: u32,
    pub pairs: BTreeSet<PairKey>,
}

pub type HolderTotals = BTreeMap<u32, HolderStats>;

/// Replays one pair's records in the order they happened. Only a strictly
/// faster time takes the record; anything else is history but changes nothing.
/// Records from other pairs than the first one seen are ignored.
pub fn reconstruct_group<'a, I>(records: I, today: NaiveDate) -> Option<GroupTimeline>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut ordered: Vec<&Record> = records.into_iter().collect();
    ordered.sort_by(|a, b| a.cmp_chronological(b));
    let pair = ordered.first()?.pair();

    let mut intervals: Vec<HolderInterval> = Vec::new();
    for record in ordered {
        if record.pair() != pair {
            debug!("Skipping record {} outside of pair {:?}", record.id, pair);
            continue;
        }
        match intervals.last_mut() {
            Some(held) if record.time_ms >= held.time_ms => continue,
            Some(held) => {
                held.end = Some(record.date_set);
                held.days = days_between(held.start, record.date_set);
            }
            None => (),
        }
        intervals.push(HolderInterval {
            user_id: record.user_id,
            record_id: record.id,
            time_ms: record.time_ms,
            start: record.date_set,
            end: None,
            days: 0,
        });
    }
    if let Some(held) = intervals.last_mut() {
        held.days = days_between(held.start, today);
    }

    Some(GroupTimeline {
        pair: pair,
        intervals: intervals,
    })
}

/// Splits the log by pair and replays every pair independently. Output is in
/// pair order.
pub fn reconstruct_all<'a, I>(records: I, today: NaiveDate) -> Vec<GroupTimeline>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<PairKey, Vec<&'a Record>> = BTreeMap::new();
    for record in records {
        groups.entry(record.pair()).or_default().push(record);
    }

    groups
        .into_values()
        .filter_map(|group| reconstruct_group(group, today))
        .collect()
}

pub fn holder_totals(timelines: &[GroupTimeline]) -> HolderTotals {
    let mut totals = HolderTotals::new();
    for timeline in timelines {
        for interval in &timeline.intervals {
            let stats = totals.entry(interval.user_id).or_default();
            stats.total_days = stats.total_days.saturating_add(interval.days);
            stats.wr_count += 1;
            stats.pairs.insert(timeline.pair);
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    const TODAY: i64 = 100;

    #[test]
    fn single_record_holds_until_today() {
        let records = vec![record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10))];
        let timeline = reconstruct_group(&records, day(TODAY)).unwrap();

        assert_eq!(timeline.intervals.len(), 1);
        assert_eq!(timeline.dethronements(), 0);
        let held = timeline.holder().unwrap();
        assert_eq!(held.user_id, ASH);
        assert_eq!(held.end, None);
        assert_eq!(held.days, 90);
    }

    #[test]
    fn empty_group_has_no_timeline() {
        let records: Vec<Record> = Vec::new();
        assert!(reconstruct_group(&records, day(TODAY)).is_none());
        assert!(reconstruct_all(&records, day(TODAY)).is_empty());
    }

    #[test]
    fn faster_time_dethrones_the_holder() {
        let records = vec![
            record(2, FLORIA, WARP_STAR, BEA, 60_000, day(30)),
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10)),
        ];
        let timeline = reconstruct_group(&records, day(TODAY)).unwrap();

        assert_eq!(timeline.intervals.len(), 2);
        let first = &timeline.intervals[0];
        assert_eq!((first.user_id, first.start, first.end, first.days), (ASH, day(10), Some(day(30)), 20));
        let second = &timeline.intervals[1];
        assert_eq!((second.user_id, second.start, second.end, second.days), (BEA, day(30), None, 70));

        let totals = holder_totals(&[timeline]);
        assert_eq!(totals[&ASH].wr_count, 1);
        assert_eq!(totals[&ASH].total_days, 20);
        assert_eq!(totals[&BEA].wr_count, 1);
        assert_eq!(totals[&BEA].total_days, 70);
    }

    #[test]
    fn slower_and_equal_times_change_nothing() {
        let base = vec![
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10)),
            record(2, FLORIA, WARP_STAR, BEA, 60_000, day(30)),
        ];
        let mut extended = base.clone();
        extended.push(record(3, FLORIA, WARP_STAR, CAL, 70_000, day(50)));
        extended.push(record(4, FLORIA, WARP_STAR, DEE, 60_000, day(60)));

        let before = reconstruct_group(&base, day(TODAY)).unwrap();
        let after = reconstruct_group(&extended, day(TODAY)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn same_day_dethrone_counts_zero_days() {
        let records = vec![
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10)),
            record(2, FLORIA, WARP_STAR, BEA, 60_000, day(10)),
        ];
        let timeline = reconstruct_group(&records, day(TODAY)).unwrap();
        assert_eq!(timeline.intervals[0].days, 0);
        assert_eq!(timeline.intervals[1].days, 90);

        let totals = holder_totals(&[timeline]);
        assert_eq!(totals[&ASH].wr_count, 1);
        assert_eq!(totals[&ASH].total_days, 0);
    }

    #[test]
    fn same_day_replay_follows_submission_order() {
        // the faster run was submitted first, so the slower one never holds
        let records = vec![
            record(2, FLORIA, WARP_STAR, BEA, 65_780, day(10)),
            record(1, FLORIA, WARP_STAR, ASH, 60_000, day(10)),
        ];
        let timeline = reconstruct_group(&records, day(TODAY)).unwrap();
        assert_eq!(timeline.intervals.len(), 1);
        assert_eq!(timeline.holder().unwrap().user_id, ASH);
    }

    #[test]
    fn today_before_the_record_is_never_negative() {
        let records = vec![record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10))];
        let timeline = reconstruct_group(&records, day(5)).unwrap();
        assert_eq!(timeline.holder().unwrap().days, 0);
    }

    #[test]
    fn totals_span_every_pair() {
        let records = vec![
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10)),
            record(2, FLORIA, WAGON_STAR, ASH, 66_000, day(20)),
            record(3, FLOWER, WARP_STAR, BEA, 31_000, day(40)),
            record(4, FLOWER, WARP_STAR, ASH, 30_000, day(60)),
            record(5, FLORIA, WARP_STAR, BEA, 64_000, day(90)),
        ];
        let timelines = reconstruct_all(records.iter().rev(), day(TODAY));
        assert_eq!(
            timelines.iter().map(|t| t.pair).collect::<Vec<_>>(),
            vec![(FLORIA, WARP_STAR), (FLORIA, WAGON_STAR), (FLOWER, WARP_STAR)]
        );

        let totals = holder_totals(&timelines);
        // floria/warp 80 + floria/wagon 80 + flower 40
        assert_eq!(totals[&ASH].total_days, 200);
        assert_eq!(totals[&ASH].wr_count, 3);
        assert_eq!(totals[&ASH].pairs.len(), 3);
        // flower 20 + floria/warp 10
        assert_eq!(totals[&BEA].total_days, 30);
        assert_eq!(totals[&BEA].wr_count, 2);
    }

    #[test]
    fn replay_is_deterministic_under_input_order() {
        let records = vec![
            record(1, FLORIA, WARP_STAR, ASH, 65_780, day(10)),
            record(2, FLORIA, WARP_STAR, BEA, 60_000, day(10)),
            record(3, FLORIA, WARP_STAR, CAL, 59_000, day(12)),
        ];
        let forward = reconstruct_all(&records, day(TODAY));
        let backward = reconstruct_all(records.iter().rev(), day(TODAY));
        assert_eq!(forward, backward);
    }

    #[test]
    fn days_stay_non_negative_for_any_today() {
        let mut state: u64 = 17;
        let mut next = move |bound: u64| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) % bound
        };
        for round in 0..100u32 {
            let records: Vec<Record> = (1..=1 + next(25) as u32)
                .map(|id| {
                    let machine = if next(2) == 0 { WARP_STAR } else { WAGON_STAR };
                    record(id, FLORIA, machine, next(4) as u32 + 1, 50_000 + next(20_000) as u32, day(next(90) as i64))
                })
                .collect();
            // today may fall before, inside or after the logged dates
            let today = day(next(120) as i64 - 10);
            let timelines = reconstruct_all(&records, today);
            for timeline in &timelines {
                for interval in &timeline.intervals {
                    let end = interval.end.unwrap_or(today);
                    assert_eq!(interval.days, days_between(interval.start, end), "round {}", round);
                    if end <= interval.start {
                        assert_eq!(interval.days, 0, "round {}", round);
                    }
                }
            }
            let totals = holder_totals(&timelines);
            let summed: u32 = timelines
                .iter()
                .flat_map(|t| t.intervals.iter())
                .map(|i| i.days)
                .sum();
            assert_eq!(totals.values().map(|t| t.total_days).sum::<u32>(), summed, "round {}", round);
        }
    }

    #[test]
    fn every_interval_is_non_negative_and_contiguous() {
        let records: Vec<Record> = (0..20u32)
            .map(|i| record(i + 1, FLORIA, WARP_STAR, i % 4 + 1, 90_000 - (i % 7) * 1_000 - i, day(i64::from(i / 3))))
            .collect();
        let timeline = reconstruct_group(&records, day(TODAY)).unwrap();
        for pair in timeline.intervals.windows(2) {
            assert_eq!(pair[0].end, Some(pair[1].start));
            assert!(pair[1].time_ms < pair[0].time_ms);
            assert_eq!(pair[0].days, days_between(pair[0].start, pair[1].start));
        }
    }
}

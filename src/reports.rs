//! The JSON documents the site renders, built from a [`Snapshot`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::{
    catalog::{Catalog, Character, CountryBucket, Course, CourseFamily, Machine, User},
    engine::{
        current::{current_best_all, current_best_by_course},
        days_between,
        rankings::{rank_countries, rank_players, CountryRanking, PlayerRanking},
        timeline::{holder_totals, reconstruct_all, reconstruct_group},
        Snapshot,
    },
    helpers::static_path,
    records::{time::format_ms, Record},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrRow {
    pub course_key: String,
    pub course_name: String,
    pub machine_name: String,
    pub machine_icon: String,
    pub time: String,
    pub player: String,
    pub nation_code: String,
    pub date: NaiveDate,
    pub days: u32,
    pub character_name: String,
    pub char_icon: String,
}

struct Resolved<'a> {
    record: &'a Record,
    course: &'a Course,
    machine: &'a Machine,
    character: &'a Character,
    user: &'a User,
}

fn resolve<'a>(catalog: &'a Catalog, record: &'a Record) -> Option<Resolved<'a>> {
    Some(Resolved {
        record: record,
        course: catalog.course(record.course_id)?,
        machine: catalog.machine(record.machine_id)?,
        character: catalog.character(record.character_id)?,
        user: catalog.user(record.user_id)?,
    })
}

/// Rows pointing at something missing from the catalog are logged and skipped.
fn resolve_all<'a, I>(catalog: &'a Catalog, records: I) -> Vec<Resolved<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut resolved = Vec::new();
    for record in records {
        match resolve(catalog, record) {
            Some(r) => resolved.push(r),
            None => warn!(
                "Record {} points at a missing course, machine, character or user",
                record.id
            ),
        }
    }

    resolved
}

impl<'a> Resolved<'a> {
    fn wr_row(&self, today: NaiveDate) -> WrRow {
        WrRow {
            course_key: self.course.course_key.clone(),
            course_name: self.course.name.clone(),
            machine_name: self.machine.name.clone(),
            machine_icon: static_path(&self.machine.icon),
            time: self.record.time_str.clone(),
            player: self.user.username.clone(),
            nation_code: self.user.nation_code(),
            date: self.record.date_set,
            days: days_between(self.record.date_set, today),
            character_name: self.character.name.clone(),
            char_icon: static_path(&self.character.icon),
        }
    }
}

fn wr_rows<'a, I>(catalog: &'a Catalog, current: I, today: NaiveDate) -> Vec<WrRow>
where
    I: IntoIterator<Item = &'a Record>,
{
    resolve_all(catalog, current)
        .iter()
        .map(|r| r.wr_row(today))
        .collect()
}

/// Best time on each course, whatever machine it was set on.
pub fn current_wrs(snapshot: &Snapshot, today: NaiveDate) -> Vec<WrRow> {
    let best = current_best_by_course(&snapshot.records);
    let mut rows = wr_rows(&snapshot.catalog, best.into_values(), today);
    rows.sort_by_cached_key(|r| r.course_name.to_lowercase());

    rows
}

/// Best time for every (course, machine) pair.
pub fn wr_snapshot(snapshot: &Snapshot, today: NaiveDate) -> Vec<WrRow> {
    let best = current_best_all(&snapshot.records);
    let mut rows = wr_rows(&snapshot.catalog, best.into_values(), today);
    rows.sort_by_cached_key(|r| (r.course_name.to_lowercase(), r.machine_name.to_lowercase()));

    rows
}

/// Current pair records set within the last `days` days, newest first.
pub fn recent_wrs(snapshot: &Snapshot, today: NaiveDate, days: u32) -> Vec<WrRow> {
    // a window reaching past the calendar's start has no cutoff at all
    let cutoff = today.checked_sub_signed(Duration::days(i64::from(days)));
    let best = current_best_all(&snapshot.records);
    let recent = best
        .into_values()
        .filter(|r| cutoff.map_or(true, |c| r.date_set >= c));
    let mut rows = wr_rows(&snapshot.catalog, recent, today);
    rows.sort_by_cached_key(|r| {
        (
            std::cmp::Reverse(r.date),
            r.course_name.to_lowercase(),
            r.machine_name.to_lowercase(),
        )
    });

    rows
}

pub fn player_rankings(snapshot: &Snapshot, today: NaiveDate) -> Vec<PlayerRanking> {
    let timelines = reconstruct_all(&snapshot.records, today);
    let totals = holder_totals(&timelines);

    rank_players(snapshot.catalog.users(), &totals)
}

pub fn country_rankings(snapshot: &Snapshot) -> Vec<CountryRanking> {
    let best = current_best_all(&snapshot.records);

    rank_countries(best.into_values(), &snapshot.catalog)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionRow {
    pub player: String,
    pub nation_code: String,
    pub time: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub days: u32,
}

/// Every WR a pair has had, oldest first. `None` if the course or machine
/// doesn't exist; an empty list if nobody has run it yet.
pub fn wr_progression(
    snapshot: &Snapshot,
    course_key: &str,
    machine_name: &str,
    today: NaiveDate,
) -> Option<Vec<ProgressionRow>> {
    let catalog = &snapshot.catalog;
    let pair = catalog.pair_key(course_key, machine_name)?;
    let group = snapshot.records.iter().filter(|r| r.pair() == pair);
    let timeline = match reconstruct_group(group, today) {
        Some(t) => t,
        None => return Some(Vec::new()),
    };

    let rows = timeline
        .intervals
        .iter()
        .map(|i| {
            let user = catalog.user(i.user_id);
            ProgressionRow {
                player: user.map(|u| u.username.clone()).unwrap_or_default(),
                nation_code: user.map(User::nation_code).unwrap_or_default(),
                time: format_ms(i.time_ms),
                start: i.start,
                end: i.end,
                days: i.days,
            }
        })
        .collect();

    Some(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineWrRow {
    pub machine_name: String,
    pub machine_icon: String,
    pub date: NaiveDate,
    pub time: String,
    pub player: String,
    pub nation_code: String,
    pub days: u32,
    pub lap1: Option<f32>,
    pub lap2: Option<f32>,
    pub lap3: Option<f32>,
    pub char_icon: String,
    pub char_alt: String,
    pub proof_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub machine_name: String,
    pub machine_icon: String,
    pub time: String,
    pub player: String,
    pub nation_code: String,
    pub days: u32,
    pub lap1: Option<f32>,
    pub lap2: Option<f32>,
    pub lap3: Option<f32>,
    pub char_icon: String,
    pub proof_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub total_machine_wrs: u32,
    pub unique_players: u32,
    pub unique_nations: u32,
    pub unique_machines: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayShare {
    pub name: String,
    pub total_days: u32,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NationCount {
    pub nation: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub by_player: Vec<DayShare>,
    pub by_machine: Vec<DayShare>,
    pub by_nation: Vec<NationCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub key: String,
    pub name: String,
    pub family: CourseFamily,
    pub map_icon: String,
    pub summary: CourseSummary,
    pub current_machine_wrs: Vec<MachineWrRow>,
    pub history: Vec<HistoryRow>,
    pub stats: CourseStats,
}

fn shares(days: BTreeMap<String, u32>) -> Vec<DayShare> {
    let total: u32 = days.values().sum();
    let denominator = f64::from(total.max(1));
    let mut rows: Vec<DayShare> = days
        .into_iter()
        .map(|(name, d)| DayShare {
            pct: (f64::from(d) / denominator * 10_000.0).round() / 100.0,
            name: name,
            total_days: d,
        })
        .collect();
    // the map already gave us name order, so a stable sort keeps it for ties
    rows.sort_by(|a, b| b.total_days.cmp(&a.total_days));

    rows
}

/// Everything the course page shows. `None` for an unknown course key.
pub fn course_view(snapshot: &Snapshot, course_key: &str, today: NaiveDate) -> Option<CourseView> {
    let catalog = &snapshot.catalog;
    let course = catalog.course_by_key(course_key)?;

    let best = current_best_all(snapshot.records_for_course(course.id));
    let mut current = resolve_all(catalog, best.into_values());
    current.sort_by_cached_key(|r| r.machine.name.to_lowercase());

    let mut player_days: BTreeMap<String, u32> = BTreeMap::new();
    let mut machine_days: BTreeMap<String, u32> = BTreeMap::new();
    let mut nations: HashMap<String, u32> = HashMap::new();
    let mut known_nations: BTreeSet<String> = BTreeSet::new();
    let mut players: BTreeSet<u32> = BTreeSet::new();
    for r in &current {
        let held = days_between(r.record.date_set, today);
        *player_days.entry(r.user.username.clone()).or_default() += held;
        *machine_days.entry(r.machine.name.clone()).or_default() += held;
        let bucket = r.user.country_bucket();
        *nations.entry(bucket.code().to_owned()).or_default() += 1;
        if let CountryBucket::Known(code) = bucket {
            known_nations.insert(code);
        }
        players.insert(r.user.id);
    }

    let mut by_nation: Vec<NationCount> = nations
        .into_iter()
        .map(|(nation, count)| NationCount {
            nation: nation,
            count: count,
        })
        .collect();
    by_nation.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.nation.cmp(&b.nation)));

    let summary = CourseSummary {
        total_machine_wrs: current.len() as u32,
        unique_players: players.len() as u32,
        unique_nations: known_nations.len() as u32,
        unique_machines: machine_days.len() as u32,
    };

    let current_machine_wrs = current
        .iter()
        .map(|r| MachineWrRow {
            machine_name: r.machine.name.clone(),
            machine_icon: static_path(&r.machine.icon),
            date: r.record.date_set,
            time: r.record.time_str.clone(),
            player: r.user.username.clone(),
            nation_code: r.user.nation_code(),
            days: days_between(r.record.date_set, today),
            lap1: r.record.lap1,
            lap2: r.record.lap2,
            lap3: r.record.lap3,
            char_icon: static_path(&r.character.icon),
            char_alt: r.character.name.clone(),
            proof_url: r.record.proof_url.clone(),
        })
        .collect();

    let mut course_records: Vec<&Record> = snapshot.records_for_course(course.id).collect();
    course_records.sort_by(|a, b| b.date_set.cmp(&a.date_set).then_with(|| b.id.cmp(&a.id)));
    let history = resolve_all(catalog, course_records)
        .into_iter()
        .map(|r| HistoryRow {
            date: r.record.date_set,
            machine_name: r.machine.name.clone(),
            machine_icon: static_path(&r.machine.icon),
            time: r.record.time_str.clone(),
            player: r.user.username.clone(),
            nation_code: r.user.nation_code(),
            days: days_between(r.record.date_set, today),
            lap1: r.record.lap1,
            lap2: r.record.lap2,
            lap3: r.record.lap3,
            char_icon: static_path(&r.character.icon),
            proof_url: r.record.proof_url.clone(),
        })
        .collect();

    Some(CourseView {
        key: course.course_key.clone(),
        name: course.name.clone(),
        family: course.family(),
        map_icon: course.map_icon.as_deref().map(static_path).unwrap_or_default(),
        summary: summary,
        current_machine_wrs: current_machine_wrs,
        history: history,
        stats: CourseStats {
            by_player: shares(player_days),
            by_machine: shares(machine_days),
            by_nation: by_nation,
        },
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRow {
    pub code: String,
    pub name: String,
}

pub fn countries(catalog: &Catalog) -> Vec<CountryRow> {
    let mut rows: Vec<CountryRow> = catalog
        .countries()
        .iter()
        .map(|c| CountryRow {
            code: c.code.to_lowercase(),
            name: c.name.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));

    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedRow {
    pub record_id: u32,
    pub time: String,
    pub stored_ms: u32,
    pub reason: String,
}

pub fn flagged_records(snapshot: &Snapshot) -> Vec<FlaggedRow> {
    snapshot
        .flagged
        .iter()
        .map(|f| FlaggedRow {
            record_id: f.record_id,
            time: f.time_str.clone(),
            stored_ms: f.stored_ms,
            reason: f.to_string(),
        })
        .collect()
}

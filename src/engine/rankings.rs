use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
};

use serde::Serialize;

use crate::{
    catalog::{Catalog, CountryBucket, User},
    engine::timeline::HolderTotals,
    records::Record,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRanking {
    pub rank: u32,
    pub player: String,
    pub nation_code: String,
    pub wr_count: u32,
    pub total_wr_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRanking {
    pub rank: u32,
    pub nation_code: String,
    pub wr_count: u32,
    pub unique_players: u32,
}

// case-insensitive first so "ash" and "Ash" sit together, exact after that so
// the order never depends on input order
fn cmp_usernames(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Every known player gets a row, including those who never held a record.
/// Ranks are positions in the sorted list, so equal keys still get 1, 2, 3.
pub fn rank_players<'a, I>(users: I, totals: &HolderTotals) -> Vec<PlayerRanking>
where
    I: IntoIterator<Item = &'a User>,
{
    let mut rows: Vec<PlayerRanking> = users
        .into_iter()
        .map(|u| {
            let stats = totals.get(&u.id);
            PlayerRanking {
                rank: 0,
                player: u.username.clone(),
                nation_code: u.nation_code(),
                wr_count: stats.map_or(0, |s| s.wr_count),
                total_wr_days: stats.map_or(0, |s| s.total_days),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.wr_count
            .cmp(&a.wr_count)
            .then_with(|| b.total_wr_days.cmp(&a.total_wr_days))
            .then_with(|| cmp_usernames(&a.player, &b.player))
    });
    rows.iter_mut()
        .zip(1u32..)
        .for_each(|(row, rank)| row.rank = rank);

    rows
}

/// Built from the current WR snapshot only, one entry per (course, machine)
/// record. Holders are bucketed by the country they actually stored.
pub fn rank_countries<'a, I>(current: I, catalog: &Catalog) -> Vec<CountryRanking>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buckets: BTreeMap<CountryBucket, (u32, HashSet<u32>)> = BTreeMap::new();
    for record in current {
        let user = match catalog.user(record.user_id) {
            Some(u) => u,
            None => {
                warn!(
                    "Record {} belongs to missing user {}, leaving it out of country rankings",
                    record.id, record.user_id
                );
                continue;
            }
        };
        let entry = buckets.entry(user.country_bucket()).or_default();
        entry.0 += 1;
        entry.1.insert(user.id);
    }

    let mut sorted: Vec<(CountryBucket, u32, u32)> = buckets
        .into_iter()
        .map(|(bucket, (count, players))| (bucket, count, players.len() as u32))
        .collect();
    sorted.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(&b.0))
    });

    sorted
        .into_iter()
        .zip(1u32..)
        .map(|((bucket, count, players), rank)| CountryRanking {
            rank: rank,
            nation_code: bucket.code().to_owned(),
            wr_count: count,
            unique_players: players,
        })
        .collect()
}

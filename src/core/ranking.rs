//! Dual ranking: final-furlong ordering x pace-index ordering
//!
//! Each horse gets its 1-based position in both orderings and a combined
//! score `last_time_rank² + index_rank²`. Squaring punishes a horse that
//! sits in the middle of both tables harder than one that tops one table
//! and trails the other; lower scores are better.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::RankingError;
use crate::models::{HorseStat, RankedHorse};

/// Ascending order, missing values after every present one
fn compare_metric(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Map horse_id -> 1-based position in the stable ascending order of `metric`
fn positions<'a, F>(
    stats: &'a [HorseStat],
    metric: F,
) -> Result<HashMap<&'a str, u32>, RankingError>
where
    F: Fn(&HorseStat) -> Option<f64>,
{
    let mut order: Vec<&HorseStat> = stats.iter().collect();
    // slice::sort_by is stable: equal metrics keep listing order
    order.sort_by(|a, b| compare_metric(metric(a), metric(b)));

    let mut map = HashMap::with_capacity(order.len());
    for (i, stat) in order.iter().enumerate() {
        if map.insert(stat.horse_id.as_str(), i as u32 + 1).is_some() {
            return Err(RankingError::DuplicateHorse(stat.horse_id.clone()));
        }
    }

    Ok(map)
}

/// Rank all horses of one race
///
/// Output is sorted by combined score; equal scores keep the input order.
pub fn rank(stats: Vec<HorseStat>) -> Result<Vec<RankedHorse>, RankingError> {
    let scores: Vec<(u32, u32)> = {
        let by_last_time = positions(&stats, |s| s.average_last_time)?;
        let by_index = positions(&stats, |s| s.race_time_index)?;

        // Both maps hold every id once the duplicate check passed
        stats
            .iter()
            .map(|s| {
                (
                    by_last_time[s.horse_id.as_str()],
                    by_index[s.horse_id.as_str()],
                )
            })
            .collect()
    };

    let mut ranked: Vec<RankedHorse> = stats
        .into_iter()
        .zip(scores)
        .map(|(stat, (last_time_rank, index_rank))| RankedHorse {
            stat,
            last_time_rank,
            index_rank,
            rank: last_time_rank.pow(2) + index_rank.pow(2),
        })
        .collect();

    ranked.sort_by_key(|r| r.rank);
    Ok(ranked)
}

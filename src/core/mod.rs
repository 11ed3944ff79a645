//! Ranking core: pace normalization, recency window, aggregation and dual ranking

pub mod aggregate;
pub mod collector;
pub mod pace;
pub mod ranking;
pub mod recency;

// Re-export commonly used types
pub use aggregate::aggregate;
pub use collector::StatCollector;
pub use pace::compute_index;
pub use ranking::rank;
pub use recency::{filter_recent, RECENCY_YEARS};

use chrono::NaiveDate;

use crate::error::RankingError;
use crate::models::{HistoryRow, HorseEntry, RankedHorse};

/// Filter, aggregate and rank a whole race from already-fetched histories
///
/// `horses` is in entry-list order; `reference_date` is `None` for live ranking.
pub fn rank_histories(
    horses: &[(HorseEntry, Vec<HistoryRow>)],
    reference_date: Option<NaiveDate>,
) -> Result<Vec<RankedHorse>, RankingError> {
    let stats = horses
        .iter()
        .map(|(entry, rows)| {
            let recent = filter_recent(rows, reference_date);
            aggregate(&entry.horse_id, &entry.horse_name, recent)
        })
        .collect();

    rank(stats)
}

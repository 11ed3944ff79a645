//! Per-horse statistics over a filtered history

use tracing::debug;

use super::pace::{compute_index, round2};
use crate::models::{HistoryRow, HorseStat};

/// Average final-furlong time and pace index for one horse
///
/// Both metrics are `None` when no row contributes a value. A horse
/// without data is kept visible instead of being scored as zero.
pub fn aggregate(horse_id: &str, horse_name: &str, filtered_rows: Vec<HistoryRow>) -> HorseStat {
    let average_last_time = average_last_time(&filtered_rows);
    let race_time_index = race_time_index(&filtered_rows);

    debug!(
        horse_id,
        rows = filtered_rows.len(),
        ?average_last_time,
        ?race_time_index,
        "aggregated"
    );

    HorseStat {
        horse_id: horse_id.to_string(),
        horse_name: horse_name.to_string(),
        average_last_time,
        race_time_index,
        history: filtered_rows,
    }
}

/// Mean of numeric `last_time` values, 2 fractional digits
pub fn average_last_time(rows: &[HistoryRow]) -> Option<f64> {
    let values: Vec<f64> = rows
        .iter()
        .filter(|r| r.has_last_time())
        .filter_map(|r| r.last_time.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();

    mean(&values).map(round2)
}

/// Mean pace index over rows with a usable time and distance, 2 fractional digits
pub fn race_time_index(rows: &[HistoryRow]) -> Option<f64> {
    let indices: Vec<f64> = rows
        .iter()
        .filter(|r| !r.race_time.is_empty() && !r.race_distance.is_empty())
        .filter_map(|r| compute_index(&r.race_time, &r.race_distance).ok())
        .collect();

    mean(&indices).map(round2)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

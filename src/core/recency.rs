//! Recency window over a horse's race history

use chrono::{Local, Months, NaiveDate};

use crate::models::HistoryRow;

/// Length of the history window in calendar years
pub const RECENCY_YEARS: u32 = 2;

/// Earliest date still inside the window ending at `reference`
///
/// Calendar arithmetic: Feb 29 maps to Feb 28 when the target year has no leap day.
pub fn window_start(reference: NaiveDate, years: u32) -> NaiveDate {
    reference
        .checked_sub_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MIN)
}

/// Keep rows inside `[reference - 2 years, reference]` that carry a final-furlong time
///
/// `reference_date` is `None` in live mode (today) and the race date in backtests,
/// so a backtest never sees races run after the one being evaluated.
pub fn filter_recent(rows: &[HistoryRow], reference_date: Option<NaiveDate>) -> Vec<HistoryRow> {
    let reference = reference_date.unwrap_or_else(|| Local::now().date_naive());
    filter_window(rows, reference, RECENCY_YEARS)
}

pub fn filter_window(rows: &[HistoryRow], reference: NaiveDate, years: u32) -> Vec<HistoryRow> {
    let start = window_start(reference, years);

    rows.iter()
        .filter(|row| row.date >= start && row.date <= reference && row.has_last_time())
        .cloned()
        .collect()
}

//! Comma-delimited report text
//!
//! Fields are joined as-is. Horse names never contain commas on netkeiba,
//! so no quoting is applied.

use crate::models::RankedHorse;

pub const HEADERS: [&str; 7] = [
    "horseId",
    "horseName",
    "averageLastTime",
    "raceTimeIndex",
    "lastTimeRank",
    "indexRank",
    "rank",
];

/// 2 fractional digits, empty when there is no data
pub fn format_metric(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Fields of one horse in header order
pub fn fields(horse: &RankedHorse) -> [String; 7] {
    [
        horse.stat.horse_id.clone(),
        horse.stat.horse_name.clone(),
        format_metric(horse.stat.average_last_time),
        format_metric(horse.stat.race_time_index),
        horse.last_time_rank.to_string(),
        horse.index_rank.to_string(),
        horse.rank.to_string(),
    ]
}

/// Header plus one line per horse; no trailing newline
pub fn to_delimited(ranked: &[RankedHorse]) -> String {
    let mut lines = Vec::with_capacity(ranked.len() + 1);
    lines.push(HEADERS.join(","));
    for horse in ranked {
        lines.push(fields(horse).join(","));
    }
    lines.join("\n")
}

/// Split delimited text into rows, dropping the header line and blank lines
pub fn parse_delimited(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|f| f.trim().to_string()).collect::<Vec<_>>())
        .filter(|row| row.first().map(String::as_str) != Some(HEADERS[0]))
        .collect()
}

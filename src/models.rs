use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One past race appearance of a horse, as listed on its history page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    /// Free text with a meters quantity, e.g. "芝1600"
    pub race_distance: String,
    /// "M:SS.d"
    pub race_time: String,
    /// Final-furlong time, numeric text or empty
    pub last_time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub race_name: String,
    #[serde(default)]
    pub finish: String,
}

impl HistoryRow {
    /// Build a row from scraped cells; rows with an unreadable date are rejected
    pub fn from_cells(
        date: &str,
        race_distance: &str,
        race_time: &str,
        last_time: &str,
    ) -> Option<Self> {
        Some(Self {
            date: parse_race_date(date)?,
            race_distance: race_distance.trim().to_string(),
            race_time: race_time.trim().to_string(),
            last_time: last_time.trim().to_string(),
            venue: String::new(),
            race_name: String::new(),
            finish: String::new(),
        })
    }

    pub fn has_last_time(&self) -> bool {
        !self.last_time.is_empty()
    }
}

/// Parse the date formats used across netkeiba pages
///
/// Accepts `2024/05/26`, `2024-05-26` and `2024年5月26日`.
pub fn parse_race_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let normalized = text
        .replace('年', "-")
        .replace('月', "-")
        .replace('日', "")
        .replace('/', "-");

    NaiveDate::parse_from_str(normalized.trim(), "%Y-%m-%d").ok()
}

/// A horse as listed on an entry list or result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseEntry {
    pub horse_id: String,
    pub horse_name: String,
    /// Horse history page
    pub url: String,
}

/// Entry list of one race, in listing order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceCard {
    pub race_id: String,
    pub race_name: String,
    /// Known for result pages; absent on entry lists of upcoming races
    pub race_date: Option<NaiveDate>,
    pub entries: Vec<HorseEntry>,
}

/// Whether the history window ends today or at the race's own date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    Live,
    Backtest,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingMode::Live => write!(f, "live"),
            RankingMode::Backtest => write!(f, "backtest"),
        }
    }
}

/// Per-horse aggregate for one race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseStat {
    pub horse_id: String,
    pub horse_name: String,
    /// Mean final-furlong time, 2 fractional digits; `None` when no row contributed
    pub average_last_time: Option<f64>,
    /// Mean pace index, 2 fractional digits; `None` when no row contributed
    pub race_time_index: Option<f64>,
    pub history: Vec<HistoryRow>,
}

impl HorseStat {
    pub fn has_data(&self) -> bool {
        self.average_last_time.is_some() || self.race_time_index.is_some()
    }
}

/// Horse with its positions in both orderings and the combined score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHorse {
    #[serde(flatten)]
    pub stat: HorseStat,
    pub last_time_rank: u32,
    pub index_rank: u32,
    /// last_time_rank² + index_rank²
    pub rank: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_race_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 26);
        assert_eq!(parse_race_date("2024/05/26"), expected);
        assert_eq!(parse_race_date("2024-05-26"), expected);
        assert_eq!(parse_race_date("2024年5月26日"), expected);
        assert_eq!(parse_race_date(" 2024/5/26 "), expected);
    }

    #[test]
    fn test_parse_race_date_invalid() {
        assert_eq!(parse_race_date(""), None);
        assert_eq!(parse_race_date("2023/02/29"), None);
        assert_eq!(parse_race_date("unknown"), None);
    }

    #[test]
    fn test_history_row_from_cells() {
        let row = HistoryRow::from_cells("2024/05/26", "芝2400", "2:24.0", " 33.8 ").unwrap();
        assert_eq!(row.last_time, "33.8");
        assert!(row.has_last_time());

        assert!(HistoryRow::from_cells("", "芝2400", "2:24.0", "33.8").is_none());
    }

    #[test]
    fn test_horse_stat_has_data() {
        let stat = HorseStat {
            horse_id: "1".to_string(),
            horse_name: "A".to_string(),
            average_last_time: None,
            race_time_index: None,
            history: Vec::new(),
        };
        assert!(!stat.has_data());
    }
}

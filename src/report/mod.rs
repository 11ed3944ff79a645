//! Report output: console table, delimited text and saved artifacts
//!
//! # Example
//!
//! ```
//! use keiba::core::rank;
//! use keiba::models::HorseStat;
//! use keiba::report::{to_delimited, to_table};
//!
//! let stats = vec![HorseStat {
//!     horse_id: "2019105219".to_string(),
//!     horse_name: "ドウデュース".to_string(),
//!     average_last_time: Some(34.5),
//!     race_time_index: Some(59.8),
//!     history: Vec::new(),
//! }];
//! let ranked = rank(stats).unwrap();
//! println!("{}", to_table(&ranked));
//! assert!(to_delimited(&ranked).ends_with("34.50,59.80,1,1,2"));
//! ```

mod delimited;
mod table;
mod width;

pub use delimited::{format_metric, parse_delimited, to_delimited, HEADERS};
pub use table::{display_horse_id, table_from_delimited, to_table, NAME_WIDTH};
pub use width::{display_width, pad_display};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{RankedHorse, RankingMode};

/// Full ranking result of one race, saved next to the CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub race_id: String,
    pub race_name: String,
    pub mode: RankingMode,
    pub reference_date: NaiveDate,
    pub generated_at: String,
    pub horses: Vec<RankedHorse>,
}

impl RankingReport {
    pub fn new(
        race_id: &str,
        race_name: &str,
        mode: RankingMode,
        reference_date: NaiveDate,
        horses: Vec<RankedHorse>,
    ) -> Self {
        Self {
            race_id: race_id.to_string(),
            race_name: race_name.to_string(),
            mode,
            reference_date,
            generated_at: Utc::now().to_rfc3339(),
            horses,
        }
    }

    pub fn to_delimited(&self) -> String {
        to_delimited(&self.horses)
    }

    pub fn to_table(&self) -> String {
        to_table(&self.horses)
    }
}

/// `<raceId><raceName>` with characters that are unsafe in file names removed
pub fn report_file_stem(race_id: &str, race_name: &str) -> String {
    format!("{}{}", race_id, race_name.trim())
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect()
}

/// Write `<stem>.csv` and `<stem>.json` into `out_dir`
pub fn save_report(out_dir: &Path, report: &RankingReport) -> io::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir)?;

    let stem = report_file_stem(&report.race_id, &report.race_name);
    let csv_path = out_dir.join(format!("{}.csv", stem));
    let json_path = out_dir.join(format!("{}.json", stem));

    fs::write(&csv_path, report.to_delimited())?;

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&json_path, json)?;

    tracing::info!("Results saved to {}", csv_path.display());
    Ok((csv_path, json_path))
}

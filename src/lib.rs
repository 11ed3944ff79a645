//! Keiba - horse race ranking from netkeiba history pages
//!
//! This library provides:
//! - Pace index and final-furlong averages over a recent history window
//! - Dual ranking with a combined squared-position score
//! - Console table, CSV and JSON reports
//! - Scrapers for entry lists, race results and horse pages (`scraper` feature)
//! - A race archive harvested from the race search listing
//!
//! # Example
//!
//! ```
//! use keiba::core::rank_histories;
//! use keiba::models::{HistoryRow, HorseEntry};
//! use keiba::report::to_delimited;
//! use chrono::NaiveDate;
//!
//! let entry = HorseEntry {
//!     horse_id: "2019105219".to_string(),
//!     horse_name: "ドウデュース".to_string(),
//!     url: "https://db.netkeiba.com/horse/2019105219/".to_string(),
//! };
//! let rows = vec![HistoryRow::from_cells("2024/04/14", "芝1600", "1:35.2", "34.5").unwrap()];
//!
//! let reference = NaiveDate::from_ymd_opt(2024, 5, 26);
//! let ranked = rank_histories(&[(entry, rows)], reference).unwrap();
//! assert_eq!(ranked[0].stat.race_time_index, Some(59.5));
//! println!("{}", to_delimited(&ranked));
//! ```

pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod report;

// Network modules (only available with scraper feature)
#[cfg(feature = "scraper")]
pub mod pipeline;
#[cfg(feature = "scraper")]
pub mod scraper;

// Re-export commonly used types
pub use error::RankingError;
pub use models::{HistoryRow, HorseEntry, HorseStat, RaceCard, RankedHorse, RankingMode};
pub use report::{save_report, to_delimited, to_table, RankingReport};

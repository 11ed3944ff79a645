//! Web scraper for netkeiba race and horse pages
//!
//! Fetches entry lists (出馬表), race results, horse history pages and the
//! race search listing. Pages are served as EUC-JP and decoded before parsing.
//!
//! # Example
//!
//! ```no_run
//! use keiba::scraper::{RaceScraper, ScraperConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let scraper = RaceScraper::new(ScraperConfig::default())?;
//!
//!     let card = scraper.scrape_shutuba("202405021211").await?;
//!     println!("{}: {} horses", card.race_name, card.entries.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod horse;
mod race_list;
mod race_result;
mod shutuba;

pub use client::{decode_page, RaceScraper, ScraperConfig};
pub use horse::parse_horse_history;
pub use race_list::{parse_race_list, race_code_from_link, search_url, RaceListPage};
pub use race_result::{parse_race_horse_records, parse_race_record, parse_result_card};
pub use shutuba::parse_shutuba;

use scraper::{ElementRef, Selector};
use thiserror::Error;

pub const DB_BASE_URL: &str = "https://db.netkeiba.com";
pub const RACE_BASE_URL: &str = "https://race.netkeiba.com";

/// Scraper errors
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    #[error("No horses found for race {0}")]
    NoEntries(String),

    #[error("Failed to fetch {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },
}

/// Entry list URL of an upcoming race
pub fn shutuba_url(race_id: &str) -> String {
    format!(
        "{}/race/shutuba.html?race_id={}&rf=race_list",
        RACE_BASE_URL, race_id
    )
}

/// Result page URL of a finished race
pub fn race_result_url(race_id: &str) -> String {
    format!("{}/race/{}/", DB_BASE_URL, race_id)
}

/// History page URL of a horse
pub fn horse_url(horse_id: &str) -> String {
    format!("{}/horse/{}/", DB_BASE_URL, horse_id)
}

/// Resolve a site-relative link against the database host
pub fn absolute_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", DB_BASE_URL, href)
    } else {
        format!("{}/{}", DB_BASE_URL, href)
    }
}

/// Horse id from a link such as `/horse/2019105219/`
pub fn extract_horse_id(href: &str) -> Option<String> {
    let idx = href.find("/horse/")?;
    let id: String = href[idx + 7..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::ParseError(e.to_string()))
}

/// Trimmed text content of an element
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

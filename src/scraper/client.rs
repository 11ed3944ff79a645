//! HTTP client with rate limiting for netkeiba

use super::{
    horse_url, parse_horse_history, parse_race_list, parse_result_card, parse_shutuba,
    race_result_url, shutuba_url, RaceListPage, ScraperError,
};
use crate::models::{HistoryRow, RaceCard};
use encoding_rs::EUC_JP;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Scraper configuration
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Delay between requests in milliseconds
    pub delay_ms: u64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Max retry attempts
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            timeout_secs: 30,
            max_retries: 3,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Decode a netkeiba page body
///
/// Bodies that are valid UTF-8 as a whole are read as UTF-8. Everything else
/// is EUC-JP, with undecodable bytes replaced by U+FFFD.
pub fn decode_page(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let (decoded, _, had_errors) = EUC_JP.decode(bytes);
    if had_errors {
        tracing::debug!("Page contains bytes outside EUC-JP");
    }
    decoded.into_owned()
}

/// Race and horse page scraper with rate limiting
pub struct RaceScraper {
    client: reqwest::Client,
    config: ScraperConfig,
    last_request: Arc<Mutex<Instant>>,
}

impl RaceScraper {
    /// Create a new scraper with the given configuration
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            last_request: Arc::new(Mutex::new(Instant::now() - Duration::from_secs(10))),
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Wait for rate limit
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        let delay = Duration::from_millis(self.config.delay_ms);

        if elapsed < delay {
            tokio::time::sleep(delay - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Fetch and decode a page with rate limiting and retry
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        for attempt in 0..self.config.max_retries {
            self.wait_for_rate_limit().await;

            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let bytes = response.bytes().await?;
                        return Ok(decode_page(&bytes));
                    }
                    tracing::warn!(
                        "Request failed with status {} (attempt {}/{})",
                        response.status(),
                        attempt + 1,
                        self.config.max_retries
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.config.max_retries,
                        e
                    );
                }
            }

            if attempt + 1 < self.config.max_retries {
                let backoff = Duration::from_millis(self.config.delay_ms * (attempt as u64 + 1));
                tokio::time::sleep(backoff).await;
            }
        }

        Err(ScraperError::FetchExhausted {
            url: url.to_string(),
            attempts: self.config.max_retries,
        })
    }

    /// Entry list of an upcoming race
    pub async fn scrape_shutuba(&self, race_id: &str) -> Result<RaceCard, ScraperError> {
        let url = shutuba_url(race_id);
        tracing::info!("Scraping entries: {}", url);

        let html = self.fetch_page(&url).await?;
        let card = parse_shutuba(&html, race_id)?;

        if card.entries.is_empty() {
            return Err(ScraperError::NoEntries(race_id.to_string()));
        }
        Ok(card)
    }

    /// Runners and date of a finished race
    pub async fn scrape_result_card(&self, race_id: &str) -> Result<RaceCard, ScraperError> {
        let url = race_result_url(race_id);
        tracing::info!("Scraping result: {}", url);

        let html = self.fetch_page(&url).await?;
        let card = parse_result_card(&html, race_id)?;

        if card.entries.is_empty() {
            return Err(ScraperError::NoEntries(race_id.to_string()));
        }
        Ok(card)
    }

    /// Past races of one horse, newest first as listed
    pub async fn scrape_horse_history(&self, horse_id: &str) -> Result<Vec<HistoryRow>, ScraperError> {
        let url = horse_url(horse_id);
        tracing::debug!("Scraping horse: {}", url);

        let html = self.fetch_page(&url).await?;
        parse_horse_history(&html)
    }

    /// One page of the race search listing
    pub async fn scrape_race_list(&self, url: &str) -> Result<RaceListPage, ScraperError> {
        tracing::info!("Scraping race list: {}", url);

        let html = self.fetch_page(url).await?;
        parse_race_list(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ScraperConfig::default();
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_config_with_delay() {
        let config = ScraperConfig::default().with_delay(500);
        assert_eq!(config.delay_ms, 500);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_decode_page_euc_jp() {
        let (bytes, _, _) = EUC_JP.encode("<h1>東京優駿</h1>");
        assert_eq!(decode_page(&bytes), "<h1>東京優駿</h1>");
    }

    #[test]
    fn test_decode_page_euc_jp_with_stray_byte() {
        let (bytes, _, _) = EUC_JP.encode("<h1>東京優駿</h1><p>2023年5月28日</p>");
        let mut bytes = bytes.into_owned();
        bytes.push(0xFF);

        let text = decode_page(&bytes);
        assert!(text.contains("東京優駿"));
        assert!(text.contains("2023年5月28日"));
        assert!(text.ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_decode_page_utf8_fallback() {
        let text = "<h1>日本ダービー</h1>";
        assert_eq!(decode_page(text.as_bytes()), text);
    }

    #[test]
    fn test_scraper_new() {
        let scraper = RaceScraper::new(ScraperConfig::default().with_delay(0)).unwrap();
        assert_eq!(scraper.config().delay_ms, 0);
    }
}

//! Ranking and harvest runs
//!
//! A ranking run reads a race's runner list, fetches each horse's history
//! page one at a time, filters and aggregates it against the reference date,
//! ranks the field and writes the report. A harvest run walks a year of the
//! race search listing into the race archive.

use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::recency::{filter_window, RECENCY_YEARS};
use crate::core::{aggregate, rank, StatCollector};
use crate::data::{ArchiveError, RaceArchive};
use crate::error::{validate_race_id, validate_year, RankingError};
use crate::models::{HistoryRow, HorseEntry, HorseStat, RaceCard, RankingMode};
use crate::report::{save_report, RankingReport};
use crate::scraper::{
    absolute_url, parse_race_horse_records, parse_race_record, race_code_from_link,
    race_result_url, search_url, RaceScraper, ScraperError,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Race {0} has no readable date")]
    MissingRaceDate(String),

    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Failed to save report: {0}")]
    Io(#[from] io::Error),
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory receiving `<raceId><raceName>.csv` and `.json`
    pub out_dir: PathBuf,
    /// Write report files after ranking
    pub save: bool,
    /// History window length in calendar years
    pub recency_years: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            save: true,
            recency_years: RECENCY_YEARS,
        }
    }
}

/// Result of one ranking run
#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub report: RankingReport,
    /// CSV and JSON paths when the report was saved
    pub saved: Option<(PathBuf, PathBuf)>,
}

/// Counters of one harvest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub races_found: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// End of the history window for a race
///
/// Live runs look back from today. Backtests look back from the race's own
/// date, which must be known.
pub fn reference_date(card: &RaceCard, mode: RankingMode) -> Result<NaiveDate, PipelineError> {
    match mode {
        RankingMode::Live => Ok(Local::now().date_naive()),
        RankingMode::Backtest => card
            .race_date
            .ok_or_else(|| PipelineError::MissingRaceDate(card.race_id.clone())),
    }
}

/// Rank collected aggregates and wrap them in a report
pub fn build_report(
    card: &RaceCard,
    mode: RankingMode,
    reference: NaiveDate,
    stats: Vec<HorseStat>,
) -> Result<RankingReport, RankingError> {
    let ranked = rank(stats)?;
    Ok(RankingReport::new(
        &card.race_id,
        &card.race_name,
        mode,
        reference,
        ranked,
    ))
}

/// Aggregate of one runner from the result of fetching its history
///
/// A horse whose page could not be fetched stays in the field without data.
pub fn entry_stat(
    entry: &HorseEntry,
    fetched: Result<Vec<HistoryRow>, ScraperError>,
    reference: NaiveDate,
    recency_years: u32,
) -> HorseStat {
    let rows = match fetched {
        Ok(rows) => rows,
        Err(e) => {
            warn!("History of {} ({}) unavailable: {}", entry.horse_name, entry.horse_id, e);
            Vec::new()
        }
    };

    let recent = filter_window(&rows, reference, recency_years);
    aggregate(&entry.horse_id, &entry.horse_name, recent)
}

/// Race links of every listing page, first page first, duplicates dropped
pub fn merge_race_links(pages: impl IntoIterator<Item = Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .flatten()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Scraper-driven ranking and harvest runs
pub struct Pipeline {
    scraper: RaceScraper,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(scraper: RaceScraper, config: PipelineConfig) -> Self {
        Self { scraper, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Rank an upcoming race from its entry list
    pub async fn rank_live<F>(&self, race_id: &str, on_horse: F) -> Result<RankOutcome, PipelineError>
    where
        F: FnMut(usize, usize, &HorseEntry),
    {
        validate_race_id(race_id).map_err(PipelineError::InvalidInput)?;

        let card = self.scraper.scrape_shutuba(race_id).await?;
        self.rank_card(card, RankingMode::Live, on_horse).await
    }

    /// Rank a finished race as it looked on its own date
    pub async fn rank_backtest<F>(
        &self,
        race_id: &str,
        on_horse: F,
    ) -> Result<RankOutcome, PipelineError>
    where
        F: FnMut(usize, usize, &HorseEntry),
    {
        validate_race_id(race_id).map_err(PipelineError::InvalidInput)?;

        let card = self.scraper.scrape_result_card(race_id).await?;
        self.rank_card(card, RankingMode::Backtest, on_horse).await
    }

    async fn rank_card<F>(
        &self,
        card: RaceCard,
        mode: RankingMode,
        mut on_horse: F,
    ) -> Result<RankOutcome, PipelineError>
    where
        F: FnMut(usize, usize, &HorseEntry),
    {
        let reference = reference_date(&card, mode)?;
        info!(
            "Ranking {} {} ({} runners, {} mode, reference {})",
            card.race_id,
            card.race_name,
            card.entries.len(),
            mode,
            reference
        );

        let total = card.entries.len();
        let mut collector = StatCollector::new(&card.entries);

        for (index, entry) in card.entries.iter().enumerate() {
            on_horse(index, total, entry);

            let fetched = self.scraper.scrape_horse_history(&entry.horse_id).await;
            collector.insert(
                index,
                entry_stat(entry, fetched, reference, self.config.recency_years),
            );
        }

        self.finish_run(&card, mode, reference, collector.finish()?)
    }

    /// Rank, build the report and save it when configured
    fn finish_run(
        &self,
        card: &RaceCard,
        mode: RankingMode,
        reference: NaiveDate,
        stats: Vec<HorseStat>,
    ) -> Result<RankOutcome, PipelineError> {
        let report = build_report(card, mode, reference, stats)?;

        let saved = if self.config.save {
            Some(save_report(&self.config.out_dir, &report)?)
        } else {
            None
        };

        Ok(RankOutcome { report, saved })
    }

    /// Archive every newcomer race of `year` not yet in `archive`
    pub async fn harvest<F>(
        &self,
        year: i32,
        archive: &RaceArchive,
        mut on_race: F,
    ) -> Result<HarvestSummary, PipelineError>
    where
        F: FnMut(usize, usize, &str),
    {
        validate_year(year).map_err(PipelineError::InvalidInput)?;

        let first = self.scraper.scrape_race_list(&search_url(year)).await?;
        let mut pages = vec![first.race_links];

        for next in &first.next_pages {
            match self.scraper.scrape_race_list(&absolute_url(next)).await {
                Ok(page) => pages.push(page.race_links),
                Err(e) => warn!("Skipping listing page {}: {}", next, e),
            }
        }

        let links = merge_race_links(pages);
        let mut summary = HarvestSummary {
            races_found: links.len(),
            ..Default::default()
        };
        info!("{} races listed for {}", links.len(), year);

        for (i, link) in links.iter().enumerate() {
            let code = match race_code_from_link(link) {
                Some(code) => code,
                None => continue,
            };
            on_race(i, links.len(), &code);

            if archive.contains(&code) {
                summary.skipped += 1;
                continue;
            }

            match self.archive_race(&code, archive).await {
                Ok(true) => summary.written += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    warn!("Race {}: {}", code, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn archive_race(&self, code: &str, archive: &RaceArchive) -> Result<bool, PipelineError> {
        let html = self.scraper.fetch_page(&race_result_url(code)).await?;

        let race = parse_race_record(&html, code)?;
        let horses = parse_race_horse_records(&html, code)?;
        let outcome = archive.save(&race, &horses)?;

        Ok(!outcome.skipped())
    }
}

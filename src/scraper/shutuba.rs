//! Entry list (出馬表) scraper from race.netkeiba.com

use super::{absolute_url, element_text, extract_horse_id, selector, ScraperError};
use crate::models::{HorseEntry, RaceCard};
use scraper::{ElementRef, Html};

/// Parse the entry list of an upcoming race
///
/// Race name comes from `h1.RaceName`; each runner is a link inside
/// `td.HorseInfo`. The page carries no race date.
pub fn parse_shutuba(html: &str, race_id: &str) -> Result<RaceCard, ScraperError> {
    let document = Html::parse_document(html);

    let name_selector = selector("h1.RaceName")?;
    let link_selector = selector("table.Shutuba_Table tbody td.HorseInfo a")?;

    let race_name = document
        .select(&name_selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let entries = collect_entries(document.select(&link_selector));
    tracing::info!("{}: {} entries", race_name, entries.len());

    Ok(RaceCard {
        race_id: race_id.to_string(),
        race_name,
        race_date: None,
        entries,
    })
}

/// Horse links in page order, first occurrence of each horse kept
pub(crate) fn collect_entries<'a>(links: impl Iterator<Item = ElementRef<'a>>) -> Vec<HorseEntry> {
    let mut entries: Vec<HorseEntry> = Vec::new();

    for link in links {
        let href = match link.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        let horse_id = match extract_horse_id(href) {
            Some(id) => id,
            None => continue,
        };
        if entries.iter().any(|e| e.horse_id == horse_id) {
            continue;
        }

        entries.push(HorseEntry {
            horse_id,
            horse_name: element_text(&link),
            url: absolute_url(href),
        });
    }

    entries
}

//! Race search listing from db.netkeiba.com
//!
//! Used by the harvest to enumerate a year of newcomer races (新馬戦) at
//! the ten JRA courses.

use super::{selector, ScraperError, DB_BASE_URL};
use regex::Regex;
use scraper::Html;

/// JRA course codes (札幌 .. 小倉)
pub const JRA_COURSES: [&str; 10] = ["01", "02", "03", "04", "05", "06", "07", "08", "09", "10"];

/// Grade filter value for newcomer races
pub const GRADE_NEWCOMER: &str = "8";

/// Races listed per result page
pub const PAGE_SIZE: u32 = 100;

/// Links found on one listing page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceListPage {
    /// Race links such as `/race/202305021211/`, in page order
    pub race_links: Vec<String>,
    /// Pager links, deduplicated
    pub next_pages: Vec<String>,
}

/// Search URL for all newcomer races of `year`
pub fn search_url(year: i32) -> String {
    let mut params = vec![
        ("pid", "race_list".to_string()),
        ("word", String::new()),
        ("start_year", year.to_string()),
        ("start_mon", "1".to_string()),
        ("end_year", year.to_string()),
        ("end_mon", "12".to_string()),
        ("kyori_min", String::new()),
        ("kyori_max", String::new()),
        ("sort", "date".to_string()),
        ("list", PAGE_SIZE.to_string()),
    ];
    for jyo in JRA_COURSES {
        params.push(("jyo%5B%5D", jyo.to_string()));
    }
    params.push(("grade%5B%5D", GRADE_NEWCOMER.to_string()));

    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    format!("{}/?{}", DB_BASE_URL, query.join("&"))
}

/// Race code from a race link (`/race/202305021211/` -> `202305021211`)
pub fn race_code_from_link(link: &str) -> Option<String> {
    let rest = &link[link.find("/race/")? + 6..];
    let code: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();

    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Parse race links and pager links from a listing page
pub fn parse_race_list(html: &str) -> Result<RaceListPage, ScraperError> {
    let document = Html::parse_document(html);

    let link_selector = selector("table > tbody > tr > td > a")?;
    let pager_selector = selector("div.common_pager > ul > li > a")?;
    let race_re =
        Regex::new(r"/race/\d+").map_err(|e| ScraperError::ParseError(e.to_string()))?;

    let mut page = RaceListPage::default();

    for link in document.select(&link_selector) {
        if let Some(href) = link.value().attr("href") {
            if race_re.is_match(href) && !page.race_links.iter().any(|l| l == href) {
                page.race_links.push(href.to_string());
            }
        }
    }

    for link in document.select(&pager_selector) {
        if let Some(href) = link.value().attr("href") {
            if !page.next_pages.iter().any(|l| l == href) {
                page.next_pages.push(href.to_string());
            }
        }
    }

    Ok(page)
}

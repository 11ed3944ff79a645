//! Horse history page scraper from db.netkeiba.com

use super::{element_text, selector, ScraperError};
use crate::models::HistoryRow;
use scraper::Html;

// Column positions in `table.db_h_race_results`
const COL_DATE: usize = 0;
const COL_VENUE: usize = 1;
const COL_RACE_NAME: usize = 4;
const COL_FINISH: usize = 11;
const COL_DISTANCE: usize = 14;
const COL_TIME: usize = 17;
const COL_LAST_TIME: usize = 22;

/// Parse every past race listed on a horse page
///
/// Rows whose date cell does not parse (foreign races with notes, header
/// rows) are dropped here so the recency filter only sees valid dates.
pub fn parse_horse_history(html: &str) -> Result<Vec<HistoryRow>, ScraperError> {
    let document = Html::parse_document(html);

    let row_selector = selector("table.db_h_race_results tbody tr")?;
    let cell_selector = selector("td")?;

    let mut rows = Vec::new();
    let mut skipped = 0;

    for tr in document.select(&row_selector) {
        let cells: Vec<String> = tr.select(&cell_selector).map(|td| element_text(&td)).collect();
        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

        match HistoryRow::from_cells(
            cell(COL_DATE),
            cell(COL_DISTANCE),
            cell(COL_TIME),
            cell(COL_LAST_TIME),
        ) {
            Some(mut row) => {
                row.venue = cell(COL_VENUE).to_string();
                row.race_name = cell(COL_RACE_NAME).to_string();
                row.finish = cell(COL_FINISH).to_string();
                rows.push(row);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} history rows without a valid date", skipped);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history_row(cells: &[(usize, &str)]) -> String {
        let mut tds = vec![String::new(); 28];
        for (i, v) in cells {
            tds[*i] = v.to_string();
        }
        let body: String = tds.iter().map(|v| format!("<td>{}</td>", v)).collect();
        format!("<tr>{}</tr>", body)
    }

    fn horse_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><table class="db_h_race_results nk_tb_common">
               <thead><tr><th>日付</th><th>開催</th></tr></thead>
               <tbody>{}</tbody></table></body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_parse_horse_history() {
        let html = horse_page(&[
            history_row(&[
                (0, "<a href=\"/race/list/20240526/\">2024/05/26</a>"),
                (1, "2東京12"),
                (4, "<a href=\"/race/202405021211/\">東京優駿(GI)</a>"),
                (11, "1"),
                (14, "芝2400"),
                (17, "2:24.3"),
                (22, "33.5"),
            ]),
            history_row(&[
                (0, "2024/04/14"),
                (1, "3中山8"),
                (11, "2"),
                (14, "芝2000"),
                (17, "1:57.1"),
                (22, ""),
            ]),
        ]);

        let rows = parse_horse_history(&html).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
        assert_eq!(first.venue, "2東京12");
        assert_eq!(first.race_name, "東京優駿(GI)");
        assert_eq!(first.finish, "1");
        assert_eq!(first.race_distance, "芝2400");
        assert_eq!(first.race_time, "2:24.3");
        assert_eq!(first.last_time, "33.5");

        assert!(!rows[1].has_last_time());
    }

    #[test]
    fn test_parse_horse_history_skips_bad_dates() {
        let html = horse_page(&[
            history_row(&[(0, "----"), (14, "芝1600"), (17, "1:35.0"), (22, "34.0")]),
            history_row(&[(0, "2023/10/01"), (14, "ダ1800"), (17, "1:52.4"), (22, "37.1")]),
        ]);

        let rows = parse_horse_history(&html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].race_distance, "ダ1800");
    }

    #[test]
    fn test_parse_horse_history_short_row() {
        let html = horse_page(&["<tr><td>2022/12/25</td><td>5中山8</td></tr>".to_string()]);

        let rows = parse_horse_history(&html).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].race_time.is_empty());
        assert!(!rows[0].has_last_time());
    }

    #[test]
    fn test_parse_horse_history_no_table() {
        let rows = parse_horse_history("<html><body><p>Not found</p></body></html>").unwrap();
        assert!(rows.is_empty());
    }
}

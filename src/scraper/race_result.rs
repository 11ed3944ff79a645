//! Race result page scraper from db.netkeiba.com
//!
//! The same page serves two purposes: the runner list and date for a
//! backtest, and the race header plus finishing order for the archive.

use super::shutuba::collect_entries;
use super::{element_text, extract_horse_id, selector, ScraperError};
use crate::data::{RaceHorseRecord, RaceRecord};
use crate::models::{parse_race_date, RaceCard};
use regex::Regex;
use scraper::Html;

/// Parse the runner list and date of a finished race
pub fn parse_result_card(html: &str, race_id: &str) -> Result<RaceCard, ScraperError> {
    let document = Html::parse_document(html);

    let date_selector = selector("div.data_intro p.smalltxt")?;
    let name_selector = selector("div.data_intro h1")?;
    let link_selector = selector("table.race_table_01 tbody td a")?;

    let race_date = document
        .select(&date_selector)
        .next()
        .map(|el| element_text(&el))
        .and_then(|text| text.split_whitespace().next().and_then(parse_race_date));

    if race_date.is_none() {
        tracing::warn!("No race date found for {}", race_id);
    }

    let race_name = document
        .select(&name_selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let entries = collect_entries(document.select(&link_selector));
    tracing::info!("{}: {} runners", race_name, entries.len());

    Ok(RaceCard {
        race_id: race_id.to_string(),
        race_name,
        race_date,
        entries,
    })
}

/// Parse the race header block (`div.data_intro`)
///
/// The condition line reads `芝左2400m / 天候 : 晴 / 芝 : 良 / 発走 : 15:40`
/// and the small text `2023年5月28日 2回東京12日目 ...`.
pub fn parse_race_record(html: &str, code: &str) -> Result<RaceRecord, ScraperError> {
    let document = Html::parse_document(html);

    let name_selector = selector(".data_intro > dl > dd h1")?;
    let info_selector = selector(".data_intro > dl > dd p")?;
    let small_selector = selector(".data_intro > p.smalltxt")?;

    let name = document
        .select(&name_selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let info_text: String = document
        .select(&info_selector)
        .map(|el| el.text().collect::<String>())
        .collect();
    let race_info: Vec<&str> = info_text.split('/').map(str::trim).collect();

    let small_text = document
        .select(&small_selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();
    let date_place: Vec<&str> = small_text.split_whitespace().collect();

    if date_place.len() < 2 {
        return Err(ScraperError::ParseError(format!(
            "race {}: unexpected header text {:?}",
            code, small_text
        )));
    }

    let distance_re = compile(r"(\d+)m")?;
    let place_re = compile(r"\d+回(\D+)\d+日目")?;
    let course_re = compile(r"([^\d]+)\d+m")?;

    let surface = race_info.first().copied().unwrap_or("");

    Ok(RaceRecord {
        code: code.to_string(),
        name,
        date: date_place[0]
            .replacen('年', "/", 1)
            .replacen('月', "/", 1)
            .replacen('日', "", 1),
        place: capture(&place_re, date_place[1]),
        distance: capture(&distance_re, surface).parse().ok(),
        course: capture(&course_re, surface).trim().to_string(),
        weather: after_colon(race_info.get(1)),
        condition: after_colon(race_info.get(2)),
        time: after_colon(race_info.get(3)),
    })
}

/// Parse the finishing order table
pub fn parse_race_horse_records(
    html: &str,
    race_code: &str,
) -> Result<Vec<RaceHorseRecord>, ScraperError> {
    let document = Html::parse_document(html);

    let row_selector = selector("#contents_liquid > table > tbody > tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;
    let weight_re = compile(r"^(\d+)\(([+-]?\d+)\)")?;

    let mut records = Vec::new();

    for tr in document.select(&row_selector) {
        let cells: Vec<_> = tr.select(&cell_selector).collect();
        // Header row uses <th>
        if cells.len() < 15 {
            continue;
        }

        let text = |i: usize| element_text(&cells[i]);
        let href = |i: usize| {
            cells[i]
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or("")
                .to_string()
        };

        let weight_text = text(14);
        let weight = weight_re.captures(&weight_text);

        records.push(RaceHorseRecord {
            race_code: race_code.to_string(),
            result: text(0).parse().ok(),
            horse_num: text(2).parse().ok(),
            horse_id: extract_horse_id(&href(3)).unwrap_or_default(),
            horse_name: text(3),
            sex_age: text(4),
            carry_weight: text(5),
            jockey_id: href(6).split('/').nth(4).unwrap_or("").to_string(),
            time: text(7),
            progress: text(10),
            last_time: text(11).parse().ok(),
            win_odds: text(12).parse().ok(),
            favorite: text(13).parse().ok(),
            horse_weight: weight
                .as_ref()
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            horse_weight_diff: weight
                .as_ref()
                .and_then(|c| c.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        });
    }

    Ok(records)
}

fn compile(pattern: &str) -> Result<Regex, ScraperError> {
    Regex::new(pattern).map_err(|e| ScraperError::ParseError(e.to_string()))
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Text after the first `:` of a `label : value` segment
fn after_colon(segment: Option<&&str>) -> String {
    segment
        .and_then(|s| s.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const RESULT_HTML: &str = r#"
        <html><body><div id="contents_liquid">
        <div class="data_intro">
          <dl class="racedata fc">
            <dt>11 R</dt>
            <dd>
              <h1>東京優駿(GI)</h1>
              <p><span>芝左2400m&nbsp;/&nbsp;天候 : 晴&nbsp;/&nbsp;芝 : 良&nbsp;/&nbsp;発走 : 15:40</span></p>
            </dd>
          </dl>
          <p class="smalltxt">2023年5月28日 2回東京12日目 3歳オープン&nbsp;&nbsp;(国際)(指定)(馬齢)</p>
        </div>
        <table class="race_table_01 nk_tb_common" summary="レース結果">
          <tr>
            <th>着順</th><th>枠番</th><th>馬番</th><th>馬名</th><th>性齢</th><th>斤量</th><th>騎手</th>
            <th>タイム</th><th>着差</th><th>ﾀｲﾑ指数</th><th>通過</th><th>上り</th><th>単勝</th>
            <th>人気</th><th>馬体重</th>
          </tr>
          <tr>
            <td>1</td><td>3</td><td>5</td>
            <td><a href="/horse/2020103686/" title="タスティエーラ">タスティエーラ</a></td>
            <td>牡3</td><td>57</td>
            <td><a href="/jockey/result/recent/05212/" title="レーン">レーン</a></td>
            <td>2:25.2</td><td></td><td>**</td><td>4-4-4-4</td><td>33.5</td><td>8.0</td>
            <td>4</td><td>496(+4)</td>
          </tr>
          <tr>
            <td>中止</td><td>8</td><td>18</td>
            <td><a href="/horse/2020104766/">スキルヴィング</a></td>
            <td>牡3</td><td>57</td>
            <td><a href="/jockey/result/recent/01075/">ルメール</a></td>
            <td></td><td></td><td></td><td></td><td></td><td>4.6</td>
            <td>2</td><td>計不</td>
          </tr>
        </table>
        </div></body></html>
    "#;

    #[test]
    fn test_parse_result_card() {
        let card = parse_result_card(RESULT_HTML, "202305021211").unwrap();

        assert_eq!(card.race_name, "東京優駿(GI)");
        assert_eq!(card.race_date, NaiveDate::from_ymd_opt(2023, 5, 28));
        assert_eq!(card.entries.len(), 2);
        assert_eq!(card.entries[0].horse_id, "2020103686");
        assert_eq!(card.entries[0].horse_name, "タスティエーラ");
        assert_eq!(card.entries[0].url, "https://db.netkeiba.com/horse/2020103686/");
        assert_eq!(card.entries[1].horse_id, "2020104766");
    }

    #[test]
    fn test_parse_race_record() {
        let race = parse_race_record(RESULT_HTML, "202305021211").unwrap();

        assert_eq!(race.code, "202305021211");
        assert_eq!(race.name, "東京優駿(GI)");
        assert_eq!(race.date, "2023/5/28");
        assert_eq!(race.place, "東京");
        assert_eq!(race.distance, Some(2400));
        assert_eq!(race.course, "芝左");
        assert_eq!(race.weather, "晴");
        assert_eq!(race.condition, "良");
        assert_eq!(race.time, "15:40");
    }

    #[test]
    fn test_parse_race_record_missing_header() {
        let err = parse_race_record("<html><body></body></html>", "202305021211").unwrap_err();
        assert!(matches!(err, ScraperError::ParseError(_)));
    }

    #[test]
    fn test_parse_race_horse_records() {
        let records = parse_race_horse_records(RESULT_HTML, "202305021211").unwrap();
        assert_eq!(records.len(), 2);

        let winner = &records[0];
        assert_eq!(winner.race_code, "202305021211");
        assert_eq!(winner.result, Some(1));
        assert_eq!(winner.horse_num, Some(5));
        assert_eq!(winner.horse_id, "2020103686");
        assert_eq!(winner.horse_name, "タスティエーラ");
        assert_eq!(winner.sex_age, "牡3");
        assert_eq!(winner.carry_weight, "57");
        assert_eq!(winner.jockey_id, "05212");
        assert_eq!(winner.time, "2:25.2");
        assert_eq!(winner.progress, "4-4-4-4");
        assert_eq!(winner.last_time, Some(33.5));
        assert_eq!(winner.win_odds, Some(8.0));
        assert_eq!(winner.favorite, Some(4));
        assert_eq!(winner.horse_weight, Some(496));
        assert_eq!(winner.horse_weight_diff, "+4");

        let scratched = &records[1];
        assert_eq!(scratched.result, None);
        assert_eq!(scratched.last_time, None);
        assert_eq!(scratched.horse_weight, None);
        assert!(scratched.horse_weight_diff.is_empty());
    }
}

//! Console table: tab-separated, names padded to a fixed display width

use super::delimited::{fields, parse_delimited, HEADERS};
use super::width::pad_display;
use crate::models::RankedHorse;

/// Display columns reserved for a horse name (9 full-width characters)
pub const NAME_WIDTH: usize = 18;

/// Bare id from either an id or a horse page URL (`.../horse/2019105219/`)
pub fn display_horse_id(raw: &str) -> String {
    let id = match raw.find("/horse/") {
        Some(idx) => raw[idx + 7..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>(),
        None => raw.trim().to_string(),
    };

    if id.is_empty() {
        "-".to_string()
    } else {
        id
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn format_line(row: &[String]) -> String {
    let get = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

    [
        display_horse_id(get(0)),
        pad_display(get(1), NAME_WIDTH),
        or_dash(get(2)).to_string(),
        or_dash(get(3)).to_string(),
        format!("{:>2}", get(4)),
        format!("{:>2}", get(5)),
        format!("{:>3}", get(6)),
    ]
    .join("\t")
}

fn header_line() -> String {
    [
        HEADERS[0].to_string(),
        pad_display(HEADERS[1], NAME_WIDTH),
        HEADERS[2].to_string(),
        HEADERS[3].to_string(),
        HEADERS[4].to_string(),
        HEADERS[5].to_string(),
        HEADERS[6].to_string(),
    ]
    .join("\t")
}

/// Table for ranked horses, header first
pub fn to_table(ranked: &[RankedHorse]) -> String {
    let mut lines = vec![header_line()];
    lines.extend(ranked.iter().map(|h| format_line(&fields(h))));
    lines.join("\n")
}

/// Table for a previously saved delimited report
pub fn table_from_delimited(text: &str) -> String {
    let mut lines = vec![header_line()];
    lines.extend(parse_delimited(text).iter().map(|row| format_line(row)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HorseStat;
    use crate::report::width::display_width;

    fn ranked(id: &str, name: &str, rank: u32) -> RankedHorse {
        RankedHorse {
            stat: HorseStat {
                horse_id: id.to_string(),
                horse_name: name.to_string(),
                average_last_time: Some(34.5),
                race_time_index: None,
                history: Vec::new(),
            },
            last_time_rank: 1,
            index_rank: 3,
            rank,
        }
    }

    #[test]
    fn test_display_horse_id() {
        assert_eq!(
            display_horse_id("https://db.netkeiba.com/horse/2019105219/"),
            "2019105219"
        );
        assert_eq!(display_horse_id("2019105219"), "2019105219");
        assert_eq!(display_horse_id(""), "-");
    }

    #[test]
    fn test_to_table_alignment() {
        let table = to_table(&[
            ranked("2019105219", "ドウデュース", 10),
            ranked("2020103686", "Tastiera", 10),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);

        for line in &lines[1..] {
            let cols: Vec<&str> = line.split('\t').collect();
            assert_eq!(cols.len(), 7);
            assert_eq!(display_width(cols[1]), NAME_WIDTH);
            assert_eq!(cols[2], "34.50");
            assert_eq!(cols[3], "-");
            assert_eq!(cols[4], " 1");
            assert_eq!(cols[5], " 3");
            assert_eq!(cols[6], " 10");
        }
    }

    #[test]
    fn test_table_from_delimited() {
        let csv = "horseId,horseName,averageLastTime,raceTimeIndex,lastTimeRank,indexRank,rank\n\
                   https://db.netkeiba.com/horse/2019105219,ドウデュース,34.50,59.25,1,2,5";
        let table = table_from_delimited(csv);
        let last = table.lines().last().unwrap();
        assert!(last.starts_with("2019105219\tドウデュース"));
        assert!(last.ends_with("\t 1\t 2\t  5"));
    }
}

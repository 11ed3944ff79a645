//! Race archive: one JSON pair per harvested race
//!
//! `<code>_race.json` holds the race header, `<code>_racehorse.json` the
//! finishing order. Existing files are never overwritten.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid archive JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Race header from a result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub code: String,
    pub name: String,
    /// `YYYY/M/D` as printed on the page
    pub date: String,
    pub place: String,
    pub distance: Option<u32>,
    /// Surface and direction, e.g. "芝右"
    pub course: String,
    pub weather: String,
    pub condition: String,
    /// Post time
    pub time: String,
}

impl RaceRecord {
    /// Tab-separated listing line: code, date, place, course and distance, name, runners
    pub fn summary_line(&self, runners: usize) -> String {
        let distance = self
            .distance
            .map(|d| format!("{}m", d))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{}\t{}\t{}\t{}{}\t{}\t{} runners",
            self.code, self.date, self.place, self.course, distance, self.name, runners
        )
    }
}

/// One runner of a harvested race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceHorseRecord {
    pub race_code: String,
    /// Finishing position; `None` for 中止, 除外 and similar
    pub result: Option<u32>,
    pub horse_num: Option<u32>,
    pub horse_id: String,
    pub horse_name: String,
    pub sex_age: String,
    pub carry_weight: String,
    pub jockey_id: String,
    pub time: String,
    pub progress: String,
    pub last_time: Option<f64>,
    pub win_odds: Option<f64>,
    pub favorite: Option<u32>,
    pub horse_weight: Option<u32>,
    /// Signed change from the previous run, e.g. "+4"
    pub horse_weight_diff: String,
}

/// Which files a save actually wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOutcome {
    pub race_written: bool,
    pub horses_written: bool,
}

impl SaveOutcome {
    pub fn skipped(&self) -> bool {
        !self.race_written && !self.horses_written
    }
}

/// Directory of harvested races
#[derive(Debug, Clone)]
pub struct RaceArchive {
    dir: PathBuf,
}

impl RaceArchive {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn race_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}_race.json", code))
    }

    pub fn racehorse_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}_racehorse.json", code))
    }

    /// Both files of the race are already present
    pub fn contains(&self, code: &str) -> bool {
        self.race_path(code).exists() && self.racehorse_path(code).exists()
    }

    /// Write whichever of the two files does not exist yet
    pub fn save(
        &self,
        race: &RaceRecord,
        horses: &[RaceHorseRecord],
    ) -> Result<SaveOutcome, ArchiveError> {
        fs::create_dir_all(&self.dir)?;

        let race_written = write_new(&self.race_path(&race.code), race)?;
        let horses_written = write_new(&self.racehorse_path(&race.code), horses)?;

        Ok(SaveOutcome {
            race_written,
            horses_written,
        })
    }

    pub fn load(&self, code: &str) -> Result<(RaceRecord, Vec<RaceHorseRecord>), ArchiveError> {
        let race = serde_json::from_str(&fs::read_to_string(self.race_path(code))?)?;
        let horses = serde_json::from_str(&fs::read_to_string(self.racehorse_path(code))?)?;
        Ok((race, horses))
    }

    /// Codes of all races with a header file, sorted
    pub fn codes(&self) -> Result<Vec<String>, ArchiveError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut codes: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix("_race.json"))
                    .map(str::to_string)
            })
            .collect();

        codes.sort();
        Ok(codes)
    }
}

fn write_new<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<bool, ArchiveError> {
    if path.exists() {
        tracing::info!("exists: {}", path.display());
        return Ok(false);
    }

    fs::write(path, serde_json::to_string(value)?)?;
    tracing::info!("write: {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race() -> RaceRecord {
        RaceRecord {
            code: "202305021211".to_string(),
            name: "東京優駿(GI)".to_string(),
            date: "2023/5/28".to_string(),
            place: "東京".to_string(),
            distance: Some(2400),
            course: "芝左".to_string(),
            weather: "晴".to_string(),
            condition: "良".to_string(),
            time: "15:40".to_string(),
        }
    }

    fn horse() -> RaceHorseRecord {
        RaceHorseRecord {
            race_code: "202305021211".to_string(),
            result: Some(1),
            horse_num: Some(5),
            horse_id: "2020103686".to_string(),
            horse_name: "タスティエーラ".to_string(),
            sex_age: "牡3".to_string(),
            carry_weight: "57".to_string(),
            jockey_id: "05212".to_string(),
            time: "2:25.2".to_string(),
            progress: "4-4-4-4".to_string(),
            last_time: Some(33.5),
            win_odds: Some(8.0),
            favorite: Some(4),
            horse_weight: Some(496),
            horse_weight_diff: "+4".to_string(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let archive = RaceArchive::new(dir.path());

        let outcome = archive.save(&race(), &[horse()]).unwrap();
        assert!(outcome.race_written);
        assert!(outcome.horses_written);
        assert!(archive.contains("202305021211"));

        let (loaded_race, loaded_horses) = archive.load("202305021211").unwrap();
        assert_eq!(loaded_race, race());
        assert_eq!(loaded_horses, vec![horse()]);
    }

    #[test]
    fn test_save_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = RaceArchive::new(dir.path());
        archive.save(&race(), &[horse()]).unwrap();

        let mut renamed = race();
        renamed.name = "changed".to_string();
        let outcome = archive.save(&renamed, &[]).unwrap();
        assert!(outcome.skipped());

        let (loaded_race, loaded_horses) = archive.load("202305021211").unwrap();
        assert_eq!(loaded_race.name, "東京優駿(GI)");
        assert_eq!(loaded_horses.len(), 1);
    }

    #[test]
    fn test_save_fills_missing_half() {
        let dir = tempfile::tempdir().unwrap();
        let archive = RaceArchive::new(dir.path());
        fs::write(archive.race_path("202305021211"), "{}").unwrap();

        let outcome = archive.save(&race(), &[horse()]).unwrap();
        assert!(!outcome.race_written);
        assert!(outcome.horses_written);
    }

    #[test]
    fn test_racehorse_json_keys() {
        let json = serde_json::to_string(&horse()).unwrap();
        assert!(json.contains("\"raceCode\":\"202305021211\""));
        assert!(json.contains("\"horseWeightDiff\":\"+4\""));
        assert!(json.contains("\"lastTime\":33.5"));
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            race().summary_line(18),
            "202305021211\t2023/5/28\t東京\t芝左2400m\t東京優駿(GI)\t18 runners"
        );

        let mut unknown = race();
        unknown.distance = None;
        assert!(unknown.summary_line(0).contains("\t芝左-\t"));
    }

    #[test]
    fn test_listing_from_saved_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = RaceArchive::new(dir.path());
        archive.save(&race(), &[horse()]).unwrap();

        let lines: Vec<String> = archive
            .codes()
            .unwrap()
            .iter()
            .map(|code| {
                let (race, horses) = archive.load(code).unwrap();
                race.summary_line(horses.len())
            })
            .collect();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("東京優駿(GI)\t1 runners"));
    }

    #[test]
    fn test_codes() {
        let dir = tempfile::tempdir().unwrap();
        let archive = RaceArchive::new(dir.path());
        assert!(archive.codes().unwrap().is_empty());

        let mut second = race();
        second.code = "202305021210".to_string();
        archive.save(&race(), &[]).unwrap();
        archive.save(&second, &[]).unwrap();

        assert_eq!(
            archive.codes().unwrap(),
            vec!["202305021210".to_string(), "202305021211".to_string()]
        );
    }

    #[test]
    fn test_codes_missing_dir() {
        let archive = RaceArchive::new("/nonexistent/keiba-archive");
        assert!(archive.codes().unwrap().is_empty());
    }
}

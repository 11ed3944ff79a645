use thiserror::Error;

/// Errors raised by the ranking core
#[derive(Debug, Error, PartialEq)]
pub enum RankingError {
    /// Race time is not `minutes:seconds`
    #[error("Invalid race time: {0:?}")]
    InvalidRaceTime(String),

    /// Distance has no usable meters value
    #[error("Invalid race distance: {0:?}")]
    InvalidDistance(String),

    /// Same horse listed twice in one race
    #[error("Duplicate horse id in race: {0}")]
    DuplicateHorse(String),

    /// A listed horse never delivered its aggregate
    #[error("No aggregate collected for entry #{index} ({horse_id})")]
    MissingHorse { index: usize, horse_id: String },
}

/// Race id validation (netkeiba race ids are 12 digits: YYYY + venue + meeting + day + race)
pub fn validate_race_id(race_id: &str) -> Result<(), String> {
    if race_id.len() != 12 || !race_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "Race id must be 12 digits (e.g. 202405020811), got {:?}",
            race_id
        ));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), String> {
    if !(1986..=2100).contains(&year) {
        return Err(format!("Year must be between 1986 and 2100, got {}", year));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_race_id_valid() {
        assert!(validate_race_id("202405020811").is_ok());
    }

    #[test]
    fn test_validate_race_id_invalid() {
        assert!(validate_race_id("").is_err());
        assert!(validate_race_id("20240502081").is_err());
        assert!(validate_race_id("2024050208aa").is_err());
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year(2024).is_ok());
        assert!(validate_year(1900).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = RankingError::InvalidRaceTime("95.2".to_string());
        assert!(err.to_string().contains("Invalid race time"));

        let err = RankingError::MissingHorse {
            index: 3,
            horse_id: "2019105219".to_string(),
        };
        assert!(err.to_string().contains("#3"));
    }
}

//! Pace index: race time normalized by distance
//!
//! The index is the number of seconds a horse needed per 1000 meters,
//! which makes a 1200m sprint comparable to a 2400m classic.

use crate::error::RankingError;

/// Parse "M:SS.d" into total seconds
pub fn parse_race_time(race_time: &str) -> Result<f64, RankingError> {
    let invalid = || RankingError::InvalidRaceTime(race_time.to_string());

    let (minutes, seconds) = race_time.trim().split_once(':').ok_or_else(invalid)?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.trim().parse().map_err(|_| invalid())?;

    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    Ok(minutes as f64 * 60.0 + seconds)
}

/// Extract meters from free text such as "1600m" or "芝右1600"
pub fn parse_distance(race_distance: &str) -> Result<u32, RankingError> {
    let digits: String = race_distance.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.parse::<u32>() {
        Ok(meters) if meters > 0 => Ok(meters),
        _ => Err(RankingError::InvalidDistance(race_distance.to_string())),
    }
}

/// Seconds per 1000 meters
pub fn compute_index(race_time: &str, race_distance: &str) -> Result<f64, RankingError> {
    let total_seconds = parse_race_time(race_time)?;
    let meters = parse_distance(race_distance)?;

    Ok(total_seconds / meters as f64 * 1000.0)
}

/// Round to 2 fractional digits
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

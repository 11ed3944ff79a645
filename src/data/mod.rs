//! Stored race data

pub mod archive;

// Re-export commonly used types
pub use archive::{ArchiveError, RaceArchive, RaceHorseRecord, RaceRecord, SaveOutcome};

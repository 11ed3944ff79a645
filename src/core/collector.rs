//! Reassembles per-horse aggregates in entry-list order
//!
//! History pages may finish in any order; ranking ties are broken by the
//! order in which horses were listed, so results are slotted by entry index.

use crate::error::RankingError;
use crate::models::{HorseEntry, HorseStat};

pub struct StatCollector {
    horse_ids: Vec<String>,
    slots: Vec<Option<HorseStat>>,
}

impl StatCollector {
    pub fn new(entries: &[HorseEntry]) -> Self {
        Self {
            horse_ids: entries.iter().map(|e| e.horse_id.clone()).collect(),
            slots: vec![None; entries.len()],
        }
    }

    /// Store the aggregate of the entry at `index`; a later insert replaces an earlier one
    pub fn insert(&mut self, index: usize, stat: HorseStat) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(stat);
        } else {
            tracing::warn!("Ignoring aggregate for unknown entry #{}", index);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entries still waiting for their aggregate
    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// All aggregates in listing order
    pub fn finish(self) -> Result<Vec<HorseStat>, RankingError> {
        self.slots
            .into_iter()
            .zip(self.horse_ids)
            .enumerate()
            .map(|(index, (slot, horse_id))| {
                slot.ok_or(RankingError::MissingHorse { index, horse_id })
            })
            .collect()
    }
}

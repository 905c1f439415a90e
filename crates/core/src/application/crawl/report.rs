// Crawl run counters

use super::super::ingest::UpsertOutcome;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub source: String,
    pub dimensions_attempted: usize,
    pub dimensions_failed: usize,
    pub pages_fetched: usize,
    pub candidates_seen: usize,
    pub blacklisted: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub conflicts: usize,
    pub failed: usize,
}

impl CrawlReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted(_) => self.inserted += 1,
            UpsertOutcome::Skipped(_) => self.skipped += 1,
            UpsertOutcome::Conflict => self.conflicts += 1,
        }
    }
}

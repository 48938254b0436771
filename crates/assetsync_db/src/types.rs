//! Record types persisted by the store.

use serde::{Deserialize, Serialize};

/// One row per known asset.
///
/// Timestamps are seconds since the Unix epoch. `processed_at == 0.0`
/// means the asset has never been processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Asset name (file name without the asset extension)
    pub name: String,
    /// Last observed filesystem modification time
    pub modified_at: f64,
    /// Last successful processing time
    pub processed_at: f64,
}

impl AssetRecord {
    /// An asset is stale when it changed after it was last processed.
    pub fn is_stale(&self) -> bool {
        self.modified_at > self.processed_at
    }

    /// Whether the asset has ever been processed.
    pub fn is_processed(&self) -> bool {
        self.processed_at > 0.0
    }
}

/// What a single upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New record with `processed_at = 0.0`
    Inserted,
    /// Existing record moved to a newer `modified_at`
    Updated,
    /// Existing record already as new or newer
    Unchanged,
}

/// Counts for a full upsert pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    /// Names seen for the first time
    pub inserted: usize,
    /// Records whose `modified_at` moved forward
    pub updated: usize,
    /// Records left as they were (same or older mtime)
    pub unchanged: usize,
}

impl UpsertSummary {
    pub(crate) fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Total number of assets passed through the upsert.
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness() {
        let mut record = AssetRecord {
            name: "wood".to_string(),
            modified_at: 10.0,
            processed_at: 0.0,
        };
        assert!(record.is_stale());
        assert!(!record.is_processed());

        record.processed_at = 10.0;
        assert!(!record.is_stale());
        assert!(record.is_processed());
    }

    #[test]
    fn test_upsert_summary_counts() {
        let mut summary = UpsertSummary::default();
        summary.record(UpsertOutcome::Inserted);
        summary.record(UpsertOutcome::Inserted);
        summary.record(UpsertOutcome::Unchanged);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.total(), 3);
    }
}

//! Schema creation for the record store.

use crate::error::Result;
use crate::RecordStore;
use tracing::debug;

/// Table holding one row per known asset.
pub const ASSET_TABLE: &str = "asset_records";

impl RecordStore {
    /// Create the table if it does not exist. Existing rows are left alone.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS asset_records (
                name TEXT PRIMARY KEY NOT NULL,
                modified_at REAL NOT NULL,
                processed_at REAL NOT NULL DEFAULT 0.0
            )"#,
        )
        .execute(&self.pool)
        .await?;

        debug!(table = ASSET_TABLE, "Record store schema verified");
        Ok(())
    }
}

//! Asset record operations
//!
//! Every multi-row mutation runs inside a single transaction. If any
//! statement fails the transaction is dropped, which rolls it back, so a
//! batch is either fully applied or not applied at all.

use crate::error::{DbError, Result};
use crate::types::{AssetRecord, UpsertOutcome, UpsertSummary};
use crate::RecordStore;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::collections::BTreeSet;
use tracing::debug;

impl RecordStore {
    // ========================================================================
    // Reads
    // ========================================================================

    /// List all records, ordered by name.
    pub async fn list(&self) -> Result<Vec<AssetRecord>> {
        let rows = sqlx::query(
            "SELECT name, modified_at, processed_at FROM asset_records ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    /// Get a record by name.
    pub async fn get(&self, name: &str) -> Result<Option<AssetRecord>> {
        let row = sqlx::query(
            "SELECT name, modified_at, processed_at FROM asset_records WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    // ========================================================================
    // Upserts
    // ========================================================================

    /// Insert a new record or advance `modified_at` of an existing one.
    ///
    /// A stored `modified_at` is never lowered.
    pub async fn upsert(&self, name: &str, modified_at: f64) -> Result<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;
        let outcome = upsert_in(&mut tx, name, modified_at).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Upsert a whole scan in one transaction.
    pub async fn upsert_many<'a, I>(&self, assets: I) -> Result<UpsertSummary>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut summary = UpsertSummary::default();
        let mut tx = self.pool.begin().await?;

        for (name, modified_at) in assets {
            let outcome = upsert_in(&mut tx, name, modified_at).await?;
            summary.record(outcome);
        }

        tx.commit().await?;

        debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            "Upsert pass committed"
        );
        Ok(summary)
    }

    // ========================================================================
    // Pruning
    // ========================================================================

    /// Delete every record whose name is not in `known_names`.
    ///
    /// Returns the number of records removed.
    pub async fn delete_missing(&self, known_names: &BTreeSet<String>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT name FROM asset_records")
            .fetch_all(&mut *tx)
            .await?;

        let mut doomed = Vec::new();
        for row in &rows {
            let name: String = row.try_get("name")?;
            if !known_names.contains(&name) {
                doomed.push(name);
            }
        }

        for name in &doomed {
            sqlx::query("DELETE FROM asset_records WHERE name = ?")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if !doomed.is_empty() {
            debug!(pruned = doomed.len(), names = ?doomed, "Pruned records for missing assets");
        }
        Ok(doomed.len())
    }

    // ========================================================================
    // Processing state
    // ========================================================================

    /// Stamp `processed_at = at` on every named record in one transaction.
    ///
    /// Unknown names are ignored and a stored `processed_at` is never lowered.
    /// Returns the number of records that matched.
    pub async fn mark_processed(&self, names: &[String], at: f64) -> Result<usize> {
        ensure_finite("processed_at", at)?;

        let mut tx = self.pool.begin().await?;
        let mut matched = 0usize;

        for name in names {
            let result = sqlx::query(
                "UPDATE asset_records SET processed_at = MAX(processed_at, ?) WHERE name = ?",
            )
            .bind(at)
            .bind(name)
            .execute(&mut *tx)
            .await?;
            matched += result.rows_affected() as usize;
        }

        tx.commit().await?;

        debug!(requested = names.len(), matched, at, "Marked batch processed");
        Ok(matched)
    }
}

async fn upsert_in(
    conn: &mut SqliteConnection,
    name: &str,
    modified_at: f64,
) -> Result<UpsertOutcome> {
    if name.is_empty() {
        return Err(DbError::invalid_state("asset name must not be empty"));
    }
    ensure_finite("modified_at", modified_at)?;

    let existing = sqlx::query("SELECT modified_at FROM asset_records WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    match existing {
        Some(row) => {
            let stored: f64 = row.try_get("modified_at")?;
            if modified_at <= stored {
                return Ok(UpsertOutcome::Unchanged);
            }

            sqlx::query("UPDATE asset_records SET modified_at = ? WHERE name = ?")
                .bind(modified_at)
                .bind(name)
                .execute(&mut *conn)
                .await?;
            Ok(UpsertOutcome::Updated)
        }
        None => {
            sqlx::query(
                "INSERT INTO asset_records (name, modified_at, processed_at) VALUES (?, ?, 0.0)",
            )
            .bind(name)
            .bind(modified_at)
            .execute(&mut *conn)
            .await?;
            Ok(UpsertOutcome::Inserted)
        }
    }
}

fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DbError::invalid_state(format!(
            "{field} must be a finite timestamp, got {value}"
        )))
    }
}

fn row_to_record(row: &SqliteRow) -> Result<AssetRecord> {
    Ok(AssetRecord {
        name: row.try_get("name")?,
        modified_at: row.try_get("modified_at")?,
        processed_at: row.try_get("processed_at")?,
    })
}

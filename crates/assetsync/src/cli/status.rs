//! `assetsync status`: what the record store knows about each asset

use super::output::{build_table, flag_cell, format_timestamp};
use super::Overrides;
use anyhow::Result;
use assetsync::cycle::{check_directories, open_store};
use assetsync::{AssetRecord, AssetSyncError, DirectoryScanner};
use comfy_table::{Cell, Color};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetStatus {
    #[serde(flatten)]
    record: AssetRecord,
    stale: bool,
    has_artifact: bool,
}

pub async fn run(overrides: &Overrides, json: bool) -> Result<()> {
    let (_, library) = overrides.library()?;
    check_directories(&[library.asset_dir.as_path(), library.output_dir.as_path()]).await?;

    let store = open_store(&library).await?;
    let records = store
        .list()
        .await
        .map_err(|e| AssetSyncError::store(&store, e));
    store.close().await;
    let records = records?;

    let outputs = library.scanner().list_output_names(&library.output_dir).await?;
    let statuses = build_statuses(records, &outputs);

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No assets recorded yet. Run `assetsync update` first.");
        return Ok(());
    }

    let rows = statuses.iter().map(|status| {
        vec![
            Cell::new(&status.record.name),
            Cell::new(format_timestamp(status.record.modified_at)),
            Cell::new(format_timestamp(status.record.processed_at)),
            flag_cell(status.stale, Color::Yellow),
            flag_cell(!status.has_artifact, Color::Red),
        ]
    });
    println!(
        "{}",
        build_table(&["Asset", "Modified", "Processed", "Stale", "Missing artifact"], rows)
    );

    let pending = statuses
        .iter()
        .filter(|s| s.stale || !s.has_artifact)
        .count();
    println!("{} assets recorded, {} pending.", statuses.len(), pending);
    Ok(())
}

fn build_statuses(records: Vec<AssetRecord>, outputs: &BTreeSet<String>) -> Vec<AssetStatus> {
    records
        .into_iter()
        .map(|record| AssetStatus {
            stale: record.is_stale(),
            has_artifact: outputs.contains(&record.name),
            record,
        })
        .collect()
}

//! `assetsync complete`: record an out-of-band processing run

use super::Overrides;
use anyhow::Result;
use assetsync::cycle::open_store;

pub async fn run(overrides: &Overrides, names: Vec<String>) -> Result<()> {
    let (_, library) = overrides.library()?;

    let store = open_store(&library).await?;
    let result = assetsync::complete(&store, &names).await;
    store.close().await;
    let report = result?;

    println!(
        "Marked {} of {} assets as processed.",
        report.marked, report.requested
    );
    if report.marked < report.requested {
        println!("Unknown names were ignored; run `assetsync update` to refresh the record store.");
    }
    Ok(())
}

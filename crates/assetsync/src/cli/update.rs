//! `assetsync update`: sync the record store and show the task list

use super::Overrides;
use anyhow::Result;

pub async fn run(overrides: &Overrides, json: bool) -> Result<()> {
    let (_, library) = overrides.library()?;
    let report = assetsync::update(&library, &library.scanner()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.tasks.summary());
    Ok(())
}

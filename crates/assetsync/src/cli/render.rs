//! `assetsync render`: run a full cycle through the configured processor

use super::output::print_messages;
use super::Overrides;
use anyhow::{Context, Result};
use assetsync::{CommandProcessor, ProcessorConfig};
use std::time::Duration;

pub async fn run(overrides: &Overrides, json: bool) -> Result<()> {
    let (config, library) = overrides.library()?;
    let processor = command_processor(&config.processor)?;

    let report = assetsync::run_cycle(
        &library,
        &library.scanner(),
        &processor,
        &config.processor.params,
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_messages(&report.messages);
    }

    if let Some(processed) = &report.processed {
        if !processed.failed.is_empty() {
            anyhow::bail!(
                "{} of {} tasks failed; they stay pending for the next run",
                processed.failed.len(),
                report.tasks.len()
            );
        }
    }
    Ok(())
}

fn command_processor(config: &ProcessorConfig) -> Result<CommandProcessor> {
    let program = config
        .command
        .clone()
        .context("No processor configured: set [processor] command in the config file")?;
    Ok(CommandProcessor::new(program, config.args.clone())
        .with_task_timeout(Duration::from_secs(config.task_timeout_secs.max(1))))
}

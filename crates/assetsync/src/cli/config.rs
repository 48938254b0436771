//! `assetsync config`: show the resolved configuration

use super::Overrides;
use anyhow::Result;
use assetsync::config::default_config_path;

pub fn run(overrides: &Overrides, json: bool) -> Result<()> {
    let config = overrides.load_config()?;
    let library = config.library().ok();
    let config_path = overrides.config.clone().unwrap_or_else(default_config_path);

    if json {
        let value = serde_json::json!({
            "config_file": {
                "path": config_path.to_string_lossy(),
                "exists": config_path.exists(),
            },
            "asset_dir": config.asset_dir,
            "output_dir": config.output_dir,
            "database_path": library.as_ref().map(|l| l.database_path.clone()),
            "asset_extension": config.asset_extension,
            "artifact_suffix": config.artifact_suffix,
            "scan_timeout_secs": config.scan_timeout_secs,
            "store_timeout_secs": config.store_timeout_secs,
            "processor": config.processor,
            "logs_dir": assetsync_logging::logs_dir(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let show = |path: Option<&std::path::Path>| {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    };

    println!("Config file:     {} ({})", config_path.display(), if config_path.exists() { "found" } else { "not found" });
    println!("Asset dir:       {}", show(config.asset_dir.as_deref()));
    println!("Output dir:      {}", show(config.output_dir.as_deref()));
    println!("Record store:    {}", show(library.as_ref().map(|l| l.database_path.as_path())));
    println!("Asset files:     *{}", config.asset_extension);
    println!("Artifact files:  <name>{}", config.artifact_suffix);
    println!("Processor:       {}", config.processor.command.as_deref().unwrap_or("(not set)"));
    println!("Logs:            {}", assetsync_logging::logs_dir().display());
    Ok(())
}

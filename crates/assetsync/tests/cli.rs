//! The `assetsync` binary end to end

#![cfg(unix)]

mod common;

use assetsync::AssetSyncConfig;
use common::{TestEnv, T1};
use std::path::Path;
use std::process::{Command, Output};

fn write_config(env: &TestEnv, home: &Path) -> std::path::PathBuf {
    let mut config = AssetSyncConfig::default();
    config.asset_dir = Some(env.asset_dir.clone());
    config.output_dir = Some(env.output_dir.clone());
    config.database_path = Some(env.db_path.clone());
    config.asset_extension = ".asset".to_string();
    config.artifact_suffix = ".asset.SWATCH".to_string();
    config.processor.command = Some("sh".to_string());
    config.processor.args = vec![
        "-c".to_string(),
        r#"echo "rendering $1 with $ASSETSYNC_PARAM_CAMERA"; cp "$1" "$2""#.to_string(),
        "sh".to_string(),
        "{asset}".to_string(),
        "{output}".to_string(),
    ];

    let path = home.join("config.toml");
    config.save(&path).unwrap();
    path
}

fn assetsync(home: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_assetsync"))
        .env("ASSETSYNC_HOME", home)
        .env_remove("ASSETSYNC_ASSET_DIR")
        .env_remove("ASSETSYNC_OUTPUT_DIR")
        .env_remove("ASSETSYNC_DB")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to run assetsync")
}

#[test]
fn test_render_json_is_parseable_when_processor_prints() {
    let env = TestEnv::new();
    let home = tempfile::TempDir::new().unwrap();
    env.write_asset("wood", T1);
    let config = write_config(&env, home.path());

    let output = assetsync(home.path(), &config, &["render", "--json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    });
    assert_eq!(report["completion"]["marked"], 1);
    assert_eq!(report["processed"]["succeeded"][0], "wood");
    assert!(env.output_dir.join("wood.asset.SWATCH").exists());
}

#[test]
fn test_update_json_after_render_reports_no_tasks() {
    let env = TestEnv::new();
    let home = tempfile::TempDir::new().unwrap();
    env.write_asset("wood", T1);
    let config = write_config(&env, home.path());

    assert!(assetsync(home.path(), &config, &["render"]).status.success());

    let output = assetsync(home.path(), &config, &["update", "--json"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tasks"]["tasks"], serde_json::json!([]));
}

//! Full cycles: update → process → complete

mod common;

use assetsync::{
    run_cycle, update, CommandProcessor, ProcessReport, ProcessingParams, Processor, RenderTask,
    UP_TO_DATE_MESSAGE,
};
use common::{names, TestEnv, T1, T2};
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Writes artifacts for every task except the ones told to fail.
struct FakeProcessor {
    fail: BTreeSet<String>,
    extra_success: Option<String>,
    seen: Mutex<Vec<Vec<String>>>,
}

impl FakeProcessor {
    fn new(fail: &[&str]) -> Self {
        Self {
            fail: names(fail),
            extra_success: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn batches(&self) -> Vec<Vec<String>> {
        self.seen.lock().unwrap().clone()
    }
}

impl Processor for FakeProcessor {
    async fn process(&self, tasks: &[RenderTask], _params: &ProcessingParams) -> ProcessReport {
        self.seen
            .lock()
            .unwrap()
            .push(tasks.iter().map(|t| t.name.clone()).collect());

        let mut report = ProcessReport::default();
        for task in tasks {
            if self.fail.contains(&task.name) {
                report.failed.push(task.name.clone());
            } else {
                std::fs::write(&task.output_path, b"swatch").unwrap();
                report.succeeded.push(task.name.clone());
            }
        }
        if let Some(extra) = &self.extra_success {
            report.succeeded.push(extra.clone());
        }
        report
    }
}

#[tokio::test]
async fn test_partial_failure_retries_only_failed_assets() {
    let env = TestEnv::new();
    env.write_asset("wood", T1);
    env.write_asset("metal", T1);
    env.write_asset("glass", T1);
    let library = env.library();
    let scanner = library.scanner();

    let processor = FakeProcessor::new(&["metal"]);
    let report = run_cycle(&library, &scanner, &processor, &ProcessingParams::new())
        .await
        .unwrap();

    assert_eq!(report.tasks.len(), 3);
    let completion = report.completion.unwrap();
    assert_eq!(completion.marked, 2);
    assert!(report.messages[0].starts_with("There are 3 new or updated assets"));
    assert!(report.messages.contains(&"This is 2/3 tasks.".to_string()));
    assert!(report
        .messages
        .contains(&"The following files failed: metal.".to_string()));

    // Next cycle only carries the failure.
    let processor = FakeProcessor::new(&[]);
    let report = run_cycle(&library, &scanner, &processor, &ProcessingParams::new())
        .await
        .unwrap();
    assert_eq!(report.tasks.names(), &names(&["metal"]));
    assert_eq!(processor.batches(), vec![vec!["metal".to_string()]]);

    // And then nothing.
    let report = run_cycle(&library, &scanner, &processor, &ProcessingParams::new())
        .await
        .unwrap();
    assert!(report.tasks.is_empty());
    assert!(report.processed.is_none());
    assert!(report.completion.is_none());
    assert_eq!(report.messages, vec![UP_TO_DATE_MESSAGE.to_string()]);
    assert_eq!(processor.batches().len(), 1);
}

#[tokio::test]
async fn test_edit_after_cycle_is_picked_up() {
    let env = TestEnv::new();
    env.write_asset("wood", T1);
    let library = env.library();
    let scanner = library.scanner();
    let processor = FakeProcessor::new(&[]);

    run_cycle(&library, &scanner, &processor, &ProcessingParams::new())
        .await
        .unwrap();

    // A modification time later than the batch start.
    let later = assetsync::RecordStore::now_secs() as i64 + 60;
    env.write_asset("wood", later);

    let report = update(&library, &scanner).await.unwrap();
    assert_eq!(report.sync.updated, 1);
    assert_eq!(report.tasks.stale(), &names(&["wood"]));
}

#[tokio::test]
async fn test_unrequested_success_is_ignored() {
    let env = TestEnv::new();
    env.write_asset("wood", T1);
    env.write_asset("metal", T2);
    let library = env.library();
    let scanner = library.scanner();

    // First pass processes both, so metal is up to date.
    run_cycle(&library, &scanner, &FakeProcessor::new(&[]), &ProcessingParams::new())
        .await
        .unwrap();
    let before = env.store().await.get("metal").await.unwrap().unwrap();

    env.remove_artifact("wood");
    let mut processor = FakeProcessor::new(&[]);
    processor.extra_success = Some("metal".to_string());
    let report = run_cycle(&library, &scanner, &processor, &ProcessingParams::new())
        .await
        .unwrap();

    assert_eq!(report.tasks.names(), &names(&["wood"]));
    assert_eq!(report.completion.unwrap().marked, 1);

    let after = env.store().await.get("metal").await.unwrap().unwrap();
    assert_eq!(after.processed_at, before.processed_at);
}

#[tokio::test]
async fn test_update_does_not_process() {
    let env = TestEnv::new();
    env.write_asset("wood", T1);
    let library = env.library();

    let report = update(&library, &library.scanner()).await.unwrap();
    assert_eq!(report.tasks.names(), &names(&["wood"]));

    let record = env.store().await.get("wood").await.unwrap().unwrap();
    assert!(!record.is_processed());
}

#[tokio::test]
async fn test_missing_output_dir_aborts_before_store_is_touched() {
    let env = TestEnv::new();
    env.write_asset("wood", T1);
    std::fs::remove_dir_all(&env.output_dir).unwrap();
    let library = env.library();

    let err = run_cycle(&library, &library.scanner(), &FakeProcessor::new(&[]), &ProcessingParams::new())
        .await
        .unwrap_err();

    assert!(err.is_directory_unavailable());
    assert!(!env.db_path.exists());
}

#[tokio::test]
async fn test_unusable_store_path_is_store_unavailable() {
    let env = TestEnv::new();
    env.write_asset("wood", T1);
    std::fs::create_dir_all(&env.db_path).unwrap();
    let library = env.library();

    let err = update(&library, &library.scanner()).await.unwrap_err();
    assert!(err.is_store_unavailable());
}

// ============================================================================
// CommandProcessor
// ============================================================================

#[cfg(unix)]
mod command {
    use super::*;
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> CommandProcessor {
        CommandProcessor::new(
            "sh",
            vec![
                "-c".to_string(),
                script.to_string(),
                "sh".to_string(),
                "{asset}".to_string(),
                "{output}".to_string(),
            ],
        )
    }

    #[tokio::test]
    async fn test_command_processor_full_cycle() {
        let env = TestEnv::new();
        env.write_asset("wood", T1);
        env.write_asset("metal", T1);
        let library = env.library();

        let processor = sh(r#"cp "$1" "$2""#);
        let report = run_cycle(&library, &library.scanner(), &processor, &ProcessingParams::new())
            .await
            .unwrap();

        assert_eq!(report.completion.unwrap().marked, 2);
        assert!(env.output_dir.join("wood.asset.SWATCH").exists());
        assert!(env.output_dir.join("metal.asset.SWATCH").exists());

        let report = update(&library, &library.scanner()).await.unwrap();
        assert!(report.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_command_processor_nonzero_exit_fails_task() {
        let env = TestEnv::new();
        env.write_asset("wood", T1);
        let library = env.library();

        let processor = sh("exit 3");
        let report = run_cycle(&library, &library.scanner(), &processor, &ProcessingParams::new())
            .await
            .unwrap();

        let processed = report.processed.unwrap();
        assert_eq!(processed.failed, vec!["wood".to_string()]);
        assert_eq!(report.completion.unwrap().marked, 0);
    }

    #[tokio::test]
    async fn test_command_processor_skips_missing_asset() {
        let env = TestEnv::new();
        let task = RenderTask {
            name: "ghost".to_string(),
            asset_path: env.asset_dir.join("ghost.asset"),
            output_path: env.output_dir.join("ghost.asset.SWATCH"),
        };

        let report = sh(r#"cp "$1" "$2""#)
            .process(&[task], &ProcessingParams::new())
            .await;
        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed, vec!["ghost".to_string()]);
    }

    #[tokio::test]
    async fn test_command_processor_exports_params() {
        let env = TestEnv::new();
        let path = env.write_asset("wood", T1);
        let task = RenderTask {
            name: "wood".to_string(),
            asset_path: path,
            output_path: env.output_dir.join("wood.asset.SWATCH"),
        };
        let params = ProcessingParams::from([("camera".to_string(), "RenderCamShape".to_string())]);

        let processor = sh(r#"test "$ASSETSYNC_PARAM_CAMERA" = RenderCamShape && cp "$1" "$2""#);
        let report = processor.process(&[task], &params).await;
        assert_eq!(report.succeeded, vec!["wood".to_string()]);
    }

    fn wood_task(env: &TestEnv) -> RenderTask {
        RenderTask {
            name: "wood".to_string(),
            asset_path: env.write_asset("wood", T1),
            output_path: env.output_dir.join("wood.asset.SWATCH"),
        }
    }

    #[tokio::test]
    async fn test_command_processor_timeout_fails_task() {
        let env = TestEnv::new();
        let task = wood_task(&env);

        let processor = sh("sleep 5").with_task_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let report = processor.process(&[task], &ProcessingParams::new()).await;

        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed, vec!["wood".to_string()]);
    }

    #[tokio::test]
    async fn test_command_processor_spawn_failure_fails_task() {
        let env = TestEnv::new();
        let task = wood_task(&env);

        let processor = CommandProcessor::new(
            env.asset_dir.join("no-such-renderer").to_string_lossy(),
            vec!["{asset}".to_string()],
        );
        let report = processor.process(&[task], &ProcessingParams::new()).await;

        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed, vec!["wood".to_string()]);
    }

    #[tokio::test]
    async fn test_command_processor_output_is_captured() {
        let env = TestEnv::new();
        let task = wood_task(&env);

        let processor = sh(r#"echo "rendering $1"; echo "noise" >&2; cp "$1" "$2""#);
        let report = processor.process(&[task], &ProcessingParams::new()).await;

        assert_eq!(report.succeeded, vec!["wood".to_string()]);
        assert!(env.output_dir.join("wood.asset.SWATCH").exists());
    }
}

//! External processor boundary
//!
//! The processor turns assets into artifacts. assetsync only hands it the
//! task list and reads back which tasks succeeded.

use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Parameters passed through to every task (camera, shape, ...).
pub type ProcessingParams = BTreeMap<String, String>;

/// One unit of work for the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTask {
    pub name: String,
    pub asset_path: PathBuf,
    pub output_path: PathBuf,
}

/// Per-batch result. `succeeded` and `failed` are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl ProcessReport {
    /// Operator-facing lines describing the batch.
    pub fn messages(&self, total: usize) -> Vec<String> {
        let mut lines = vec![
            format!(
                "The following assets have been processed and saved to the output directory: {}.",
                self.succeeded.join(", ")
            ),
            format!("This is {}/{} tasks.", self.succeeded.len(), total),
        ];
        if !self.failed.is_empty() {
            lines.push(format!("The following files failed: {}.", self.failed.join(", ")));
        }
        lines
    }
}

/// Something that can process a batch of tasks.
pub trait Processor: Send + Sync {
    fn process(
        &self,
        tasks: &[RenderTask],
        params: &ProcessingParams,
    ) -> impl Future<Output = ProcessReport> + Send;
}

/// Runs an external program once per task.
///
/// Arguments may contain `{name}`, `{asset}`, `{output}` and `{param.KEY}`
/// placeholders. Parameters are also exported as `ASSETSYNC_PARAM_<KEY>`.
/// A task succeeds when the program exits with status 0 within the timeout.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    program: String,
    args: Vec<String>,
    task_timeout: Duration,
}

impl CommandProcessor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            task_timeout: Duration::from_secs(600),
        }
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    async fn run_task(&self, task: &RenderTask, params: &ProcessingParams) -> bool {
        match tokio::fs::try_exists(&task.asset_path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(task = %task.name, path = %task.asset_path.display(), "Asset file doesn't exist, skipping");
                return false;
            }
            Err(err) => {
                warn!(task = %task.name, error = %err, "Cannot check asset file, skipping");
                return false;
            }
        }

        let args: Vec<String> = self
            .args
            .iter()
            .map(|template| expand_arg(template, task, params))
            .collect();

        // Output is captured so the processor never writes into our stdout.
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .envs(params.iter().map(|(key, value)| (param_env_name(key), value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(task = %task.name, program = %self.program, ?args, "Running processor");

        match tokio::time::timeout(self.task_timeout, command.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                debug!(
                    task = %task.name,
                    stdout = %String::from_utf8_lossy(&output.stdout).trim_end(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                    "Processor finished"
                );
                true
            }
            Ok(Ok(output)) => {
                warn!(
                    task = %task.name,
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                    "Processor exited unsuccessfully"
                );
                debug!(task = %task.name, stdout = %String::from_utf8_lossy(&output.stdout).trim_end(), "Processor output");
                false
            }
            Ok(Err(err)) => {
                warn!(task = %task.name, program = %self.program, error = %err, "Failed to start processor");
                false
            }
            Err(_) => {
                warn!(task = %task.name, timeout = ?self.task_timeout, "Processor timed out");
                false
            }
        }
    }
}

impl Processor for CommandProcessor {
    async fn process(&self, tasks: &[RenderTask], params: &ProcessingParams) -> ProcessReport {
        let mut report = ProcessReport::default();

        for task in tasks {
            if self.run_task(task, params).await {
                report.succeeded.push(task.name.clone());
            } else {
                report.failed.push(task.name.clone());
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Processor batch finished"
        );
        report
    }
}

fn expand_arg(template: &str, task: &RenderTask, params: &ProcessingParams) -> String {
    let mut arg = template
        .replace("{name}", &task.name)
        .replace("{asset}", &task.asset_path.to_string_lossy())
        .replace("{output}", &task.output_path.to_string_lossy());
    for (key, value) in params {
        arg = arg.replace(&format!("{{param.{key}}}"), value);
    }
    arg
}

fn param_env_name(key: &str) -> String {
    let key: String = key
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("ASSETSYNC_PARAM_{key}")
}

//! assetsync - stale asset tracking and task reconciliation
//!
//! Keeps a directory of source assets and a directory of derived artifacts
//! in step. Each cycle finds the assets that are new, changed since they were
//! last processed, or missing their artifact, hands them to a processor, and
//! durably records the ones that succeeded.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Scanner   │     │ Reconciler  │     │  Processor  │     │   Tracker   │
//! │ (asset/out  │────▶│ (sync, task │────▶│ (external,  │────▶│ (complete)  │
//! │    dirs)    │     │    list)    │     │  per task)  │     │             │
//! └─────────────┘     └──────┬──────┘     └─────────────┘     └──────┬──────┘
//!                            │          ┌──────────────┐             │
//!                            └─────────▶│ Record store │◀────────────┘
//!                                       │   (SQLite)   │
//!                                       └──────────────┘
//! ```
//!
//! The public core is [`reconcile::sync`], [`reconcile::generate_tasks`] and
//! [`tracker::complete`]; [`cycle`] wires them into one pass.

pub mod config;
pub mod cycle;
pub mod error;
pub mod naming;
pub mod processor;
pub mod reconcile;
pub mod scanner;
pub mod tracker;

// Re-exports for convenience
pub use assetsync_db::{AssetRecord, RecordStore};
pub use config::{AssetSyncConfig, Library, ProcessorConfig};
pub use cycle::{run_cycle, update, CycleReport, UpdateReport};
pub use error::{AssetSyncError, Result};
pub use naming::NamingConvention;
pub use processor::{CommandProcessor, ProcessReport, ProcessingParams, Processor, RenderTask};
pub use reconcile::{generate_tasks, sync, SyncReport, TaskList, UP_TO_DATE_MESSAGE};
pub use scanner::{DirectoryScanner, FsScanner, ScannedAsset};
pub use tracker::{complete, complete_at, CompletionReport};

//! TaskWeave Core
//!
//! Planning-and-rewrite orchestrator: turns a natural-language change
//! request into a file-level task plan, executes it sequentially against
//! an in-memory file-state map, and reports only files whose content
//! actually changed.
//!
//! # Core Concepts
//!
//! - [`Orchestrator`]: Top-level entry point; its boundary never throws
//! - [`AgentContext`]: Immutable run input with the pre-run file snapshot
//! - [`TaskPlan`] / [`Task`]: Ordered single-file change instructions
//! - [`execute_plan`]: Sequential, fail-fast task execution
//! - [`AuditLog`]: Structured record persisted for every run
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskweave_core::{AgentContext, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(client, storage, audit);
//! let result = orchestrator.run(context).await;
//! if result.success {
//!     for file in &result.changed_files {
//!         println!("changed: {}", file.path);
//!     }
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod audit;
mod error;
mod executor;
mod orchestrator;
mod planner;
mod rewrite;
mod types;

// Re-exports
pub use audit::{
    AuditError, AuditErrorRecord, AuditLog, AuditSink, FinalStatus, FsAuditSink, MemoryAuditSink,
};
pub use error::{AgentError, ContextError};
pub use executor::{execute_plan, ExecutionOutcome, FileState};
pub use orchestrator::Orchestrator;
pub use planner::run_planning;
pub use rewrite::run_rewrite;
pub use types::{
    AgentContext, EstimatedComplexity, JobId, OrchestratorConfig, RewriteResult, RunResult, Task,
    TaskId, TaskPlan, TaskStatus,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

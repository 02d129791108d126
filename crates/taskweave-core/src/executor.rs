//! Task plan executor
//!
//! Runs a plan sequentially against a mutable file-state map. Each task
//! resolves its target path against the *current* map, so earlier tasks'
//! effects decide whether later tasks create or modify. The first task
//! error halts the loop; later tasks stay PENDING.

use indexmap::IndexMap;
use taskweave_file::{Checksum, FileId, FileRecord, FileStorage, ProjectId};
use taskweave_genai::GenerationClient;
use tracing::{debug, error, info, warn};

use crate::error::AgentError;
use crate::rewrite::run_rewrite;
use crate::types::{OrchestratorConfig, Task, TaskPlan, TaskStatus};

/// File-state map for one run, keyed by immutable file id
pub type FileState = IndexMap<FileId, FileRecord>;

/// Result of executing a plan
#[derive(Debug)]
pub struct ExecutionOutcome {
    /// False if any task ended FAILED
    pub success: bool,
    /// The full, possibly-mutated file-state map
    pub files: FileState,
    /// The plan with final task statuses
    pub plan: TaskPlan,
    /// The error that halted the loop, if any
    pub error: Option<AgentError>,
}

/// Execute the plan's tasks in list order, fail-fast
///
/// `files` is the run's working copy of the context snapshot; ownership
/// passes in and the mutated map comes back in the outcome. Non-PENDING
/// tasks are skipped, which makes re-entry with a partially executed
/// plan idempotent.
pub async fn execute_plan(
    client: &dyn GenerationClient,
    storage: &dyn FileStorage,
    config: &OrchestratorConfig,
    mut plan: TaskPlan,
    mut files: FileState,
) -> ExecutionOutcome {
    let project_id = plan.project_id;
    let mut success = true;
    let mut halt_error = None;

    for task in &mut plan.tasks {
        if task.status != TaskStatus::Pending {
            debug!(task = %task.id, status = %task.status, "skipping non-pending task");
            continue;
        }
        task.status = TaskStatus::InProgress;
        info!(task = %task.id, path = %task.target_file_path, "task started");

        match run_task(client, storage, config, project_id, task, &mut files).await {
            Ok(()) => {
                task.status = TaskStatus::Completed;
                info!(task = %task.id, "task completed");
            }
            Err(e) => {
                task.status = TaskStatus::Failed;
                error!(task = %task.id, error = %e, "task failed, halting remaining plan");
                success = false;
                halt_error = Some(e);
                break;
            }
        }
    }

    ExecutionOutcome {
        success,
        files,
        plan,
        error: halt_error,
    }
}

/// Execute one task against the current file state
async fn run_task(
    client: &dyn GenerationClient,
    storage: &dyn FileStorage,
    config: &OrchestratorConfig,
    project_id: ProjectId,
    task: &mut Task,
    files: &mut FileState,
) -> Result<(), AgentError> {
    // Creation vs modification is decided against the current map, not
    // the original snapshot.
    let existing = files
        .values()
        .find(|f| f.path == task.target_file_path)
        .cloned();

    match existing {
        None => {
            // Creation: a placeholder record gives the file an identity
            // before its content exists.
            let placeholder = storage
                .create_placeholder(project_id, &task.target_file_path, &config.placeholder_content)
                .await?;
            task.target_file_id = Some(placeholder.id);

            let result = run_rewrite(client, task, None, &config.rewrite).await?;
            let file = placeholder.with_content(result.updated_content);
            debug!(task = %task.id, file = %file.id, "created file");
            files.insert(file.id, file);
        }
        Some(current) => {
            reconcile_target_id(task, &current);

            let result = run_rewrite(client, task, Some(&current.content), &config.rewrite).await?;
            let new_checksum = Checksum::of_text(&result.updated_content);
            if new_checksum == current.checksum {
                // No-op rewrite: identical content never touches the map.
                debug!(task = %task.id, file = %current.id, "content unchanged, no-op");
            } else {
                let updated = current.with_content(result.updated_content);
                files.insert(updated.id, updated);
            }
        }
    }
    Ok(())
}

/// Reconcile a task's declared target id with the file resolved by path
///
/// The path-based match wins; a mismatch means the planner's view was
/// stale and is logged as an inconsistency, not an error.
fn reconcile_target_id(task: &mut Task, resolved: &FileRecord) {
    match task.target_file_id {
        None => task.target_file_id = Some(resolved.id),
        Some(declared) if declared != resolved.id => {
            warn!(
                task = %task.id,
                declared = %declared,
                resolved = %resolved.id,
                path = %task.target_file_path,
                "target file id mismatch, path resolution wins"
            );
            task.target_file_id = Some(resolved.id);
        }
        Some(_) => {}
    }
}

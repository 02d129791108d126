//! Planning stage
//!
//! Turns a run context into a validated [`TaskPlan`]. The generation
//! service sees the user request, a project summary, the selected file
//! listing and the plan schema; its output is schema-validated, target
//! paths are normalized, and every task comes back PENDING.

use schemars::JsonSchema;
use serde::Deserialize;
use std::fmt::Write as _;
use taskweave_file::{FileId, ProjectPath};
use taskweave_genai::{
    generate_structured, response_schema, GenerationClient, GenerationOptions, GenerationRequest,
};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::error::AgentError;
use crate::types::{AgentContext, EstimatedComplexity, Task, TaskId, TaskPlan, TaskStatus};

/// System instruction for the planning call
const PLANNING_SYSTEM_INSTRUCTION: &str = "You are a meticulous software project planner. \
Break the user's request into an ordered list of single-file tasks. Every task must name \
exactly one target file path, relative to the project root. Earlier tasks run before later \
ones; use list order to express dependencies. Respond only with JSON matching the provided \
schema.";

/// Plan as the model emits it, before ids and statuses are assigned
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct PlanDraft {
    /// Project id echoed by the model, advisory only
    project_id: Option<String>,
    /// Proposed tasks in execution order
    tasks: Vec<TaskDraft>,
}

/// One task as the model emits it
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct TaskDraft {
    title: String,
    description: String,
    target_file_path: String,
    target_file_id: Option<String>,
    related_test_file_id: Option<String>,
    estimated_complexity: Option<EstimatedComplexity>,
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Build the planning prompt from the run context
fn build_planning_prompt(context: &AgentContext) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "## User Request\n{}\n", context.user_request);
    let _ = writeln!(prompt, "## Project\nid: {}", context.project_id);
    let _ = writeln!(prompt, "summary: {}\n", context.project_summary);
    let _ = writeln!(prompt, "## Selected Files");
    for file in &context.files {
        let _ = writeln!(prompt, "- {} {} ({})", file.id, file.path, file.name);
    }
    let _ = writeln!(
        prompt,
        "\nProduce the task plan for this request. Reference existing files by the ids \
         and paths above; new files need only a path."
    );
    prompt
}

/// Parse a file id the model echoed back; malformed ids are dropped
fn parse_echoed_id(raw: Option<String>, field: &str, title: &str) -> Option<FileId> {
    let raw = raw?;
    match Ulid::from_string(&raw) {
        Ok(ulid) => Some(FileId(ulid)),
        Err(_) => {
            warn!(task = title, field, value = %raw, "dropping malformed file id from planner");
            None
        }
    }
}

/// Run the planning stage
///
/// # Errors
/// Returns [`AgentError::SchemaValidation`] when the model output violates
/// the plan schema, [`AgentError::MissingTargetPath`] when a task carries
/// no target path, and [`AgentError::InvalidTargetPath`] when a path does
/// not normalize.
pub async fn run_planning(
    client: &dyn GenerationClient,
    context: &AgentContext,
    options: &GenerationOptions,
) -> Result<TaskPlan, AgentError> {
    let request = GenerationRequest::new(
        build_planning_prompt(context),
        PLANNING_SYSTEM_INSTRUCTION,
        response_schema::<PlanDraft>(),
        options.clone(),
    );

    debug!(project = %context.project_id, files = context.files.len(), "requesting task plan");
    let draft: PlanDraft = generate_structured(client, &request).await?;

    if let Some(echoed) = &draft.project_id {
        if echoed != &context.project_id.to_string() {
            warn!(
                context_project = %context.project_id,
                plan_project = %echoed,
                "plan project id differs from context; context id is authoritative"
            );
        }
    }

    let mut tasks = Vec::with_capacity(draft.tasks.len());
    for draft_task in draft.tasks {
        let raw_path = draft_task.target_file_path.trim();
        if raw_path.is_empty() {
            return Err(AgentError::MissingTargetPath {
                title: draft_task.title,
            });
        }
        let path = ProjectPath::normalize(raw_path).map_err(|source| {
            AgentError::InvalidTargetPath {
                title: draft_task.title.clone(),
                path: raw_path.to_string(),
                source,
            }
        })?;

        let target_file_id =
            parse_echoed_id(draft_task.target_file_id, "targetFileId", &draft_task.title);
        let related_test_file_id = parse_echoed_id(
            draft_task.related_test_file_id,
            "relatedTestFileId",
            &draft_task.title,
        );

        tasks.push(Task {
            id: TaskId::new(),
            title: draft_task.title,
            description: draft_task.description,
            target_file_path: path,
            target_file_id,
            related_test_file_id,
            estimated_complexity: draft_task.estimated_complexity,
            dependencies: draft_task.dependencies,
            status: TaskStatus::Pending,
        });
    }

    info!(project = %context.project_id, tasks = tasks.len(), "task plan ready");
    Ok(TaskPlan::new(context.project_id, tasks))
}

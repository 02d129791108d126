//! Core types for TaskWeave
//!
//! Defines the fundamental types for the orchestrator:
//! - Run context and configuration
//! - Tasks, task plans and the task status machine
//! - Rewrite and run results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use taskweave_file::{FileId, FileRecord, ProjectId, ProjectPath};
use taskweave_genai::GenerationOptions;
use ulid::Ulid;

use crate::audit::AuditLog;
use crate::error::ContextError;

/// Unique run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Generate new job ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Ulid);

impl TaskId {
    /// Generate new task ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable input to one run
///
/// The file list is the pre-run snapshot; the executor works on its own
/// copy and never mutates the context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContext {
    /// Project being changed
    pub project_id: ProjectId,
    /// Natural-language change request
    pub user_request: String,
    /// Short project summary for prompt context
    pub project_summary: String,
    /// Files selected for this run
    pub files: Vec<FileRecord>,
}

impl AgentContext {
    /// Create a context
    #[inline]
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        user_request: impl Into<String>,
        project_summary: impl Into<String>,
        files: Vec<FileRecord>,
    ) -> Self {
        Self {
            project_id,
            user_request: user_request.into(),
            project_summary: project_summary.into(),
            files,
        }
    }

    /// Structural validation of the run input
    ///
    /// At most one file may resolve per path; every file must belong to
    /// the context's project; the request must be non-empty.
    ///
    /// # Errors
    /// Returns [`ContextError`] naming the offending field.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.user_request.trim().is_empty() {
            return Err(ContextError::EmptyRequest);
        }
        let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
        for file in &self.files {
            if file.project_id != self.project_id {
                return Err(ContextError::ForeignFile {
                    path: file.path.to_string(),
                    project_id: file.project_id.to_string(),
                });
            }
            if !seen.insert(file.path.as_str()) {
                return Err(ContextError::DuplicatePath(file.path.to_string()));
            }
        }
        Ok(())
    }

    /// Look up a file in the snapshot by path
    #[must_use]
    pub fn file_by_path(&self, path: &ProjectPath) -> Option<&FileRecord> {
        self.files.iter().find(|f| &f.path == path)
    }
}

/// Task lifecycle states
///
/// Transitions are driven solely by the executor and only move forward:
/// PENDING → IN_PROGRESS → {COMPLETED | FAILED}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not yet picked up
    Pending,
    /// Currently executing
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// Whether this is a terminal state
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Planner's effort estimate for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EstimatedComplexity {
    /// Small, localized change
    Low,
    /// Typical single-file change
    Medium,
    /// Large or intricate change
    High,
}

/// One file-level change instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier, assigned by the planning stage
    pub id: TaskId,
    /// Short task title
    pub title: String,
    /// What the change should accomplish
    pub description: String,
    /// Canonical target path
    pub target_file_path: ProjectPath,
    /// Target file id, resolved during execution
    pub target_file_id: Option<FileId>,
    /// Test file the planner associated with this change
    pub related_test_file_id: Option<FileId>,
    /// Planner's effort estimate
    pub estimated_complexity: Option<EstimatedComplexity>,
    /// Titles of tasks this one builds on (informational; list order
    /// is the only ordering mechanism)
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Lifecycle state
    pub status: TaskStatus,
}

impl Task {
    /// Create a pending task
    #[inline]
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        target_file_path: ProjectPath,
    ) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: description.into(),
            target_file_path,
            target_file_id: None,
            related_test_file_id: None,
            estimated_complexity: None,
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
        }
    }

    /// With a pre-resolved target file id
    #[inline]
    #[must_use]
    pub fn with_target_file_id(mut self, id: FileId) -> Self {
        self.target_file_id = Some(id);
        self
    }

    /// With an effort estimate
    #[inline]
    #[must_use]
    pub fn with_complexity(mut self, complexity: EstimatedComplexity) -> Self {
        self.estimated_complexity = Some(complexity);
        self
    }
}

/// Ordered list of tasks for one run
///
/// Execution order is positional; there is no dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPlan {
    /// Project the plan applies to
    pub project_id: ProjectId,
    /// Tasks in execution order
    pub tasks: Vec<Task>,
}

impl TaskPlan {
    /// Create a plan
    #[inline]
    #[must_use]
    pub fn new(project_id: ProjectId, tasks: Vec<Task>) -> Self {
        Self { project_id, tasks }
    }

    /// Empty plan for a project
    #[inline]
    #[must_use]
    pub fn empty(project_id: ProjectId) -> Self {
        Self::new(project_id, Vec::new())
    }

    /// Whether the plan has no tasks
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Rewrite stage output: the entire resulting file, never a diff
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    /// Full content of the file after the change
    pub updated_content: String,
    /// Short explanation of what was done
    pub explanation: String,
}

/// Outcome of one end-to-end run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Whether every task completed and the audit log was persisted
    pub success: bool,
    /// Files whose content actually changed, by checksum or by being new
    pub changed_files: Vec<FileRecord>,
    /// The plan with final task statuses
    pub final_plan: TaskPlan,
    /// Run identifier
    pub job_id: JobId,
    /// The persisted audit record
    pub audit: AuditLog,
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Generation options for the planning stage
    pub planning: GenerationOptions,
    /// Generation options for the rewrite stage
    pub rewrite: GenerationOptions,
    /// Initial content of placeholder records for creation tasks
    pub placeholder_content: String,
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With planning options
    #[inline]
    #[must_use]
    pub fn with_planning(mut self, options: GenerationOptions) -> Self {
        self.planning = options;
        self
    }

    /// With rewrite options
    #[inline]
    #[must_use]
    pub fn with_rewrite(mut self, options: GenerationOptions) -> Self {
        self.rewrite = options;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            planning: GenerationOptions::new("planner"),
            rewrite: GenerationOptions::new("rewriter").with_temperature(0.3),
            placeholder_content: "// Placeholder: content will be generated".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(project: ProjectId, path: &str, content: &str) -> FileRecord {
        FileRecord::new(project, ProjectPath::from_str(path).unwrap(), content)
    }

    #[test]
    fn job_id_generation() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    #[test]
    fn task_builder_starts_pending() {
        let task = Task::new(
            "add login",
            "add a login form",
            ProjectPath::from_str("src/login.ts").unwrap(),
        )
        .with_complexity(EstimatedComplexity::Medium);

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.estimated_complexity, Some(EstimatedComplexity::Medium));
        assert!(task.target_file_id.is_none());
    }

    #[test]
    fn context_rejects_empty_request() {
        let context = AgentContext::new(ProjectId::new(), "  ", "summary", vec![]);
        assert!(matches!(
            context.validate(),
            Err(ContextError::EmptyRequest)
        ));
    }

    #[test]
    fn context_rejects_duplicate_paths() {
        let project = ProjectId::new();
        let context = AgentContext::new(
            project,
            "change things",
            "summary",
            vec![record(project, "src/a.ts", "x"), record(project, "src/a.ts", "y")],
        );
        assert!(matches!(
            context.validate(),
            Err(ContextError::DuplicatePath(_))
        ));
    }

    #[test]
    fn context_rejects_foreign_files() {
        let project = ProjectId::new();
        let context = AgentContext::new(
            project,
            "change things",
            "summary",
            vec![record(ProjectId::new(), "src/a.ts", "x")],
        );
        assert!(matches!(
            context.validate(),
            Err(ContextError::ForeignFile { .. })
        ));
    }

    #[test]
    fn context_resolves_by_path() {
        let project = ProjectId::new();
        let file = record(project, "src/a.ts", "x");
        let context =
            AgentContext::new(project, "change things", "summary", vec![file.clone()]);

        let path = ProjectPath::from_str("src/a.ts").unwrap();
        assert_eq!(context.file_by_path(&path).map(|f| f.id), Some(file.id));
    }

    #[test]
    fn default_config_uses_low_rewrite_temperature() {
        let config = OrchestratorConfig::default();
        assert!(config.rewrite.temperature < config.planning.temperature);
    }
}

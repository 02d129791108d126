//! Run audit log
//!
//! Every run writes a structured record keyed by job id, at least twice:
//! once at start and once at the end, overwriting idempotently. The
//! record is what makes a run reconstructable after the fact, including
//! failed ones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use taskweave_file::{FileRecord, ProjectId};
use taskweave_genai::FieldError;

use crate::error::AgentError;
use crate::types::{JobId, TaskPlan};

/// Final outcome of a run as recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalStatus {
    /// All tasks completed
    Success,
    /// A task failed and halted the plan
    Failed,
    /// The planner returned zero tasks; a valid no-op run
    #[serde(rename = "No tasks generated")]
    NoTasksGenerated,
    /// The run aborted outside task execution
    Error,
    /// Still running; only seen in the initial write
    Running,
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FinalStatus::Success => "Success",
            FinalStatus::Failed => "Failed",
            FinalStatus::NoTasksGenerated => "No tasks generated",
            FinalStatus::Error => "Error",
            FinalStatus::Running => "Running",
        };
        f.write_str(s)
    }
}

/// Error details as stored in the audit log
///
/// Schema failures keep the field errors and the raw model payload, so a
/// failed run can be reconstructed down to what the model actually
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditErrorRecord {
    /// Rendered error chain
    pub message: String,
    /// Field-level schema violations, empty for other failures
    #[serde(default)]
    pub field_errors: Vec<FieldError>,
    /// The offending raw model output, for schema failures
    pub raw_output: Option<Value>,
}

impl From<&AgentError> for AuditErrorRecord {
    fn from(error: &AgentError) -> Self {
        match error {
            AgentError::SchemaValidation(e) => Self {
                message: error.to_string(),
                field_errors: e.errors.clone(),
                raw_output: Some(e.raw.clone()),
            },
            _ => Self {
                message: error.to_string(),
                field_errors: Vec::new(),
                raw_output: None,
            },
        }
    }
}

/// Structured record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Run identifier
    pub job_id: JobId,
    /// Project the run targeted
    pub project_id: ProjectId,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time, absent while running
    pub finished_at: Option<DateTime<Utc>>,
    /// Outcome
    pub status: FinalStatus,
    /// The plan as the planning stage produced it; set once, never
    /// touched by execution
    pub initial_plan: Option<TaskPlan>,
    /// The plan with statuses and resolved ids after execution
    pub final_plan: Option<TaskPlan>,
    /// Files whose content actually changed
    pub changed_files: Vec<FileRecord>,
    /// Error details on failure
    pub error: Option<AuditErrorRecord>,
}

impl AuditLog {
    /// Record for a run that just started
    #[must_use]
    pub fn started(job_id: JobId, project_id: ProjectId) -> Self {
        Self {
            job_id,
            project_id,
            started_at: Utc::now(),
            finished_at: None,
            status: FinalStatus::Running,
            initial_plan: None,
            final_plan: None,
            changed_files: Vec::new(),
            error: None,
        }
    }

    /// Mark the run finished with an outcome
    pub fn finish(&mut self, status: FinalStatus, changed_files: Vec<FileRecord>) {
        self.finished_at = Some(Utc::now());
        self.status = status;
        self.changed_files = changed_files;
    }

    /// Record the error that ended the run
    pub fn record_error(&mut self, error: &AgentError) {
        self.error = Some(AuditErrorRecord::from(error));
    }
}

/// Errors from an audit sink
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Writing the record failed
    #[error("audit write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the record failed
    #[error("audit serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Audit log persistence boundary
///
/// Writes are keyed by job id and idempotently overwritable; the
/// orchestrator calls this at least twice per run.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist the record, replacing any previous write for its job id
    ///
    /// # Errors
    /// Returns [`AuditError`] when the record cannot be persisted.
    async fn write(&self, log: &AuditLog) -> Result<(), AuditError>;
}

/// In-memory audit sink for tests and embedders
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<HashMap<JobId, AuditLog>>,
}

impl MemoryAuditSink {
    /// Create an empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest record written for a job
    #[must_use]
    pub fn record(&self, job_id: JobId) -> Option<AuditLog> {
        self.records
            .lock()
            .ok()
            .and_then(|guard| guard.get(&job_id).cloned())
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn write(&self, log: &AuditLog) -> Result<(), AuditError> {
        self.records
            .lock()
            .map_err(|_| {
                AuditError::Io(std::io::Error::other("audit sink lock poisoned"))
            })?
            .insert(log.job_id, log.clone());
        Ok(())
    }
}

/// Filesystem audit sink
///
/// Writes `agent-data.json` under `projects/<project>/jobs/<job>/`,
/// creating directories as needed. Overwrites on rewrite of the same
/// job id.
#[derive(Debug, Clone)]
pub struct FsAuditSink {
    root: PathBuf,
}

impl FsAuditSink {
    /// Sink rooted at a directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the record file for a run
    #[must_use]
    pub fn record_path(&self, project_id: ProjectId, job_id: JobId) -> PathBuf {
        self.root
            .join("projects")
            .join(project_id.to_string())
            .join("jobs")
            .join(job_id.to_string())
            .join("agent-data.json")
    }
}

#[async_trait]
impl AuditSink for FsAuditSink {
    async fn write(&self, log: &AuditLog) -> Result<(), AuditError> {
        let path = self.record_path(log.project_id, log.job_id);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let bytes = serde_json::to_vec_pretty(log)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskweave_genai::SchemaValidationError;

    fn log() -> AuditLog {
        AuditLog::started(JobId::new(), ProjectId::new())
    }

    #[test]
    fn final_status_serializes_original_labels() {
        let json = serde_json::to_string(&FinalStatus::NoTasksGenerated).unwrap();
        assert_eq!(json, "\"No tasks generated\"");
        let json = serde_json::to_string(&FinalStatus::Success).unwrap();
        assert_eq!(json, "\"Success\"");
    }

    #[test]
    fn finish_stamps_end_time_and_status() {
        let mut log = log();
        assert!(log.finished_at.is_none());
        log.finish(FinalStatus::Success, Vec::new());
        assert!(log.finished_at.is_some());
        assert_eq!(log.status, FinalStatus::Success);
    }

    #[test]
    fn schema_failure_keeps_field_errors_and_raw_payload() {
        let mut log = log();
        let raw = json!({ "updatedContent": "y" });
        log.record_error(&AgentError::SchemaValidation(SchemaValidationError {
            type_name: "RewriteResult",
            raw: raw.clone(),
            errors: vec![FieldError {
                pointer: String::new(),
                message: "\"explanation\" is a required property".to_string(),
            }],
        }));

        let record = log.error.unwrap();
        assert_eq!(record.raw_output, Some(raw));
        assert_eq!(record.field_errors.len(), 1);
        assert!(record.message.contains("schema validation failed"));
    }

    #[test]
    fn non_schema_failure_has_message_only() {
        let mut log = log();
        log.record_error(&AgentError::Generation("model down".to_string()));

        let record = log.error.unwrap();
        assert_eq!(record.message, "generation failed: model down");
        assert!(record.field_errors.is_empty());
        assert!(record.raw_output.is_none());
    }

    #[tokio::test]
    async fn memory_sink_overwrites_by_job_id() {
        let sink = MemoryAuditSink::new();
        let mut log = log();
        sink.write(&log).await.unwrap();
        assert_eq!(
            sink.record(log.job_id).unwrap().status,
            FinalStatus::Running
        );

        log.finish(FinalStatus::Failed, Vec::new());
        log.record_error(&AgentError::Generation("boom".to_string()));
        sink.write(&log).await.unwrap();

        let stored = sink.record(log.job_id).unwrap();
        assert_eq!(stored.status, FinalStatus::Failed);
        assert!(stored.error.unwrap().message.contains("boom"));
    }

    #[tokio::test]
    async fn fs_sink_writes_per_job_layout() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsAuditSink::new(dir.path());
        let log = log();

        sink.write(&log).await.unwrap();

        let path = sink.record_path(log.project_id, log.job_id);
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let decoded: AuditLog = serde_json::from_str(&contents).unwrap();
        assert_eq!(decoded.job_id, log.job_id);
    }
}

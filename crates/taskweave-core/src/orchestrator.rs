//! Run orchestrator
//!
//! The top-level entry point for one run: validate the context, plan,
//! execute, diff against the pre-run snapshot, and persist the audit
//! log. The boundary never propagates an error to its caller; every
//! failure becomes a `success: false` result with partial progress and
//! an audit record.

use std::collections::HashMap;
use std::sync::Arc;
use taskweave_file::{Checksum, FileId, FileRecord, FileStorage};
use taskweave_genai::GenerationClient;
use tracing::{info, warn};

use crate::audit::{AuditLog, AuditSink, FinalStatus};
use crate::error::AgentError;
use crate::executor::{execute_plan, FileState};
use crate::planner::run_planning;
use crate::types::{AgentContext, JobId, OrchestratorConfig, RunResult, TaskPlan};

/// Checksums of the pre-run snapshot, the diff baseline
type Baseline = HashMap<FileId, Checksum>;

/// Planning-and-rewrite orchestrator
pub struct Orchestrator {
    client: Arc<dyn GenerationClient>,
    storage: Arc<dyn FileStorage>,
    audit: Arc<dyn AuditSink>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator with default configuration
    #[must_use]
    pub fn new(
        client: Arc<dyn GenerationClient>,
        storage: Arc<dyn FileStorage>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            client,
            storage,
            audit,
            config: OrchestratorConfig::default(),
        }
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute one run end to end
    ///
    /// Never returns an error: context validation failure, planning
    /// failure, task failure and audit-sink failure all fold into
    /// `success: false` on the [`RunResult`], with whatever files did
    /// change before the failure still reported.
    pub async fn run(&self, context: AgentContext) -> RunResult {
        let job_id = JobId::new();
        let mut log = AuditLog::started(job_id, context.project_id);
        info!(job = %job_id, project = %context.project_id, "run started");
        let mut sink_ok = self.write_audit(&log).await;

        if let Err(e) = context.validate() {
            let err = AgentError::from(e);
            warn!(job = %job_id, error = %err, "context rejected");
            return self
                .finish_aborted(log, TaskPlan::empty(context.project_id), err)
                .await;
        }

        // Pre-run snapshot: the diff baseline and the executor's working copy.
        let baseline: Baseline = context.files.iter().map(|f| (f.id, f.checksum)).collect();
        let files: FileState = context.files.iter().map(|f| (f.id, f.clone())).collect();

        let plan = match run_planning(&*self.client, &context, &self.config.planning).await {
            Ok(plan) => plan,
            Err(e) => {
                return self
                    .finish_aborted(log, TaskPlan::empty(context.project_id), e)
                    .await;
            }
        };
        log.initial_plan = Some(plan.clone());
        sink_ok &= self.write_audit(&log).await;

        if plan.is_empty() {
            // A no-op run is a valid, successful outcome.
            info!(job = %job_id, "planner returned no tasks");
            log.final_plan = Some(plan.clone());
            log.finish(FinalStatus::NoTasksGenerated, Vec::new());
            sink_ok &= self.write_audit(&log).await;
            return self.result(sink_ok, Vec::new(), plan, job_id, log);
        }

        let outcome = execute_plan(&*self.client, &*self.storage, &self.config, plan, files).await;
        let changed = changed_files(&baseline, &outcome.files);

        if let Some(e) = &outcome.error {
            log.record_error(e);
        }
        log.final_plan = Some(outcome.plan.clone());
        let status = if outcome.success {
            FinalStatus::Success
        } else {
            FinalStatus::Failed
        };
        log.finish(status, changed.clone());
        sink_ok &= self.write_audit(&log).await;

        info!(
            job = %job_id,
            success = outcome.success,
            changed = changed.len(),
            "run finished"
        );
        self.result(
            outcome.success && sink_ok,
            changed,
            outcome.plan,
            job_id,
            log,
        )
    }

    /// End a run that failed before any task executed
    async fn finish_aborted(
        &self,
        mut log: AuditLog,
        plan: TaskPlan,
        error: AgentError,
    ) -> RunResult {
        log.record_error(&error);
        log.finish(FinalStatus::Error, Vec::new());
        // The run already failed; a sink failure here changes nothing.
        let _ = self.write_audit(&log).await;
        let job_id = log.job_id;
        self.result(false, Vec::new(), plan, job_id, log)
    }

    /// Assemble the run result
    fn result(
        &self,
        success: bool,
        changed_files: Vec<FileRecord>,
        final_plan: TaskPlan,
        job_id: JobId,
        audit: AuditLog,
    ) -> RunResult {
        RunResult {
            success,
            changed_files,
            final_plan,
            job_id,
            audit,
        }
    }

    /// Write the audit record, demoting failures to a warning
    async fn write_audit(&self, log: &AuditLog) -> bool {
        match self.audit.write(log).await {
            Ok(()) => true,
            Err(e) => {
                warn!(job = %log.job_id, error = %e, "audit write failed");
                false
            }
        }
    }
}

/// Files whose checksum differs from the baseline, or that are new
///
/// This is the only authoritative signal of change: a file that was
/// rewritten to identical content is excluded.
fn changed_files(baseline: &Baseline, files: &FileState) -> Vec<FileRecord> {
    files
        .values()
        .filter(|f| baseline.get(&f.id) != Some(&f.checksum))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use serde_json::json;
    use taskweave_file::{InMemoryFileStorage, ProjectId};
    use taskweave_test_utils::ScriptedClient;

    fn orchestrator(client: Arc<ScriptedClient>) -> (Orchestrator, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let orchestrator = Orchestrator::new(
            client,
            Arc::new(InMemoryFileStorage::new()),
            audit.clone(),
        );
        (orchestrator, audit)
    }

    #[tokio::test]
    async fn empty_plan_is_a_successful_no_op() {
        let client = Arc::new(ScriptedClient::new());
        client.push_ok(json!({ "tasks": [] }));
        let (orchestrator, audit) = orchestrator(client);

        let context = AgentContext::new(ProjectId::new(), "do nothing", "summary", vec![]);
        let result = orchestrator.run(context).await;

        assert!(result.success);
        assert!(result.changed_files.is_empty());
        assert!(result.final_plan.is_empty());
        let record = audit.record(result.job_id).unwrap();
        assert_eq!(record.status, FinalStatus::NoTasksGenerated);
        assert!(record.initial_plan.is_some());
        assert!(record.finished_at.is_some());
    }

    #[tokio::test]
    async fn invalid_context_fails_without_planning() {
        // No scripted responses: reaching the planner would error the
        // script, not return a clean validation failure.
        let client = Arc::new(ScriptedClient::new());
        let (orchestrator, audit) = orchestrator(client);

        let context = AgentContext::new(ProjectId::new(), "", "summary", vec![]);
        let result = orchestrator.run(context).await;

        assert!(!result.success);
        assert!(result.changed_files.is_empty());
        let record = audit.record(result.job_id).unwrap();
        assert_eq!(record.status, FinalStatus::Error);
        assert!(record
            .error
            .unwrap()
            .message
            .contains("user request is empty"));
    }

    #[tokio::test]
    async fn planning_failure_is_folded_into_the_result() {
        let client = Arc::new(ScriptedClient::new());
        client.push_err("model down");
        let (orchestrator, audit) = orchestrator(client);

        let context = AgentContext::new(ProjectId::new(), "change things", "summary", vec![]);
        let result = orchestrator.run(context).await;

        assert!(!result.success);
        let record = audit.record(result.job_id).unwrap();
        assert_eq!(record.status, FinalStatus::Error);
        assert!(record.error.unwrap().message.contains("model down"));
    }
}

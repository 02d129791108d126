//! Testing utilities for the TaskWeave workspace
//!
//! Scripted generation clients and file fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use taskweave_file::{FileRecord, ProjectId, ProjectPath};
use taskweave_genai::{GenerationClient, GenerationError, GenerationRequest};

/// Generation client that replays a scripted queue of responses
///
/// Each `generate` call pops the next scripted entry; an exhausted
/// script fails the call, which catches tests that make more generation
/// calls than they meant to.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<Value, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Err(message.into()));
    }

    /// Requests seen so far, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(GenerationError::RequestFailed(message)),
            None => Err(GenerationError::RequestFailed(
                "scripted client exhausted".to_string(),
            )),
        }
    }
}

pub fn file_record(project: ProjectId, path: &str, content: &str) -> FileRecord {
    FileRecord::new(project, path.parse::<ProjectPath>().unwrap(), content)
}

/// JSON payload shaped like a rewrite-stage response
pub fn rewrite_value(updated_content: &str, explanation: &str) -> Value {
    json!({
        "updatedContent": updated_content,
        "explanation": explanation,
    })
}

/// JSON payload shaped like one planned task
pub fn plan_task_value(title: &str, target_file_path: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} in {target_file_path}"),
        "targetFilePath": target_file_path,
    })
}

/// JSON payload shaped like a planning-stage response
pub fn plan_value(project: ProjectId, tasks: Vec<Value>) -> Value {
    json!({
        "projectId": project.to_string(),
        "tasks": tasks,
    })
}

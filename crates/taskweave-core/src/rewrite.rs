//! Rewrite stage
//!
//! Executes a single task against the generation service: the model is
//! asked for the *entire* resulting file plus a short explanation, never
//! a diff. Pure request/response; the caller owns all file-state
//! mutation.

use std::fmt::Write as _;
use taskweave_genai::{
    generate_structured, response_schema, GenerationClient, GenerationOptions, GenerationRequest,
};
use tracing::debug;

use crate::error::AgentError;
use crate::types::{RewriteResult, Task};

/// System instruction, with the verb matching creation vs modification
fn rewrite_system_instruction(is_creation: bool) -> String {
    let verb = if is_creation { "Create" } else { "Update" };
    format!(
        "You are an expert coding assistant. {verb} the file described by the task. \
         Respond with the complete final content of the file and a short explanation \
         of the change. Never respond with a diff, a patch, or a partial file."
    )
}

/// Build the rewrite prompt for one task
fn build_rewrite_prompt(task: &Task, current_content: Option<&str>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "## Task\n{}\n", task.title);
    let _ = writeln!(prompt, "{}\n", task.description);
    let _ = writeln!(prompt, "Target file: {}", task.target_file_path);
    match current_content {
        Some(content) => {
            let _ = writeln!(
                prompt,
                "\n## Current Content\n```\n{content}\n```\n\nEmit the entire updated file."
            );
        }
        None => {
            let _ = writeln!(
                prompt,
                "\nThis file does not exist yet. Emit its entire initial content."
            );
        }
    }
    prompt
}

/// Run the rewrite stage for one task
///
/// `current_content` is `None` for creation tasks. No side effects;
/// folding the result into file state is the executor's job.
///
/// # Errors
/// Returns [`AgentError::SchemaValidation`] when the model output does
/// not match the rewrite schema, or [`AgentError::Generation`] when the
/// service call fails.
pub async fn run_rewrite(
    client: &dyn GenerationClient,
    task: &Task,
    current_content: Option<&str>,
    options: &GenerationOptions,
) -> Result<RewriteResult, AgentError> {
    let is_creation = current_content.is_none();
    let request = GenerationRequest::new(
        build_rewrite_prompt(task, current_content),
        rewrite_system_instruction(is_creation),
        response_schema::<RewriteResult>(),
        options.clone(),
    );

    debug!(task = %task.id, path = %task.target_file_path, is_creation, "requesting rewrite");
    let result: RewriteResult = generate_structured(client, &request).await?;
    Ok(result)
}

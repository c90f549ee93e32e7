use async_trait::async_trait;
use graph_flow::{Context, NextAction, Task, TaskResult};
use tracing::{info, warn};

use super::types::{PipelineStage, session_keys};
use crate::models::{GroundedRequest, ToolKind, ValidationError};
use crate::synthesis::VALIDATION_FAILED_ANSWER;
use crate::validation::validate_request;

/// Validates the request and records the tools to run.
///
/// Always continues; the graph branches on whether errors were recorded.
pub struct ValidateRequestTask;

#[async_trait]
impl Task for ValidateRequestTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let request: GroundedRequest = context.require(session_keys::REQUEST).await?;
        info!(
            stage = %PipelineStage::Validating,
            tool_count = request.required_tools.len(),
            language = request.language.as_deref().unwrap_or("unspecified"),
            "Validating grounded request"
        );

        let errors = validate_request(&request);
        let tools = ToolKind::parse_all(&request.required_tools);

        if !errors.is_empty() {
            warn!(error_count = errors.len(), "Request failed validation");
        }

        context.set(session_keys::VALIDATION_ERRORS, &errors).await?;
        context.set(session_keys::TOOLS, &tools).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::Continue,
            Some(PipelineStage::Validating.to_string()),
        ))
    }
}

/// Terminal state for requests that failed validation
pub struct RejectRequestTask;

#[async_trait]
impl Task for RejectRequestTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let errors: Vec<ValidationError> = context
            .get(session_keys::VALIDATION_ERRORS)
            .await
            .unwrap_or_default();
        info!(
            stage = %PipelineStage::DoneInvalid,
            error_count = errors.len(),
            "Rejecting request"
        );

        context
            .set(session_keys::ANSWER, VALIDATION_FAILED_ANSWER)
            .await?;

        Ok(TaskResult::new_with_status(
            Some(VALIDATION_FAILED_ANSWER.to_string()),
            NextAction::End,
            Some(PipelineStage::DoneInvalid.to_string()),
        ))
    }
}

/// Edge condition: true when validation recorded at least one error
pub fn has_validation_errors(context: &Context) -> bool {
    context
        .get_sync::<Vec<ValidationError>>(session_keys::VALIDATION_ERRORS)
        .is_some_and(|errors| !errors.is_empty())
}

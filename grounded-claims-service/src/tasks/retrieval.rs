use async_trait::async_trait;
use graph_flow::{Context, NextAction, Task, TaskResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::types::{PipelineStage, session_keys};
use crate::facts::{FactStore, retrieve_with_timeout};
use crate::models::GroundedRequest;

/// Pulls facts for the request context out of the fact store
pub struct RetrieveFactsTask {
    store: Arc<dyn FactStore>,
    timeout: Duration,
}

impl RetrieveFactsTask {
    pub fn new(store: Arc<dyn FactStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

#[async_trait]
impl Task for RetrieveFactsTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let request: GroundedRequest = context.require(session_keys::REQUEST).await?;

        let facts =
            retrieve_with_timeout(self.store.as_ref(), &request.graph_context, self.timeout).await;
        info!(
            stage = %PipelineStage::Retrieving,
            fact_count = facts.len(),
            "Retrieved facts"
        );

        context.set(session_keys::FACTS, &facts).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::Continue,
            Some(PipelineStage::Retrieving.to_string()),
        ))
    }
}

use async_trait::async_trait;
use graph_flow::{Context, NextAction, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::types::{PipelineStage, session_keys};
use crate::models::{FactReference, GroundedRequest, ToolKind};
use crate::tools::{Calculators, ToolInputs};

/// Runs the requested calculation tools against the retrieved facts
pub struct RunCalculationsTask {
    calculators: Arc<Calculators>,
}

impl RunCalculationsTask {
    pub fn new(calculators: Arc<Calculators>) -> Self {
        Self { calculators }
    }
}

#[async_trait]
impl Task for RunCalculationsTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let request: GroundedRequest = context.require(session_keys::REQUEST).await?;
        let tools: Vec<ToolKind> = context.require(session_keys::TOOLS).await?;
        let facts: Vec<FactReference> = context.require(session_keys::FACTS).await?;

        let inputs = ToolInputs {
            facts: &facts,
            request: &request,
        };
        let calculations = self.calculators.dispatch(&tools, &inputs);
        info!(
            stage = %PipelineStage::Calculating,
            calculation_count = calculations.len(),
            "Ran calculation tools"
        );

        context.set(session_keys::CALCULATIONS, &calculations).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::Continue,
            Some(PipelineStage::Calculating.to_string()),
        ))
    }
}

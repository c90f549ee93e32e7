//! Grounded reasoning pipeline.
//!
//! The run is a graph of tasks sharing one [`Context`]:
//!
//! ```text
//! validate ──(errors)──▶ reject
//!     │
//!     ▼
//! retrieve ─▶ calculate ─▶ check missing ─▶ score ─▶ synthesize
//! ```

use graph_flow::{Context, Graph, GraphBuilder, Task};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::error::PipelineError;
use crate::facts::FactStore;
use crate::models::{GroundedRequest, GroundedResponse};
use crate::tables::ReasoningTables;
use crate::tasks::{
    CheckMissingInfoTask, RejectRequestTask, RetrieveFactsTask, RunCalculationsTask,
    ScoreConfidenceTask, SynthesizeAnswerTask, ValidateRequestTask, has_validation_errors,
    session_keys,
};
use crate::tools::Calculators;

pub fn build_grounded_workflow(
    calculators: Arc<Calculators>,
    store: Arc<dyn FactStore>,
    fact_timeout: Duration,
) -> Graph {
    let validate_task = Arc::new(ValidateRequestTask);
    let validate_id = validate_task.id().to_string();

    let reject_task = Arc::new(RejectRequestTask);
    let reject_id = reject_task.id().to_string();

    let retrieve_task = Arc::new(RetrieveFactsTask::new(store, fact_timeout));
    let retrieve_id = retrieve_task.id().to_string();

    let calculate_task = Arc::new(RunCalculationsTask::new(calculators));
    let calculate_id = calculate_task.id().to_string();

    let missing_task = Arc::new(CheckMissingInfoTask);
    let missing_id = missing_task.id().to_string();

    let score_task = Arc::new(ScoreConfidenceTask);
    let score_id = score_task.id().to_string();

    let synthesize_task = Arc::new(SynthesizeAnswerTask);
    let synthesize_id = synthesize_task.id().to_string();

    GraphBuilder::new("grounded_claims")
        .add_task(validate_task)
        .add_task(reject_task)
        .add_task(retrieve_task)
        .add_task(calculate_task)
        .add_task(missing_task)
        .add_task(score_task)
        .add_task(synthesize_task)
        .add_conditional_edge(&validate_id, has_validation_errors, &reject_id, &retrieve_id)
        .add_edge(&retrieve_id, &calculate_id)
        .add_edge(&calculate_id, &missing_id)
        .add_edge(&missing_id, &score_id)
        .add_edge(&score_id, &synthesize_id)
        .build()
}

/// Runs grounded requests through the task graph. Cheap to clone.
#[derive(Clone)]
pub struct GroundedPipeline {
    graph: Arc<Graph>,
}

impl GroundedPipeline {
    pub fn new(
        calculators: Arc<Calculators>,
        store: Arc<dyn FactStore>,
        fact_timeout: Duration,
    ) -> Self {
        Self {
            graph: Arc::new(build_grounded_workflow(calculators, store, fact_timeout)),
        }
    }

    /// Pipeline over the given tables, reading facts from `store`
    pub fn with_tables(
        tables: Arc<ReasoningTables>,
        store: Arc<dyn FactStore>,
        fact_timeout: Duration,
    ) -> Self {
        Self::new(Arc::new(Calculators::new(tables)), store, fact_timeout)
    }

    pub async fn process(&self, request: GroundedRequest) -> Result<GroundedResponse, PipelineError> {
        let started = Instant::now();

        let context = Context::new();
        context.set(session_keys::REQUEST, &request).await?;

        let outcome = self.graph.execute(context.clone()).await?;

        let response = GroundedResponse {
            answer: context.require(session_keys::ANSWER).await?,
            facts_used: context.get(session_keys::FACTS).await.unwrap_or_default(),
            calculations_performed: context
                .get(session_keys::CALCULATIONS)
                .await
                .unwrap_or_default(),
            follow_up_needed: context.contains(session_keys::FOLLOW_UP_QUESTION),
            follow_up_question: context.get(session_keys::FOLLOW_UP_QUESTION).await,
            confidence_level: context.get(session_keys::CONFIDENCE).await.unwrap_or(0.0),
            processing_time: u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX),
            validation_errors: context
                .get(session_keys::VALIDATION_ERRORS)
                .await
                .unwrap_or_default(),
        };

        info!(
            final_stage = outcome.status_message.as_deref().unwrap_or("unknown"),
            steps = outcome.visited.len(),
            fact_count = response.facts_used.len(),
            calculation_count = response.calculations_performed.len(),
            follow_up_needed = response.follow_up_needed,
            processing_time_ns = response.processing_time,
            "Grounded request processed"
        );

        Ok(response)
    }
}

use async_trait::async_trait;
use graph_flow::{Context, NextAction, Task, TaskResult};
use tracing::info;

use super::types::{PipelineStage, session_keys};
use crate::confidence;
use crate::missing_info::{find_missing, follow_up_question};
use crate::models::{CalculationReference, FactReference, ToolKind};
use crate::synthesis::synthesize;

pub struct CheckMissingInfoTask;

#[async_trait]
impl Task for CheckMissingInfoTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let tools: Vec<ToolKind> = context.require(session_keys::TOOLS).await?;
        let facts: Vec<FactReference> = context.require(session_keys::FACTS).await?;

        let missing = find_missing(&tools, &facts);
        info!(
            stage = %PipelineStage::CheckingMissing,
            missing = ?missing,
            "Checked prerequisite facts"
        );

        if let Some(question) = follow_up_question(&missing) {
            context.set(session_keys::FOLLOW_UP_QUESTION, question).await?;
        }
        context.set(session_keys::MISSING_INFO, &missing).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::Continue,
            Some(PipelineStage::CheckingMissing.to_string()),
        ))
    }
}

pub struct ScoreConfidenceTask;

#[async_trait]
impl Task for ScoreConfidenceTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let facts: Vec<FactReference> = context.require(session_keys::FACTS).await?;
        let calculations: Vec<CalculationReference> =
            context.require(session_keys::CALCULATIONS).await?;

        let score = confidence::aggregate(&facts, &calculations);
        info!(stage = %PipelineStage::Scoring, confidence = score, "Scored answer confidence");

        context.set(session_keys::CONFIDENCE, score).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::Continue,
            Some(PipelineStage::Scoring.to_string()),
        ))
    }
}

/// Renders the cited answer and ends the run
pub struct SynthesizeAnswerTask;

#[async_trait]
impl Task for SynthesizeAnswerTask {
    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let facts: Vec<FactReference> = context.require(session_keys::FACTS).await?;
        let calculations: Vec<CalculationReference> =
            context.require(session_keys::CALCULATIONS).await?;

        let answer = synthesize(&facts, &calculations);
        info!(
            stage = %PipelineStage::Synthesizing,
            answer_length = answer.len(),
            "Synthesized grounded answer"
        );

        context.set(session_keys::ANSWER, &answer).await?;

        Ok(TaskResult::new_with_status(
            Some(answer),
            NextAction::End,
            Some(PipelineStage::Done.to_string()),
        ))
    }
}

use thiserror::Error;

/// Errors raised while building or executing a task graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Graph '{0}' has no start task")]
    NoStartTask(String),

    #[error("Graph exceeded the step limit of {0} tasks")]
    StepLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, GraphError>;

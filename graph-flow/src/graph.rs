use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{
    context::Context,
    error::{GraphError, Result},
    task::{NextAction, Task, TaskResult},
};

/// Type alias for edge condition functions
pub type EdgeCondition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Upper bound on tasks executed by a single run, guards against cycles
pub const DEFAULT_MAX_STEPS: usize = 64;

/// Edge between tasks in the graph
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub condition: Option<EdgeCondition>,
}

/// An immutable graph of tasks.
///
/// Built once through [`GraphBuilder`] and then shared (usually behind an
/// `Arc`) by every execution; all per-run state lives in the [`Context`].
pub struct Graph {
    pub id: String,
    tasks: HashMap<String, Arc<dyn Task>>,
    edges: Vec<Edge>,
    start_task_id: Option<String>,
    max_steps: usize,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: HashMap::new(),
            edges: Vec::new(),
            start_task_id: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Run the graph from its start task until a task ends the run or no
    /// outgoing edge matches.
    pub async fn execute(&self, context: Context) -> Result<ExecutionResult> {
        let start = self
            .start_task_id
            .clone()
            .ok_or_else(|| GraphError::NoStartTask(self.id.clone()))?;
        self.execute_from(&start, context).await
    }

    /// Run the graph starting from a specific task
    pub async fn execute_from(&self, task_id: &str, context: Context) -> Result<ExecutionResult> {
        let mut visited = Vec::new();
        let mut current = task_id.to_string();

        loop {
            if visited.len() >= self.max_steps {
                return Err(GraphError::StepLimitExceeded(self.max_steps));
            }

            let result = self.execute_single_task(&current, context.clone()).await?;
            visited.push(result.task_id.clone());

            let next = match &result.next_action {
                NextAction::End => None,
                NextAction::Continue => self.find_next_task(&current, &context),
                NextAction::GoTo(target) => {
                    if !self.tasks.contains_key(target) {
                        return Err(GraphError::TaskNotFound(target.clone()));
                    }
                    Some(target.clone())
                }
            };

            match next {
                Some(next_task_id) => {
                    debug!(graph = %self.id, from = %current, to = %next_task_id, "following edge");
                    current = next_task_id;
                }
                None => {
                    let status = if result.next_action == NextAction::End {
                        ExecutionStatus::Completed
                    } else {
                        ExecutionStatus::Exhausted
                    };
                    return Ok(ExecutionResult {
                        response: result.response,
                        status_message: result.status_message,
                        visited,
                        status,
                    });
                }
            }
        }
    }

    /// Execute a single task without following its next action
    async fn execute_single_task(&self, task_id: &str, context: Context) -> Result<TaskResult> {
        let task = self
            .tasks
            .get(task_id)
            .ok_or_else(|| GraphError::TaskNotFound(task_id.to_string()))?;

        let mut result = task.run(context).await?;
        result.task_id = task_id.to_string();

        Ok(result)
    }

    /// Find the next task based on edges and conditions.
    ///
    /// Edges are checked in insertion order; the first unconditional edge or
    /// the first conditional edge whose condition holds wins.
    pub fn find_next_task(&self, current_task_id: &str, context: &Context) -> Option<String> {
        self.edges
            .iter()
            .filter(|edge| edge.from == current_task_id)
            .find(|edge| match &edge.condition {
                Some(condition) => condition(context),
                None => true,
            })
            .map(|edge| edge.to.clone())
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
        }
    }

    /// Add a task; the first task added becomes the start task
    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        let task_id = task.id().to_string();
        if self.graph.start_task_id.is_none() {
            self.graph.start_task_id = Some(task_id.clone());
        }
        self.graph.tasks.insert(task_id, task);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            condition: None,
        });
        self
    }

    /// Branch from `from` to `yes` when `condition` holds, otherwise to `no`
    pub fn add_conditional_edge<F>(
        mut self,
        from: impl Into<String>,
        condition: F,
        yes: impl Into<String>,
        no: impl Into<String>,
    ) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        let from = from.into();
        self.graph.edges.push(Edge {
            from: from.clone(),
            to: yes.into(),
            condition: Some(Arc::new(condition)),
        });
        self.graph.edges.push(Edge {
            from,
            to: no.into(),
            condition: None,
        });
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.graph.max_steps = max_steps;
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Outcome of a graph run
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Response of the last task executed
    pub response: Option<String>,
    pub status_message: Option<String>,
    /// Task ids in execution order
    pub visited: Vec<String>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// A task ended the run explicitly
    Completed,
    /// The run stopped because no outgoing edge matched
    Exhausted,
}

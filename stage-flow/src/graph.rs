use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    context::Context,
    error::{FlowError, Result},
    session::Session,
    task::{NextAction, Task, TaskResult},
};

/// Edge between tasks in the graph
#[derive(Clone, Debug)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A graph of tasks that can be executed
pub struct Graph {
    pub id: String,
    tasks: DashMap<String, Arc<dyn Task>>,
    edges: Vec<Edge>,
    start_task_id: Option<String>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: DashMap::new(),
            edges: Vec::new(),
            start_task_id: None,
        }
    }

    /// Add a task to the graph. The first task added becomes the start task.
    pub fn add_task(&mut self, task: Arc<dyn Task>) -> &mut Self {
        let task_id = task.id().to_string();
        if self.start_task_id.is_none() {
            self.start_task_id = Some(task_id.clone());
        }
        self.tasks.insert(task_id, task);
        self
    }

    /// Add an edge between tasks
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Execute the session's current task, following `ContinueAndExecute`
    /// until a task ends the graph or hands control back.
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        loop {
            let result = self
                .execute_single_task(&session.current_task_id, session.context.clone())
                .await?;

            if result.status_message.is_some() {
                session.status_message = result.status_message.clone();
            }

            match result.next_action {
                NextAction::End => {
                    session.current_task_id = result.task_id;
                    return Ok(ExecutionResult {
                        response: result.response,
                        status: ExecutionStatus::Completed,
                    });
                }
                NextAction::Continue => {
                    if let Some(next) = self.find_next_task(&result.task_id) {
                        session.current_task_id = next;
                    }
                    return Ok(ExecutionResult {
                        response: result.response,
                        status: ExecutionStatus::Paused,
                    });
                }
                NextAction::ContinueAndExecute => match self.find_next_task(&result.task_id) {
                    Some(next) => {
                        debug!(graph = %self.id, from = %result.task_id, to = %next, "advancing");
                        session.current_task_id = next;
                    }
                    None => {
                        // Nothing left to run: the chain ends here.
                        session.current_task_id = result.task_id;
                        return Ok(ExecutionResult {
                            response: result.response,
                            status: ExecutionStatus::Completed,
                        });
                    }
                },
            }
        }
    }

    /// Execute a single task without following its next action
    async fn execute_single_task(&self, task_id: &str, context: Context) -> Result<TaskResult> {
        let task = self
            .get_task(task_id)
            .ok_or_else(|| FlowError::TaskNotFound(task_id.to_string()))?;

        let mut result = task.run(context).await?;
        result.task_id = task_id.to_string();

        Ok(result)
    }

    /// Find the next task based on edges
    pub fn find_next_task(&self, current_task_id: &str) -> Option<String> {
        self.edges
            .iter()
            .find(|edge| edge.from == current_task_id)
            .map(|edge| edge.to.clone())
    }

    /// Get the start task ID
    pub fn start_task_id(&self) -> Result<String> {
        self.start_task_id
            .clone()
            .ok_or_else(|| FlowError::GraphNotReady(self.id.clone()))
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(task_id).map(|entry| entry.clone())
    }

    /// Open a new session positioned at the start task
    pub fn new_session(&self, session_id: impl Into<String>) -> Result<Session> {
        let start = self.start_task_id()?;
        Ok(Session::new_from_task(session_id, &start).with_graph(self.id.clone()))
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

    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        self.graph.add_task(task);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.add_edge(from, to);
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Status of graph execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Stopped after a `Continue`; calling again resumes at the next task
    Paused,
    /// The graph reached an `End`
    Completed,
}

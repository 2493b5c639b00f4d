use serde::{Deserialize, Serialize};

use crate::context::Context;

/// Execution state of one walk through a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub graph_id: String,
    pub current_task_id: String,
    pub status_message: Option<String>,
    #[serde(skip)]
    pub context: Context,
}

impl Session {
    pub fn new_from_task(sid: impl Into<String>, task_name: &str) -> Self {
        Self {
            id: sid.into(),
            graph_id: "default".to_string(),
            current_task_id: task_name.to_string(),
            status_message: None,
            context: Context::new(),
        }
    }

    pub fn with_graph(mut self, graph_id: impl Into<String>) -> Self {
        self.graph_id = graph_id.into();
        self
    }
}

pub mod context;
pub mod error;
pub mod graph;
pub mod session;
pub mod task;

// Re-export commonly used types
pub use context::Context;
pub use error::{FlowError, Result};
pub use graph::{ExecutionResult, ExecutionStatus, Graph, GraphBuilder};
pub use session::Session;
pub use task::{NextAction, Task, TaskResult};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AppendTask {
        label: &'static str,
        next: NextAction,
    }

    #[async_trait]
    impl Task for AppendTask {
        fn id(&self) -> &str {
            self.label
        }

        async fn run(&self, context: Context) -> Result<TaskResult> {
            let mut trail: Vec<String> = context.get("trail").await.unwrap_or_default();
            trail.push(self.label.to_string());
            context.set("trail", trail).await?;

            Ok(TaskResult::new_with_status(
                Some(format!("{} done", self.label)),
                self.next.clone(),
                Some(format!("ran {}", self.label)),
            ))
        }
    }

    struct FailingTask;

    #[async_trait]
    impl Task for FailingTask {
        async fn run(&self, _context: Context) -> Result<TaskResult> {
            Err(FlowError::TaskExecutionFailed("boom".to_string()))
        }
    }

    struct SilentTask;

    #[async_trait]
    impl Task for SilentTask {
        fn id(&self) -> &str {
            "silent"
        }

        async fn run(&self, _context: Context) -> Result<TaskResult> {
            Ok(TaskResult::new(None, NextAction::End))
        }
    }

    fn task(label: &'static str, next: NextAction) -> Arc<dyn Task> {
        Arc::new(AppendTask { label, next })
    }

    #[tokio::test]
    async fn test_chained_execution_runs_to_end() {
        let graph = GraphBuilder::new("chain")
            .add_task(task("a", NextAction::ContinueAndExecute))
            .add_task(task("b", NextAction::ContinueAndExecute))
            .add_task(task("c", NextAction::End))
            .add_edge("a", "b")
            .add_edge("b", "c")
            .build();

        let mut session = graph.new_session("s1").unwrap();
        let result = graph.execute_session(&mut session).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.response.as_deref(), Some("c done"));
        assert_eq!(session.current_task_id, "c");
        assert_eq!(session.status_message.as_deref(), Some("ran c"));

        let trail: Vec<String> = session.context.get("trail").await.unwrap();
        assert_eq!(trail, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_continue_pauses_after_one_step() {
        let graph = GraphBuilder::new("stepper")
            .add_task(task("first", NextAction::Continue))
            .add_task(task("second", NextAction::End))
            .add_edge("first", "second")
            .build();

        let mut session = graph.new_session("s2").unwrap();
        let result = graph.execute_session(&mut session).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Paused);
        assert_eq!(session.current_task_id, "second");

        let result = graph.execute_session(&mut session).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn test_task_error_stops_the_chain() {
        let failing: Arc<dyn Task> = Arc::new(FailingTask);
        let failing_id = failing.id().to_string();
        let graph = GraphBuilder::new("failing")
            .add_task(task("a", NextAction::ContinueAndExecute))
            .add_task(failing)
            .add_task(task("c", NextAction::End))
            .add_edge("a", failing_id.clone())
            .add_edge(failing_id.clone(), "c")
            .build();

        let mut session = graph.new_session("s3").unwrap();
        let err = graph.execute_session(&mut session).await.unwrap_err();

        assert!(matches!(err, FlowError::TaskExecutionFailed(_)));
        assert_eq!(session.current_task_id, failing_id);
        let trail: Vec<String> = session.context.get("trail").await.unwrap();
        assert_eq!(trail, vec!["a"]);
    }

    #[tokio::test]
    async fn test_status_message_survives_silent_task() {
        let graph = GraphBuilder::new("quiet")
            .add_task(task("loud", NextAction::ContinueAndExecute))
            .add_task(Arc::new(SilentTask))
            .add_edge("loud", "silent")
            .build();

        let mut session = graph.new_session("s5").unwrap();
        let result = graph.execute_session(&mut session).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.response, None);
        assert_eq!(session.current_task_id, "silent");
        assert_eq!(session.status_message.as_deref(), Some("ran loud"));
    }

    #[tokio::test]
    async fn test_empty_graph_has_no_session() {
        let graph = Graph::new("empty");
        assert!(matches!(
            graph.new_session("s4"),
            Err(FlowError::GraphNotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_context_typed_access() {
        let context = Context::new();
        context.set("count", 3u32).await.unwrap();

        assert_eq!(context.get::<u32>("count").await, Some(3));
        assert_eq!(context.get::<String>("count").await, None);
        assert!(context.require::<u32>("missing").await.is_err());

        context.remove("count").await;
        assert_eq!(context.get_sync::<u32>("count"), None);

        context.set("a", "x").await.unwrap();
        context.clone().clear().await;
        assert_eq!(context.get::<String>("a").await, None);
    }
}

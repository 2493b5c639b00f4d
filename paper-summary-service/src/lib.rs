pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod parser;
pub mod render;
pub mod service;
pub mod store;
pub mod summarizer;
pub mod tasks;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::{Config, LogFormat, init_tracing};
pub use service::{AppState, build_router};
pub use workflow::{PaperProcessor, ProcessingHandle, build_paper_workflow};
pub use models::*;

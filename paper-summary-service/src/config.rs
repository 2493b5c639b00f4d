use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_FOLDER: &str = "./uploads";
const DEFAULT_SUMMARY_MODEL: &str = "openai/gpt-4o";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_LOG_FILTER: &str = "paper_summary_service=debug,stage_flow=debug,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Service settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub upload_folder: PathBuf,
    pub openrouter_api_key: Option<String>,
    pub summary_model: String,
    pub log_format: LogFormat,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            openrouter_api_key: None,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            log_format: LogFormat::Json,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset and numbers
    /// that do not parse keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            port: get("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            database_url: get("DATABASE_URL"),
            upload_folder: get("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_folder),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            summary_model: get("SUMMARY_MODEL").unwrap_or(defaults.summary_model),
            log_format: match get("LOG_FORMAT").as_deref() {
                Some("pretty") => LogFormat::Pretty,
                _ => LogFormat::Json,
            },
            max_upload_bytes: get("MAX_UPLOAD_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&bytes| bytes > 0)
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

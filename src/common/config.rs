//! Runtime configuration loaded from the process environment.
//!
//! The snapshot is taken once at startup; nothing below the service layer
//! reads the environment afterwards.

use std::env;
use std::path::PathBuf;

use log::LevelFilter;

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct AppCfg {
    /// Directory holding one classifier artefact per disease.
    pub model_dir: PathBuf,
    /// Optional JSON suggestion catalog overriding the built-in texts.
    pub suggestions_path: Option<PathBuf>,
    pub log_level: u8,
    pub parallel_load: bool,
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Snapshot with defaults and an explicit model directory.
    pub fn with_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::from_lookup(|_| None)
        }
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            model_dir: PathBuf::from(env_or("MEDPREDICT_MODEL_DIR", "./models")),
            suggestions_path: lookup("MEDPREDICT_SUGGESTIONS")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            log_level: env_or("MEDPREDICT_LOG_LEVEL", "2").parse().unwrap_or(2),
            parallel_load: parse_flag(&env_or("MEDPREDICT_PARALLEL_LOAD", "true")),
        }
    }

    /// Map the numeric level onto the `log` facade.
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

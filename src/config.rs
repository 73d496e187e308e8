//! Assistant configuration.
//!
//! Settings come from an optional YAML file, then environment variables:
//! `OPENAI_API_KEY` replaces `api_key` and `CODEASSIST_MODEL` replaces
//! `model`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::llm::{Task, TaskOptions, DEFAULT_API_BASE, DEFAULT_MODEL};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "CODEASSIST_MODEL";

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codeassist.yaml", ".codeassist.yaml"];

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-task sampling overrides. Unset fields keep the task default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct TaskOverride {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout; unset means the HTTP client default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub tasks: BTreeMap<Task, TaskOverride>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
            timeout_ms: None,
            tasks: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load the config: explicit file, else discovered file, else defaults.
    /// Environment overrides are applied and the result validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit.map(Path::to_path_buf).or_else(discover) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::parse_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_key = key;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.is_empty()) {
            self.model = model;
        }
    }

    /// Sampling options for a task, with overrides applied.
    pub fn task_options(&self, task: Task) -> TaskOptions {
        let mut options = task.default_options();
        if let Some(o) = self.tasks.get(&task) {
            if let Some(t) = o.temperature {
                options.temperature = t;
            }
            if let Some(m) = o.max_tokens {
                options.max_tokens = m;
            }
        }
        options
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Check that the config is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api_base {:?} must start with http:// or https://",
                self.api_base
            )));
        }

        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be positive".to_string(),
            ));
        }

        for (task, o) in &self.tasks {
            if let Some(t) = o.temperature {
                if !(0.0..=2.0).contains(&t) {
                    return Err(ConfigError::Invalid(format!(
                        "tasks.{}.temperature {} is outside [0, 2]",
                        task, t
                    )));
                }
            }
            if o.max_tokens == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "tasks.{}.max_tokens must be positive",
                    task
                )));
            }
        }

        Ok(())
    }
}

/// Find a config file in the working directory, then the user config dir.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .or_else(|| user_config_path().filter(|p| p.exists()))
}

/// `<user config dir>/codeassist/config.yaml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "codeassist")
        .map(|d| d.config_dir().join("config.yaml"))
}

/// Template written by `codeassist init`.
pub const TEMPLATE: &str = r#"# codeassist configuration
#
# The OPENAI_API_KEY environment variable overrides api_key,
# CODEASSIST_MODEL overrides model.

api_key: ""
model: gpt-4
api_base: https://api.openai.com/v1

# Request timeout in milliseconds (omit for the HTTP client default)
# timeout_ms: 30000

# Per-task sampling overrides
# tasks:
#   refactor:
#     temperature: 0.2
#     max_tokens: 2000
"#;

//! Configuration types and loading.
//!
//! [`ExplainConfig`] is assembled from, in increasing priority: built-in
//! defaults, `.explain.yaml` in the repository root, `EXPLAIN_*` environment
//! variables, and command-line overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name of the per-repository configuration file.
pub const CONFIG_FILE_NAME: &str = ".explain.yaml";

/// Prefix of configuration environment variables (`EXPLAIN_MODEL`, ...).
pub const ENV_PREFIX: &str = "EXPLAIN_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider supplied a value of the wrong shape, or the file is not
    /// valid YAML.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The selected model has no command configured.
    #[error("unknown model '{model}' (available: {available})")]
    UnknownModel { model: String, available: String },

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Config struct
// ---------------------------------------------------------------------------

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// Model used for explanations; a key of `models`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Where explanations and `topics.json` are written.
    #[serde(default = "default_output_dir", rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Model name -> argv of the CLI that reads a prompt on stdin.
    #[serde(default = "default_models")]
    pub models: BTreeMap<String, Vec<String>>,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            output_dir: default_output_dir(),
            models: default_models(),
        }
    }
}

fn default_model() -> String {
    "claude".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("explanations")
}

fn default_models() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        ("claude".to_string(), vec!["claude".to_string(), "-p".to_string()]),
        (
            "gemini".to_string(),
            // gemini reads stdin only when -p is given an empty prompt.
            vec!["gemini".to_string(), "-p".to_string(), String::new()],
        ),
    ])
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "output-dir")]
    pub output_dir: Option<PathBuf>,
}

impl ExplainConfig {
    /// Argv for the configured model.
    pub fn model_command(&self) -> Result<&[String]> {
        let argv = self
            .models
            .get(&self.model)
            .ok_or_else(|| ConfigError::UnknownModel {
                model: self.model.clone(),
                available: self.model_names().join(", "),
            })?;
        if argv.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: format!("models.{}", self.model),
                reason: "command must name a program".to_string(),
            });
        }
        Ok(argv)
    }

    /// Names of all configured models, sorted.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Output directory resolved against `base` when relative.
    pub fn output_dir_in(&self, base: &Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            base.join(&self.output_dir)
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The layered provider stack for `repo_root`, without command-line values.
pub fn figment(repo_root: &Path) -> Figment {
    Figment::from(Serialized::defaults(ExplainConfig::default()))
        .merge(Yaml::file(repo_root.join(CONFIG_FILE_NAME)))
        .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace('_', "-").into()))
}

/// Loads configuration for `repo_root`, applying `overrides` last.
///
/// A missing `.explain.yaml` is fine; a malformed one is an error.
pub fn load_config(repo_root: &Path, overrides: &ConfigOverrides) -> Result<ExplainConfig> {
    let config: ExplainConfig = figment(repo_root)
        .merge(Serialized::defaults(overrides))
        .extract()
        .map_err(Box::new)?;
    debug!(model = %config.model, output_dir = %config.output_dir.display(), "configuration loaded");
    Ok(config)
}

/// Creates `path` (and parents) if missing.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

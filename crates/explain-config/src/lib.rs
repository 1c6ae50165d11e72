//! Configuration management for explain.
//!
//! Settings come from `.explain.yaml` at the repository root, `EXPLAIN_*`
//! environment variables and command-line flags, layered with figment.

pub mod config;

pub use config::{
    CONFIG_FILE_NAME, ConfigError, ConfigOverrides, ExplainConfig, ensure_output_dir, load_config,
};

//! Running the model CLI.
//!
//! A model is an argv from configuration. The prompt goes to its stdin and
//! the explanation is whatever it prints on stdout.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use explain_config::ExplainConfig;
use explain_session::ExplainError;

/// Marks a running claude CLI session; a nested `claude -p` refuses to run
/// while it is inherited.
const NESTED_SESSION_VAR: &str = "CLAUDECODE";

/// A resolved model command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRunner {
    name: String,
    program: String,
    args: Vec<String>,
}

impl ModelRunner {
    /// The runner for the configured model.
    pub fn from_config(config: &ExplainConfig) -> Result<Self, ExplainError> {
        let argv = config
            .model_command()
            .map_err(|e| ExplainError::model(&config.model, e.to_string()))?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ExplainError::model(&config.model, "empty command"))?;
        Ok(Self {
            name: config.model.clone(),
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locates the model executable on `PATH`.
    pub fn locate(&self) -> Result<PathBuf, ExplainError> {
        which::which(&self.program).map_err(|_| {
            ExplainError::model(
                &self.name,
                format!("'{}' CLI not available on PATH", self.program),
            )
        })
    }

    /// Sends `prompt` to the model and returns its reply.
    pub fn run(&self, prompt: &str) -> Result<String, ExplainError> {
        let program = self.locate()?;
        debug!(model = %self.name, program = %program.display(), bytes = prompt.len(), "running model");

        let mut child = Command::new(&program)
            .args(&self.args)
            .env_remove(NESTED_SESSION_VAR)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExplainError::io(format!("failed to start {}", self.program), e))?;

        // Feed stdin from a thread so a model that replies while still
        // reading cannot deadlock against a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_owned();
            thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| ExplainError::io(format!("failed to wait for {}", self.program), e))?;

        if let Some(Ok(Err(e))) = writer.map(|w| w.join()) {
            // A model may legitimately stop reading early.
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(ExplainError::io(
                    format!("failed to send prompt to {}", self.program),
                    e,
                ));
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                msg => msg.to_string(),
            };
            return Err(ExplainError::model(&self.name, reason));
        }

        let reply = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(model = %self.name, bytes = reply.len(), "model replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(argv: &[&str]) -> ExplainConfig {
        ExplainConfig {
            model: "test".into(),
            models: BTreeMap::from([(
                "test".to_string(),
                argv.iter().map(|s| s.to_string()).collect(),
            )]),
            ..ExplainConfig::default()
        }
    }

    #[test]
    fn unknown_model_is_a_model_error() {
        let cfg = ExplainConfig {
            model: "nope".into(),
            ..ExplainConfig::default()
        };
        let err = ModelRunner::from_config(&cfg).unwrap_err();
        assert!(matches!(err, ExplainError::Model { .. }));
        assert!(err.to_string().contains("unknown model 'nope'"));
    }

    #[test]
    fn missing_executable() {
        let runner = ModelRunner::from_config(&config(&["definitely-not-a-model-cli-xyz"])).unwrap();
        let err = runner.run("hi").unwrap_err();
        assert!(err.to_string().contains("not available on PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn prompt_goes_to_stdin_and_reply_comes_back() {
        let runner = ModelRunner::from_config(&config(&["sh", "-c", "tr a-z A-Z"])).unwrap();
        assert_eq!(runner.run("hello").unwrap(), "HELLO");
    }

    #[cfg(unix)]
    #[test]
    fn nested_session_variable_is_removed() {
        // SAFETY: the variable is only read by the child spawned below.
        unsafe { std::env::set_var(NESTED_SESSION_VAR, "1") };
        let runner = ModelRunner::from_config(&config(&[
            "sh",
            "-c",
            "cat >/dev/null; printf '%s' \"${CLAUDECODE:-unset}\"",
        ]))
        .unwrap();
        assert_eq!(runner.run("x").unwrap(), "unset");
    }

    #[cfg(unix)]
    #[test]
    fn failure_reports_stderr() {
        let runner = ModelRunner::from_config(&config(&[
            "sh",
            "-c",
            "cat >/dev/null; echo 'rate limited' >&2; exit 3",
        ]))
        .unwrap();
        let err = runner.run("x").unwrap_err();
        assert_eq!(err.to_string(), "model 'test' failed: rate limited");
        assert!(err.is_retryable());
    }
}

use crate::errors::ExecutionError;
use crate::metrics_defs::{LOG_QUERIES, LOG_QUERY_DURATION, LOG_QUERY_LINES};
use crate::range::TimeRange;
use async_trait::async_trait;
use shared::{counter, histogram};
use std::fmt;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

/// Settings shared by every query of an invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySettings {
    pub range: TimeRange,
    /// Oldest lines first.
    pub forward: bool,
    /// Label printed in front of every returned line.
    pub include_label: Option<String>,
}

impl QuerySettings {
    pub fn new(range: TimeRange) -> Self {
        QuerySettings {
            range,
            forward: true,
            include_label: None,
        }
    }

    pub fn with_include_label(mut self, label: impl Into<String>) -> Self {
        self.include_label = Some(label.into());
        self
    }
}

/// Runs a query against the log store and returns the matched lines with
/// their timestamp prefix removed.
#[async_trait]
pub trait LogExecutor: Send + Sync {
    async fn query(
        &self,
        query: &str,
        settings: &QuerySettings,
    ) -> Result<Vec<String>, ExecutionError>;
}

/// Drops everything before the first `{`. Lines without one are kept as is.
pub fn strip_timestamp(line: &str) -> &str {
    match line.find('{') {
        Some(start) => &line[start..],
        None => line,
    }
}

/// Address and login of the log store, handed to every executor run.
#[derive(Clone, PartialEq)]
pub struct LogStoreCredentials {
    pub addr: String,
    pub username: String,
    pub password: String,
}

impl LogStoreCredentials {
    pub const ADDR_ENV: &'static str = "LOKI_ADDR";
    pub const USERNAME_ENV: &'static str = "LOKI_USERNAME";
    pub const PASSWORD_ENV: &'static str = "LOKI_PASSWORD";

    pub fn envs(&self) -> [(&'static str, &str); 3] {
        [
            (Self::ADDR_ENV, self.addr.as_str()),
            (Self::USERNAME_ENV, self.username.as_str()),
            (Self::PASSWORD_ENV, self.password.as_str()),
        ]
    }
}

impl fmt::Debug for LogStoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStoreCredentials")
            .field("addr", &self.addr)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Runs queries through the `logcli` command line client.
///
/// `command` is the argv prefix used to start it, normally just `["logcli"]`.
pub struct LogCli {
    command: Vec<String>,
    credentials: LogStoreCredentials,
}

impl LogCli {
    pub fn new(
        command: Vec<String>,
        credentials: LogStoreCredentials,
    ) -> Result<Self, ExecutionError> {
        if command.first().is_none_or(|program| program.is_empty()) {
            return Err(ExecutionError::EmptyCommand);
        }
        Ok(LogCli {
            command,
            credentials,
        })
    }

    pub fn args(query: &str, settings: &QuerySettings) -> Vec<String> {
        let range = &settings.range;
        let mut args = vec![
            "query".to_string(),
            "--quiet".to_string(),
            "--timezone=UTC".to_string(),
            format!("--from={}", range.from_rfc3339()),
            format!("--to={}", range.to_rfc3339()),
            format!("--limit={}", range.limit()),
        ];
        if settings.forward {
            args.push("--forward".to_string());
        }
        if let Some(label) = &settings.include_label {
            args.push(format!("--include-label={label}"));
        }
        args.push(query.to_string());
        args
    }
}

#[async_trait]
impl LogExecutor for LogCli {
    async fn query(
        &self,
        query: &str,
        settings: &QuerySettings,
    ) -> Result<Vec<String>, ExecutionError> {
        let (program, prefix) = self
            .command
            .split_first()
            .ok_or(ExecutionError::EmptyCommand)?;
        let args = LogCli::args(query, settings);
        tracing::debug!(program, query, "Running log query");

        let start = Instant::now();
        let output = Command::new(program)
            .args(prefix)
            .args(&args)
            .envs(self.credentials.envs())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExecutionError::Spawn {
                program: program.clone(),
                source,
            })?;
        histogram!(LOG_QUERY_DURATION).record(start.elapsed().as_secs_f64());

        if !output.status.success() {
            counter!(LOG_QUERIES, "outcome" => "failed").increment(1);
            return Err(ExecutionError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        let lines: Vec<String> = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| strip_timestamp(line).to_string())
            .collect();

        counter!(LOG_QUERIES, "outcome" => "ok").increment(1);
        histogram!(LOG_QUERY_LINES).record(lines.len() as f64);
        tracing::debug!(lines = lines.len(), "Log query finished");
        Ok(lines)
    }
}

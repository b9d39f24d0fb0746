use identity::config::AdminApiConfig;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct LogStoreConfig {
    /// argv used to start logcli.
    #[serde(default = "default_logcli_command")]
    pub command: Vec<String>,
    /// Label printed in front of every returned line.
    #[serde(default = "default_include_label")]
    pub include_label: Option<String>,
    /// argv of the secret store lookup. The secret name is appended as the
    /// last argument and the value read from stdout.
    pub secret_command: Option<Vec<String>>,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        LogStoreConfig {
            command: default_logcli_command(),
            include_label: default_include_label(),
            secret_command: None,
        }
    }
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub admin_api: AdminApiConfig,
    #[serde(default)]
    pub log_store: LogStoreConfig,
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Reads `path` when given, otherwise uses the built in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Config::from_file(path),
            None => Ok(Config::default()),
        }
    }
}

fn default_metrics_prefix() -> String {
    "eplogs".into()
}

fn default_logcli_command() -> Vec<String> {
    vec!["logcli".into()]
}

fn default_include_label() -> Option<String> {
    Some("app".into())
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(String),
    #[error("{key} is not set and no secret store is configured")]
    NoSecretStore { key: String },
    #[error("could not read {key} from the secret store: {reason}")]
    SecretStore { key: String, reason: String },
}

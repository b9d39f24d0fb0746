use crate::config::{ConfigError, LogStoreConfig};
use async_trait::async_trait;
use identity::Environment;
use identity::config::AdminApiConfig;
use logquery::LogStoreCredentials;
use std::process::Stdio;
use tokio::process::Command;

/// Source of secrets that are not present in the environment.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<String, String>;
}

/// Reads a secret by running `command` with the secret name appended.
pub struct CommandSecretStore {
    command: Vec<String>,
}

impl CommandSecretStore {
    pub fn new(command: Vec<String>) -> Self {
        CommandSecretStore { command }
    }

    pub fn from_config(config: &LogStoreConfig) -> Option<Self> {
        config
            .secret_command
            .clone()
            .filter(|command| !command.is_empty())
            .map(CommandSecretStore::new)
    }
}

#[async_trait]
impl SecretStore for CommandSecretStore {
    async fn fetch(&self, key: &str) -> Result<String, String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| "secret command is empty".to_string())?;

        let output = Command::new(program)
            .args(args)
            .arg(key)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("could not run {program}: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{program} failed ({}): {}", output.status, stderr.trim()));
        }

        let secret = String::from_utf8(output.stdout)
            .map_err(|_| format!("{program} returned a non UTF-8 secret"))?;
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(format!("{program} returned an empty secret"));
        }
        Ok(secret.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Bearer token for the admin API of `env`.
pub fn admin_token<F>(
    config: &AdminApiConfig,
    env: Environment,
    lookup: F,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = &config.target(env).token_env;
    non_empty(lookup(var)).ok_or_else(|| ConfigError::MissingCredential(var.clone()))
}

/// Log store settings, taken from the environment and completed from the
/// secret store. Resolved once per process.
pub async fn log_store_credentials<F>(
    lookup: F,
    store: Option<&dyn SecretStore>,
) -> Result<LogStoreCredentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let addr = env_or_secret(LogStoreCredentials::ADDR_ENV, &lookup, store).await?;
    let username = env_or_secret(LogStoreCredentials::USERNAME_ENV, &lookup, store).await?;
    let password = env_or_secret(LogStoreCredentials::PASSWORD_ENV, &lookup, store).await?;

    Ok(LogStoreCredentials {
        addr,
        username,
        password,
    })
}

async fn env_or_secret<F>(
    key: &str,
    lookup: &F,
    store: Option<&dyn SecretStore>,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = non_empty(lookup(key)) {
        return Ok(value);
    }

    let store = store.ok_or_else(|| ConfigError::NoSecretStore {
        key: key.to_string(),
    })?;
    tracing::debug!(key, "Fetching log store setting from secret store");
    store
        .fetch(key)
        .await
        .map_err(|reason| ConfigError::SecretStore {
            key: key.to_string(),
            reason,
        })
}

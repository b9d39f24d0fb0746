use crate::types::Environment;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct AdminApiTarget {
    pub url: String,
    /// Environment variable holding the bearer token for this deployment.
    pub token_env: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct AdminApiConfig {
    #[serde(default = "default_prod")]
    pub prod: AdminApiTarget,
    #[serde(default = "default_staging")]
    pub staging: AdminApiTarget,
    /// Overall timeout of a single admin API request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AdminApiConfig {
    pub fn target(&self, env: Environment) -> &AdminApiTarget {
        match env {
            Environment::Prod => &self.prod,
            Environment::Staging => &self.staging,
        }
    }
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        AdminApiConfig {
            prod: default_prod(),
            staging: default_staging(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_prod() -> AdminApiTarget {
    AdminApiTarget {
        url: "https://console.prod.internal/api/v1/admin".into(),
        token_env: "ADMIN_API_TOKEN_PROD".into(),
    }
}

fn default_staging() -> AdminApiTarget {
    AdminApiTarget {
        url: "https://console.stage.internal/api/v1/admin".into(),
        token_env: "ADMIN_API_TOKEN_STAGING".into(),
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_target_per_environment() {
        let config = AdminApiConfig::default();
        assert_eq!(
            config.target(Environment::Prod).token_env,
            "ADMIN_API_TOKEN_PROD"
        );
        assert_eq!(
            config.target(Environment::Staging).token_env,
            "ADMIN_API_TOKEN_STAGING"
        );
        assert_eq!(config.timeout_secs, 30);
    }
}

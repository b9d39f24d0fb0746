use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment the lookup runs against.
///
/// The admin API calls the non-production deployment "staging" while the log
/// store labels its lines with `dev`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Prod,
    Staging,
}

impl Environment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Staging => "staging",
        }
    }

    /// Value of the environment label in the log store.
    pub const fn log_label(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Staging => "dev",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved identity of an endpoint.
///
/// Either every field is known or the value does not exist: the resolver
/// builds it only after the whole lookup chain succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    project_id: String,
    tenant_id: String,
    region_id: String,
    branch_id: String,
    timeline_id: String,
    endpoint_id: String,
}

impl Endpoint {
    pub fn new<S: Into<String>>(
        project_id: S,
        tenant_id: S,
        region_id: S,
        branch_id: S,
        timeline_id: S,
        endpoint_id: S,
    ) -> Self {
        Endpoint {
            project_id: project_id.into(),
            tenant_id: tenant_id.into(),
            region_id: region_id.into(),
            branch_id: branch_id.into(),
            timeline_id: timeline_id.into(),
            endpoint_id: endpoint_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Region as labelled in the log store (already normalized).
    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    pub fn timeline_id(&self) -> &str {
        &self.timeline_id
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }
}

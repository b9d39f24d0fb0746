use crate::config::AdminApiConfig;
use crate::metrics_defs::{ADMIN_API_REQUEST_DURATION, ADMIN_API_REQUESTS};
use crate::types::Environment;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use url::Url;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ProjectRecord {
    pub id: String,
    pub tenant_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BranchRecord {
    pub id: String,
    pub timeline_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EndpointRecord {
    pub id: String,
    pub branch_id: String,
    pub project_id: String,
    /// Region as reported by the admin API, before normalization.
    pub region_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EndpointSummary {
    pub id: String,
}

#[derive(Deserialize)]
struct ProjectResponse {
    project: ProjectRecord,
}

#[derive(Deserialize)]
struct BranchResponse {
    branch: BranchRecord,
}

#[derive(Deserialize)]
struct EndpointResponse {
    endpoint: EndpointRecord,
}

#[derive(Deserialize)]
struct EndpointSearchResponse {
    endpoints: Vec<EndpointSummary>,
}

#[derive(thiserror::Error, Debug)]
pub enum AdminApiError {
    #[error("not found")]
    NotFound,
    #[error("not authorized ({0})")]
    Unauthorized(StatusCode),
    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The four lookups the resolver needs from the admin API.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn get_project(&self, project_id: &str) -> Result<ProjectRecord, AdminApiError>;
    async fn get_branch(&self, branch_id: &str) -> Result<BranchRecord, AdminApiError>;
    async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointRecord, AdminApiError>;
    async fn search_endpoints(
        &self,
        project_id: &str,
    ) -> Result<Vec<EndpointSummary>, AdminApiError>;
}

/// HTTP client for the admin API. Requests are never retried.
pub struct AdminApiClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl AdminApiClient {
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self, AdminApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| AdminApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(AdminApiError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(AdminApiClient {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(
        config: &AdminApiConfig,
        env: Environment,
        token: String,
    ) -> Result<Self, AdminApiError> {
        AdminApiClient::new(
            &config.target(env).url,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        lookup: &'static str,
        url: Url,
    ) -> Result<T, AdminApiError> {
        tracing::debug!(lookup, %url, "Admin API lookup");
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        histogram!(ADMIN_API_REQUEST_DURATION, "lookup" => lookup)
            .record(start.elapsed().as_secs_f64());
        counter!(ADMIN_API_REQUESTS, "lookup" => lookup, "status" => status.as_str().to_owned())
            .increment(1);

        match status {
            s if s.is_success() => Ok(response.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(AdminApiError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AdminApiError::Unauthorized(status))
            }
            _ => Err(AdminApiError::UnexpectedStatus(status)),
        }
    }
}

#[async_trait]
impl AdminApi for AdminApiClient {
    async fn get_project(&self, project_id: &str) -> Result<ProjectRecord, AdminApiError> {
        let url = self.url(&["projects", project_id]);
        let response: ProjectResponse = self.get_json("project", url).await?;
        Ok(response.project)
    }

    async fn get_branch(&self, branch_id: &str) -> Result<BranchRecord, AdminApiError> {
        let url = self.url(&["branches", branch_id]);
        let response: BranchResponse = self.get_json("branch", url).await?;
        Ok(response.branch)
    }

    async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointRecord, AdminApiError> {
        let url = self.url(&["endpoints", endpoint_id]);
        let response: EndpointResponse = self.get_json("endpoint", url).await?;
        Ok(response.endpoint)
    }

    async fn search_endpoints(
        &self,
        project_id: &str,
    ) -> Result<Vec<EndpointSummary>, AdminApiError> {
        let mut url = self.url(&["endpoints"]);
        url.query_pairs_mut().append_pair("project_id", project_id);
        let response: EndpointSearchResponse = self.get_json("search_endpoints", url).await?;
        Ok(response.endpoints)
    }
}

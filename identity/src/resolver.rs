use crate::admin_api::{AdminApi, AdminApiError};
use crate::metrics_defs::RESOLUTION_AMBIGUOUS;
use crate::region::normalize_region;
use crate::types::Endpoint;
use shared::counter;
use std::fmt;

/// Admin API lookup a resolution step performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupStep {
    Project,
    Branch,
    Endpoint,
    SearchEndpoints,
}

impl LookupStep {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LookupStep::Project => "project",
            LookupStep::Branch => "branch",
            LookupStep::Endpoint => "endpoint",
            LookupStep::SearchEndpoints => "endpoint search",
        }
    }
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolutionError {
    #[error("{step} lookup failed for {id}: {source}")]
    Lookup {
        step: LookupStep,
        id: String,
        #[source]
        source: AdminApiError,
    },

    #[error("{step} record for {id} has no {field}")]
    MissingField {
        step: LookupStep,
        id: String,
        field: &'static str,
    },

    #[error("expected exactly one endpoint in project {project_id}, found {count}")]
    Ambiguous { project_id: String, count: usize },
}

impl ResolutionError {
    #[cfg(test)]
    pub fn step(&self) -> Option<LookupStep> {
        match self {
            ResolutionError::Lookup { step, .. } | ResolutionError::MissingField { step, .. } => {
                Some(*step)
            }
            ResolutionError::Ambiguous { .. } => None,
        }
    }
}

fn lookup_failed(step: LookupStep, id: &str) -> impl FnOnce(AdminApiError) -> ResolutionError {
    let id = id.to_string();
    move |source| ResolutionError::Lookup { step, id, source }
}

fn require<'a>(
    step: LookupStep,
    id: &str,
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ResolutionError> {
    if value.is_empty() {
        return Err(ResolutionError::MissingField {
            step,
            id: id.to_string(),
            field,
        });
    }
    Ok(value)
}

/// Walks the admin API to turn an endpoint or project id into an [`Endpoint`].
///
/// Every call goes to the admin API; nothing is cached between steps or
/// between resolutions.
pub struct Resolver<A> {
    api: A,
}

impl<A: AdminApi> Resolver<A> {
    pub fn new(api: A) -> Self {
        Resolver { api }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// endpoint -> branch (timeline) -> project (tenant), then region normalization.
    pub async fn resolve_by_endpoint_id(
        &self,
        endpoint_id: &str,
    ) -> Result<Endpoint, ResolutionError> {
        let endpoint = self
            .api
            .get_endpoint(endpoint_id)
            .await
            .map_err(lookup_failed(LookupStep::Endpoint, endpoint_id))?;
        let branch_id = require(
            LookupStep::Endpoint,
            endpoint_id,
            "branch_id",
            &endpoint.branch_id,
        )?;
        let project_id = require(
            LookupStep::Endpoint,
            endpoint_id,
            "project_id",
            &endpoint.project_id,
        )?;
        let raw_region = require(
            LookupStep::Endpoint,
            endpoint_id,
            "region_id",
            &endpoint.region_id,
        )?;

        let branch = self
            .api
            .get_branch(branch_id)
            .await
            .map_err(lookup_failed(LookupStep::Branch, branch_id))?;
        let timeline_id = require(
            LookupStep::Branch,
            branch_id,
            "timeline_id",
            &branch.timeline_id,
        )?;

        let project = self
            .api
            .get_project(project_id)
            .await
            .map_err(lookup_failed(LookupStep::Project, project_id))?;
        let tenant_id = require(LookupStep::Project, project_id, "tenant_id", &project.tenant_id)?;

        let region_id = normalize_region(raw_region);
        tracing::debug!(
            endpoint_id,
            raw_region,
            region_id = region_id.as_str(),
            "Resolved endpoint"
        );

        Ok(Endpoint::new(
            project_id.to_string(),
            tenant_id.to_string(),
            region_id,
            branch_id.to_string(),
            timeline_id.to_string(),
            endpoint_id.to_string(),
        ))
    }

    /// Requires the project to own exactly one endpoint; never guesses between several.
    pub async fn resolve_by_project_id(
        &self,
        project_id: &str,
    ) -> Result<Endpoint, ResolutionError> {
        let endpoints = self
            .api
            .search_endpoints(project_id)
            .await
            .map_err(lookup_failed(LookupStep::SearchEndpoints, project_id))?;

        match endpoints.as_slice() {
            [only] => self.resolve_by_endpoint_id(&only.id).await,
            _ => {
                counter!(RESOLUTION_AMBIGUOUS).increment(1);
                tracing::warn!(
                    project_id,
                    count = endpoints.len(),
                    "Project does not map to a single endpoint"
                );
                Err(ResolutionError::Ambiguous {
                    project_id: project_id.to_string(),
                    count: endpoints.len(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_api::AdminApiClient;
    use crate::testutils::{FakeAdminApi, MockAdminApiServer, TEST_TOKEN, fixtures};
    use std::time::Duration;

    fn resolver() -> Resolver<FakeAdminApi> {
        Resolver::new(FakeAdminApi::new(fixtures()))
    }

    #[tokio::test]
    async fn test_resolve_by_endpoint_id() {
        let resolver = resolver();
        let endpoint = resolver.resolve_by_endpoint_id("ep-single").await.unwrap();

        assert_eq!(
            endpoint,
            Endpoint::new(
                "proj-single",
                "tenant-single",
                "us-east-1",
                "br-single",
                "tl-single",
                "ep-single"
            )
        );
        assert_eq!(
            resolver.api().calls(),
            vec!["endpoint:ep-single", "branch:br-single", "project:proj-single"]
        );
    }

    #[tokio::test]
    async fn test_resolve_by_project_matches_endpoint_path() {
        let by_project = resolver().resolve_by_project_id("proj-single").await.unwrap();
        let by_endpoint = resolver().resolve_by_endpoint_id("ep-single").await.unwrap();
        assert_eq!(by_project, by_endpoint);
    }

    #[tokio::test]
    async fn test_ambiguous_projects() {
        for (project_id, expected) in [("proj-many", 2), ("proj-empty", 0), ("unknown", 0)] {
            let resolver = resolver();
            let err = resolver.resolve_by_project_id(project_id).await.unwrap_err();
            match err {
                ResolutionError::Ambiguous { project_id: p, count } => {
                    assert_eq!(p, project_id);
                    assert_eq!(count, expected);
                }
                other => panic!("unexpected error: {other}"),
            }
            // Nothing past the search is looked up.
            assert_eq!(resolver.api().calls(), vec![format!("search:{project_id}")]);
        }
    }

    #[tokio::test]
    async fn test_lookup_failures_carry_step() {
        let err = resolver().resolve_by_endpoint_id("missing").await.unwrap_err();
        assert!(matches!(
            &err,
            ResolutionError::Lookup {
                step: LookupStep::Endpoint,
                id,
                source: AdminApiError::NotFound,
            } if id == "missing"
        ));

        let resolver = resolver();
        let err = resolver.resolve_by_endpoint_id("ep-orphan").await.unwrap_err();
        assert_eq!(err.step(), Some(LookupStep::Branch));
        assert!(matches!(&err, ResolutionError::Lookup { id, .. } if id == "br-missing"));
        assert_eq!(err.to_string(), "branch lookup failed for br-missing: not found");
        // The chain stops at the first failure.
        assert_eq!(
            resolver.api().calls(),
            vec!["endpoint:ep-orphan", "branch:br-missing"]
        );
    }

    #[tokio::test]
    async fn test_empty_fields_are_rejected() {
        let err = resolver().resolve_by_endpoint_id("ep-blank").await.unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::MissingField {
                step: LookupStep::Branch,
                field: "timeline_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_region_is_normalized() {
        let endpoint = resolver().resolve_by_endpoint_id("ep-many-2").await.unwrap();
        assert_eq!(endpoint.region_id(), "us-west-2");
        assert_eq!(endpoint.timeline_id(), "tl-many-2");
        assert_eq!(endpoint.tenant_id(), "tenant-many");
    }

    #[tokio::test]
    async fn test_resolve_over_http() {
        let server = MockAdminApiServer::spawn(fixtures()).await.unwrap();
        let client =
            AdminApiClient::new(&server.base_url(), TEST_TOKEN.into(), Duration::from_secs(5))
                .unwrap();
        let resolver = Resolver::new(client);

        let endpoint = resolver.resolve_by_project_id("proj-single").await.unwrap();
        assert_eq!(endpoint.endpoint_id(), "ep-single");
        assert_eq!(endpoint.region_id(), "us-east-1");

        let err = resolver.resolve_by_project_id("proj-many").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Ambiguous { count: 2, .. }));
    }
}

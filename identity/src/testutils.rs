use crate::admin_api::{
    AdminApi, AdminApiError, BranchRecord, EndpointRecord, EndpointSummary, ProjectRecord,
};
use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const TEST_TOKEN: &str = "test-token";

#[derive(Clone, Default)]
pub struct AdminFixtures {
    pub projects: BTreeMap<String, ProjectRecord>,
    pub branches: BTreeMap<String, BranchRecord>,
    pub endpoints: BTreeMap<String, EndpointRecord>,
}

impl AdminFixtures {
    fn add_project(&mut self, project_id: &str, tenant_id: &str) {
        self.projects.insert(
            project_id.into(),
            ProjectRecord {
                id: project_id.into(),
                tenant_id: tenant_id.into(),
            },
        );
    }

    fn add_endpoint(
        &mut self,
        project_id: &str,
        branch_id: &str,
        endpoint_id: &str,
        region_id: &str,
    ) {
        self.endpoints.insert(
            endpoint_id.into(),
            EndpointRecord {
                id: endpoint_id.into(),
                branch_id: branch_id.into(),
                project_id: project_id.into(),
                region_id: region_id.into(),
            },
        );
    }

    fn add_branch(&mut self, branch_id: &str, timeline_id: &str) {
        self.branches.insert(
            branch_id.into(),
            BranchRecord {
                id: branch_id.into(),
                timeline_id: timeline_id.into(),
            },
        );
    }

    pub fn search(&self, project_id: &str) -> Vec<EndpointSummary> {
        self.endpoints
            .values()
            .filter(|e| e.project_id == project_id)
            .map(|e| EndpointSummary { id: e.id.clone() })
            .collect()
    }
}

/// proj-single owns exactly one endpoint, proj-many two, proj-empty none.
/// ep-orphan points at a branch that does not exist and ep-blank at a branch
/// without a timeline.
pub fn fixtures() -> AdminFixtures {
    let mut f = AdminFixtures::default();

    f.add_project("proj-single", "tenant-single");
    f.add_branch("br-single", "tl-single");
    f.add_endpoint("proj-single", "br-single", "ep-single", "aws-us-east-1");

    f.add_project("proj-many", "tenant-many");
    f.add_branch("br-many-1", "tl-many-1");
    f.add_branch("br-many-2", "tl-many-2");
    f.add_endpoint("proj-many", "br-many-1", "ep-many-1", "aws-us-west-2-new");
    f.add_endpoint("proj-many", "br-many-2", "ep-many-2", "aws-us-west-2-new");

    f.add_project("proj-empty", "tenant-empty");

    f.add_project("proj-orphan", "tenant-orphan");
    f.add_endpoint("proj-orphan", "br-missing", "ep-orphan", "eu-central-1");

    f.add_project("proj-blank", "tenant-blank");
    f.add_branch("br-blank", "");
    f.add_endpoint("proj-blank", "br-blank", "ep-blank", "eu-central-1");

    f
}

/// In-memory admin API that records every lookup it serves.
pub struct FakeAdminApi {
    fixtures: AdminFixtures,
    calls: Mutex<Vec<String>>,
}

impl FakeAdminApi {
    pub fn new(fixtures: AdminFixtures) -> Self {
        FakeAdminApi {
            fixtures,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AdminApi for FakeAdminApi {
    async fn get_project(&self, project_id: &str) -> Result<ProjectRecord, AdminApiError> {
        self.record(format!("project:{project_id}"));
        self.fixtures
            .projects
            .get(project_id)
            .cloned()
            .ok_or(AdminApiError::NotFound)
    }

    async fn get_branch(&self, branch_id: &str) -> Result<BranchRecord, AdminApiError> {
        self.record(format!("branch:{branch_id}"));
        self.fixtures
            .branches
            .get(branch_id)
            .cloned()
            .ok_or(AdminApiError::NotFound)
    }

    async fn get_endpoint(&self, endpoint_id: &str) -> Result<EndpointRecord, AdminApiError> {
        self.record(format!("endpoint:{endpoint_id}"));
        self.fixtures
            .endpoints
            .get(endpoint_id)
            .cloned()
            .ok_or(AdminApiError::NotFound)
    }

    async fn search_endpoints(
        &self,
        project_id: &str,
    ) -> Result<Vec<EndpointSummary>, AdminApiError> {
        self.record(format!("search:{project_id}"));
        Ok(self.fixtures.search(project_id))
    }
}

/// Serves the fixtures over HTTP the way the admin API does, under `/api`.
pub struct MockAdminApiServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl MockAdminApiServer {
    pub async fn spawn(fixtures: AdminFixtures) -> std::io::Result<Self> {
        let app = Router::new()
            .route("/api/projects/{id}", get(project))
            .route("/api/branches/{id}", get(branch))
            .route("/api/endpoints/{id}", get(endpoint))
            .route("/api/endpoints", get(search))
            .with_state(Arc::new(fixtures));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(MockAdminApiServer { addr, handle })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

impl Drop for MockAdminApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

type Fixtures = State<Arc<AdminFixtures>>;

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TEST_TOKEN}");
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn respond<T: serde::Serialize>(headers: &HeaderMap, key: &str, record: Option<&T>) -> Response {
    if !authorized(headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match record {
        Some(record) => Json(json!({ key: record })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn project(State(f): Fixtures, Path(id): Path<String>, headers: HeaderMap) -> Response {
    respond(&headers, "project", f.projects.get(&id))
}

async fn branch(State(f): Fixtures, Path(id): Path<String>, headers: HeaderMap) -> Response {
    respond(&headers, "branch", f.branches.get(&id))
}

async fn endpoint(State(f): Fixtures, Path(id): Path<String>, headers: HeaderMap) -> Response {
    respond(&headers, "endpoint", f.endpoints.get(&id))
}

async fn search(
    State(f): Fixtures,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    match params.get("project_id") {
        Some(project_id) => respond(&headers, "endpoints", Some(&f.search(project_id))),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

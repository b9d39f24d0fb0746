//! Two pass proxy query.
//!
//! Only some proxy lines mention the endpoint id, but every line of a client
//! session carries its `session_id`. The discovery pass finds the sessions
//! that touched the endpoint, then the final query matches the endpoint id
//! or any of those sessions.

use crate::builder::LogQuery;
use crate::errors::ExecutionError;
use crate::executor::{LogExecutor, QuerySettings};
use crate::labels::{LineFilter, StreamSelector, render};
use crate::metrics_defs::PROXY_SESSIONS_DISCOVERED;
use crate::selection::Service;
use identity::{Endpoint, Environment};
use regex::Regex;
use shared::histogram;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static SESSION_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"session_id=(.{36})").unwrap());

/// The discovery query has not run yet.
#[derive(Debug)]
pub struct Discovering;

/// Discovery ran; the session ids it found are known.
#[derive(Debug)]
pub struct Correlating {
    session_ids: BTreeSet<String>,
}

#[derive(Debug)]
pub struct ProxyCorrelation<S> {
    endpoint_id: String,
    selector: StreamSelector,
    state: S,
}

/// Collects every distinct session id found in `lines`. Lines without one
/// are skipped.
pub fn extract_session_ids<I, S>(lines: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut session_ids = BTreeSet::new();
    for line in lines {
        for captures in SESSION_ID_REGEX.captures_iter(line.as_ref()) {
            session_ids.insert(captures[1].to_string());
        }
    }
    session_ids
}

impl ProxyCorrelation<Discovering> {
    pub fn new(endpoint: &Endpoint, env: Environment) -> Self {
        ProxyCorrelation {
            endpoint_id: endpoint.endpoint_id().to_string(),
            selector: StreamSelector::new(env.log_label(), endpoint.region_id(), Service::Proxy),
            state: Discovering,
        }
    }

    pub fn discovery_query(&self) -> String {
        render(
            &self.selector,
            &[LineFilter::Contains(self.endpoint_id.clone())],
        )
    }

    /// Runs the discovery query once. Its lines are only scanned for session
    /// ids, never returned.
    pub async fn discover<E>(
        self,
        executor: &E,
        settings: &QuerySettings,
    ) -> Result<ProxyCorrelation<Correlating>, ExecutionError>
    where
        E: LogExecutor + ?Sized,
    {
        let lines = executor.query(&self.discovery_query(), settings).await?;
        let session_ids = extract_session_ids(&lines);

        histogram!(PROXY_SESSIONS_DISCOVERED).record(session_ids.len() as f64);
        tracing::info!(
            endpoint_id = self.endpoint_id.as_str(),
            lines = lines.len(),
            sessions = session_ids.len(),
            "Discovered proxy sessions"
        );

        Ok(self.correlate(session_ids))
    }

    /// Moves to the correlating state with an already known set of session ids.
    pub fn correlate(self, mut session_ids: BTreeSet<String>) -> ProxyCorrelation<Correlating> {
        session_ids.remove(&self.endpoint_id);
        ProxyCorrelation {
            endpoint_id: self.endpoint_id,
            selector: self.selector,
            state: Correlating { session_ids },
        }
    }
}

impl ProxyCorrelation<Correlating> {
    pub fn session_ids(&self) -> &BTreeSet<String> {
        &self.state.session_ids
    }

    /// Regex matching the endpoint id or any discovered session id.
    pub fn alternation(&self) -> String {
        std::iter::once(&self.endpoint_id)
            .chain(&self.state.session_ids)
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn final_query(&self) -> LogQuery {
        LogQuery {
            service: Service::Proxy,
            query: render(&self.selector, &[LineFilter::Matches(self.alternation())]),
        }
    }
}

/// Runs discovery for `endpoint` and returns the correlated state holding
/// both the final query and the discovered session ids.
pub async fn build_proxy_query<E>(
    endpoint: &Endpoint,
    env: Environment,
    executor: &E,
    settings: &QuerySettings,
) -> Result<ProxyCorrelation<Correlating>, ExecutionError>
where
    E: LogExecutor + ?Sized,
{
    ProxyCorrelation::new(endpoint, env)
        .discover(executor, settings)
        .await
}

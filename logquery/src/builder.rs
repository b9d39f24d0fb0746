use crate::correlator::{Discovering, ProxyCorrelation};
use crate::labels::{APP, CONTAINER, LineFilter, StreamSelector, render};
use crate::selection::{LogSelection, Service};
use identity::{Endpoint, Environment};

/// Lines dropped from compute logs even when they mention the endpoint.
pub const COMPUTE_NOISE_FILTERS: &[&str] = &["heartbeat", "GET /status"];

pub const COMPUTE_CONTAINER: &str = "compute-node";
pub const POOLER_CONTAINER: &str = "pgbouncer";

/// Value of the app label carried by compute and pooler lines of an endpoint.
pub fn compute_app(endpoint: &Endpoint) -> String {
    format!("compute-node-{}", endpoint.endpoint_id())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogQuery {
    pub service: Service,
    pub query: String,
}

/// How the logs of one service are fetched.
#[derive(Debug)]
pub enum ServicePlan {
    /// A single query.
    Direct(LogQuery),
    /// Proxy lines need a discovery pass before the final query exists.
    Correlated(ProxyCorrelation<Discovering>),
}

impl ServicePlan {
    pub fn service(&self) -> Service {
        match self {
            ServicePlan::Direct(query) => query.service,
            ServicePlan::Correlated(_) => Service::Proxy,
        }
    }

    /// The query run first for this service.
    #[cfg(test)]
    pub fn first_query(&self) -> String {
        match self {
            ServicePlan::Direct(query) => query.query.clone(),
            ServicePlan::Correlated(correlation) => correlation.discovery_query(),
        }
    }
}

/// Plans one query per selected service, in fixed service order.
///
/// An empty selection plans nothing.
pub fn build_queries(
    endpoint: &Endpoint,
    env: Environment,
    selection: &LogSelection,
) -> Vec<ServicePlan> {
    selection
        .services()
        .into_iter()
        .map(|service| plan(endpoint, env, service))
        .collect()
}

fn plan(endpoint: &Endpoint, env: Environment, service: Service) -> ServicePlan {
    let selector = StreamSelector::new(env.log_label(), endpoint.region_id(), service);

    let query = match service {
        Service::Pageserver | Service::Safekeeper => render(
            &selector,
            &[LineFilter::Contains(endpoint.timeline_id().to_string())],
        ),
        Service::Compute => {
            let selector = selector
                .with(APP, compute_app(endpoint))
                .with(CONTAINER, COMPUTE_CONTAINER);
            let filters: Vec<LineFilter> = COMPUTE_NOISE_FILTERS
                .iter()
                .map(|marker| LineFilter::NotContains(marker.to_string()))
                .collect();
            render(&selector, &filters)
        }
        Service::ConnectionPooler => {
            let selector = selector
                .with(APP, compute_app(endpoint))
                .with(CONTAINER, POOLER_CONTAINER);
            render(&selector, &[])
        }
        Service::Proxy => {
            return ServicePlan::Correlated(ProxyCorrelation::new(endpoint, env));
        }
    };

    ServicePlan::Direct(LogQuery { service, query })
}

//! Metrics definitions for identity resolution.

use shared::metrics_defs::{MetricDef, MetricType};

pub const ADMIN_API_REQUESTS: MetricDef = MetricDef {
    name: "admin_api.requests",
    metric_type: MetricType::Counter,
    description: "Number of admin API lookups. Tagged with lookup, status.",
};

pub const ADMIN_API_REQUEST_DURATION: MetricDef = MetricDef {
    name: "admin_api.request.duration",
    metric_type: MetricType::Histogram,
    description: "Admin API lookup duration in seconds. Tagged with lookup.",
};

pub const RESOLUTION_AMBIGUOUS: MetricDef = MetricDef {
    name: "resolution.ambiguous",
    metric_type: MetricType::Counter,
    description: "Project lookups that did not match exactly one endpoint",
};

pub const ALL_METRICS: &[MetricDef] = &[
    ADMIN_API_REQUESTS,
    ADMIN_API_REQUEST_DURATION,
    RESOLUTION_AMBIGUOUS,
];

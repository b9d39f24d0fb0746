//! Metrics definitions for log queries.

use shared::metrics_defs::{MetricDef, MetricType};

pub const LOG_QUERIES: MetricDef = MetricDef {
    name: "log_query.executions",
    metric_type: MetricType::Counter,
    description: "Number of log executor runs. Tagged with outcome.",
};

pub const LOG_QUERY_DURATION: MetricDef = MetricDef {
    name: "log_query.duration",
    metric_type: MetricType::Histogram,
    description: "Time spent in the log executor in seconds",
};

pub const LOG_QUERY_LINES: MetricDef = MetricDef {
    name: "log_query.lines",
    metric_type: MetricType::Histogram,
    description: "Number of lines returned by a log query",
};

pub const PROXY_SESSIONS_DISCOVERED: MetricDef = MetricDef {
    name: "proxy.sessions.discovered",
    metric_type: MetricType::Histogram,
    description: "Number of distinct proxy session ids found by a discovery query",
};

pub const ALL_METRICS: &[MetricDef] = &[
    LOG_QUERIES,
    LOG_QUERY_DURATION,
    LOG_QUERY_LINES,
    PROXY_SESSIONS_DISCOVERED,
];

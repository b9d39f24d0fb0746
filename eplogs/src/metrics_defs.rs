//! Metrics definitions for the command line tool.

use shared::metrics_defs::{MetricDef, MetricType};

pub const INVOCATIONS: MetricDef = MetricDef {
    name: "invocations",
    metric_type: MetricType::Counter,
    description: "Number of runs. Tagged with mode, outcome.",
};

pub const ALL_METRICS: &[MetricDef] = &[INVOCATIONS];

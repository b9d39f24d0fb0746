//! Builds log store queries for a resolved endpoint and runs them through
//! the log query executor.

pub mod builder;
pub mod correlator;
pub mod errors;
pub mod executor;
pub mod labels;
pub mod metrics_defs;
pub mod range;
pub mod selection;

#[cfg(test)]
mod testutils;

pub use builder::{LogQuery, ServicePlan, build_queries};
pub use correlator::{Correlating, Discovering, ProxyCorrelation};
pub use errors::{ExecutionError, RangeError};
pub use executor::{LogCli, LogExecutor, LogStoreCredentials, QuerySettings};
pub use range::TimeRange;
pub use selection::{LogSelection, Service};

//! Resolves a partial endpoint or project identifier into a fully qualified
//! [`Endpoint`] by walking the admin API.

pub mod admin_api;
pub mod config;
pub mod metrics_defs;
pub mod region;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod testutils;

pub use admin_api::{AdminApi, AdminApiClient, AdminApiError};
pub use resolver::{LookupStep, ResolutionError, Resolver};
pub use types::{Endpoint, Environment};

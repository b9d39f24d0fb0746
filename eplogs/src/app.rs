use crate::cli::{Cli, IdentityTarget, Target};
use crate::config::{Config, ConfigError};
use crate::credentials::{CommandSecretStore, SecretStore, admin_token, log_store_credentials};
use crate::metrics_defs::INVOCATIONS;
use crate::output;
use async_trait::async_trait;
use identity::{
    AdminApi, AdminApiClient, AdminApiError, Endpoint, Environment, ResolutionError, Resolver,
};
use logquery::{
    ExecutionError, LogCli, LogExecutor, LogSelection, QuerySettings, RangeError, ServicePlan,
    build_queries,
};
use shared::counter;
use std::io::{self, Write};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid time range: {0}")]
    Range(#[from] RangeError),
    #[error("could not create admin API client: {0}")]
    AdminApi(#[from] AdminApiError),
    #[error("could not resolve endpoint: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("log query failed: {0}")]
    Execution(#[from] ExecutionError),
    #[error("could not write output: {0}")]
    Output(#[from] io::Error),
    #[error("could not print identity: {0}")]
    Identity(#[from] serde_json::Error),
}

/// Builds the admin API client and the log executor on demand, so that a
/// mode only needs the credentials of the clients it uses.
#[async_trait]
pub trait Backends: Send + Sync {
    type Api: AdminApi;
    type Executor: LogExecutor;

    fn admin_api(&self, env: Environment) -> Result<Self::Api, CliError>;

    async fn log_executor(&self) -> Result<Self::Executor, CliError>;
}

/// Clients configured from the YAML file and the process environment.
pub struct ConfiguredBackends<'a> {
    config: &'a Config,
}

impl<'a> ConfiguredBackends<'a> {
    pub fn new(config: &'a Config) -> Self {
        ConfiguredBackends { config }
    }
}

#[async_trait]
impl Backends for ConfiguredBackends<'_> {
    type Api = AdminApiClient;
    type Executor = LogCli;

    fn admin_api(&self, env: Environment) -> Result<AdminApiClient, CliError> {
        let admin_api = &self.config.admin_api;
        let token = admin_token(admin_api, env, |key| std::env::var(key).ok())?;
        Ok(AdminApiClient::from_config(admin_api, env, token)?)
    }

    async fn log_executor(&self) -> Result<LogCli, CliError> {
        let log_store = &self.config.log_store;
        let store = CommandSecretStore::from_config(log_store);
        let credentials = log_store_credentials(
            |key| std::env::var(key).ok(),
            store.as_ref().map(|store| store as &dyn SecretStore),
        )
        .await?;
        Ok(LogCli::new(log_store.command.clone(), credentials)?)
    }
}

/// Runs one invocation. Every step completes before the next one starts.
pub async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    let target = cli.target();
    let range = cli.time_range(chrono::Utc::now().naive_utc())?;
    let mut settings = QuerySettings::new(range);
    settings.include_label = config.log_store.include_label.clone();

    let mode = match (&target, cli.map) {
        (Target::Query(_), _) => "query",
        (Target::Identity(_), true) => "map",
        (Target::Identity(_), false) => "fetch",
    };
    let backends = ConfiguredBackends::new(&config);
    let mut stdout = io::stdout().lock();
    let result = dispatch(&cli, target, &settings, &backends, &mut stdout).await;
    let outcome = if result.is_ok() { "ok" } else { "failed" };
    counter!(INVOCATIONS, "mode" => mode, "outcome" => outcome).increment(1);
    result
}

/// A custom query never touches the admin API. Map mode never touches the
/// log store.
pub async fn dispatch<B, W>(
    cli: &Cli,
    target: Target,
    settings: &QuerySettings,
    backends: &B,
    out: &mut W,
) -> Result<(), CliError>
where
    B: Backends,
    W: Write,
{
    let env = cli.environment();

    match target {
        Target::Query(query) => {
            let executor = backends.log_executor().await?;
            run_custom_query(&executor, &query, settings, out).await
        }
        Target::Identity(target) => {
            let resolver = Resolver::new(backends.admin_api(env)?);
            let endpoint = resolve(&resolver, &target).await?;
            tracing::info!(
                endpoint_id = endpoint.endpoint_id(),
                region_id = endpoint.region_id(),
                "Resolved identity"
            );

            if cli.map {
                output::print_identity(out, &endpoint)?;
                return Ok(());
            }

            let executor = backends.log_executor().await?;
            fetch_logs(&executor, &endpoint, env, cli.selection(), settings, out).await
        }
    }
}

pub async fn resolve<A: AdminApi>(
    resolver: &Resolver<A>,
    target: &IdentityTarget,
) -> Result<Endpoint, ResolutionError> {
    match target {
        IdentityTarget::Endpoint(endpoint_id) => resolver.resolve_by_endpoint_id(endpoint_id).await,
        IdentityTarget::Project(project_id) => resolver.resolve_by_project_id(project_id).await,
    }
}

pub async fn run_custom_query<E, W>(
    executor: &E,
    query: &str,
    settings: &QuerySettings,
    out: &mut W,
) -> Result<(), CliError>
where
    E: LogExecutor + ?Sized,
    W: Write,
{
    let lines = executor.query(query, settings).await?;
    output::print_lines(out, &lines)?;
    Ok(())
}

/// Queries every selected service in order; nothing selected means every
/// service. Proxy runs its discovery pass first and prints the sessions it
/// found before the correlated lines.
pub async fn fetch_logs<E, W>(
    executor: &E,
    endpoint: &Endpoint,
    env: Environment,
    selection: LogSelection,
    settings: &QuerySettings,
    out: &mut W,
) -> Result<(), CliError>
where
    E: LogExecutor + ?Sized,
    W: Write,
{
    for plan in build_queries(endpoint, env, &selection.or_all()) {
        output::print_header(out, plan.service())?;
        let query = match plan {
            ServicePlan::Direct(query) => query,
            ServicePlan::Correlated(correlation) => {
                let correlation = correlation.discover(executor, settings).await?;
                output::print_session_ids(out, correlation.session_ids())?;
                correlation.final_query()
            }
        };
        tracing::debug!(service = %query.service, query = query.query.as_str(), "Querying");
        let lines = executor.query(&query.query, settings).await?;
        output::print_lines(out, &lines)?;
    }
    Ok(())
}

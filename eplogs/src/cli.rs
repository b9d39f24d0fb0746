use chrono::NaiveDateTime;
use clap::{ArgGroup, Parser, ValueEnum};
use identity::Environment;
use logquery::range::parse_timestamp;
use logquery::{LogSelection, RangeError, TimeRange};
use std::path::PathBuf;

const DEFAULT_WINDOW_MINUTES: i64 = 60;

/// Fetch every log line of a database endpoint across storage, compute,
/// pooler and proxy.
#[derive(Debug, Parser)]
#[command(name = "eplogs", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["endpoint", "project", "query"])
))]
pub struct Cli {
    /// Deployment to look the endpoint up in.
    #[arg(long, value_enum, default_value_t = EnvArg::Prod)]
    pub env: EnvArg,

    /// Endpoint id.
    #[arg(long, short = 'e')]
    pub endpoint: Option<String>,

    /// Project id. The project must own exactly one endpoint.
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Print the resolved identity and exit without querying logs.
    #[arg(long, short = 'm', conflicts_with = "query")]
    pub map: bool,

    /// Run this LogQL query as is, skipping identity resolution.
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Fetch pageserver logs.
    #[arg(long)]
    pub pageserver: bool,

    /// Fetch safekeeper logs.
    #[arg(long)]
    pub safekeeper: bool,

    /// Fetch compute logs.
    #[arg(long)]
    pub compute: bool,

    /// Fetch connection pooler logs.
    #[arg(long)]
    pub pooler: bool,

    /// Fetch proxy logs, including every session that touched the endpoint.
    #[arg(long)]
    pub proxy: bool,

    /// Start of the time range, UTC (default: 60 minutes before --to).
    #[arg(long, value_parser = parse_timestamp)]
    pub from: Option<NaiveDateTime>,

    /// End of the time range, UTC (default: now).
    #[arg(long, value_parser = parse_timestamp)]
    pub to: Option<NaiveDateTime>,

    /// Maximum number of lines per query.
    #[arg(long, short = 'l', default_value_t = 1000)]
    pub limit: usize,

    /// YAML configuration file.
    #[arg(long, short = 'c', env = "EPLOGS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvArg {
    Prod,
    Staging,
}

impl From<EnvArg> for Environment {
    fn from(env: EnvArg) -> Self {
        match env {
            EnvArg::Prod => Environment::Prod,
            EnvArg::Staging => Environment::Staging,
        }
    }
}

/// Identifier the endpoint identity is resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityTarget {
    Endpoint(String),
    Project(String),
}

/// What the invocation looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Identity(IdentityTarget),
    Query(String),
}

impl Cli {
    pub fn environment(&self) -> Environment {
        self.env.into()
    }

    pub fn target(&self) -> Target {
        match (&self.query, &self.endpoint, &self.project) {
            (Some(query), _, _) => Target::Query(query.clone()),
            (None, Some(endpoint), _) => {
                Target::Identity(IdentityTarget::Endpoint(endpoint.clone()))
            }
            // the `target` group is required, so the project is set here
            (None, None, project) => Target::Identity(IdentityTarget::Project(
                project.clone().unwrap_or_default(),
            )),
        }
    }

    /// Services picked on the command line, as given. No flag means none.
    pub fn selection(&self) -> LogSelection {
        LogSelection {
            pageserver: self.pageserver,
            safekeeper: self.safekeeper,
            compute: self.compute,
            connection_pooler: self.pooler,
            proxy: self.proxy,
        }
    }

    pub fn time_range(&self, now: NaiveDateTime) -> Result<TimeRange, RangeError> {
        let to = self.to.unwrap_or(now);
        match self.from {
            Some(from) => TimeRange::new(from, to, self.limit),
            None => TimeRange::ending_at(to, DEFAULT_WINDOW_MINUTES, self.limit),
        }
    }
}

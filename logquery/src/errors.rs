use std::io;
use std::process::ExitStatus;
use std::string::FromUtf8Error;

/// Errors raised while running a query through the log executor.
#[derive(thiserror::Error, Debug)]
pub enum ExecutionError {
    #[error("log query command is empty")]
    EmptyCommand,

    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("log query failed ({status}): {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("log query returned invalid output: {0}")]
    InvalidOutput(#[from] FromUtf8Error),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("invalid timestamp {0:?}, expected YYYY-MM-DD HH:MM:SS or RFC 3339")]
    InvalidTimestamp(String),

    #[error("time range is empty: {from} is not before {to}")]
    Empty { from: String, to: String },

    #[error("limit must be greater than zero")]
    ZeroLimit,

    #[error("a {minutes} minute window ending at {to} is out of range")]
    OutOfRange { to: String, minutes: i64 },
}

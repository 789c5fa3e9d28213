//! Top-level error type and exit codes.

use std::io;

use thiserror::Error;

use crate::api::ApiError;

/// Exit codes (sysexits.h compatible where one fits).
pub mod exitcode {
    pub const OK: i32 = 0;
    /// Remote service rejected the request
    pub const API: i32 = 1;
    /// Command line usage error
    pub const USAGE: i32 = 64;
    /// Service unavailable (transport / decoding failure)
    pub const UNAVAILABLE: i32 = 69;
    /// Input/output error
    pub const IOERR: i32 = 74;
    /// Configuration error
    pub const CONFIG: i32 = 78;
}

/// Every way a single invocation can fail.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment missing or invalid.
    #[error("{0}")]
    Config(String),

    /// Missing/unknown action or missing required flag. Carries the usage text.
    #[error("{0}")]
    Usage(String),

    /// A flag value clap could not parse. Carries clap's rendered error.
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => exitcode::CONFIG,
            CliError::Usage(_) | CliError::Parse(_) => exitcode::USAGE,
            CliError::Api(ApiError::Api { .. }) => exitcode::API,
            CliError::Api(ApiError::Generic(_)) => exitcode::UNAVAILABLE,
            CliError::Io(_) => exitcode::IOERR,
        }
    }
}

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a run before (or instead of) downloading anything.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("{} exists but is not a directory", .0.display())]
    #[diagnostic(code(riptok::not_a_directory))]
    NotADirectory(PathBuf),

    #[error("Unknown timezone code '{0}'")]
    #[diagnostic(
        code(riptok::unknown_timezone),
        help("Use UTC or an IANA timezone name such as Europe/Berlin")
    )]
    UnknownTimezone(String),

    #[error("Invalid delay window: min {min}s, max {max}s")]
    #[diagnostic(
        code(riptok::invalid_delay),
        help("Delays must be finite, non-negative, and min must not exceed max")
    )]
    InvalidDelay { min: f64, max: f64 },

    #[error("Timestamp {0} cannot be represented as a date")]
    TimestampOutOfRange(i64),

    #[error("{program} did run but was not successful ({status})")]
    CommandFailed {
        program: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("Could not format timestamp")]
    Format(#[from] time::error::Format),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

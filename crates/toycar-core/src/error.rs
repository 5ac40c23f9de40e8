//! Error types for the toycar core.

use std::{fmt, path::PathBuf};

/// Result type for toycar core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the motion model or feeding it input.
///
/// The motion model itself never fails; these only surface at the edges
/// where untrusted names and files come in.
#[derive(Debug)]
pub enum Error {
    /// A control token outside the closed set.
    UnknownControl {
        /// The rejected token.
        token: String,
    },
    /// A motion parameter that is not usable.
    InvalidParams {
        /// Name of the offending field.
        field: &'static str,
        /// Description of what was wrong.
        detail: String,
    },
    /// Reading or parsing a params file failed.
    Config {
        /// The file being loaded.
        path: PathBuf,
        /// The error message.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownControl { token } => write!(f, "unknown control token '{token}'"),
            Error::InvalidParams { field, detail } => {
                write!(f, "invalid motion parameter {field}: {detail}")
            }
            Error::Config { path, message } => {
                write!(f, "failed to load params from {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}

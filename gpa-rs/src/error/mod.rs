use core::{error, fmt};

use crate::kernel::{ConfigError, ExecInvariantViolation};

/// Errors raised by the free-function API of gpa-rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter or buffer shape violated a precondition.
    InvalidParameter {
        /// Explaining which parameter is invalid and why.
        reason: String,
    },
    /// Phase unwrapping met a step whose direction cannot be resolved.
    UnwrapAmbiguous {
        /// Index of the later sample of the ambiguous pair.
        index: usize,
    },
    /// The local frequency field is zero (or not finite) at `index`.
    DegenerateFrequency {
        /// Offending sample index.
        index: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter { reason } => write!(f, "Invalid parameter: {reason}"),
            Error::UnwrapAmbiguous { index } => {
                write!(f, "Ambiguous phase unwrap at sample {index}")
            }
            Error::DegenerateFrequency { index } => {
                write!(f, "Degenerate local frequency at sample {index}")
            }
        }
    }
}

impl error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        Error::InvalidParameter {
            reason: value.to_string(),
        }
    }
}

impl From<ExecInvariantViolation> for Error {
    fn from(value: ExecInvariantViolation) -> Self {
        match value {
            ExecInvariantViolation::UnwrapAmbiguous { index } => Error::UnwrapAmbiguous { index },
            ExecInvariantViolation::DegenerateFrequency { index } => {
                Error::DegenerateFrequency { index }
            }
            ExecInvariantViolation::Config(err) => err.into(),
            other => Error::InvalidParameter {
                reason: other.to_string(),
            },
        }
    }
}

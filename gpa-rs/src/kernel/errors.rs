use core::fmt;

/// Validation errors raised when a kernel is built from its config or when an
/// adapter is bound to a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// Two buffers that must share a length do not.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            ConfigError::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failures raised while a validated kernel runs over concrete buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// An input or output buffer had the wrong length.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// A wrapped phase step was too close to `pi` to pick a direction.
    UnwrapAmbiguous {
        /// Index of the later sample of the ambiguous pair.
        index: usize,
    },
    /// The local frequency at `index` was zero (or not finite), so no strain
    /// can be derived from it.
    DegenerateFrequency {
        /// Offending sample index.
        index: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::UnwrapAmbiguous { index } => {
                write!(f, "Phase step into sample {index} is ambiguous (|step| ~ pi).")
            }
            ExecInvariantViolation::DegenerateFrequency { index } => {
                write!(f, "Local frequency at sample {index} is zero or not finite.")
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ExecInvariantViolation};

    #[test]
    fn config_error_wraps_into_exec_violation() {
        let err: ExecInvariantViolation = ConfigError::EmptyInput { arg: "signal" }.into();
        assert_eq!(
            err,
            ExecInvariantViolation::Config(ConfigError::EmptyInput { arg: "signal" })
        );
        assert_eq!(err.to_string(), "Input `signal` was empty.");
    }

    #[test]
    fn numeric_conditions_name_the_sample() {
        let err = ExecInvariantViolation::DegenerateFrequency { index: 17 };
        assert!(err.to_string().contains("17"));
        let err = ExecInvariantViolation::UnwrapAmbiguous { index: 3 };
        assert!(err.to_string().contains("sample 3"));
    }
}

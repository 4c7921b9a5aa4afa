use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
///
/// All parameter checks happen here, so a constructed kernel can only fail at
/// run time on properties of the buffers it is handed.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Reject a periodicity that is zero or not finite.
pub(crate) fn check_periodicity(arg: &'static str, g: f64) -> Result<(), ConfigError> {
    if !g.is_finite() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "periodicity must be finite",
        });
    }
    if g == 0.0 {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "periodicity must be non-zero",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_periodicity, ConfigError, KernelLifecycle};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct ReciprocalConfig {
        g: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct ReciprocalKernel {
        frequency: f64,
    }

    impl KernelLifecycle for ReciprocalKernel {
        type Config = ReciprocalConfig;

        fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
            check_periodicity("g", config.g)?;
            Ok(Self {
                frequency: 1.0 / config.g,
            })
        }
    }

    #[test]
    fn lifecycle_constructor_accepts_valid_config() {
        let kernel = ReciprocalKernel::try_new(ReciprocalConfig { g: 4.0 }).expect("valid config");
        assert_eq!(kernel.frequency, 0.25);
    }

    #[test]
    fn lifecycle_constructor_rejects_invalid_config() {
        let err = ReciprocalKernel::try_new(ReciprocalConfig { g: 0.0 }).expect_err("zero g");
        assert_eq!(
            err,
            ConfigError::InvalidArgument {
                arg: "g",
                reason: "periodicity must be non-zero",
            }
        );
        assert!(ReciprocalKernel::try_new(ReciprocalConfig { g: f64::NAN }).is_err());
    }
}

//! Relative strain against a reference periodicity.

use crate::error::Error;
use crate::kernel::{
    bind_output, check_periodicity, read_nonempty, ConfigError, ExecInvariantViolation,
    KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::Strain1D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constructor config for [`StrainKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrainConfig {
    /// Reference (unstrained) periodicity in samples. Must be non-zero.
    pub g: f64,
    /// Frequencies with magnitude at or below this are degenerate.
    pub min_abs_frequency: f64,
}

impl StrainConfig {
    /// Config rejecting only exactly-zero frequencies.
    pub fn new(g: f64) -> Self {
        Self {
            g,
            min_abs_frequency: 0.0,
        }
    }
}

/// Trait-first strain kernel: `strain = (1/g - f) / f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainKernel {
    reference_frequency: f64,
    min_abs_frequency: f64,
}

impl StrainKernel {
    /// Return `1/g`.
    pub fn reference_frequency(&self) -> f64 {
        self.reference_frequency
    }

    fn strain_into(&self, frequency: &[f64], out: &mut [f64]) -> Result<(), ExecInvariantViolation> {
        for (index, (s, &f)) in out.iter_mut().zip(frequency.iter()).enumerate() {
            if !f.is_finite() || f.abs() <= self.min_abs_frequency {
                return Err(ExecInvariantViolation::DegenerateFrequency { index });
            }
            *s = (self.reference_frequency - f) / f;
        }
        Ok(())
    }
}

impl KernelLifecycle for StrainKernel {
    type Config = StrainConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        check_periodicity("g", config.g)?;
        if !config.min_abs_frequency.is_finite() || config.min_abs_frequency < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "min_abs_frequency",
                reason: "min_abs_frequency must be finite and >= 0",
            });
        }
        Ok(Self {
            reference_frequency: 1.0 / config.g,
            min_abs_frequency: config.min_abs_frequency,
        })
    }
}

impl Strain1D<f64> for StrainKernel {
    fn run_into<I, O>(&self, frequency: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let frequency = read_nonempty(frequency, "frequency")?;
        let out = bind_output(out, "out", frequency.len())?;
        self.strain_into(frequency, out)
    }

    fn run_alloc<I>(&self, frequency: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let frequency = read_nonempty(frequency, "frequency")?;
        let mut out = vec![0.0; frequency.len()];
        self.strain_into(frequency, &mut out)?;
        Ok(out)
    }
}

/// Relative strain of a local frequency field against reference periodicity
/// `g`.
pub fn strain_1d(frequency: &[f64], g: f64) -> Result<Vec<f64>, Error> {
    let kernel = StrainKernel::try_new(StrainConfig::new(g))?;
    Ok(kernel.run_alloc(frequency)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reference_frequency_has_zero_strain() {
        let strain = strain_1d(&[0.25; 16], 4.0).expect("valid input");
        strain
            .iter()
            .for_each(|s| assert_abs_diff_eq!(*s, 0.0, epsilon = 1e-15));
    }

    #[test]
    fn stretched_periodicity_has_negative_strain() {
        // Periodicity 5 against reference 4: (0.25 - 0.2) / 0.2.
        let strain = strain_1d(&[0.2, 0.25, 1.0 / 3.0], 4.0).expect("valid input");
        assert_abs_diff_eq!(strain[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(strain[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(strain[2], -0.25, epsilon = 1e-12);
    }

    #[test]
    fn zero_frequency_is_degenerate() {
        let err = strain_1d(&[0.25, 0.0, 0.25], 4.0).expect_err("zero frequency");
        assert_eq!(err, Error::DegenerateFrequency { index: 1 });

        let kernel = StrainKernel::try_new(StrainConfig {
            g: 4.0,
            min_abs_frequency: 1e-3,
        })
        .expect("valid config");
        let err = kernel
            .run_alloc(&[0.25, 0.25, -5e-4])
            .expect_err("near-zero frequency");
        assert_eq!(err, ExecInvariantViolation::DegenerateFrequency { index: 2 });
        assert!(kernel.run_alloc(&[0.25, f64::NAN]).is_err());
    }

    #[test]
    fn strain_validates_config_and_shapes() {
        assert!(matches!(
            strain_1d(&[0.25], 0.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(StrainKernel::try_new(StrainConfig {
            g: 4.0,
            min_abs_frequency: -1.0,
        })
        .is_err());

        let kernel = StrainKernel::try_new(StrainConfig::new(4.0)).expect("valid config");
        assert_eq!(kernel.reference_frequency(), 0.25);
        let mut out = [0.0; 2];
        let err = kernel
            .run_into(&[0.25, 0.25, 0.25], &mut out)
            .expect_err("short output");
        assert!(matches!(err, ExecInvariantViolation::LengthMismatch { .. }));
    }
}

//! Error fields against a known two-regime ground truth.
//!
//! The reference signal is unstrained at periodicity `g` over its first half
//! and strained to `g + delta_g` over the rest. The split sits at
//! `floor(len / 2)`, so an odd-length field puts its middle sample in the
//! strained half.

use crate::error::Error;
use crate::kernel::{
    bind_output, check_periodicity, read_nonempty, ConfigError, ExecInvariantViolation,
    KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::ReferenceError1D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ground-truth parameters shared by the error kernels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceConfig {
    /// Periodicity of the unstrained half.
    pub g: f64,
    /// Periodicity change of the strained half.
    pub delta_g: f64,
}

impl ReferenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_periodicity("g", self.g)?;
        if !self.delta_g.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "delta_g",
                reason: "delta_g must be finite",
            });
        }
        if self.g + self.delta_g == 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "delta_g",
                reason: "strained periodicity g + delta_g must be non-zero",
            });
        }
        Ok(())
    }
}

/// Expected value on each side of the split.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TwoRegime {
    first: f64,
    second: f64,
}

impl TwoRegime {
    fn abs_error_into(&self, field: &[f64], out: &mut [f64]) {
        let half = field.len() / 2;
        let (head, tail) = out.split_at_mut(half);
        head.iter_mut()
            .zip(&field[..half])
            .for_each(|(e, v)| *e = (v - self.first).abs());
        tail.iter_mut()
            .zip(&field[half..])
            .for_each(|(e, v)| *e = (v - self.second).abs());
    }

    fn run_into<I, O>(&self, field: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let field = read_nonempty(field, "field")?;
        let out = bind_output(out, "out", field.len())?;
        self.abs_error_into(field, out);
        Ok(())
    }

    fn run_alloc<I>(&self, field: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let field = read_nonempty(field, "field")?;
        let mut out = vec![0.0; field.len()];
        self.abs_error_into(field, &mut out);
        Ok(out)
    }
}

/// Absolute error of a local frequency field against `1/g` and `1/(g+delta_g)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyErrorKernel {
    expected: TwoRegime,
}

impl FrequencyErrorKernel {
    /// Expected frequencies of the unstrained and strained halves.
    pub fn expected(&self) -> (f64, f64) {
        (self.expected.first, self.expected.second)
    }
}

impl KernelLifecycle for FrequencyErrorKernel {
    type Config = ReferenceConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            expected: TwoRegime {
                first: 1.0 / config.g,
                second: 1.0 / (config.g + config.delta_g),
            },
        })
    }
}

impl ReferenceError1D<f64> for FrequencyErrorKernel {
    fn run_into<I, O>(&self, field: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        self.expected.run_into(field, out)
    }

    fn run_alloc<I>(&self, field: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        self.expected.run_alloc(field)
    }
}

/// Absolute error of a strain field against `0` and `-delta_g/(g+delta_g)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainErrorKernel {
    expected: TwoRegime,
}

impl StrainErrorKernel {
    /// Expected strain of the unstrained and strained halves.
    pub fn expected(&self) -> (f64, f64) {
        (self.expected.first, self.expected.second)
    }
}

impl KernelLifecycle for StrainErrorKernel {
    type Config = ReferenceConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            expected: TwoRegime {
                first: 0.0,
                second: -config.delta_g / (config.g + config.delta_g),
            },
        })
    }
}

impl ReferenceError1D<f64> for StrainErrorKernel {
    fn run_into<I, O>(&self, field: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        self.expected.run_into(field, out)
    }

    fn run_alloc<I>(&self, field: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        self.expected.run_alloc(field)
    }
}

/// Pointwise absolute error of a local frequency field against the
/// two-regime reference.
pub fn error_gpa_1d(field: &[f64], g: f64, delta_g: f64) -> Result<Vec<f64>, Error> {
    let kernel = FrequencyErrorKernel::try_new(ReferenceConfig { g, delta_g })?;
    Ok(kernel.run_alloc(field)?)
}

/// Pointwise absolute error of a strain field against the two-regime
/// reference.
pub fn error_strain_1d(strain: &[f64], g: f64, delta_g: f64) -> Result<Vec<f64>, Error> {
    let kernel = StrainErrorKernel::try_new(ReferenceConfig { g, delta_g })?;
    Ok(kernel.run_alloc(strain)?)
}

/// Aggregate statistics of an error field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorSummary {
    /// Mean absolute error.
    pub mean: f64,
    /// Root mean square error.
    pub rms: f64,
    /// Largest error.
    pub max: f64,
}

impl ErrorSummary {
    /// Summarize `errors`; `None` when empty.
    pub fn from_errors(errors: &[f64]) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let n = errors.len() as f64;
        let (sum, sum_sq, max) = errors.iter().fold(
            (0.0, 0.0, f64::NEG_INFINITY),
            |(sum, sum_sq, max), &e| (sum + e, sum_sq + e * e, max.max(e)),
        );
        Some(Self {
            mean: sum / n,
            rms: (sum_sq / n).sqrt(),
            max,
        })
    }
}

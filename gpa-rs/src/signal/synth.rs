//! Synthetic two-regime sine signals with phase noise.

use crate::error::Error;
use crate::kernel::{
    bind_output, check_periodicity, ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D,
};
use crate::signal::traits::Synthesize1D;
use core::f64::consts::PI;
use rand::Rng;
use rand_distr::{Distribution, Normal};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constructor config for [`SineKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SineConfig {
    /// Extent of the sampled axis; `len + 1` samples cover `0..=len`.
    pub len: usize,
    /// Periodicity of the first half, in samples.
    pub g: f64,
    /// Periodicity change applied to the second half.
    pub delta_g: f64,
    /// Standard deviation of the Gaussian phase noise.
    pub noise: f64,
}

/// Trait-first generator of `sin(2 pi x / g + n_x)` over `x = 0..=len`,
/// switching to periodicity `g + delta_g` from `x = floor(len / 2)` on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineKernel {
    len: usize,
    g: f64,
    strained_g: f64,
    noise: Option<Normal<f64>>,
}

impl SineKernel {
    /// Index of the first sample using the strained periodicity.
    pub fn split(&self) -> usize {
        self.len / 2
    }

    fn fill<R>(&self, rng: &mut R, out: &mut [f64])
    where
        R: Rng + ?Sized,
    {
        let split = self.split();
        for (x, sample) in out.iter_mut().enumerate() {
            let g = if x < split { self.g } else { self.strained_g };
            let n = match &self.noise {
                Some(dist) => dist.sample(rng),
                None => 0.0,
            };
            *sample = (2.0 * PI * x as f64 / g + n).sin();
        }
        tracing::trace!(
            samples = out.len(),
            split,
            noisy = self.noise.is_some(),
            "sine synthesized"
        );
    }
}

impl KernelLifecycle for SineKernel {
    type Config = SineConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "array length must be at least 1",
            });
        }
        check_periodicity("g", config.g)?;
        let strained_g = config.g + config.delta_g;
        if !strained_g.is_finite() || strained_g == 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "delta_g",
                reason: "strained periodicity g + delta_g must be finite and non-zero",
            });
        }
        if !config.noise.is_finite() || config.noise < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "noise",
                reason: "noise must be finite and >= 0",
            });
        }
        let noise = if config.noise > 0.0 {
            Some(
                Normal::new(0.0, config.noise).map_err(|_| ConfigError::InvalidArgument {
                    arg: "noise",
                    reason: "noise is not a valid standard deviation",
                })?,
            )
        } else {
            None
        };
        Ok(Self {
            len: config.len,
            g: config.g,
            strained_g,
            noise,
        })
    }
}

impl Synthesize1D<f64> for SineKernel {
    fn output_len(&self) -> usize {
        self.len + 1
    }

    fn run_into<R, O>(&self, rng: &mut R, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        R: Rng + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let out = bind_output(out, "out", self.output_len())?;
        self.fill(rng, out);
        Ok(())
    }

    fn run_alloc<R>(&self, rng: &mut R) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        R: Rng + ?Sized,
    {
        let mut out = vec![0.0; self.output_len()];
        self.fill(rng, &mut out);
        Ok(out)
    }
}

/// Sine of periodicity `g` over the first half of `0..=len` and `g + delta_g`
/// over the rest, with Gaussian phase noise of standard deviation `noise`.
pub fn sine_1d<R>(
    len: usize,
    g: f64,
    delta_g: f64,
    noise: f64,
    rng: &mut R,
) -> Result<Vec<f64>, Error>
where
    R: Rng + ?Sized,
{
    let kernel = SineKernel::try_new(SineConfig {
        len,
        g,
        delta_g,
        noise,
    })?;
    Ok(kernel.run_alloc(rng)?)
}

//! Trait-first kernels for frequency-domain mask generation.

use crate::kernel::{bind_output, ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D};
use crate::signal::traits::MaskGenerate1D;
use nalgebra::RealField;
use num_traits::FromPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constructor config for [`GaussianMaskKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianMaskConfig<F> {
    /// Mask length; equals the length of the spectrum it weights.
    pub len: usize,
    /// Center of the bump as a (possibly fractional) index into the centered
    /// spectrum.
    pub center: F,
    /// Width of the bump. Must be non-zero.
    pub sigma: F,
    /// Peak weight.
    pub amplitude: F,
}

impl<F> GaussianMaskConfig<F>
where
    F: RealField + Copy,
{
    /// Unit-amplitude mask config.
    pub fn unit(len: usize, center: F, sigma: F) -> Self {
        Self {
            len,
            center,
            sigma,
            amplitude: F::one(),
        }
    }
}

/// Trait-first Gaussian bump generator.
///
/// Produces `mask[i] = a * exp(-0.5 * (i - center)^2 / sigma^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianMaskKernel<F> {
    len: usize,
    center: F,
    sigma: F,
    amplitude: F,
    half: F,
}

impl<F> GaussianMaskKernel<F>
where
    F: RealField + Copy,
{
    /// Return configured mask length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; zero-length masks are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return configured center.
    pub fn center(&self) -> F {
        self.center
    }

    /// Return configured width.
    pub fn sigma(&self) -> F {
        self.sigma
    }

    pub(super) fn weight(&self, x: F) -> F {
        let d = (x - self.center) / self.sigma;
        self.amplitude * (-(self.half * d * d)).exp()
    }

    fn fill(&self, out: &mut [F]) {
        let mut x = F::zero();
        for w in out.iter_mut() {
            *w = self.weight(x);
            x += F::one();
        }
    }
}

impl<F> KernelLifecycle for GaussianMaskKernel<F>
where
    F: RealField + Copy + FromPrimitive,
{
    type Config = GaussianMaskConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len < 1 {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "mask length must be at least 1",
            });
        }
        if config.sigma == F::zero() {
            return Err(ConfigError::InvalidArgument {
                arg: "sigma",
                reason: "sigma must be non-zero",
            });
        }
        if !config.sigma.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "sigma",
                reason: "sigma must be finite",
            });
        }
        if !config.center.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "center",
                reason: "center must be finite",
            });
        }
        if !config.amplitude.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "amplitude",
                reason: "amplitude must be finite",
            });
        }
        let half = F::from_f64(0.5).ok_or(ConfigError::InvalidArgument {
            arg: "sigma",
            reason: "scalar conversion failed",
        })?;

        Ok(Self {
            len: config.len,
            center: config.center,
            sigma: config.sigma,
            amplitude: config.amplitude,
            half,
        })
    }
}

impl<F> MaskGenerate1D<F> for GaussianMaskKernel<F>
where
    F: RealField + Copy,
{
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<F> + ?Sized,
    {
        let out = bind_output(out, "out", self.len)?;
        self.fill(out);
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<F>, ExecInvariantViolation> {
        let mut out = vec![F::zero(); self.len];
        self.fill(&mut out);
        Ok(out)
    }
}

//! One-dimensional phase unwrapping.
//!
//! Unwrapping assumes the true phase never moves by more than `pi` between
//! neighbouring samples. Faster phase ramps are indistinguishable from their
//! wrapped counterparts and are silently folded; [`UnwrapPolicy`] chooses
//! whether steps close to that limit are accepted or reported.

use crate::error::Error;
use crate::kernel::{
    bind_output, read_nonempty, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use crate::signal::traits::PhaseUnwrap1D;
use itertools::Itertools;
use nalgebra::RealField;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do with a wrapped step whose direction cannot be told apart.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnwrapPolicy<F> {
    /// Unwrap every step, taking `|step| <= pi` as the true motion.
    Accept,
    /// Fail with [`ExecInvariantViolation::UnwrapAmbiguous`] when a wrapped
    /// step lies within `margin` of `pi`.
    RejectAmbiguous {
        /// Distance from `pi` under which a step is ambiguous.
        margin: F,
    },
}

/// Constructor config for [`UnwrapKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnwrapConfig<F> {
    /// Minimum raw step that is treated as a wrap. Values below `pi` act as
    /// `pi`.
    pub discont: F,
    /// Ambiguity handling.
    pub policy: UnwrapPolicy<F>,
}

impl<F> Default for UnwrapConfig<F>
where
    F: RealField + Copy,
{
    fn default() -> Self {
        Self {
            discont: F::pi(),
            policy: UnwrapPolicy::Accept,
        }
    }
}

/// Trait-first 1D phase unwrapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnwrapKernel<F> {
    discont: F,
    policy: UnwrapPolicy<F>,
}

impl<F> UnwrapKernel<F>
where
    F: RealField + Copy,
{
    /// Return the effective discontinuity threshold.
    pub fn discont(&self) -> F {
        self.discont
    }

    /// Return the configured ambiguity policy.
    pub fn policy(&self) -> UnwrapPolicy<F> {
        self.policy
    }

    /// Map a raw step into `[-pi, pi]`, keeping `+pi` for positive steps.
    fn wrap_step(step: F) -> F {
        let pi = F::pi();
        let two_pi = F::two_pi();
        let mut shifted = (step + pi) % two_pi;
        if shifted < F::zero() {
            shifted += two_pi;
        }
        let wrapped = shifted - pi;
        if wrapped == -pi && step > F::zero() {
            pi
        } else {
            wrapped
        }
    }

    fn unwrap_slice(&self, wrapped: &[F], out: &mut [F]) -> Result<(), ExecInvariantViolation> {
        let pi = F::pi();
        let mut correction = F::zero();
        let mut jumps = 0usize;
        out[0] = wrapped[0];
        for (i, (prev, next)) in wrapped.iter().copied().tuple_windows().enumerate() {
            let index = i + 1;
            let step = next - prev;
            let step_wrapped = Self::wrap_step(step);
            if let UnwrapPolicy::RejectAmbiguous { margin } = self.policy {
                if pi - step_wrapped.abs() <= margin {
                    return Err(ExecInvariantViolation::UnwrapAmbiguous { index });
                }
            }
            if step.abs() >= self.discont {
                correction += step_wrapped - step;
                jumps += 1;
            }
            out[index] = next + correction;
        }
        tracing::trace!(len = wrapped.len(), jumps, "phase unwrapped");
        Ok(())
    }
}

impl<F> KernelLifecycle for UnwrapKernel<F>
where
    F: RealField + Copy,
{
    type Config = UnwrapConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !config.discont.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "discont",
                reason: "discont must be finite",
            });
        }
        if let UnwrapPolicy::RejectAmbiguous { margin } = config.policy {
            if !margin.is_finite() || margin < F::zero() || margin >= F::pi() {
                return Err(ConfigError::InvalidArgument {
                    arg: "margin",
                    reason: "margin must be in [0, pi)",
                });
            }
        }
        Ok(Self {
            discont: config.discont.max(F::pi()),
            policy: config.policy,
        })
    }
}

impl<F> PhaseUnwrap1D<F> for UnwrapKernel<F>
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, wrapped: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let wrapped = read_nonempty(wrapped, "wrapped")?;
        let out = bind_output(out, "out", wrapped.len())?;
        self.unwrap_slice(wrapped, out)
    }

    fn run_alloc<I>(&self, wrapped: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let wrapped = read_nonempty(wrapped, "wrapped")?;
        let mut out = vec![F::zero(); wrapped.len()];
        self.unwrap_slice(wrapped, &mut out)?;
        Ok(out)
    }
}

/// Unwrap `wrapped` with the default threshold, accepting every step.
pub fn unwrap_phase<F>(wrapped: &[F]) -> Result<Vec<F>, Error>
where
    F: RealField + Copy,
{
    let kernel = UnwrapKernel::try_new(UnwrapConfig::default())?;
    Ok(kernel.run_alloc(wrapped)?)
}

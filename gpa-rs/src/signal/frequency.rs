//! Local frequency fields from unwrapped phase.

use crate::error::Error;
use crate::kernel::{
    bind_output, read_nonempty, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use crate::signal::moire::MoireCorrection;
use crate::signal::phase::{PhaseExtractConfig, PhaseExtractKernel};
use crate::signal::traits::{LocalFrequency1D, PhaseExtract1D};
use nalgebra::RealField;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Numerical derivative with central differences inside and first-order
/// one-sided differences at both ends. `x` must hold at least two samples.
fn gradient_slice<F>(x: &[F], out: &mut [F])
where
    F: RealField + Copy,
{
    let n = x.len();
    let two = F::one() + F::one();
    out[0] = x[1] - x[0];
    out[1..n - 1]
        .iter_mut()
        .zip(x.windows(3))
        .for_each(|(d, w)| *d = (w[2] - w[0]) / two);
    out[n - 1] = x[n - 1] - x[n - 2];
}

fn check_gradient_len(len: usize) -> Result<(), ExecInvariantViolation> {
    if len < 2 {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "gradient needs at least 2 samples",
        });
    }
    Ok(())
}

/// Numerical derivative of `x` with unit sample spacing.
pub fn gradient<F>(x: &[F]) -> Result<Vec<F>, Error>
where
    F: RealField + Copy,
{
    check_gradient_len(x.len())?;
    let mut out = vec![F::zero(); x.len()];
    gradient_slice(x, &mut out);
    Ok(out)
}

/// Constructor config for [`LocalFrequencyKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalFrequencyConfig {
    /// Reference periodicity whose aliasing is undone, if any.
    pub moire_periodicity: Option<f64>,
}

/// Trait-first phase-to-frequency kernel.
///
/// Returns `gradient(phase) / 2pi` in cycles per sample, shifted back into
/// the true band when a Moiré periodicity is configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrequencyKernel {
    correction: MoireCorrection,
}

impl LocalFrequencyKernel {
    /// Return the aliasing correction applied to every sample.
    pub fn correction(&self) -> MoireCorrection {
        self.correction
    }

    fn scale_into(&self, phase: &[f64], out: &mut [f64]) {
        gradient_slice(phase, out);
        let offset = self.correction.frequency_offset();
        let inv_two_pi = 1.0 / (2.0 * core::f64::consts::PI);
        out.iter_mut().for_each(|f| *f = *f * inv_two_pi + offset);
    }
}

impl KernelLifecycle for LocalFrequencyKernel {
    type Config = LocalFrequencyConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let correction = match config.moire_periodicity {
            Some(g) => MoireCorrection::from_periodicity(g)?,
            None => MoireCorrection::Unaliased,
        };
        Ok(Self { correction })
    }
}

impl LocalFrequency1D<f64> for LocalFrequencyKernel {
    fn run_into<I, O>(&self, phase: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let phase = read_nonempty(phase, "phase")?;
        check_gradient_len(phase.len())?;
        let out = bind_output(out, "out", phase.len())?;
        self.scale_into(phase, out);
        Ok(())
    }

    fn run_alloc<I>(&self, phase: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let phase = read_nonempty(phase, "phase")?;
        check_gradient_len(phase.len())?;
        let mut out = vec![0.0; phase.len()];
        self.scale_into(phase, &mut out);
        Ok(out)
    }
}

/// Geometrical phase analysis of `signal`: the local frequency, in cycles per
/// sample, of the harmonic selected by `mask`.
pub fn gpa(signal: &[f64], mask: &[f64]) -> Result<Vec<f64>, Error> {
    let extractor = PhaseExtractKernel::try_new(PhaseExtractConfig::default())?;
    let phase = extractor.run_alloc(signal, mask)?;
    let kernel = LocalFrequencyKernel::try_new(LocalFrequencyConfig::default())?;
    Ok(kernel.run_alloc(&phase)?)
}

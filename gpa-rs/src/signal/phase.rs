//! Phase extraction of one masked harmonic.
//!
//! The signal is transformed into a centered spectrum, weighted by a mask
//! around one harmonic, transformed back, and the argument of the resulting
//! complex signal is unwrapped into a continuous phase field.

use crate::error::Error;
use crate::kernel::{
    read_nonempty, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::fft::{centered_spectrum, centered_spectrum_complex, inverse_centered};
use crate::signal::traits::{PhaseExtract1D, PhaseUnwrap1D};
use crate::signal::unwrap::{UnwrapConfig, UnwrapKernel};

pub use rustfft::num_complex::Complex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constructor config for [`PhaseExtractKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseExtractConfig {
    /// Unwrapping of the extracted phase.
    pub unwrap: UnwrapConfig<f64>,
}

/// Trait-first masked-harmonic phase extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseExtractKernel {
    unwrap: UnwrapKernel<f64>,
}

impl PhaseExtractKernel {
    /// Return the unwrapper used on the extracted phase.
    pub fn unwrapper(&self) -> &UnwrapKernel<f64> {
        &self.unwrap
    }

    /// Apply `mask` to the centered spectrum of a real `signal` and return the
    /// complex inverse transform.
    pub fn isolate<I, M>(
        &self,
        signal: &I,
        mask: &M,
    ) -> Result<Vec<Complex<f64>>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        M: Read1D<f64> + ?Sized,
    {
        let signal = read_nonempty(signal, "signal")?;
        let mask = read_mask(mask, signal.len())?;
        Ok(apply_mask(centered_spectrum(signal), mask))
    }

    /// Like [`isolate`](Self::isolate) for a complex (analytic) `signal`.
    pub fn isolate_complex<I, M>(
        &self,
        signal: &I,
        mask: &M,
    ) -> Result<Vec<Complex<f64>>, ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
        M: Read1D<f64> + ?Sized,
    {
        let signal = read_nonempty(signal, "signal")?;
        let mask = read_mask(mask, signal.len())?;
        Ok(apply_mask(centered_spectrum_complex(signal.to_vec()), mask))
    }

    /// Wrapped phase, in `(-pi, pi]`, of the masked harmonic of `signal`.
    pub fn wrapped_phase<I, M>(
        &self,
        signal: &I,
        mask: &M,
    ) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        M: Read1D<f64> + ?Sized,
    {
        Ok(angles(&self.isolate(signal, mask)?))
    }

    /// Unwrapped phase of the masked harmonic of a complex `signal`.
    pub fn run_complex_alloc<I, M>(
        &self,
        signal: &I,
        mask: &M,
    ) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
        M: Read1D<f64> + ?Sized,
    {
        let wrapped = angles(&self.isolate_complex(signal, mask)?);
        self.unwrap.run_alloc(&wrapped)
    }
}

fn read_mask<M>(mask: &M, expected: usize) -> Result<&[f64], ExecInvariantViolation>
where
    M: Read1D<f64> + ?Sized,
{
    let mask = mask.read_slice()?;
    if mask.len() != expected {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "mask",
            expected,
            got: mask.len(),
        });
    }
    Ok(mask)
}

fn apply_mask(mut spectrum: Vec<Complex<f64>>, mask: &[f64]) -> Vec<Complex<f64>> {
    spectrum
        .iter_mut()
        .zip(mask.iter())
        .for_each(|(bin, w)| *bin *= *w);
    tracing::trace!(bins = spectrum.len(), "mask applied to centered spectrum");
    inverse_centered(spectrum)
}

fn angles(x: &[Complex<f64>]) -> Vec<f64> {
    x.iter().map(|c| c.arg()).collect()
}

impl KernelLifecycle for PhaseExtractKernel {
    type Config = PhaseExtractConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            unwrap: UnwrapKernel::try_new(config.unwrap)?,
        })
    }
}

impl PhaseExtract1D for PhaseExtractKernel {
    fn run_into<I, M, O>(
        &self,
        signal: &I,
        mask: &M,
        out: &mut O,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        M: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let wrapped = self.wrapped_phase(signal, mask)?;
        self.unwrap.run_into(&wrapped, out)
    }

    fn run_alloc<I, M>(&self, signal: &I, mask: &M) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        M: Read1D<f64> + ?Sized,
    {
        let wrapped = self.wrapped_phase(signal, mask)?;
        self.unwrap.run_alloc(&wrapped)
    }
}

/// Unwrapped phase of the harmonic of `signal` selected by `mask`.
pub fn extract_phase(signal: &[f64], mask: &[f64]) -> Result<Vec<f64>, Error> {
    let kernel = PhaseExtractKernel::try_new(PhaseExtractConfig::default())?;
    Ok(kernel.run_alloc(signal, mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::mask::mask_gaussian_1d;
    use crate::signal::unwrap::UnwrapPolicy;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;

    fn tone(n: usize, g: f64, phi: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * i as f64 / g + phi).sin())
            .collect()
    }

    #[test]
    fn full_pass_mask_reproduces_complex_exponential_phase() {
        let n = 256;
        let f = 0.07;
        let phi0 = 0.4;
        let signal: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::from_polar(1.0, 2.0 * PI * f * i as f64 + phi0))
            .collect();
        let all_pass = vec![1.0; n];
        let kernel =
            PhaseExtractKernel::try_new(PhaseExtractConfig::default()).expect("valid config");
        let phase = kernel
            .run_complex_alloc(&signal, &all_pass)
            .expect("extraction");
        phase.iter().enumerate().for_each(|(i, p)| {
            assert_abs_diff_eq!(*p, 2.0 * PI * f * i as f64 + phi0, epsilon = 1e-9)
        });
    }

    #[test]
    fn masked_tone_has_linear_phase() {
        // 1024 samples of period 4: the positive harmonic sits on bin 768.
        let n = 1024;
        let signal = tone(n, 4.0, 0.0);
        let mask = mask_gaussian_1d(n, 768.0, 10.0).expect("valid mask");
        let phase = extract_phase(&signal, &mask).expect("extraction");
        assert_eq!(phase.len(), n);
        phase
            .windows(2)
            .for_each(|w| assert_abs_diff_eq!(w[1] - w[0], PI / 2.0, epsilon = 1e-9));
    }

    #[test]
    fn isolated_harmonic_is_analytic() {
        let n = 512;
        let signal = tone(n, 8.0, 0.0);
        let mask = mask_gaussian_1d(n, 320.0, 6.0).expect("valid mask");
        let kernel =
            PhaseExtractKernel::try_new(PhaseExtractConfig::default()).expect("valid config");
        let isolated = kernel.isolate(&signal, &mask).expect("isolation");
        // sin = (e^{ix} - e^{-ix}) / 2i keeps one half-amplitude exponential.
        isolated
            .iter()
            .for_each(|c| assert_abs_diff_eq!(c.norm(), 0.5, epsilon = 1e-9));
        let wrapped = kernel.wrapped_phase(&signal, &mask).expect("wrapped");
        assert!(wrapped.iter().all(|p| p.abs() <= PI));
    }

    #[test]
    fn run_into_writes_phase() {
        let n = 64;
        let signal = tone(n, 8.0, 0.0);
        let mask = mask_gaussian_1d(n, 40.0, 3.0).expect("valid mask");
        let kernel =
            PhaseExtractKernel::try_new(PhaseExtractConfig::default()).expect("valid config");
        let mut out = vec![0.0; n];
        kernel
            .run_into(&signal, &mask, &mut out)
            .expect("run_into should succeed");
        let alloc = kernel.run_alloc(&signal, &mask).expect("run_alloc");
        assert_eq!(out, alloc);
    }

    #[test]
    fn mask_shape_must_match_signal() {
        let signal = tone(32, 4.0, 0.0);
        let mask = vec![1.0; 31];
        let kernel =
            PhaseExtractKernel::try_new(PhaseExtractConfig::default()).expect("valid config");
        let err = kernel
            .run_alloc(&signal, &mask)
            .expect_err("mismatched mask");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "mask",
                expected: 32,
                got: 31,
            }
        );
        assert!(matches!(
            extract_phase(&[], &[]),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn strict_unwrap_flags_fast_phase() {
        // Period 2 moves the phase by exactly pi each sample.
        let n = 64;
        let signal: Vec<f64> = (0..n).map(|i| (PI * i as f64 + 0.3).cos()).collect();
        let all_pass = vec![1.0; n];
        let kernel = PhaseExtractKernel::try_new(PhaseExtractConfig {
            unwrap: UnwrapConfig {
                discont: PI,
                policy: UnwrapPolicy::RejectAmbiguous { margin: 1e-6 },
            },
        })
        .expect("valid config");
        assert_eq!(
            kernel.unwrapper().policy(),
            UnwrapPolicy::RejectAmbiguous { margin: 1e-6 }
        );
        assert_eq!(kernel.unwrapper().discont(), PI);
        let err = kernel
            .run_alloc(&signal, &all_pass)
            .expect_err("pi steps are ambiguous");
        assert!(matches!(err, ExecInvariantViolation::UnwrapAmbiguous { .. }));
    }
}

//! End-to-end geometrical phase analysis of a 1D signal.
//!
//! [`GpaKernel`] chains the stages: Gaussian mask around the reference
//! harmonic, phase extraction, local frequency (with optional Moiré
//! correction), strain against the reference periodicity, and error fields
//! against the two-regime ground truth.

use crate::error::Error;
use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::frequency::{LocalFrequencyConfig, LocalFrequencyKernel};
use crate::signal::mask::{reference_position, GaussianMaskConfig, GaussianMaskKernel};
use crate::signal::metrics::{
    ErrorSummary, FrequencyErrorKernel, ReferenceConfig, StrainErrorKernel,
};
use crate::signal::phase::{PhaseExtractConfig, PhaseExtractKernel};
use crate::signal::strain::{StrainConfig, StrainKernel};
use crate::signal::synth::{SineConfig, SineKernel};
use crate::signal::traits::{
    LocalFrequency1D, MaskGenerate1D, PhaseExtract1D, ReferenceError1D, Strain1D, Synthesize1D,
};
use crate::signal::unwrap::UnwrapConfig;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constructor config for [`GpaKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpaConfig {
    /// Reference periodicity in samples.
    pub g: f64,
    /// Periodicity change of the strained half, used by the error fields.
    pub delta_g: f64,
    /// Mask width in Fourier bins.
    pub sigma: f64,
    /// Mask center in centered-spectrum bins. `None` places it on
    /// [`reference_position`].
    pub center: Option<f64>,
    /// Shift the frequency field out of the aliased band when `g < 2`.
    pub moire: bool,
    /// Phase unwrapping settings.
    pub unwrap: UnwrapConfig<f64>,
}

impl Default for GpaConfig {
    fn default() -> Self {
        Self {
            g: 4.0,
            delta_g: 0.0,
            sigma: 10.0,
            center: None,
            moire: true,
            unwrap: UnwrapConfig::default(),
        }
    }
}

/// Every intermediate field of one analysis run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GpaReport {
    /// Analyzed signal.
    pub signal: Vec<f64>,
    /// Gaussian weights applied to the centered spectrum.
    pub mask: Vec<f64>,
    /// Center actually used for the mask.
    pub mask_center: f64,
    /// Unwrapped phase of the isolated harmonic.
    pub phase: Vec<f64>,
    /// Local frequency in cycles per sample.
    pub frequency: Vec<f64>,
    /// Relative strain against `g`.
    pub strain: Vec<f64>,
    /// Absolute frequency error against the two-regime reference.
    pub frequency_error: Vec<f64>,
    /// Absolute strain error against the two-regime reference.
    pub strain_error: Vec<f64>,
}

impl GpaReport {
    /// Mean, RMS and max of the frequency error.
    pub fn frequency_summary(&self) -> Option<ErrorSummary> {
        ErrorSummary::from_errors(&self.frequency_error)
    }

    /// Mean, RMS and max of the strain error.
    pub fn strain_summary(&self) -> Option<ErrorSummary> {
        ErrorSummary::from_errors(&self.strain_error)
    }
}

/// Trait-first GPA pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpaKernel {
    g: f64,
    sigma: f64,
    center: Option<f64>,
    phase: PhaseExtractKernel,
    frequency: LocalFrequencyKernel,
    strain: StrainKernel,
    frequency_error: FrequencyErrorKernel,
    strain_error: StrainErrorKernel,
}

impl GpaKernel {
    /// Mask center used for a signal of `len` samples.
    pub fn mask_center(&self, len: usize) -> Result<f64, Error> {
        match self.center {
            Some(center) => Ok(center),
            None => Ok(reference_position(self.g, len)? as f64),
        }
    }

    /// Analyze `signal`.
    pub fn run(&self, signal: &[f64]) -> Result<GpaReport, Error> {
        let len = signal.len();
        if len == 0 {
            return Err(ConfigError::EmptyInput { arg: "signal" }.into());
        }
        let mask_center = self.mask_center(len)?;
        if !(0.0..len as f64).contains(&mask_center) {
            tracing::warn!(
                mask_center,
                len,
                "mask center lies outside the spectrum; the mask selects nothing"
            );
        }
        let mask = GaussianMaskKernel::try_new(GaussianMaskConfig::unit(
            len,
            mask_center,
            self.sigma,
        ))?
        .run_alloc()?;
        tracing::debug!(len, mask_center, sigma = self.sigma, "mask built");

        let phase = self.phase.run_alloc(signal, &mask)?;
        let frequency = self.frequency.run_alloc(&phase)?;
        let strain = self.strain.run_alloc(&frequency)?;
        let frequency_error = self.frequency_error.run_alloc(&frequency)?;
        let strain_error = self.strain_error.run_alloc(&strain)?;

        let report = GpaReport {
            signal: signal.to_vec(),
            mask,
            mask_center,
            phase,
            frequency,
            strain,
            frequency_error,
            strain_error,
        };
        if let Some(summary) = report.frequency_summary() {
            tracing::debug!(
                mean = summary.mean,
                rms = summary.rms,
                max = summary.max,
                "frequency error"
            );
        }
        Ok(report)
    }

    /// Synthesize a sine from `sine` and analyze it.
    pub fn run_synthetic<R>(&self, sine: SineConfig, rng: &mut R) -> Result<GpaReport, Error>
    where
        R: Rng + ?Sized,
    {
        let signal = SineKernel::try_new(sine)?.run_alloc(rng)?;
        self.run(&signal)
    }
}

impl KernelLifecycle for GpaKernel {
    type Config = GpaConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.sigma == 0.0 || !config.sigma.is_finite() {
            return Err(ConfigError::InvalidArgument {
                arg: "sigma",
                reason: "sigma must be finite and non-zero",
            });
        }
        if let Some(center) = config.center {
            if !center.is_finite() {
                return Err(ConfigError::InvalidArgument {
                    arg: "center",
                    reason: "center must be finite",
                });
            }
        }
        let reference = ReferenceConfig {
            g: config.g,
            delta_g: config.delta_g,
        };
        Ok(Self {
            g: config.g,
            sigma: config.sigma,
            center: config.center,
            phase: PhaseExtractKernel::try_new(PhaseExtractConfig {
                unwrap: config.unwrap,
            })?,
            frequency: LocalFrequencyKernel::try_new(LocalFrequencyConfig {
                moire_periodicity: config.moire.then_some(config.g),
            })?,
            strain: StrainKernel::try_new(StrainConfig::new(config.g))?,
            frequency_error: FrequencyErrorKernel::try_new(reference)?,
            strain_error: StrainErrorKernel::try_new(reference)?,
        })
    }
}

/// Run the full analysis of `signal` with `config`.
pub fn run_gpa(signal: &[f64], config: GpaConfig) -> Result<GpaReport, Error> {
    GpaKernel::try_new(config)?.run(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;

    fn tone(n: usize, g: f64) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * i as f64 / g).sin()).collect()
    }

    #[test]
    fn default_config_finds_reference_harmonic() {
        let report = run_gpa(&tone(1024, 4.0), GpaConfig::default()).expect("analysis");
        assert_eq!(report.mask_center, 768.0);
        assert_eq!(report.signal, tone(1024, 4.0));
        assert_eq!(report.mask[768], 1.0);
        assert_eq!(report.frequency.len(), 1024);
        assert_eq!(report.strain_error.len(), 1024);
        report
            .frequency
            .iter()
            .for_each(|f| assert_abs_diff_eq!(*f, 0.25, epsilon = 1e-9));
        report
            .strain
            .iter()
            .for_each(|s| assert_abs_diff_eq!(*s, 0.0, epsilon = 1e-8));
        let summary = report.frequency_summary().expect("non-empty");
        assert!(summary.max < 1e-9);
    }

    #[test]
    fn explicit_center_overrides_reference_position() {
        let kernel = GpaKernel::try_new(GpaConfig {
            g: 8.0,
            center: Some(640.0),
            ..GpaConfig::default()
        })
        .expect("valid config");
        assert_eq!(kernel.mask_center(1024).expect("center"), 640.0);
        let report = kernel.run(&tone(1024, 8.0)).expect("analysis");
        report
            .frequency
            .iter()
            .for_each(|f| assert_abs_diff_eq!(*f, 0.125, epsilon = 1e-9));
    }

    #[test]
    fn moire_correction_recovers_undersampled_frequency() {
        // Period 1.5 aliases to -1/3 cycles per sample.
        let signal = tone(768, 1.5);
        let corrected = run_gpa(
            &signal,
            GpaConfig {
                g: 1.5,
                sigma: 6.0,
                ..GpaConfig::default()
            },
        )
        .expect("analysis");
        assert_eq!(corrected.mask_center, 128.0);
        corrected.frequency[50..700]
            .iter()
            .for_each(|f| assert_abs_diff_eq!(*f, 2.0 / 3.0, epsilon = 1e-6));

        let aliased = run_gpa(
            &signal,
            GpaConfig {
                g: 1.5,
                sigma: 6.0,
                moire: false,
                ..GpaConfig::default()
            },
        )
        .expect("analysis");
        aliased.frequency[50..700]
            .iter()
            .for_each(|f| assert_abs_diff_eq!(*f, -1.0 / 3.0, epsilon = 1e-6));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for config in [
            GpaConfig {
                g: 0.0,
                ..GpaConfig::default()
            },
            GpaConfig {
                sigma: 0.0,
                ..GpaConfig::default()
            },
            GpaConfig {
                delta_g: -4.0,
                ..GpaConfig::default()
            },
            GpaConfig {
                center: Some(f64::INFINITY),
                ..GpaConfig::default()
            },
        ] {
            assert!(matches!(
                run_gpa(&tone(64, 4.0), config),
                Err(Error::InvalidParameter { .. })
            ));
        }
        assert!(matches!(
            run_gpa(&[], GpaConfig::default()),
            Err(Error::InvalidParameter { .. })
        ));
    }
}

//! Geometrical phase analysis of 1D signals.
//!
//! Data flows through the stages in this order: [`synth`] (test signals),
//! [`mask`], [`phase`], [`frequency`] (with [`moire`] correction), [`strain`]
//! and [`metrics`]. [`pipeline`] chains them.

/// Trait interfaces for the analysis stages.
pub mod traits;

/// Centered FFT helpers
pub mod fft;

/// Gaussian masks in Fourier space and the reference harmonic position.
pub mod mask;

/// Aliasing correction for periodicities below two samples.
pub mod moire;

/// Phase unwrapping.
pub mod unwrap;

/// Masked-harmonic phase extraction.
pub mod phase;

/// Local frequency from phase.
pub mod frequency;

/// Relative strain.
pub mod strain;

/// Error fields against the two-regime reference.
pub mod metrics;

/// Synthetic sine signals.
pub mod synth;

/// Full analysis runs.
pub mod pipeline;

pub use frequency::{gpa, gradient};
pub use mask::{gaussian_1d, mask_gaussian_1d, reference_position};
pub use metrics::{error_gpa_1d, error_strain_1d, ErrorSummary};
pub use moire::gpa_moire_correction;
pub use phase::extract_phase;
pub use pipeline::{run_gpa, GpaConfig, GpaKernel, GpaReport};
pub use strain::strain_1d;
pub use synth::sine_1d;
pub use unwrap::unwrap_phase;

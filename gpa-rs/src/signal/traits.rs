//! Trait interfaces for the analysis stages.
//!
//! Each stage exposes a `run_into` form writing into a caller-provided buffer
//! and a `run_alloc` form that allocates its output.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use rand::Rng;

/// Frequency-domain mask generation capability.
pub trait MaskGenerate1D<T> {
    /// Generate mask weights into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Generate mask weights and allocate output.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}

/// Masked-harmonic phase extraction capability.
pub trait PhaseExtract1D {
    /// Extract the unwrapped phase of the masked harmonic into `out`.
    fn run_into<I, M, O>(
        &self,
        signal: &I,
        mask: &M,
        out: &mut O,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        M: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized;

    /// Extract the unwrapped phase of the masked harmonic and allocate output.
    fn run_alloc<I, M>(&self, signal: &I, mask: &M) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        M: Read1D<f64> + ?Sized;
}

/// 1D phase unwrapping capability.
pub trait PhaseUnwrap1D<T> {
    /// Unwrap a wrapped phase sequence into a caller-provided output buffer.
    fn run_into<I, O>(&self, wrapped: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Unwrap a wrapped phase sequence and allocate output.
    fn run_alloc<I>(&self, wrapped: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Local frequency estimation from an unwrapped phase field.
pub trait LocalFrequency1D<T> {
    /// Differentiate `phase` into cycles per sample, writing into `out`.
    fn run_into<I, O>(&self, phase: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Differentiate `phase` into cycles per sample and allocate output.
    fn run_alloc<I>(&self, phase: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Relative strain estimation from a local frequency field.
pub trait Strain1D<T> {
    /// Compute strain into a caller-provided output buffer.
    fn run_into<I, O>(&self, frequency: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Compute strain and allocate output.
    fn run_alloc<I>(&self, frequency: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Pointwise absolute error against a two-regime analytic reference.
pub trait ReferenceError1D<T> {
    /// Compute the error field into a caller-provided output buffer.
    fn run_into<I, O>(&self, field: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Compute the error field and allocate output.
    fn run_alloc<I>(&self, field: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Synthetic test-signal generation capability.
pub trait Synthesize1D<T> {
    /// Number of samples the generator produces.
    fn output_len(&self) -> usize;

    /// Generate samples into a caller-provided output buffer.
    fn run_into<R, O>(&self, rng: &mut R, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        R: Rng + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Generate samples and allocate output.
    fn run_alloc<R>(&self, rng: &mut R) -> Result<Vec<T>, ExecInvariantViolation>
    where
        R: Rng + ?Sized;
}

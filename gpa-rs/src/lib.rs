//! Local frequency and strain of quasi-periodic 1D signals by geometrical
//! phase analysis (GPA).
//!
//! A single harmonic is isolated with a Gaussian mask in Fourier space, its
//! phase is extracted and unwrapped, and the phase gradient gives the local
//! frequency. Strain and error fields are derived from that frequency.
//!
//! ```
//! use gpa_rs::signal::{mask_gaussian_1d, gpa, strain_1d};
//!
//! let signal: Vec<f64> = (0..1024)
//!     .map(|i| (2.0 * core::f64::consts::PI * i as f64 / 4.0).sin())
//!     .collect();
//! let mask = mask_gaussian_1d(signal.len(), 768.0, 10.0)?;
//! let frequency = gpa(&signal, &mask)?;
//! let strain = strain_1d(&frequency, 4.0)?;
//! assert!((frequency[512] - 0.25).abs() < 1e-9);
//! assert!(strain[512].abs() < 1e-8);
//! # Ok::<(), gpa_rs::Error>(())
//! ```

pub mod error;
pub mod kernel;

/// Signal processing
pub mod signal;

pub use error::Error;

//! Aliasing (Moiré) correction for undersampled periodicities.
//!
//! A periodicity `g < 2` samples puts the fundamental above Nyquist. Its
//! alias lands back inside the centered band after folding over a whole
//! number of sampling bands; this module names that number.

use crate::error::Error;
use crate::kernel::{check_periodicity, ConfigError};

/// Largest `|2/g|` for which the band count is still exact in `f64`.
const MAX_BAND_INDEX: f64 = 4_503_599_627_370_496.0; // 2^52

/// Fold classification for `k = floor(2/g)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoireCorrection {
    /// `k == 0`: the harmonic sits inside the principal band.
    Unaliased,
    /// Non-zero even `k`: the alias folded back over `k/2` bands.
    Even {
        /// `floor(2/g)`.
        k: i64,
    },
    /// Odd `k`: the alias folded back over `(k+1)/2` bands.
    Odd {
        /// `floor(2/g)`.
        k: i64,
    },
}

impl MoireCorrection {
    /// Classify the reference periodicity `g`.
    pub fn from_periodicity(g: f64) -> Result<Self, ConfigError> {
        check_periodicity("g", g)?;
        let band = (2.0 / g).floor();
        if !band.is_finite() || band.abs() > MAX_BAND_INDEX {
            return Err(ConfigError::InvalidArgument {
                arg: "g",
                reason: "periodicity too small to resolve its alias band",
            });
        }
        let k = band as i64;
        Ok(match k {
            0 => MoireCorrection::Unaliased,
            k if k.rem_euclid(2) == 0 => MoireCorrection::Even { k },
            k => MoireCorrection::Odd { k },
        })
    }

    /// Return `floor(2/g)`.
    pub fn k(&self) -> i64 {
        match *self {
            MoireCorrection::Unaliased => 0,
            MoireCorrection::Even { k } | MoireCorrection::Odd { k } => k,
        }
    }

    /// Number of whole sampling bands the alias was folded over.
    pub fn folds(&self) -> i64 {
        match *self {
            MoireCorrection::Unaliased => 0,
            MoireCorrection::Even { k } => k / 2,
            MoireCorrection::Odd { k } => (k + 1) / 2,
        }
    }

    /// Shift, in Fourier bins of an `n`-point transform, between the true and
    /// the aliased harmonic.
    pub fn bin_offset(&self, n: usize) -> f64 {
        self.folds() as f64 * n as f64
    }

    /// Shift, in cycles per sample, to add to an aliased frequency field.
    pub fn frequency_offset(&self) -> f64 {
        self.folds() as f64
    }
}

/// Undo the aliasing of a frequency field measured at reference periodicity
/// `g`, returning the corrected field.
pub fn gpa_moire_correction(field: &[f64], g: f64) -> Result<Vec<f64>, Error> {
    let offset = MoireCorrection::from_periodicity(g)?.frequency_offset();
    Ok(field.iter().map(|f| f + offset).collect())
}

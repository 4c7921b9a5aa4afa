use crate::error::Error;
use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::moire::MoireCorrection;
use crate::signal::traits::MaskGenerate1D;
use nalgebra::RealField;
use num_traits::FromPrimitive;

mod kernels;
pub use kernels::*;

/// Evaluate `a * exp(-0.5 * (x - center)^2 / sigma^2)` at every point of `x`.
///
/// `sigma` must be non-zero.
pub fn gaussian_1d<F>(x: &[F], a: F, center: F, sigma: F) -> Result<Vec<F>, Error>
where
    F: RealField + Copy + FromPrimitive,
{
    // Any length works here; only the bump parameters are validated.
    let kernel = GaussianMaskKernel::try_new(GaussianMaskConfig {
        len: x.len().max(1),
        center,
        sigma,
        amplitude: a,
    })?;
    Ok(x.iter().map(|&xi| kernel.weight(xi)).collect())
}

/// Build a unit-amplitude Gaussian mask of `len` weights centered on the
/// centered-spectrum index `center`.
pub fn mask_gaussian_1d<F>(len: usize, center: F, sigma: F) -> Result<Vec<F>, Error>
where
    F: RealField + Copy + FromPrimitive,
{
    let kernel = GaussianMaskKernel::try_new(GaussianMaskConfig::unit(len, center, sigma))?;
    Ok(kernel.run_alloc()?)
}

/// Expected index of the fundamental of periodicity `g` in a centered
/// spectrum of `len` bins, folded back into the principal band.
///
/// With `k = floor(2/g)` the bin is `round(len/2 + len/g - m*len)` where `m`
/// is `k/2` for even `k` and `(k+1)/2` for odd `k`. Ties round to even.
pub fn reference_position(g: f64, len: usize) -> Result<i64, Error> {
    if len < 1 {
        return Err(ConfigError::InvalidArgument {
            arg: "len",
            reason: "array length must be at least 1",
        }
        .into());
    }
    let rule = MoireCorrection::from_periodicity(g)?;
    let n = len as f64;
    let position = (0.5 * n + n / g - rule.bin_offset(len)).round_ties_even();
    tracing::trace!(g, len, ?rule, position, "reference mask position");
    Ok(position as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gaussian_matches_closed_form() {
        let x = [-2.0f64, -1.0, 0.0, 1.0, 2.0];
        let y = gaussian_1d(&x, 2.0, 0.0, 1.0).expect("valid sigma");
        let expected = [
            2.0 * (-2.0f64).exp(),
            2.0 * (-0.5f64).exp(),
            2.0,
            2.0 * (-0.5f64).exp(),
            2.0 * (-2.0f64).exp(),
        ];
        y.iter()
            .zip(expected.iter())
            .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-14));

        assert!(gaussian_1d::<f64>(&[], 1.0, 0.0, 1.0)
            .expect("empty evaluation")
            .is_empty());
        assert!(matches!(
            gaussian_1d(&x, 1.0, 0.0, 0.0),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn mask_gaussian_has_requested_shape() {
        let mask = mask_gaussian_1d(1024, 768.0f64, 10.0).expect("valid mask");
        assert_eq!(mask.len(), 1024);
        let (peak, _) = mask
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(core::cmp::Ordering::Equal))
            .expect("max bin");
        assert_eq!(peak, 768);
    }

    #[test]
    fn mask_gaussian_rejects_bad_parameters() {
        assert!(mask_gaussian_1d(16, 8.0f64, 0.0).is_err());
        assert!(mask_gaussian_1d(0, 0.0f64, 1.0).is_err());
    }

    #[test]
    fn reference_position_of_unaliased_periodicity() {
        assert_eq!(reference_position(4.0, 1024).expect("valid"), 768);
        // 511.5 + 255.75 rounds down.
        assert_eq!(reference_position(4.0, 1023).expect("valid"), 767);
        assert_eq!(reference_position(10.0, 100).expect("valid"), 60);
        assert_eq!(reference_position(-4.0, 1024).expect("valid"), 256);
    }

    #[test]
    fn reference_position_folds_aliased_periodicity() {
        // k = 1: 512 + 682.67 - 1024.
        assert_eq!(reference_position(1.5, 1024).expect("valid"), 171);
        // k = 2: 512 + 1280 - 1024.
        assert_eq!(reference_position(0.8, 1024).expect("valid"), 768);
        // Exactly two samples per period folds onto the band edge.
        assert_eq!(reference_position(2.0, 1024).expect("valid"), 0);
    }

    #[test]
    fn reference_position_is_idempotent() {
        let first = reference_position(3.7, 999).expect("valid");
        for _ in 0..8 {
            assert_eq!(reference_position(3.7, 999).expect("valid"), first);
        }
    }

    #[test]
    fn reference_position_rejects_bad_parameters() {
        assert!(matches!(
            reference_position(0.0, 1024),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            reference_position(4.0, 0),
            Err(Error::InvalidParameter { .. })
        ));
    }
}

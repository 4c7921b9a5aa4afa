//! Frequency-centered discrete Fourier transforms.
//!
//! The centered layout puts the zero-frequency bin at index `len / 2`, so a
//! bin index `i` corresponds to `(i - len/2) / len` cycles per sample.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

fn shift_to_center<T>(x: &mut [T]) {
    let half = x.len() / 2;
    x.rotate_right(half);
}

fn shift_to_origin<T>(x: &mut [T]) {
    let half = x.len() / 2;
    x.rotate_left(half);
}

/// Move the zero-frequency bin from index `0` to index `len / 2`.
pub fn fftshift<T: Clone>(x: &[T]) -> Vec<T> {
    let mut out = x.to_vec();
    shift_to_center(&mut out);
    out
}

/// Inverse of [`fftshift`]: move the zero-frequency bin back to index `0`.
pub fn ifftshift<T: Clone>(x: &[T]) -> Vec<T> {
    let mut out = x.to_vec();
    shift_to_origin(&mut out);
    out
}

/// Forward DFT of a real signal in centered layout.
pub fn centered_spectrum(x: &[f64]) -> Vec<Complex<f64>> {
    let buf: Vec<Complex<f64>> = x.iter().map(|&v| Complex::new(v, 0.0)).collect();
    centered_spectrum_complex(buf)
}

/// Forward DFT of a complex signal in centered layout.
pub fn centered_spectrum_complex(mut buf: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
    if buf.is_empty() {
        return buf;
    }
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buf.len());
    fft.process(&mut buf);
    shift_to_center(&mut buf);
    buf
}

/// Inverse DFT of a centered spectrum, normalized by `1/len`.
pub fn inverse_centered(mut spec: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
    if spec.is_empty() {
        return spec;
    }
    let n = spec.len();
    shift_to_origin(&mut spec);
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut spec);
    let scale = 1.0 / n as f64;
    spec.iter_mut().for_each(|c| *c *= scale);
    spec
}

use super::{ConfigError, ExecInvariantViolation};

use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Adapter trait for reading contiguous 1D input.
pub trait Read1D<T> {
    /// Borrow the underlying input as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing contiguous 1D output.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

impl<T> Read1D<T> for Array1<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

impl<T> Write1D<T> for Array1<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

impl<'a, T> Read1D<T> for ArrayView1<'a, T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array_view" })
    }
}

impl<'a, T> Write1D<T> for ArrayViewMut1<'a, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut().ok_or(ConfigError::NonContiguous {
            arg: "array_view_mut",
        })
    }
}

/// Borrow a non-empty input slice, naming `arg` in the error.
pub fn read_nonempty<'a, T, I>(
    input: &'a I,
    arg: &'static str,
) -> Result<&'a [T], ExecInvariantViolation>
where
    I: Read1D<T> + ?Sized,
{
    let slice = input.read_slice()?;
    if slice.is_empty() {
        return Err(ConfigError::EmptyInput { arg }.into());
    }
    Ok(slice)
}

/// Borrow an output slice and check it holds exactly `expected` samples.
pub fn bind_output<'a, T, O>(
    out: &'a mut O,
    arg: &'static str,
    expected: usize,
) -> Result<&'a mut [T], ExecInvariantViolation>
where
    O: Write1D<T> + ?Sized,
{
    let slice = out.write_slice_mut()?;
    if slice.len() != expected {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg,
            expected,
            got: slice.len(),
        });
    }
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::{bind_output, read_nonempty, Read1D, Write1D};
    use crate::kernel::{ConfigError, ExecInvariantViolation};
    use ndarray::{s, Array1};

    #[test]
    fn slice_and_array_adapters() {
        let phase = [0.0f64, 0.5, 1.0];
        assert_eq!(phase.read_slice().expect("array adapter").len(), 3);

        let view: &[f64] = &phase;
        assert_eq!(view.read_slice().expect("slice adapter")[1], 0.5);
    }

    #[test]
    fn strided_view_is_rejected() {
        let field = Array1::from(vec![0.25f64, 0.24, 0.25, 0.26]);
        let every_other = field.slice(s![..;2]);
        assert_eq!(
            every_other.read_slice(),
            Err(ConfigError::NonContiguous { arg: "array_view" })
        );
    }

    #[test]
    fn ndarray_output_binding() {
        let mut out = Array1::from(vec![0.0f64; 3]);
        bind_output(&mut out, "out", 3)
            .expect("matching output")
            .copy_from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!(out.as_slice().expect("slice"), &[4.0, 5.0, 6.0]);

        let mut short = vec![0.0f64; 2];
        assert_eq!(
            short.write_slice_mut().map(|s| s.len()),
            Ok(2),
            "vec adapter"
        );
        let err = bind_output(&mut short, "strain", 3).expect_err("short output");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "strain",
                expected: 3,
                got: 2,
            }
        );
    }

    #[test]
    fn empty_inputs_are_named() {
        let empty: Vec<f64> = Vec::new();
        let err = read_nonempty(&empty, "signal").expect_err("empty input");
        assert_eq!(
            err,
            ExecInvariantViolation::Config(ConfigError::EmptyInput { arg: "signal" })
        );
    }
}

//! Shared trait-first kernel substrate.
//!
//! Every analysis stage is a kernel: a value built once from a `*Config`
//! through [`KernelLifecycle::try_new`] and then run over 1D buffers through
//! the [`Read1D`]/[`Write1D`] adapters.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;

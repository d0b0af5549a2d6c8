//! fdb-exporter crate
//!
//! This crate is an implementation detail of the `fdb-exporter` tool. This crate's API is fluid and may change without warning
//! and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod exposition;

#[doc(hidden)]
pub mod metrics;

#[doc(hidden)]
pub mod status;

pub use commands::{Host, run};

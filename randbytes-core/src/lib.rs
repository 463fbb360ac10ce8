//! # randbytes core
//!
//! Cryptographically strong random bytes from the platform CSPRNG, with a
//! bounded retry when the generator reports that it is not seeded yet.
//!
//! ## Calling conventions
//!
//! The same retry policy backs every way of asking for bytes:
//! - [`RandomBytes::generate_sync`] blocks the calling thread
//! - [`RandomBytes::generate`] is an `async fn`
//! - [`RandomBytes::generate_callback`] hands the outcome to a callback
//! - [`RandomBytes::generate_deferred`] returns a [`Deferred`] future
//!
//! The last two need the `async` feature (on by default) and a native target.
//! Hosts with their own executor, such as WebAssembly, drive the same
//! adapters through [`RandomBytes::callback_task`] and
//! [`RandomBytes::deferred_task`].
//!
//! ## Usage
//!
//! ```rust
//! use randbytes_core::{OsEntropy, RandomBytes};
//!
//! let rng = RandomBytes::new(OsEntropy::new());
//! let bytes = rng.generate_sync(18).unwrap();
//! assert_eq!(bytes.len(), 18);
//! ```
//!
//! ## Retry policy
//!
//! A request makes at most [`retry::MAX_ATTEMPTS`] calls into the source.
//! Failures whose message contains [`random::NOT_SEEDED_MARKER`] are retried
//! immediately; once the bound is reached the request fails with
//! [`RandomError::NotSeeded`]. Any other failure is returned at once as
//! [`RandomError::Source`], carrying the source's own error value.
//!
//! ## Error Handling
//!
//! - [`ArgumentError`] - caller mistakes, always reported by the initiating call
//! - [`RandomError::NotSeeded`] - the source never became ready
//! - [`RandomError::Source`] - any other source failure, unchanged

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::sync::OnceLock;

pub mod callback;
mod config;
mod error;
mod generator;
#[cfg(feature = "async")]
mod generator_async;
pub mod random;
pub mod retry;
#[cfg(test)]
mod test_support;

pub use callback::CallbackArg;
pub use config::GeneratorConfig;
pub use error::{ArgumentError, RandomError, Result};
pub use generator::{RandomBytes, MAX_SIZE};
#[cfg(feature = "async")]
pub use generator_async::Deferred;
pub use random::{EntropySource, FailureKind, OsEntropy, OsError};

fn os_generator() -> &'static RandomBytes<OsEntropy> {
    static GENERATOR: OnceLock<RandomBytes<OsEntropy>> = OnceLock::new();
    GENERATOR.get_or_init(|| RandomBytes::new(OsEntropy::new()))
}

/// Generate `size` random bytes from the OS, blocking.
pub fn random_bytes_sync(size: usize) -> Result<Vec<u8>, OsError> {
    os_generator().generate_sync(size)
}

/// Generate `size` random bytes from the OS.
pub async fn random_bytes(size: usize) -> Result<Vec<u8>, OsError> {
    os_generator().generate(size).await
}

/// Generate a fixed-size random byte array from the OS.
pub fn random_array<const N: usize>() -> Result<[u8; N], OsError> {
    let bytes = random_bytes_sync(N)?;
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes);
    Ok(buf)
}

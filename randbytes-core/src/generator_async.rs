//! Callback and deferred-value conventions.
//!
//! [`RandomBytes::callback_task`] and [`RandomBytes::deferred_task`] build the
//! work for a request without scheduling it, so any executor can drive them.
//! On native targets [`RandomBytes::generate_callback`] and
//! [`RandomBytes::generate_deferred`] schedule that work on tokio.
//!
//! # Example
//!
//! ```rust,ignore
//! use randbytes_core::{CallbackArg, OsEntropy, RandomBytes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rng = RandomBytes::new(OsEntropy::new());
//!
//!     // Callback
//!     rng.generate_callback(18, CallbackArg::Callable(|outcome| {
//!         println!("{outcome:?}");
//!     }))?;
//!
//!     // Deferred
//!     let bytes = rng.generate_deferred(18)?.await?;
//!     assert_eq!(bytes.len(), 18);
//!
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::callback::CallbackArg;
use crate::error::{ArgumentError, RandomError, Result};
use crate::generator::{check_size, RandomBytes};
use crate::random::EntropySource;

impl<S: EntropySource> RandomBytes<S> {
    /// Validate a callback request and return the work that fulfils it.
    ///
    /// Nothing runs until the returned future is polled; it calls `callback`
    /// exactly once with the outcome. The future is `Send` when `callback` is.
    pub fn callback_task<F>(
        &self,
        size: usize,
        callback: CallbackArg<F>,
    ) -> std::result::Result<impl Future<Output = ()>, ArgumentError>
    where
        F: FnOnce(Result<Vec<u8>, S::Error>) + 'static,
    {
        let callback = callback.validate()?;
        check_size(size)?;

        let this = self.clone();
        Ok(async move { callback(this.generate(size).await) })
    }

    /// Validate a deferred request and return its work and its [`Deferred`].
    ///
    /// The work is a [`RandomBytes::callback_task`] whose callback settles the
    /// `Deferred`. Fails with [`ArgumentError::CallbackRequired`] when
    /// deferred values are disabled in the [`crate::GeneratorConfig`].
    pub fn deferred_task(
        &self,
        size: usize,
    ) -> std::result::Result<(impl Future<Output = ()>, Deferred<S::Error>), ArgumentError> {
        self.check_deferred()?;

        let (settle, deferred) = deferred_channel();
        let task = self.callback_task(size, CallbackArg::Callable(settle))?;
        Ok((task, deferred))
    }

    fn check_deferred(&self) -> std::result::Result<(), ArgumentError> {
        if self.config().deferred() {
            Ok(())
        } else {
            Err(ArgumentError::CallbackRequired)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<S: EntropySource> RandomBytes<S> {
    /// Generate `size` random bytes and hand the outcome to `callback`.
    ///
    /// The callback runs exactly once. The request itself is held back until
    /// this call has finished scheduling it, so the callback never runs on
    /// the caller's stack and never before the work is released on return.
    /// Inside a tokio runtime the request is spawned onto it; otherwise it
    /// runs on a dedicated thread.
    ///
    /// A missing or non-callable callback, or an oversized request, is
    /// reported here and nothing is scheduled.
    pub fn generate_callback<F>(
        &self,
        size: usize,
        callback: CallbackArg<F>,
    ) -> std::result::Result<(), ArgumentError>
    where
        F: FnOnce(Result<Vec<u8>, S::Error>) + Send + 'static,
    {
        let callback = callback.validate()?;
        check_size(size)?;

        let (release, released) = oneshot::channel::<()>();
        let this = self.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = released.await;
                callback(this.generate(size).await);
            });
        } else {
            log::debug!("no tokio runtime, generating on a dedicated thread");
            std::thread::spawn(move || {
                let _ = released.blocking_recv();
                callback(this.generate_sync(size));
            });
        }

        // Must stay the last step before returning
        let _ = release.send(());
        Ok(())
    }

    /// Generate `size` random bytes as a deferred value.
    ///
    /// Fails with [`ArgumentError::CallbackRequired`] when deferred values are
    /// disabled in the [`crate::GeneratorConfig`].
    pub fn generate_deferred(
        &self,
        size: usize,
    ) -> std::result::Result<Deferred<S::Error>, ArgumentError> {
        self.check_deferred()?;

        let (settle, deferred) = deferred_channel();
        self.generate_callback(size, CallbackArg::Callable(settle))?;
        Ok(deferred)
    }
}

/// A callback that settles the returned [`Deferred`] with its outcome.
fn deferred_channel<E>() -> (impl FnOnce(Result<Vec<u8>, E>) + Send + 'static, Deferred<E>)
where
    E: std::error::Error + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let settle = move |outcome| {
        // Receiver gone means the caller dropped the Deferred
        let _ = tx.send(outcome);
    };
    (settle, Deferred { rx })
}

/// Pending outcome of a deferred request.
///
/// Resolves exactly once. Dropping it does not cancel the request.
#[must_use = "a Deferred does nothing unless awaited"]
pub struct Deferred<E>
where
    E: std::error::Error + 'static,
{
    rx: oneshot::Receiver<Result<Vec<u8>, E>>,
}

impl<E> Future for Deferred<E>
where
    E: std::error::Error + 'static,
{
    type Output = Result<Vec<u8>, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(RandomError::Interrupted)))
    }
}

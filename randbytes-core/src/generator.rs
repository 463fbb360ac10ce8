//! Random byte generator.
//!
//! [`RandomBytes`] wraps an [`EntropySource`] and retries requests while the
//! source reports that it is not seeded. The blocking call and the async
//! primitive run the same [`RetryState`] loop; the callback and deferred
//! conventions in [`crate::generator_async`] are thin adapters over
//! [`RandomBytes::generate`].

use std::ops::ControlFlow;
use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::error::{ArgumentError, RandomError, Result};
use crate::random::EntropySource;
use crate::retry::{Next, RetryState};

/// Largest request accepted, in bytes.
pub const MAX_SIZE: usize = i32::MAX as usize;

/// Result of a single call into the source.
type Attempt<E> = std::result::Result<Vec<u8>, E>;

/// Cryptographically strong random byte generator.
///
/// Cloning is cheap and clones share the underlying source.
pub struct RandomBytes<S> {
    source: Arc<S>,
    config: GeneratorConfig,
}

impl<S> Clone for RandomBytes<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
        }
    }
}

impl<S: EntropySource> RandomBytes<S> {
    /// Create a generator with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, GeneratorConfig::default())
    }

    /// Create a generator with an explicit configuration.
    pub fn with_config(source: S, config: GeneratorConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
        }
    }

    /// The wrapped entropy source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Generator configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `size` random bytes, blocking the calling thread.
    pub fn generate_sync(&self, size: usize) -> Result<Vec<u8>, S::Error> {
        check_size(size)?;

        let mut retry = RetryState::new();
        loop {
            let outcome = fill_once(&*self.source, size);
            if let ControlFlow::Break(result) = self.settle(&mut retry, outcome) {
                return result;
            }
        }
    }

    /// Generate `size` random bytes without blocking the executor.
    ///
    /// Inside a tokio runtime each attempt runs on the blocking pool and the
    /// next attempt only starts once the previous one has completed.
    pub async fn generate(&self, size: usize) -> Result<Vec<u8>, S::Error> {
        check_size(size)?;

        let mut retry = RetryState::new();
        loop {
            let outcome = self.attempt(size).await?;
            if let ControlFlow::Break(result) = self.settle(&mut retry, outcome) {
                return result;
            }
        }
    }

    async fn attempt(&self, size: usize) -> Result<Attempt<S::Error>, S::Error> {
        #[cfg(all(feature = "async", not(target_arch = "wasm32")))]
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let source = Arc::clone(&self.source);
            return match handle
                .spawn_blocking(move || fill_once(&*source, size))
                .await
            {
                Ok(outcome) => Ok(outcome),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => Err(RandomError::Interrupted),
            };
        }

        Ok(fill_once(&*self.source, size))
    }

    fn settle(
        &self,
        retry: &mut RetryState,
        outcome: Attempt<S::Error>,
    ) -> ControlFlow<Result<Vec<u8>, S::Error>> {
        match outcome {
            Ok(bytes) => {
                log::trace!("generated {} random bytes", bytes.len());
                ControlFlow::Break(Ok(bytes))
            }
            Err(err) => match retry.on_failure(self.source.classify(&err), err) {
                Next::Retry => ControlFlow::Continue(()),
                Next::Fail(err) => ControlFlow::Break(Err(err)),
            },
        }
    }
}

/// Reject sizes no single request may produce.
pub(crate) fn check_size(size: usize) -> std::result::Result<(), ArgumentError> {
    if size > MAX_SIZE {
        return Err(ArgumentError::SizeOutOfRange {
            size,
            max: MAX_SIZE,
        });
    }
    Ok(())
}

fn fill_once<S: EntropySource + ?Sized>(source: &S, size: usize) -> Attempt<S::Error> {
    let mut buf = vec![0u8; size];
    source.fill(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::MAX_ATTEMPTS;
    use crate::test_support::{ScriptedError, ScriptedSource};

    #[test]
    fn test_sync_exact_length() {
        let rng = RandomBytes::new(ScriptedSource::always_succeeds());

        for size in [0, 1, 18, 32, 1000] {
            assert_eq!(rng.generate_sync(size).unwrap().len(), size);
        }
    }

    #[test]
    fn test_sync_recovers_after_one_not_seeded() {
        let rng = RandomBytes::new(ScriptedSource::not_seeded_times(1));

        let bytes = rng.generate_sync(18).unwrap();
        assert_eq!(bytes.len(), 18);
        assert_eq!(rng.source().calls(), 2);
    }

    #[test]
    fn test_sync_recovers_on_last_attempt() {
        let rng = RandomBytes::new(ScriptedSource::not_seeded_times(2));

        assert_eq!(rng.generate_sync(18).unwrap().len(), 18);
        assert_eq!(rng.source().calls(), 3);
    }

    #[test]
    fn test_sync_gives_up_after_three_attempts() {
        let rng = RandomBytes::new(ScriptedSource::always_not_seeded());

        let err = rng.generate_sync(18).unwrap_err();
        assert!(err.is_not_seeded());
        assert!(err.to_string().contains("PRNG not seeded"));
        assert_eq!(err.source_error(), Some(&ScriptedError::not_seeded()));
        assert_eq!(rng.source().calls(), MAX_ATTEMPTS);
    }

    #[test]
    fn test_sync_three_failures_then_success_still_fails() {
        let rng = RandomBytes::new(ScriptedSource::not_seeded_times(3));

        assert!(rng.generate_sync(18).unwrap_err().is_not_seeded());
        assert_eq!(rng.source().calls(), 3);
    }

    #[test]
    fn test_sync_passes_other_errors_through() {
        let rng = RandomBytes::new(ScriptedSource::failing("device unplugged"));

        let err = rng.generate_sync(18).unwrap_err();
        assert_eq!(err.to_string(), "device unplugged");
        assert!(!err.is_not_seeded());
        assert_eq!(
            err.source_error(),
            Some(&ScriptedError::other("device unplugged"))
        );
        assert_eq!(
            err.into_source(),
            Some(ScriptedError::other("device unplugged"))
        );
        assert_eq!(rng.source().calls(), 1);
    }

    #[test]
    fn test_sync_size_out_of_range() {
        let rng = RandomBytes::new(ScriptedSource::always_succeeds());

        let err = rng.generate_sync(MAX_SIZE + 1).unwrap_err();
        assert!(matches!(
            err,
            RandomError::Argument(ArgumentError::SizeOutOfRange { .. })
        ));
        assert_eq!(err.source_error(), None);
        assert_eq!(rng.source().calls(), 0);
    }

    #[test]
    fn test_clones_share_source() {
        let rng = RandomBytes::new(ScriptedSource::always_succeeds());
        let other = rng.clone();

        rng.generate_sync(4).unwrap();
        other.generate_sync(4).unwrap();
        assert_eq!(rng.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_async_exact_length() {
        let rng = RandomBytes::new(ScriptedSource::always_succeeds());

        assert_eq!(rng.generate(18).await.unwrap().len(), 18);
        assert!(rng.generate(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_async_recovers_after_not_seeded() {
        let rng = RandomBytes::new(ScriptedSource::not_seeded_times(1));

        assert_eq!(rng.generate(18).await.unwrap().len(), 18);
        assert_eq!(rng.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_async_gives_up_after_three_attempts() {
        let rng = RandomBytes::new(ScriptedSource::always_not_seeded());

        let err = rng.generate(18).await.unwrap_err();
        assert!(err.to_string().contains("PRNG not seeded"));
        assert_eq!(rng.source().calls(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_async_passes_other_errors_through() {
        let rng = RandomBytes::new(ScriptedSource::failing("EIO"));

        let err = rng.generate(18).await.unwrap_err();
        assert!(matches!(err, RandomError::Source(ref e) if e == &ScriptedError::other("EIO")));
        assert_eq!(rng.source().calls(), 1);
    }
}

//! Bounded retry on "not seeded" failures.
//!
//! Every calling convention drives the same [`RetryState`]: one per request,
//! fed each source failure in turn until it says to stop.

use crate::error::RandomError;
use crate::random::FailureKind;

/// Total attempts per request, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// What to do after a failed attempt.
#[derive(Debug)]
pub enum Next<E>
where
    E: std::error::Error + 'static,
{
    /// Try the source again, immediately.
    Retry,
    /// Give up with this error.
    Fail(RandomError<E>),
}

/// Per-request attempt counter.
#[derive(Debug, Default)]
pub struct RetryState {
    attempts: u32,
}

impl RetryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failed attempts seen so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a failed attempt and decide whether to try again.
    pub fn on_failure<E>(&mut self, kind: FailureKind, err: E) -> Next<E>
    where
        E: std::error::Error + 'static,
    {
        self.attempts += 1;

        match kind {
            FailureKind::Other => Next::Fail(RandomError::Source(err)),
            FailureKind::NotSeeded if self.attempts < MAX_ATTEMPTS => {
                log::debug!(
                    "entropy source not seeded (attempt {}/{MAX_ATTEMPTS}), retrying",
                    self.attempts
                );
                Next::Retry
            }
            FailureKind::NotSeeded => {
                log::warn!("entropy source still not seeded after {MAX_ATTEMPTS} attempts");
                Next::Fail(RandomError::NotSeeded {
                    attempts: self.attempts,
                    source: err,
                })
            }
        }
    }
}

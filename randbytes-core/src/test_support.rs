//! Scripted entropy source for exercising the retry policy.

use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

use crate::random::{EntropySource, NOT_SEEDED_MARKER};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub(crate) struct ScriptedError(String);

impl ScriptedError {
    pub(crate) fn not_seeded() -> Self {
        Self(format!("error:24064064:random number generator:RAND_bytes:{NOT_SEEDED_MARKER}"))
    }

    pub(crate) fn other(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

/// Fails `not_seeded` times with the marker, then either succeeds or keeps
/// failing with `error`.
#[derive(Debug)]
pub(crate) struct ScriptedSource {
    not_seeded: u32,
    error: Option<ScriptedError>,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub(crate) fn always_succeeds() -> Self {
        Self::not_seeded_times(0)
    }

    pub(crate) fn not_seeded_times(n: u32) -> Self {
        Self {
            not_seeded: n,
            error: None,
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn always_not_seeded() -> Self {
        Self::not_seeded_times(u32::MAX)
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self {
            not_seeded: 0,
            error: Some(ScriptedError::other(msg)),
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntropySource for ScriptedSource {
    type Error = ScriptedError;

    fn fill(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.not_seeded {
            return Err(ScriptedError::not_seeded());
        }
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        buf.fill(0xA5);
        Ok(())
    }
}

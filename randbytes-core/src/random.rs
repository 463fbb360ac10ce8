//! Entropy sources.
//!
//! Uses `ring::rand::SystemRandom` on native targets and `getrandom` on WASM.

/// Substring identifying a CSPRNG that has not gathered enough entropy yet.
pub const NOT_SEEDED_MARKER: &str = "PRNG not seeded";

/// How a source failure is treated by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Not enough entropy yet; worth trying again.
    NotSeeded,
    /// Anything else; reported as-is.
    Other,
}

/// A cryptographically secure random generator the crate delegates to.
pub trait EntropySource: Send + Sync + 'static {
    /// The source's own error type, passed through to callers unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Classify a failure returned by [`EntropySource::fill`].
    ///
    /// The default looks for [`NOT_SEEDED_MARKER`] in the error message.
    fn classify(&self, err: &Self::Error) -> FailureKind {
        if err.to_string().contains(NOT_SEEDED_MARKER) {
            FailureKind::NotSeeded
        } else {
            FailureKind::Other
        }
    }
}

/// Error type of the platform source.
#[cfg(not(target_arch = "wasm32"))]
pub type OsError = ring::error::Unspecified;

/// Error type of the platform source (WASM version).
#[cfg(target_arch = "wasm32")]
pub type OsError = getrandom::Error;

/// The operating system's secure random generator.
#[derive(Debug)]
pub struct OsEntropy {
    #[cfg(not(target_arch = "wasm32"))]
    rng: ring::rand::SystemRandom,
}

impl OsEntropy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            rng: ring::rand::SystemRandom::new(),
        }
    }
}

impl Default for OsEntropy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl EntropySource for OsEntropy {
    type Error = OsError;

    fn fill(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        use ring::rand::SecureRandom;
        self.rng.fill(buf)
    }
}

#[cfg(target_arch = "wasm32")]
impl EntropySource for OsEntropy {
    type Error = OsError;

    fn fill(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        getrandom::getrandom(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedError, ScriptedSource};

    #[test]
    fn test_os_entropy_fills_buffer() {
        let source = OsEntropy::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        source.fill(&mut a).unwrap();
        source.fill(&mut b).unwrap();

        // Two 256-bit draws colliding would mean a broken source
        assert_ne!(a, b);
    }

    #[test]
    fn test_os_entropy_empty_buffer() {
        let source = OsEntropy::new();
        let mut buf = [0u8; 0];
        assert!(source.fill(&mut buf).is_ok());
    }

    #[test]
    fn test_default_classification_uses_marker() {
        let source = ScriptedSource::always_succeeds();
        assert_eq!(
            source.classify(&ScriptedError::not_seeded()),
            FailureKind::NotSeeded
        );
        assert_eq!(
            source.classify(&ScriptedError::other("disk on fire")),
            FailureKind::Other
        );
    }

    #[test]
    fn test_marker_matches_inside_longer_message() {
        let source = ScriptedSource::always_succeeds();
        let err = ScriptedError::other("error:24064064:random number generator:SSLEAY_RAND_BYTES:PRNG not seeded");
        assert_eq!(source.classify(&err), FailureKind::NotSeeded);
    }
}

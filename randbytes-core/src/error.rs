//! Error types for random byte generation.

use thiserror::Error;

/// Result type for generation requests against a source with error type `E`.
pub type Result<T, E> = std::result::Result<T, RandomError<E>>;

/// Caller programming errors.
///
/// These are always reported synchronously from the initiating call, whatever
/// the calling convention.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// The callback convention was used without a callback, or a deferred
    /// value was requested from a generator that has them disabled.
    #[error("argument callback is required")]
    CallbackRequired,

    /// Something other than a function was passed in the callback position.
    #[error("argument callback must be a function, got {0}")]
    CallbackNotFunction(String),

    /// Requested size exceeds what a single request may produce.
    #[error("argument size out of range: {size} > {max}")]
    SizeOutOfRange { size: usize, max: usize },

    /// Requested size is not a non-negative integer.
    #[error("argument size must be a non-negative integer, got {0}")]
    InvalidSize(String),
}

/// Terminal outcome of a failed generation request.
///
/// `E` is the entropy source's own error type. Errors that are not "not
/// seeded" are carried in [`RandomError::Source`] exactly as the source
/// produced them.
#[derive(Error, Debug)]
pub enum RandomError<E>
where
    E: std::error::Error + 'static,
{
    /// Invalid arguments to a blocking or awaited request.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The source kept reporting that it is not seeded.
    #[error("PRNG not seeded after {attempts} attempts")]
    NotSeeded {
        attempts: u32,
        #[source]
        source: E,
    },

    /// Any other source failure, passed through unchanged.
    #[error(transparent)]
    Source(E),

    /// The task driving the request was torn down before it completed.
    #[error("generation interrupted before completion")]
    Interrupted,
}

impl<E> RandomError<E>
where
    E: std::error::Error + 'static,
{
    /// Whether this is the terminal "not seeded" failure.
    #[must_use]
    pub fn is_not_seeded(&self) -> bool {
        matches!(self, Self::NotSeeded { .. })
    }

    /// The underlying source error, if the failure came from the source.
    #[must_use]
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::NotSeeded { source, .. } | Self::Source(source) => Some(source),
            Self::Argument(_) | Self::Interrupted => None,
        }
    }

    /// Take the underlying source error out, if there is one.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::NotSeeded { source, .. } | Self::Source(source) => Some(source),
            Self::Argument(_) | Self::Interrupted => None,
        }
    }
}

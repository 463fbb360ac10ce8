//! Callback argument validation.
//!
//! Dynamic hosts can hand us anything in the callback position. Bindings map
//! what they received into a [`CallbackArg`] and the generator rejects the bad
//! shapes before any work is scheduled.

use crate::error::ArgumentError;

/// What was passed in the callback position.
#[derive(Debug)]
pub enum CallbackArg<F> {
    /// Nothing was passed.
    Missing,
    /// A value that cannot be called; holds a description of its type.
    NotCallable(String),
    /// A usable callback.
    Callable(F),
}

impl<F> CallbackArg<F> {
    /// Unwrap the callback or report why it cannot be used.
    pub fn validate(self) -> Result<F, ArgumentError> {
        match self {
            Self::Callable(f) => Ok(f),
            Self::Missing => Err(ArgumentError::CallbackRequired),
            Self::NotCallable(kind) => Err(ArgumentError::CallbackNotFunction(kind)),
        }
    }

    /// Wrap a callable value, leaving the invalid shapes untouched.
    pub fn map<G>(self, f: impl FnOnce(F) -> G) -> CallbackArg<G> {
        match self {
            Self::Callable(callback) => CallbackArg::Callable(f(callback)),
            Self::Missing => CallbackArg::Missing,
            Self::NotCallable(kind) => CallbackArg::NotCallable(kind),
        }
    }
}

impl<F> From<Option<F>> for CallbackArg<F> {
    fn from(callback: Option<F>) -> Self {
        match callback {
            Some(f) => Self::Callable(f),
            None => Self::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Cb = fn(u8);

    #[test]
    fn test_missing_callback() {
        let err = CallbackArg::<Cb>::Missing.validate().unwrap_err();
        assert_eq!(err, ArgumentError::CallbackRequired);
        assert_eq!(err.to_string(), "argument callback is required");
    }

    #[test]
    fn test_not_callable() {
        let err = CallbackArg::<Cb>::NotCallable("string".into())
            .validate()
            .unwrap_err();
        assert!(err.to_string().starts_with("argument callback must be a function"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_map_keeps_shape() {
        let doubled = CallbackArg::Callable(2u8).map(|n| n * 2);
        assert!(matches!(doubled, CallbackArg::Callable(4)));

        let missing = CallbackArg::<u8>::Missing.map(|n| n * 2);
        assert!(matches!(missing, CallbackArg::Missing));

        let err = CallbackArg::<u8>::NotCallable("object".into())
            .map(|n| n * 2)
            .validate()
            .unwrap_err();
        assert_eq!(err, ArgumentError::CallbackNotFunction("object".into()));
    }

    #[test]
    fn test_from_option() {
        let f: Cb = |_| {};
        assert!(CallbackArg::from(Some(f)).validate().is_ok());
        assert!(CallbackArg::<Cb>::from(None).validate().is_err());
    }
}

//! Error types surfaced by fallible map operations.
//!
//! The trie itself cannot fail: absence is reported as `None`, and internal
//! invariant violations are defects checked with `debug_assert!`. The only
//! caller-facing failure is a key provider that refuses to hash or compare a
//! key. Such a failure is wrapped in [`ProviderError`] and returned from the
//! `try_*` family of operations; the map the operation was called on is left
//! untouched.

use std::convert::Infallible;

use thiserror::Error;

/// Failure raised by a [`KeyProvider`](crate::provider::KeyProvider) while the
/// map was hashing or comparing keys.
///
/// # Examples
///
/// ```
/// use hashtrie::error::ProviderError;
///
/// let error: ProviderError<String> = ProviderError::Hash("unhashable".to_string());
/// assert_eq!(error.to_string(), "key hash provider failed: unhashable");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProviderError<E> {
    /// The provider failed to hash a key.
    #[error("key hash provider failed: {0}")]
    Hash(E),
    /// The provider failed to compare two keys.
    #[error("key equality provider failed: {0}")]
    Equality(E),
}

impl<E> ProviderError<E> {
    /// Returns the error produced by the provider.
    pub fn into_inner(self) -> E {
        match self {
            Self::Hash(error) | Self::Equality(error) => error,
        }
    }
}

/// Result type of the fallible map operations.
pub type ProviderResult<T, E> = Result<T, ProviderError<E>>;

/// Extracts the value of a result whose provider cannot fail.
#[inline]
pub(crate) fn into_ok<T>(result: ProviderResult<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(ProviderError::Hash(never) | ProviderError::Equality(never)) => match never {},
    }
}

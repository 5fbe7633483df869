//! Key providers: how the trie hashes and compares keys.
//!
//! A [`KeyProvider`] bundles the two collaborators the trie needs for its
//! keys: a 32-bit hash function and an equality relation. They are fused into
//! one trait because they must agree with each other: whenever
//! `keys_equal(a, b)` holds, `hash_key(a) == hash_key(b)` must hold as well.
//! The trie relies on this but cannot check it; a provider that breaks it
//! makes keys unreachable.
//!
//! Two providers ship with the crate:
//!
//! - [`StandardProvider`]: uses the key's own [`Hash`] and [`Eq`]
//!   implementations. This is the default for [`HashTrieMap`].
//! - [`IdentityHasher`]: hashes and compares `Arc<T>` keys by allocation
//!   identity, for opaque keys that have no meaningful content equality.
//!
//! Providers whose operations can fail declare a non-[`Infallible`] error
//! type; maps built on them expose only the `try_*` operations.
//!
//! [`HashTrieMap`]: crate::persistent::HashTrieMap

mod identity;
mod mix;

use std::convert::Infallible;
use std::fmt;
use std::hash::{BuildHasher, Hash};

pub use identity::IdentityHasher;
pub use mix::{FloatKey, combine_unordered, fold_to_u32, hash_value, mix};

// =============================================================================
// KeyProvider
// =============================================================================

/// Hash and equality for the keys of a [`HashTrieMap`](crate::persistent::HashTrieMap).
///
/// # Contract
///
/// - `hash_key` is deterministic for the lifetime of the process.
/// - `keys_equal` is reflexive, symmetric and transitive.
/// - `keys_equal(a, b)` implies `hash_key(a) == hash_key(b)`.
///
/// Errors returned by either method are propagated to the caller of the map
/// operation that triggered them, wrapped in
/// [`ProviderError`](crate::error::ProviderError).
///
/// # Examples
///
/// A provider that treats ASCII keys case-insensitively:
///
/// ```
/// use std::convert::Infallible;
/// use hashtrie::persistent::HashTrieMap;
/// use hashtrie::provider::{KeyProvider, fold_to_u32};
///
/// #[derive(Clone, Default)]
/// struct CaseInsensitive;
///
/// impl KeyProvider<str> for CaseInsensitive {
///     type Error = Infallible;
///
///     fn hash_key(&self, key: &str) -> Result<u32, Infallible> {
///         let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
///         for byte in key.bytes() {
///             hash = (hash ^ u64::from(byte.to_ascii_lowercase())).wrapping_mul(0x0100_0000_01b3);
///         }
///         Ok(fold_to_u32(hash))
///     }
///
///     fn keys_equal(&self, left: &str, right: &str) -> Result<bool, Infallible> {
///         Ok(left.eq_ignore_ascii_case(right))
///     }
/// }
///
/// impl KeyProvider<String> for CaseInsensitive {
///     type Error = Infallible;
///
///     fn hash_key(&self, key: &String) -> Result<u32, Infallible> {
///         <Self as KeyProvider<str>>::hash_key(self, key)
///     }
///
///     fn keys_equal(&self, left: &String, right: &String) -> Result<bool, Infallible> {
///         Ok(left.eq_ignore_ascii_case(right))
///     }
/// }
///
/// let map = HashTrieMap::with_provider(CaseInsensitive).insert("Hello".to_string(), 1);
/// assert_eq!(map.get("HELLO"), Some(&1));
/// ```
pub trait KeyProvider<K: ?Sized> {
    /// Error raised when a key cannot be hashed or compared.
    type Error;

    /// Returns the 32-bit hash of `key`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the key cannot be hashed.
    fn hash_key(&self, key: &K) -> Result<u32, Self::Error>;

    /// Returns `true` if `left` and `right` denote the same key.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the keys cannot be compared.
    fn keys_equal(&self, left: &K, right: &K) -> Result<bool, Self::Error>;
}

// =============================================================================
// Hash builder selection
// =============================================================================

/// Hash builder used by [`StandardProvider`] and [`hash_value`].
///
/// Every choice here hashes with fixed keys, so equal keys hash equally
/// across maps and across calls within a process.
#[cfg(feature = "fxhash")]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// Hash builder used by [`StandardProvider`] and [`hash_value`].
///
/// Every choice here hashes with fixed keys, so equal keys hash equally
/// across maps and across calls within a process.
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub type DefaultHashBuilder = std::hash::BuildHasherDefault<ahash::AHasher>;

/// Hash builder used by [`StandardProvider`] and [`hash_value`].
///
/// Every choice here hashes with fixed keys, so equal keys hash equally
/// across maps and across calls within a process.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder =
    std::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>;

// =============================================================================
// StandardProvider
// =============================================================================

/// Provider backed by the key's own [`Hash`] and [`Eq`] implementations.
///
/// The 64-bit output of the hash builder `S` is folded to the 32 bits the
/// trie consumes. Any `Q: Hash + Eq` is supported, so maps keyed by `String`
/// can be queried with `&str`.
///
/// # Examples
///
/// ```
/// use hashtrie::provider::{KeyProvider, StandardProvider};
///
/// let provider = StandardProvider::new();
/// assert_eq!(provider.hash_key("key"), provider.hash_key(&"key".to_string()[..]));
/// assert_eq!(provider.keys_equal(&1, &1), Ok(true));
/// ```
#[derive(Clone, Copy, Default)]
pub struct StandardProvider<S = DefaultHashBuilder> {
    build_hasher: S,
}

impl StandardProvider {
    /// Creates a provider using [`DefaultHashBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> StandardProvider<S> {
    /// Creates a provider that hashes with `build_hasher`.
    ///
    /// The builder must be deterministic: two hashers it builds must produce
    /// the same output for the same input.
    #[must_use]
    pub const fn with_hasher(build_hasher: S) -> Self {
        Self { build_hasher }
    }

    /// Returns the hash builder.
    pub const fn hasher(&self) -> &S {
        &self.build_hasher
    }
}

impl<S> fmt::Debug for StandardProvider<S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("StandardProvider").finish_non_exhaustive()
    }
}

impl<Q, S> KeyProvider<Q> for StandardProvider<S>
where
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Error = Infallible;

    #[inline]
    fn hash_key(&self, key: &Q) -> Result<u32, Infallible> {
        Ok(fold_to_u32(self.build_hasher.hash_one(key)))
    }

    #[inline]
    fn keys_equal(&self, left: &Q, right: &Q) -> Result<bool, Infallible> {
        Ok(left == right)
    }
}

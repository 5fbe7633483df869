//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`HashTrieMap`], an immutable hash map
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `HashTrieMap` is based on a Hash Array Mapped Trie (HAMT). Each level of
//! the trie consumes 5 bits of a key's 32-bit hash, so a trie is at most 7
//! branch levels deep; keys whose hashes are fully equal share a collision
//! bucket.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! All operations return new maps without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Examples
//!
//! ```rust
//! use hashtrie::persistent::HashTrieMap;
//!
//! let map = HashTrieMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2)
//!     .insert("three".to_string(), 3);
//!
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(map.get("two"), Some(&2));
//! assert_eq!(map.get("three"), Some(&3));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! # Key providers
//!
//! Keys are hashed and compared by the map's
//! [`KeyProvider`]. [`HashTrieMap::new`] uses
//! [`StandardProvider`], which relies on the key's `Hash` and `Eq`;
//! [`HashTrieMap::with_provider`] accepts any other provider. Operations whose
//! provider may fail are available as `try_*` methods returning
//! [`ProviderResult`]; the plain methods require a provider whose error type is
//! [`Infallible`].

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::ReferenceCounter;
use super::iter::{IntoIter, Iter};
use super::node::{Inserter, Node, NodeRef, Removal};
use crate::error::{ProviderError, ProviderResult, into_ok};
use crate::provider::{KeyProvider, StandardProvider, combine_unordered, hash_value, mix};

// =============================================================================
// HashTrieMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// `HashTrieMap` is an immutable data structure that uses structural
/// sharing to efficiently support functional programming patterns.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// # Examples
///
/// ```rust
/// use hashtrie::persistent::HashTrieMap;
///
/// let map = HashTrieMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
pub struct HashTrieMap<K, V, P = StandardProvider> {
    /// Root node of the trie, `None` for the empty map
    root: Option<NodeRef<K, V>>,
    /// Number of entries
    length: usize,
    provider: P,
}

impl<K, V> HashTrieMap<K, V> {
    /// Creates a new empty map using [`StandardProvider`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map: HashTrieMap<String, i32> = HashTrieMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_provider(StandardProvider::new())
    }
}

impl<K: Clone + Hash + Eq, V: Clone> HashTrieMap<K, V> {
    /// Creates a map containing a single key-value pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::singleton("key".to_string(), 42);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get("key"), Some(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }
}

impl<K, V, P> HashTrieMap<K, V, P> {
    /// Creates a new empty map that hashes and compares keys with `provider`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    /// use hashtrie::provider::StandardProvider;
    ///
    /// let map: HashTrieMap<u64, &str> = HashTrieMap::with_provider(StandardProvider::new());
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_provider(provider: P) -> Self {
        Self {
            root: None,
            length: 0,
            provider,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the provider used to hash and compare keys.
    #[inline]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// Reference-equal maps are always equal; the converse does not hold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new().insert(1, "one");
    /// assert!(map.ptr_eq(&map.remove(&2)));
    /// assert!(!map.ptr_eq(&map.insert(2, "two")));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns an iterator over key-value pairs.
    ///
    /// The order depends on the key hashes, not on insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let mut keys: Vec<&String> = map.iter().map(|(key, _)| key).collect();
    /// keys.sort();
    /// assert_eq!(keys, vec!["a", "b"]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.length)
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let sum: i32 = map.values().sum();
    /// assert_eq!(sum, 3);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Calls `visit` once for every entry, in trie order.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        if let Some(root) = &self.root {
            root.for_each(&mut |_, key, value| visit(key, value));
        }
    }

    /// Folds every entry into an accumulator, in trie order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("bb".to_string(), 2);
    ///
    /// let weighted = map.fold(0, |accumulator, key, value| accumulator + key.len() * value);
    /// assert_eq!(weighted, 5);
    /// ```
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Returns an order-independent hash of the map's contents.
    ///
    /// The key hashes cached in the trie are mixed with the value hashes and
    /// summed, so the provider is not consulted. Maps that are equal and
    /// share a provider have equal structural hashes, whatever order their
    /// entries were inserted in.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let forward: HashTrieMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let backward: HashTrieMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
    /// assert_eq!(forward.structural_hash(), backward.structural_hash());
    /// ```
    #[must_use]
    pub fn structural_hash(&self) -> u32
    where
        V: Hash,
    {
        let mut accumulator = 0;
        if let Some(root) = &self.root {
            root.for_each(&mut |key_hash, _, value| {
                accumulator = combine_unordered(accumulator, mix(key_hash, hash_value(value)));
            });
        }
        accumulator
    }

    // =========================================================================
    // Fallible lookups
    // =========================================================================

    /// Returns a reference to the value corresponding to the key, or the
    /// provider's failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails to hash or compare
    /// keys.
    pub fn try_get<Q>(&self, key: &Q) -> ProviderResult<Option<&V>, P::Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q>,
    {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let hash = self.provider.hash_key(key).map_err(ProviderError::Hash)?;
        root.find(hash, key, &self.provider)
    }

    /// Returns `true` if the map contains the key, or the provider's failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails to hash or compare
    /// keys.
    pub fn try_contains_key<Q>(&self, key: &Q) -> ProviderResult<bool, P::Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q>,
    {
        Ok(self.try_get(key)?.is_some())
    }

    /// Compares two maps by contents, or returns the provider's failure.
    ///
    /// Every key of `self` is looked up in `other` with `other`'s provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails to hash or compare
    /// keys.
    pub fn try_equals(&self, other: &Self) -> ProviderResult<bool, P::Error>
    where
        V: PartialEq,
        P: KeyProvider<K>,
    {
        if self.length != other.length {
            return Ok(false);
        }
        if self.ptr_eq(other) {
            return Ok(true);
        }
        for (key, value) in self {
            match other.try_get(key)? {
                Some(other_value) if other_value == value => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Infallible lookups
    // =========================================================================

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, as long as the
    /// provider handles the borrowed form consistently.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new()
    ///     .insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q, Error = Infallible>,
    {
        into_ok(self.try_get(key))
    }

    /// Returns the value corresponding to the key, or `default` when absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new().insert("b".to_string(), 2);
    /// assert_eq!(map.get_or("b", &0), &2);
    /// assert_eq!(map.get_or("a", &0), &0);
    /// ```
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q, Error = Infallible>,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new()
    ///     .insert("key".to_string(), 42);
    ///
    /// assert!(map.contains_key("key"));
    /// assert!(!map.contains_key("other"));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q, Error = Infallible>,
    {
        self.get(key).is_some()
    }
}

impl<K: Clone, V: Clone, P: Clone> HashTrieMap<K, V, P> {
    fn with_root(&self, root: Option<NodeRef<K, V>>, length: usize) -> Self {
        Self {
            root,
            length,
            provider: self.provider.clone(),
        }
    }

    /// Shared insertion path. `unchanged` decides whether a replacement value
    /// equals the stored one, in which case `self` is returned as is.
    fn insert_with<F>(&self, key: K, value: V, unchanged: F) -> ProviderResult<Self, P::Error>
    where
        P: KeyProvider<K>,
        F: Fn(&V, &V) -> bool,
    {
        let hash = self.provider.hash_key(&key).map_err(ProviderError::Hash)?;
        let Some(root) = &self.root else {
            return Ok(self.with_root(Some(Node::entry(hash, key, value)), 1));
        };

        let mut inserter = Inserter::new(&self.provider, unchanged);
        let updated = inserter.assoc(root, 0, hash, key, value)?;
        if ReferenceCounter::ptr_eq(root, &updated) {
            return Ok(self.clone());
        }

        let length = if inserter.added() {
            self.length + 1
        } else {
            self.length
        };
        Ok(self.with_root(Some(updated), length))
    }

    // =========================================================================
    // Fallible updates
    // =========================================================================

    /// Inserts a key-value pair, or returns the provider's failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails to hash or compare
    /// keys. `self` is unaffected either way.
    pub fn try_insert(&self, key: K, value: V) -> ProviderResult<Self, P::Error>
    where
        P: KeyProvider<K>,
    {
        self.insert_with(key, value, |_, _| false)
    }

    /// Inserts a key-value pair unless the key already maps to an equal
    /// value, or returns the provider's failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails to hash or compare
    /// keys.
    pub fn try_insert_if_changed(&self, key: K, value: V) -> ProviderResult<Self, P::Error>
    where
        V: PartialEq,
        P: KeyProvider<K>,
    {
        self.insert_with(key, value, |current, replacement| current == replacement)
    }

    /// Removes a key, or returns the provider's failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails to hash or compare
    /// keys.
    pub fn try_remove<Q>(&self, key: &Q) -> ProviderResult<Self, P::Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q>,
    {
        let Some(root) = &self.root else {
            return Ok(self.clone());
        };
        let hash = self.provider.hash_key(key).map_err(ProviderError::Hash)?;

        match Node::without(root, 0, hash, key, &self.provider)? {
            Removal::Unchanged => Ok(self.clone()),
            Removal::Vanished => {
                debug_assert_eq!(self.length, 1);
                Ok(self.with_root(None, 0))
            }
            Removal::Replaced(updated) => Ok(self.with_root(Some(updated), self.length - 1)),
        }
    }

    // =========================================================================
    // Infallible updates
    // =========================================================================

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, the value is replaced.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map1 = HashTrieMap::new().insert("key".to_string(), 1);
    /// let map2 = map1.insert("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self
    where
        P: KeyProvider<K, Error = Infallible>,
    {
        into_ok(self.try_insert(key, value))
    }

    /// Inserts a key-value pair unless the key already maps to an equal value.
    ///
    /// When nothing changes the returned map shares its root with `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new().insert("key".to_string(), 1);
    ///
    /// assert!(map.insert_if_changed("key".to_string(), 1).ptr_eq(&map));
    /// assert!(!map.insert_if_changed("key".to_string(), 2).ptr_eq(&map));
    /// ```
    #[must_use]
    pub fn insert_if_changed(&self, key: K, value: V) -> Self
    where
        V: PartialEq,
        P: KeyProvider<K, Error = Infallible>,
    {
        into_ok(self.try_insert_if_changed(key, value))
    }

    /// Removes a key from the map.
    ///
    /// Returns a new map without the key. If the key doesn't exist,
    /// returns a map sharing the original root.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q, Error = Infallible>,
    {
        into_ok(self.try_remove(key))
    }

    /// Updates or removes a value for a key using an updater function.
    ///
    /// The updater function receives `Some(&V)` if the key exists, or `None` if it doesn't.
    /// If the updater returns `Some(V)`, the value is inserted or updated.
    /// If the updater returns `None`, the key is removed (if it exists).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map = HashTrieMap::new().insert("count".to_string(), 10);
    ///
    /// // Increment existing value
    /// let updated = map.update_with("count", |maybe_value| {
    ///     maybe_value.map(|value| value + 1)
    /// });
    /// assert_eq!(updated.get("count"), Some(&11));
    ///
    /// // Insert if not exists
    /// let inserted = map.update_with("new_key", |maybe_value| {
    ///     Some(maybe_value.copied().unwrap_or(100))
    /// });
    /// assert_eq!(inserted.get("new_key"), Some(&100));
    ///
    /// // Remove by returning None
    /// let removed = map.update_with("count", |_| None);
    /// assert_eq!(removed.get("count"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + ?Sized,
        P: KeyProvider<Q, Error = Infallible> + KeyProvider<K, Error = Infallible>,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let current = self.get(key);
        let present = current.is_some();

        match updater(current) {
            Some(value) => self.insert(key.to_owned(), value),
            None if present => self.remove(key),
            None => self.clone(),
        }
    }

    /// Merges two maps, with values from `other` taking precedence on key conflicts.
    ///
    /// # Complexity
    ///
    /// O(m log32 (n + m)) where m is the size of `other`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hashtrie::persistent::HashTrieMap;
    ///
    /// let map1 = HashTrieMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let map2 = HashTrieMap::new()
    ///     .insert("b".to_string(), 20)
    ///     .insert("c".to_string(), 3);
    ///
    /// let merged = map1.merge(&map2);
    ///
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&20)); // From map2
    /// assert_eq!(merged.get("c"), Some(&3));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self
    where
        P: KeyProvider<K, Error = Infallible>,
    {
        other.iter().fold(self.clone(), |result, (key, value)| {
            result.insert(key.clone(), value.clone())
        })
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, P: Clone> Clone for HashTrieMap<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
            provider: self.provider.clone(),
        }
    }
}

impl<K, V, P: Default> Default for HashTrieMap<K, V, P> {
    #[inline]
    fn default() -> Self {
        Self::with_provider(P::default())
    }
}

impl<K, V, P> FromIterator<(K, V)> for HashTrieMap<K, V, P>
where
    K: Clone,
    V: Clone,
    P: KeyProvider<K, Error = Infallible> + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, P> Extend<(K, V)> for HashTrieMap<K, V, P>
where
    K: Clone,
    V: Clone,
    P: KeyProvider<K, Error = Infallible> + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            *self = self.insert(key, value);
        }
    }
}

impl<K: Clone, V: Clone, P> IntoIterator for HashTrieMap<K, V, P> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(
            self.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

impl<'a, K, V, P> IntoIterator for &'a HashTrieMap<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, P> PartialEq for HashTrieMap<K, V, P>
where
    V: PartialEq,
    P: KeyProvider<K, Error = Infallible>,
{
    fn eq(&self, other: &Self) -> bool {
        into_ok(self.try_equals(other))
    }
}

impl<K, V, P> Eq for HashTrieMap<K, V, P>
where
    V: Eq,
    P: KeyProvider<K, Error = Infallible>,
{
}

impl<K, V: Hash, P> Hash for HashTrieMap<K, V, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.length);
        state.write_u32(self.structural_hash());
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P> fmt::Debug for HashTrieMap<K, V, P> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// Shared maps are Send/Sync only when nodes are reference counted with Arc
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(HashTrieMap<String, i32>: Send, Sync);
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(HashTrieMap<String, i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, P> serde::Serialize for HashTrieMap<K, V, P>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
struct HashTrieMapVisitor<K, V, P> {
    marker: std::marker::PhantomData<fn() -> HashTrieMap<K, V, P>>,
}

#[cfg(feature = "serde")]
impl<K, V, P> HashTrieMapVisitor<K, V, P> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, P> serde::de::Visitor<'de> for HashTrieMapVisitor<K, V, P>
where
    K: serde::Deserialize<'de> + Clone,
    V: serde::Deserialize<'de> + Clone,
    P: KeyProvider<K, Error = Infallible> + Clone + Default,
{
    type Value = HashTrieMap<K, V, P>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = HashTrieMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map = map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, P> serde::Deserialize<'de> for HashTrieMap<K, V, P>
where
    K: serde::Deserialize<'de> + Clone,
    V: serde::Deserialize<'de> + Clone,
    P: KeyProvider<K, Error = Infallible> + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(HashTrieMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! # hashtrie
//!
//! A persistent (immutable) associative map built on a Hash Array Mapped
//! Trie, with pluggable key hashing and equality.
//!
//! ## Overview
//!
//! - **Persistent map**: [`HashTrieMap`](persistent::HashTrieMap) returns a
//!   new map from every update and shares all untouched structure with the
//!   map it came from.
//! - **Key providers**: a [`KeyProvider`](provider::KeyProvider) decides how
//!   keys are hashed and compared. [`StandardProvider`](provider::StandardProvider)
//!   uses `Hash` and `Eq`; [`IdentityHasher`](provider::IdentityHasher) treats
//!   `Arc` keys as opaque identities.
//! - **Fallible providers**: failures from a provider surface as
//!   [`ProviderError`](error::ProviderError) through the `try_*` methods and
//!   leave every existing map untouched.
//!
//! ## Feature Flags
//!
//! - `arc`: Share nodes through `Arc` instead of `Rc`, making maps `Send + Sync`
//! - `serde`: Serialize and deserialize maps as serde maps
//! - `fxhash`: Use `rustc-hash` as the default hasher
//! - `ahash`: Use `ahash` as the default hasher
//! - `tracing`: Emit trace events for node transitions and provider activity
//! - `full`: Enable `arc`, `serde`, and `tracing`
//!
//! ## Example
//!
//! ```rust
//! use hashtrie::prelude::*;
//!
//! let map = HashTrieMap::new().insert("a", 1).insert("b", 2);
//! let without_a = map.remove("a");
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(without_a.get("b"), Some(&2));
//! assert!(!without_a.contains_key("a"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use hashtrie::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ProviderError, ProviderResult};
    pub use crate::persistent::HashTrieMap;
    pub use crate::provider::{FloatKey, IdentityHasher, KeyProvider, StandardProvider};
}

pub mod error;
pub mod persistent;
pub mod provider;

mod trace;

//! Persistent (immutable) hash trie map.
//!
//! This module provides [`HashTrieMap`], an immutable associative map built
//! on a Hash Array Mapped Trie. Updates return new maps and share every
//! unchanged subtree with the map they were derived from.
//!
//! # Structural Sharing
//!
//! ```rust
//! use hashtrie::persistent::HashTrieMap;
//!
//! let map = HashTrieMap::new()
//!     .insert("a".to_string(), 1)
//!     .insert("b".to_string(), 2);
//! let without_a = map.remove("a");
//!
//! assert!(!without_a.contains_key("a"));
//! assert_eq!(without_a.get_or("b", &0), &2);
//! assert_eq!(without_a.len(), 1);
//!
//! // The two-entry version is unaffected by the removal
//! assert_eq!(map.get("a"), Some(&1));
//! assert_eq!(map.len(), 2);
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod hashmap;
mod iter;
mod node;

pub use hashmap::HashTrieMap;
pub use iter::{IntoIter, Iter};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = ReferenceCounter::clone(&reference_counter);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }
}

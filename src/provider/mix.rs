//! Bit mixing helpers shared by the providers and the map's own hash.

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

use super::DefaultHashBuilder;

/// Folds a 64-bit hash into 32 bits.
///
/// The high half is multiplied into the low half before the final avalanche
/// so that hashers whose entropy sits in the upper bits (such as FxHash)
/// still spread keys across the low 5-bit fragments the trie consumes first.
#[inline]
#[must_use]
pub const fn fold_to_u32(hash: u64) -> u32 {
    let folded = (hash ^ (hash >> 32)).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    avalanche((folded >> 32) as u32)
}

/// Combines two 32-bit hashes into one, order-dependently.
///
/// Used to merge a key hash with its value hash.
///
/// # Examples
///
/// ```
/// use hashtrie::provider::mix;
///
/// assert_ne!(mix(1, 2), mix(2, 1));
/// ```
#[inline]
#[must_use]
pub const fn mix(left: u32, right: u32) -> u32 {
    avalanche(left.rotate_left(5) ^ right.wrapping_mul(0x85eb_ca6b))
}

/// Accumulates an element hash into an order-independent container hash.
///
/// # Examples
///
/// ```
/// use hashtrie::provider::combine_unordered;
///
/// let forward = combine_unordered(combine_unordered(0, 7), 11);
/// let backward = combine_unordered(combine_unordered(0, 11), 7);
/// assert_eq!(forward, backward);
/// ```
#[inline]
#[must_use]
pub const fn combine_unordered(accumulator: u32, element: u32) -> u32 {
    accumulator.wrapping_add(element)
}

/// Hashes an arbitrary value to 32 bits with [`DefaultHashBuilder`].
#[inline]
#[must_use]
pub fn hash_value<T: Hash + ?Sized>(value: &T) -> u32 {
    fold_to_u32(DefaultHashBuilder::default().hash_one(value))
}

/// Murmur3 finalizer.
#[inline]
const fn avalanche(mut hash: u32) -> u32 {
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85eb_ca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2_ae35);
    hash ^ (hash >> 16)
}

// =============================================================================
// FloatKey
// =============================================================================

/// An `f64` usable as a map key.
///
/// Equality and hashing work on the canonical IEEE-754 bit pattern: `-0.0`
/// equals `0.0`, and every NaN equals every other NaN. This makes the key
/// reflexive and hash-consistent, which plain `f64` is not.
///
/// # Examples
///
/// ```
/// use hashtrie::persistent::HashTrieMap;
/// use hashtrie::provider::FloatKey;
///
/// let map = HashTrieMap::new().insert(FloatKey::new(0.0), "zero");
/// assert_eq!(map.get(&FloatKey::new(-0.0)), Some(&"zero"));
/// ```
#[derive(Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    /// Wraps a float.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the wrapped float.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    fn canonical_bits(self) -> u64 {
        if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.canonical_bits());
    }
}

impl fmt::Debug for FloatKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, formatter)
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

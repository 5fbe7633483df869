//! Identity hashing for opaque keys.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::{KeyProvider, mix};
use crate::trace::debug_provider;

/// Smallest table size at which dead allocations are swept.
const PRUNE_THRESHOLD: usize = 64;

/// Provider that hashes and compares `Arc<T>` keys by allocation identity.
///
/// The first time an allocation is hashed it is assigned the next id from an
/// atomic counter; later requests for the same allocation return the cached
/// id. The side table holds only [`Weak`] references, so it never keeps a key
/// alive; slots of dropped keys are swept whenever the table has doubled since
/// the last sweep, and a later allocation at the same address gets a fresh id.
///
/// Equality is [`Arc::ptr_eq`]: two keys with identical contents are
/// different keys unless they are the same allocation. Mixing this provider
/// with content-equal keys is a caller error.
///
/// Clones share one table, so every map built from clones of one hasher sees
/// the same ids. The hasher is `Send + Sync`; concurrent first-time requests
/// for the same allocation are serialized by the table lock and observe one
/// id.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hashtrie::persistent::HashTrieMap;
/// use hashtrie::provider::IdentityHasher;
///
/// let first = Arc::new("note".to_string());
/// let second = Arc::new("note".to_string());
///
/// let map = HashTrieMap::with_provider(IdentityHasher::new())
///     .insert(Arc::clone(&first), 1)
///     .insert(Arc::clone(&second), 2);
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&first), Some(&1));
/// assert_eq!(map.get(&second), Some(&2));
/// ```
pub struct IdentityHasher<T: ?Sized> {
    table: Arc<IdentityTable<T>>,
}

struct IdentityTable<T: ?Sized> {
    next_identity: AtomicU32,
    slots: Mutex<IdentitySlots<T>>,
}

/// Slots keyed by allocation address.
///
/// `prune_at` doubles with the live population after each sweep, so a table
/// of long-lived keys is not rescanned on every insertion.
struct IdentitySlots<T: ?Sized> {
    by_address: HashMap<usize, IdentitySlot<T>>,
    prune_at: usize,
}

struct IdentitySlot<T: ?Sized> {
    allocation: Weak<T>,
    identity: u32,
}

impl<T: ?Sized> IdentityHasher<T> {
    /// Creates a hasher with an empty identity table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(IdentityTable {
                next_identity: AtomicU32::new(0),
                slots: Mutex::new(IdentitySlots {
                    by_address: HashMap::new(),
                    prune_at: PRUNE_THRESHOLD,
                }),
            }),
        }
    }

    /// Returns the identity assigned to `key`, assigning one if needed.
    pub fn identity_of(&self, key: &Arc<T>) -> u32 {
        let address = Arc::as_ptr(key).cast::<()>().addr();
        let mut slots = self.table.slots.lock();

        if let Some(slot) = slots.by_address.get(&address)
            && slot.allocation.strong_count() > 0
        {
            return slot.identity;
        }

        if slots.by_address.len() >= slots.prune_at {
            slots
                .by_address
                .retain(|_, slot| slot.allocation.strong_count() > 0);
            slots.prune_at = PRUNE_THRESHOLD.max(slots.by_address.len() * 2);
            debug_provider!(
                live = slots.by_address.len(),
                next_sweep = slots.prune_at,
                "pruned identity table"
            );
        }

        let identity = self.table.next_identity.fetch_add(1, Ordering::Relaxed);
        slots.by_address.insert(
            address,
            IdentitySlot {
                allocation: Arc::downgrade(key),
                identity,
            },
        );
        identity
    }

    /// Returns how many identities have been issued so far.
    pub fn identities_issued(&self) -> u32 {
        self.table.next_identity.load(Ordering::Relaxed)
    }

    /// Returns how many allocations the side table currently tracks,
    /// including dead ones not yet swept.
    pub fn tracked(&self) -> usize {
        self.table.slots.lock().by_address.len()
    }
}

impl<T: ?Sized> Default for IdentityHasher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for IdentityHasher<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<T: ?Sized> fmt::Debug for IdentityHasher<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IdentityHasher")
            .field("identities_issued", &self.identities_issued())
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> KeyProvider<Arc<T>> for IdentityHasher<T> {
    type Error = Infallible;

    #[inline]
    fn hash_key(&self, key: &Arc<T>) -> Result<u32, Infallible> {
        // Sequential ids would otherwise fill the trie one fragment at a time.
        Ok(mix(self.identity_of(key), 0))
    }

    #[inline]
    fn keys_equal(&self, left: &Arc<T>, right: &Arc<T>) -> Result<bool, Infallible> {
        Ok(Arc::ptr_eq(left, right))
    }
}

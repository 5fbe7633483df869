//! Trie nodes and the operations over them.
//!
//! A trie is built from four immutable node shapes:
//!
//! - `Entry`: one key-value pair together with the key's full hash.
//! - `Index`: a sparse branch. Bit `i` of `bitmap` is set when logical slot
//!   `i` is occupied; `children` holds exactly `popcount(bitmap)` nodes in
//!   slot order.
//! - `Array`: a dense branch of 32 optional slots, used once a sparse branch
//!   outgrows [`MAX_INDEX_NODE`] children.
//! - `Collision`: pairs whose keys share one full hash, told apart by the
//!   provider's equality.
//!
//! `Entry` and `Collision` are *leaves*. Because they carry their full hash
//! they are valid at any depth, which lets a deletion lift a lone leaf up
//! into its parent's place.
//!
//! Nothing here mutates a node. `assoc` and `without` rebuild the path from
//! the touched leaf up to the root and share every other subtree.

use std::borrow::Borrow;

use static_assertions::const_assert;

use super::ReferenceCounter;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::KeyProvider;
use crate::trace::trace_transition;

// =============================================================================
// Constants
// =============================================================================

/// Hash bits consumed per trie level.
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Branching factor (2^5 = 32)
pub(crate) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Bit mask for extracting a slot from a hash.
const MASK: u32 = (1 << BITS_PER_LEVEL) - 1;

/// Most children a sparse branch holds before it is promoted to an array.
pub(crate) const MAX_INDEX_NODE: usize = BRANCHING_FACTOR / 2;

/// Occupancy at or below which an array is compacted back to a sparse branch.
pub(crate) const MIN_ARRAY_NODE: usize = BRANCHING_FACTOR / 4;

/// Number of branch levels before the 32 hash bits are exhausted.
pub(crate) const MAX_DEPTH: usize = (u32::BITS as usize).div_ceil(BITS_PER_LEVEL as usize);

const_assert!(BRANCHING_FACTOR == u32::BITS as usize);
const_assert!(MIN_ARRAY_NODE < MAX_INDEX_NODE);
const_assert!(MAX_DEPTH * (BITS_PER_LEVEL as usize) >= u32::BITS as usize);

// =============================================================================
// Bit utilities
// =============================================================================

/// Returns the slot `hash` occupies at `shift`.
#[inline]
const fn fragment(hash: u32, shift: u32) -> usize {
    ((hash >> shift) & MASK) as usize
}

/// Returns the bitmap bit for the slot `hash` occupies at `shift`.
#[inline]
const fn bit_position(hash: u32, shift: u32) -> u32 {
    1 << fragment(hash, shift)
}

/// Returns the position in a compacted children array of the slot `bit`.
#[inline]
const fn sparse_index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

#[inline]
fn keys_equal<Q, P>(provider: &P, left: &Q, right: &Q) -> ProviderResult<bool, P::Error>
where
    Q: ?Sized,
    P: KeyProvider<Q>,
{
    provider
        .keys_equal(left, right)
        .map_err(ProviderError::Equality)
}

/// Finds the position of `key` among the pairs of a collision bucket.
fn position_of<K, V, Q, P>(
    provider: &P,
    entries: &[(K, V)],
    key: &Q,
) -> ProviderResult<Option<usize>, P::Error>
where
    K: Borrow<Q>,
    Q: ?Sized,
    P: KeyProvider<Q>,
{
    for (index, (entry_key, _)) in entries.iter().enumerate() {
        if keys_equal(provider, entry_key.borrow(), key)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

// =============================================================================
// Node Definition
// =============================================================================

/// Shared reference to a node.
pub(crate) type NodeRef<K, V> = ReferenceCounter<Node<K, V>>;

/// The slots of an array node.
pub(crate) type Slots<K, V> = [Option<NodeRef<K, V>>; BRANCHING_FACTOR];

/// Internal node structure for the HAMT.
pub(crate) enum Node<K, V> {
    /// Single key-value pair
    Entry { hash: u32, key: K, value: V },
    /// Dense branch; `size` counts the occupied slots
    Array { size: usize, slots: Box<Slots<K, V>> },
    /// Sparse branch
    Index {
        bitmap: u32,
        children: Vec<NodeRef<K, V>>,
    },
    /// Pairs whose keys share `hash`
    Collision { hash: u32, entries: Vec<(K, V)> },
}

/// Outcome of removing a key from a subtree.
pub(crate) enum Removal<K, V> {
    /// The key was not present; the subtree is reused as is.
    Unchanged,
    /// The subtree held only the removed key and is now empty.
    Vanished,
    /// The subtree was rebuilt without the key.
    Replaced(NodeRef<K, V>),
}

impl<K, V> Node<K, V> {
    pub(crate) fn entry(hash: u32, key: K, value: V) -> NodeRef<K, V> {
        ReferenceCounter::new(Self::Entry { hash, key, value })
    }

    fn index(bitmap: u32, children: Vec<NodeRef<K, V>>) -> NodeRef<K, V> {
        debug_assert_eq!(bitmap.count_ones() as usize, children.len());
        debug_assert!(children.len() <= MAX_INDEX_NODE);
        ReferenceCounter::new(Self::Index { bitmap, children })
    }

    fn array(size: usize, slots: Box<Slots<K, V>>) -> NodeRef<K, V> {
        debug_assert_eq!(slots.iter().filter(|slot| slot.is_some()).count(), size);
        ReferenceCounter::new(Self::Array { size, slots })
    }

    fn collision(hash: u32, entries: Vec<(K, V)>) -> NodeRef<K, V> {
        debug_assert!(entries.len() >= 2);
        ReferenceCounter::new(Self::Collision { hash, entries })
    }

    /// Returns `true` for nodes that carry their own hash.
    const fn is_leaf(&self) -> bool {
        matches!(self, Self::Entry { .. } | Self::Collision { .. })
    }

    // =========================================================================
    // find
    // =========================================================================

    /// Looks up `key`, whose hash is `hash`, in the subtree rooted here.
    pub(crate) fn find<'a, Q, P>(
        &'a self,
        hash: u32,
        key: &Q,
        provider: &P,
    ) -> ProviderResult<Option<&'a V>, P::Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        P: KeyProvider<Q>,
    {
        let mut node = self;
        let mut shift = 0;

        loop {
            match node {
                Self::Entry {
                    hash: entry_hash,
                    key: entry_key,
                    value,
                } => {
                    let found =
                        *entry_hash == hash && keys_equal(provider, entry_key.borrow(), key)?;
                    return Ok(found.then_some(value));
                }
                Self::Array { slots, .. } => match &slots[fragment(hash, shift)] {
                    Some(child) => node = &**child,
                    None => return Ok(None),
                },
                Self::Index { bitmap, children } => {
                    let bit = bit_position(hash, shift);
                    if bitmap & bit == 0 {
                        return Ok(None);
                    }
                    node = &*children[sparse_index(*bitmap, bit)];
                }
                Self::Collision {
                    hash: collision_hash,
                    entries,
                } => {
                    if *collision_hash != hash {
                        return Ok(None);
                    }
                    let position = position_of(provider, entries, key)?;
                    return Ok(position.map(|index| &entries[index].1));
                }
            }
            shift += BITS_PER_LEVEL;
        }
    }

    // =========================================================================
    // assoc helpers
    // =========================================================================

    /// Joins two leaves with different hashes into a branch at `shift`.
    fn merge_leaves(
        shift: u32,
        first_hash: u32,
        first: NodeRef<K, V>,
        second_hash: u32,
        second: NodeRef<K, V>,
    ) -> NodeRef<K, V> {
        debug_assert_ne!(first_hash, second_hash);
        debug_assert!(shift < u32::BITS);

        let first_fragment = fragment(first_hash, shift);
        let second_fragment = fragment(second_hash, shift);

        if first_fragment == second_fragment {
            let child = Self::merge_leaves(
                shift + BITS_PER_LEVEL,
                first_hash,
                first,
                second_hash,
                second,
            );
            return Self::index(1 << first_fragment, vec![child]);
        }

        let bitmap = (1 << first_fragment) | (1 << second_fragment);
        let children = if first_fragment < second_fragment {
            vec![first, second]
        } else {
            vec![second, first]
        };
        Self::index(bitmap, children)
    }

    /// Promotes a full sparse branch to an array, adding `leaf` at `slot`.
    fn expand(
        slot: usize,
        leaf: NodeRef<K, V>,
        bitmap: u32,
        children: &[NodeRef<K, V>],
    ) -> NodeRef<K, V> {
        let mut slots: Box<Slots<K, V>> = Box::new(std::array::from_fn(|_| None));
        let mut remaining = children.iter();
        for (position, target) in slots.iter_mut().enumerate() {
            if bitmap & (1 << position) != 0 {
                *target = remaining.next().cloned();
            }
        }
        slots[slot] = Some(leaf);
        Self::array(children.len() + 1, slots)
    }

    /// Compacts an array into a sparse branch, leaving out `removed`.
    fn pack(removed: usize, slots: &Slots<K, V>) -> NodeRef<K, V> {
        let mut bitmap = 0;
        let mut children = Vec::with_capacity(MIN_ARRAY_NODE);
        for (position, slot) in slots.iter().enumerate() {
            if position != removed
                && let Some(child) = slot
            {
                bitmap |= 1 << position;
                children.push(ReferenceCounter::clone(child));
            }
        }
        Self::index(bitmap, children)
    }

    // =========================================================================
    // without
    // =========================================================================

    /// Removes `key`, whose hash is `hash`, from the subtree `node`.
    pub(crate) fn without<Q, P>(
        node: &NodeRef<K, V>,
        shift: u32,
        hash: u32,
        key: &Q,
        provider: &P,
    ) -> ProviderResult<Removal<K, V>, P::Error>
    where
        K: Borrow<Q> + Clone,
        V: Clone,
        Q: ?Sized,
        P: KeyProvider<Q>,
    {
        match &**node {
            Self::Entry {
                hash: entry_hash,
                key: entry_key,
                ..
            } => {
                if *entry_hash == hash && keys_equal(provider, entry_key.borrow(), key)? {
                    Ok(Removal::Vanished)
                } else {
                    Ok(Removal::Unchanged)
                }
            }
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return Ok(Removal::Unchanged);
                }
                let Some(index) = position_of(provider, entries, key)? else {
                    return Ok(Removal::Unchanged);
                };
                if entries.len() <= 2 {
                    trace_transition!(hash = hash, "collapsing collision node to entry");
                    return Ok(entries.get(1 - index).map_or(
                        Removal::Vanished,
                        |(remaining_key, remaining_value)| {
                            Removal::Replaced(Self::entry(
                                hash,
                                remaining_key.clone(),
                                remaining_value.clone(),
                            ))
                        },
                    ));
                }
                let mut updated = entries.clone();
                updated.remove(index);
                Ok(Removal::Replaced(Self::collision(hash, updated)))
            }
            Self::Index { bitmap, children } => {
                let bit = bit_position(hash, shift);
                if bitmap & bit == 0 {
                    return Ok(Removal::Unchanged);
                }
                let index = sparse_index(*bitmap, bit);

                match Self::without(&children[index], shift + BITS_PER_LEVEL, hash, key, provider)? {
                    Removal::Unchanged => Ok(Removal::Unchanged),
                    Removal::Vanished => {
                        let remaining = bitmap & !bit;
                        if remaining == 0 {
                            return Ok(Removal::Vanished);
                        }
                        if children.len() == 2 && children[index ^ 1].is_leaf() {
                            return Ok(Removal::Replaced(ReferenceCounter::clone(
                                &children[index ^ 1],
                            )));
                        }
                        let mut updated = children.clone();
                        updated.remove(index);
                        Ok(Removal::Replaced(Self::index(remaining, updated)))
                    }
                    Removal::Replaced(child) => {
                        if children.len() == 1 && child.is_leaf() {
                            return Ok(Removal::Replaced(child));
                        }
                        let mut updated = children.clone();
                        updated[index] = child;
                        Ok(Removal::Replaced(Self::index(*bitmap, updated)))
                    }
                }
            }
            Self::Array { size, slots } => {
                let slot = fragment(hash, shift);
                let Some(child) = &slots[slot] else {
                    return Ok(Removal::Unchanged);
                };

                match Self::without(child, shift + BITS_PER_LEVEL, hash, key, provider)? {
                    Removal::Unchanged => Ok(Removal::Unchanged),
                    Removal::Vanished => {
                        let remaining = size - 1;
                        if remaining <= MIN_ARRAY_NODE {
                            trace_transition!(
                                shift = shift,
                                remaining = remaining,
                                "compacting array node to index node"
                            );
                            return Ok(Removal::Replaced(Self::pack(slot, slots)));
                        }
                        let mut updated = slots.clone();
                        updated[slot] = None;
                        Ok(Removal::Replaced(Self::array(remaining, updated)))
                    }
                    Removal::Replaced(child) => {
                        let mut updated = slots.clone();
                        updated[slot] = Some(child);
                        Ok(Removal::Replaced(Self::array(*size, updated)))
                    }
                }
            }
        }
    }

    // =========================================================================
    // for_each
    // =========================================================================

    /// Visits every pair of the subtree in pre-order, passing the key's hash.
    pub(crate) fn for_each<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(u32, &'a K, &'a V),
    {
        match self {
            Self::Entry { hash, key, value } => visit(*hash, key, value),
            Self::Array { slots, .. } => {
                for child in slots.iter().flatten() {
                    child.for_each(visit);
                }
            }
            Self::Index { children, .. } => {
                for child in children {
                    child.for_each(visit);
                }
            }
            Self::Collision { hash, entries } => {
                for (key, value) in entries {
                    visit(*hash, key, value);
                }
            }
        }
    }

    /// Checks the structural invariants of the subtree and returns the number
    /// of pairs it holds.
    #[cfg(test)]
    pub(crate) fn verify(&self) -> usize {
        match self {
            Self::Entry { .. } => 1,
            Self::Array { size, slots } => {
                let occupied = slots.iter().flatten().count();
                assert_eq!(occupied, *size, "array size out of sync");
                assert!(occupied > MIN_ARRAY_NODE, "array node should have been packed");
                slots
                    .iter()
                    .flatten()
                    .map(|child| child.verify())
                    .sum()
            }
            Self::Index { bitmap, children } => {
                assert_eq!(bitmap.count_ones() as usize, children.len());
                assert!(!children.is_empty(), "empty index node");
                assert!(children.len() <= MAX_INDEX_NODE, "index node should have been expanded");
                children
                    .iter()
                    .map(|child| child.verify())
                    .sum()
            }
            Self::Collision { entries, .. } => {
                assert!(entries.len() >= 2, "collision node should have collapsed");
                entries.len()
            }
        }
    }
}

// =============================================================================
// assoc
// =============================================================================

/// Insertion state threaded through [`Inserter::assoc`].
///
/// `unchanged` decides whether a replacement value is the same as the stored
/// one, in which case the existing node is returned untouched. `added`
/// records whether the insertion created a new leaf.
pub(crate) struct Inserter<'a, P, F> {
    provider: &'a P,
    unchanged: F,
    added: bool,
}

impl<'a, P, F> Inserter<'a, P, F> {
    pub(crate) const fn new(provider: &'a P, unchanged: F) -> Self {
        Self {
            provider,
            unchanged,
            added: false,
        }
    }

    /// Returns `true` if an insertion added a new key.
    pub(crate) const fn added(&self) -> bool {
        self.added
    }

    /// Inserts `key` into the subtree `node` at `shift`, returning the new
    /// subtree root, or `node` itself when nothing changed.
    pub(crate) fn assoc<K, V>(
        &mut self,
        node: &NodeRef<K, V>,
        shift: u32,
        hash: u32,
        key: K,
        value: V,
    ) -> ProviderResult<NodeRef<K, V>, P::Error>
    where
        K: Clone,
        V: Clone,
        P: KeyProvider<K>,
        F: Fn(&V, &V) -> bool,
    {
        match &**node {
            Node::Entry {
                hash: entry_hash,
                key: entry_key,
                value: entry_value,
            } => {
                if *entry_hash != hash {
                    self.added = true;
                    return Ok(Node::merge_leaves(
                        shift,
                        *entry_hash,
                        ReferenceCounter::clone(node),
                        hash,
                        Node::entry(hash, key, value),
                    ));
                }
                if keys_equal(self.provider, entry_key, &key)? {
                    if (self.unchanged)(entry_value, &value) {
                        return Ok(ReferenceCounter::clone(node));
                    }
                    return Ok(Node::entry(hash, key, value));
                }
                self.added = true;
                trace_transition!(hash = hash, "creating collision node");
                Ok(Node::collision(
                    hash,
                    vec![(entry_key.clone(), entry_value.clone()), (key, value)],
                ))
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    self.added = true;
                    return Ok(Node::merge_leaves(
                        shift,
                        *collision_hash,
                        ReferenceCounter::clone(node),
                        hash,
                        Node::entry(hash, key, value),
                    ));
                }
                let position = position_of(self.provider, entries, &key)?;
                if let Some(index) = position
                    && (self.unchanged)(&entries[index].1, &value)
                {
                    return Ok(ReferenceCounter::clone(node));
                }
                let mut updated = entries.clone();
                match position {
                    Some(index) => updated[index] = (key, value),
                    None => {
                        self.added = true;
                        updated.push((key, value));
                    }
                }
                Ok(Node::collision(hash, updated))
            }
            Node::Index { bitmap, children } => {
                let bit = bit_position(hash, shift);
                let index = sparse_index(*bitmap, bit);

                if bitmap & bit != 0 {
                    let child = &children[index];
                    let updated_child =
                        self.assoc(child, shift + BITS_PER_LEVEL, hash, key, value)?;
                    if ReferenceCounter::ptr_eq(child, &updated_child) {
                        return Ok(ReferenceCounter::clone(node));
                    }
                    let mut updated = children.clone();
                    updated[index] = updated_child;
                    return Ok(Node::index(*bitmap, updated));
                }

                self.added = true;
                let leaf = Node::entry(hash, key, value);
                if children.len() >= MAX_INDEX_NODE {
                    trace_transition!(shift = shift, "promoting index node to array node");
                    return Ok(Node::expand(fragment(hash, shift), leaf, *bitmap, children));
                }
                let mut updated = Vec::with_capacity(children.len() + 1);
                updated.extend_from_slice(&children[..index]);
                updated.push(leaf);
                updated.extend_from_slice(&children[index..]);
                Ok(Node::index(bitmap | bit, updated))
            }
            Node::Array { size, slots } => {
                let slot = fragment(hash, shift);
                match &slots[slot] {
                    Some(child) => {
                        let updated_child =
                            self.assoc(child, shift + BITS_PER_LEVEL, hash, key, value)?;
                        if ReferenceCounter::ptr_eq(child, &updated_child) {
                            return Ok(ReferenceCounter::clone(node));
                        }
                        let mut updated = slots.clone();
                        updated[slot] = Some(updated_child);
                        Ok(Node::array(*size, updated))
                    }
                    None => {
                        self.added = true;
                        let mut updated = slots.clone();
                        updated[slot] = Some(Node::entry(hash, key, value));
                        Ok(Node::array(size + 1, updated))
                    }
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

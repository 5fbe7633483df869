//! Depth-first traversal over a trie.

use std::iter::FusedIterator;
use std::slice;

use smallvec::SmallVec;

use super::node::{MAX_DEPTH, Node, NodeRef};

/// One partially visited branch or collision bucket.
enum Frame<'a, K, V> {
    Children(slice::Iter<'a, NodeRef<K, V>>),
    Slots(slice::Iter<'a, Option<NodeRef<K, V>>>),
    Entries(slice::Iter<'a, (K, V)>),
}

/// An iterator over key-value pairs of a [`HashTrieMap`](super::HashTrieMap).
///
/// Pairs are yielded in trie order, which depends on the key hashes and not
/// on insertion order.
pub struct Iter<'a, K, V> {
    /// Node to descend into before resuming the stack
    pending: Option<&'a Node<K, V>>,
    stack: SmallVec<[Frame<'a, K, V>; MAX_DEPTH + 1]>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Node<K, V>>, length: usize) -> Self {
        Self {
            pending: root,
            stack: SmallVec::new(),
            remaining: length,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.pending.take() {
                match node {
                    Node::Entry { key, value, .. } => {
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    Node::Index { children, .. } => {
                        self.stack.push(Frame::Children(children.iter()));
                    }
                    Node::Array { slots, .. } => self.stack.push(Frame::Slots(slots.iter())),
                    Node::Collision { entries, .. } => {
                        self.stack.push(Frame::Entries(entries.iter()));
                    }
                }
            }

            let frame = self.stack.last_mut()?;
            let next = match frame {
                Frame::Children(children) => children.next(),
                Frame::Slots(slots) => slots.find_map(Option::as_ref),
                Frame::Entries(entries) => {
                    if let Some((key, value)) = entries.next() {
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    None
                }
            };

            match next {
                Some(child) => self.pending = Some(&**child),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`HashTrieMap`](super::HashTrieMap).
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(entries: Vec<(K, V)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

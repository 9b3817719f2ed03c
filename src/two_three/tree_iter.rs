use super::node::Node;
use crate::arena::{Arena, NodeId};

/// A position in a `TwoThreeSet`: a value slot of a node, or the end.
///
/// Cursors don't borrow the set. Each one remembers the modification stamp of the set
/// that produced it, so using it after the set was mutated is reported as
/// `Error::StaleCursor` instead of reading an unrelated value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub(super) position: Option<(NodeId, usize)>,
    pub(super) stamp: u64,
}

impl Cursor {
    pub(super) fn new(position: Option<(NodeId, usize)>, stamp: u64) -> Self {
        Cursor { position, stamp }
    }

    /// Return whether this is the past-the-end cursor
    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }
}

/// Follow first children down to a leaf
pub(super) fn leftmost<T>(nodes: &Arena<Node<T>>, mut node: NodeId) -> NodeId {
    while !nodes[node].is_leaf() {
        node = nodes[node].child(0);
    }
    node
}

/// Return the in-order successor of the value at (`node`, `index`).
/// It either lives in the leftmost leaf of the next child, in the same leaf, or in the
/// closest ancestor reached from a child that is not its last one
pub(super) fn successor<T>(
    nodes: &Arena<Node<T>>,
    node: NodeId,
    index: usize,
) -> Option<(NodeId, usize)> {
    let current = &nodes[node];
    if !current.is_leaf() {
        return Some((leftmost(nodes, current.child(index + 1)), 0));
    }
    if index + 1 < current.value_count() {
        return Some((node, index + 1));
    }

    // Climb while we are coming back from a last child
    let mut child = node;
    while let Some(parent) = nodes[child].parent() {
        let position = match nodes[parent].child_position(child) {
            Some(position) => position,
            None => panic!("{:?} is missing from the children of its parent", child),
        };
        if position < nodes[parent].value_count() {
            return Some((parent, position));
        }
        child = parent;
    }
    None
}

/// Sorted iterator over references to the values of a `TwoThreeSet`
pub struct Iter<'a, T> {
    nodes: &'a Arena<Node<T>>,
    next: Option<(NodeId, usize)>,
    len: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(nodes: &'a Arena<Node<T>>, root: Option<NodeId>, len: usize) -> Self {
        Iter {
            nodes,
            next: root.map(|root| (leftmost(nodes, root), 0)),
            len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, index) = self.next?;
        let nodes = self.nodes;
        self.next = successor(nodes, node, index);
        self.len -= 1;
        Some(nodes[node].value(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> std::iter::FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            next: self.next,
            len: self.len,
        }
    }
}

use super::*;
use crate::arena::{Arena, NodeId};
use crate::compare::Comparator;
use arrayvec::ArrayVec;
use std::mem;

pub(super) struct Node<T> {
    values: ArrayVec<[T; MAX_VALUES]>,
    children: ArrayVec<[NodeId; MAX_CHILDREN]>,
    parent: Option<NodeId>,
}

impl<T> Node<T> {
    /// Build an empty, parentless leaf
    pub(super) fn new() -> Self {
        Node {
            values: ArrayVec::new(),
            children: ArrayVec::new(),
            parent: None,
        }
    }

    pub(super) fn with_value(value: T) -> Self {
        let mut node = Node::new();
        node.values.push(value);
        node
    }

    pub(super) fn value_count(&self) -> usize {
        self.values.len()
    }

    pub(super) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(super) fn values(&self) -> &[T] {
        &self.values
    }

    pub(super) fn value(&self, index: usize) -> &T {
        &self.values[index]
    }

    pub(super) fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the child at the given index.
    /// Panics if it is a leaf node or out-of-bounds access
    pub(super) fn child(&self, index: usize) -> NodeId {
        self.children[index]
    }

    pub(super) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return where `child` is linked in this node
    pub(super) fn child_position(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&id| id == child)
    }

    /// Return the index of the subtree that would hold `value`.
    /// Only meaningful when the node itself does not contain `value`
    pub(super) fn choose_child_index<C: Comparator<T>>(&self, value: &T, cmp: &C) -> usize {
        match self
            .values
            .binary_search_by(|probe| cmp.compare(probe, value))
        {
            Ok(index) | Err(index) => index,
        }
    }

    /// Return the index of the value equivalent to `value`, if any
    pub(super) fn index_of<C: Comparator<T>>(&self, value: &T, cmp: &C) -> Option<usize> {
        self.values
            .binary_search_by(|probe| cmp.compare(probe, value))
            .ok()
    }

    pub(super) fn contains_value<C: Comparator<T>>(&self, value: &T, cmp: &C) -> bool {
        self.index_of(value, cmp).is_some()
    }

    /// Insert `value` at its sorted position and return that position.
    /// The node must have room for it: a node holding three values has to be split first
    pub(super) fn insert_value<C: Comparator<T>>(&mut self, value: T, cmp: &C) -> usize {
        assert!(
            self.values.len() < MAX_VALUES,
            "insertion into an overflowing node"
        );
        let index = self.choose_child_index(&value, cmp);
        self.values.insert(index, value);
        index
    }

    /// Remove the value at `index` (0 or 1) from a node that is not overflowing
    pub(super) fn remove_value_at(&mut self, index: usize) -> T {
        assert!(self.values.len() < MAX_VALUES);
        assert!(index < MAX_VALUES - 1);
        self.values.remove(index)
    }

    /// Put `value` in place of the value at `index` and return the old one
    pub(super) fn replace_value(&mut self, value: T, index: usize) -> T {
        mem::replace(&mut self.values[index], value)
    }

    fn reset(&mut self) {
        self.values.clear();
        self.children.clear();
        self.parent = None;
    }
}

/// Child link management. These live on the arena because every move of a
/// child also rewrites the parent link stored in the child itself
impl<T> Arena<Node<T>> {
    /// Link `child` at `index`, shifting later children to the right
    pub(super) fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self[parent].children.insert(index, child);
        self[child].parent = Some(parent);
    }

    /// Unlink the child at `index`, shifting later children to the left
    pub(super) fn remove_child(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self[parent].children.remove(index);
        self[child].parent = None;
        child
    }

    /// Overwrite the child link at `index` without shifting, returning the unlinked child
    pub(super) fn set_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> NodeId {
        let old = mem::replace(&mut self[parent].children[index], child);
        self[old].parent = None;
        self[child].parent = Some(parent);
        old
    }

    /// Split an overflowing `node` (three values) around its middle value.
    /// `left` and `right` must be empty nodes: they get the first and last values, the first
    /// two and remaining children, and become the only two children of `node`,
    /// which keeps the middle value
    pub(super) fn split_overflow(&mut self, node: NodeId, left: NodeId, right: NodeId) {
        let (first, last, children) = {
            let node = &mut self[node];
            assert_eq!(
                node.values.len(),
                MAX_VALUES,
                "only an overflowing node can be split"
            );
            let last = node.values.remove(2);
            let first = node.values.remove(0);
            (first, last, mem::replace(&mut node.children, ArrayVec::new()))
        };
        debug_assert!(self[left].values.is_empty() && self[right].values.is_empty());

        self[left].values.push(first);
        self[right].values.push(last);
        for (i, child) in children.into_iter().enumerate() {
            if i < 2 {
                self.insert_child(left, child, i);
            } else {
                self.insert_child(right, child, i - 2);
            }
        }
        self.insert_child(node, left, 0);
        self.insert_child(node, right, 1);
    }

    /// Absorb `child`, a node with one value and two children, into `node`.
    /// The value lands at the slot `child` occupied (its sorted position) and the two
    /// grandchildren take the place of `child`, which is left empty and unlinked.
    /// Return the index of the absorbed value in `node`
    pub(super) fn merge_with_child(&mut self, node: NodeId, child: NodeId) -> usize {
        let slot = match self[node].child_position(child) {
            Some(slot) => slot,
            None => panic!("{:?} is not a child of {:?}", child, node),
        };
        let (value, grandchildren) = {
            let child = &mut self[child];
            assert!(
                child.values.len() == 1 && child.children.len() == 2,
                "only a split node can be merged into its parent"
            );
            let value = child.values.remove(0);
            (value, mem::replace(&mut child.children, ArrayVec::new()))
        };

        self[node].values.insert(slot, value);
        self.set_child(node, slot, grandchildren[0]);
        self.insert_child(node, grandchildren[1], slot + 1);
        self[child].reset();
        slot
    }
}

/// Read-only view of one node of a `TwoThreeSet`
pub struct NodeRef<'a, T> {
    nodes: &'a Arena<Node<T>>,
    id: NodeId,
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T: 'a> NodeRef<'a, T> {
    pub(super) fn new(nodes: &'a Arena<Node<T>>, id: NodeId) -> Self {
        NodeRef { nodes, id }
    }

    fn node(&self) -> &'a Node<T> {
        let nodes = self.nodes;
        &nodes[self.id]
    }

    /// The ordered values held by this node
    pub fn values(&self) -> &'a [T] {
        self.node().values()
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a, T>> {
        self.node()
            .children()
            .get(index)
            .map(|&id| NodeRef::new(self.nodes, id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, T>> + 'a {
        let nodes = self.nodes;
        self.node()
            .children()
            .iter()
            .map(move |&id| NodeRef::new(nodes, id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.node().parent().map(|id| NodeRef::new(self.nodes, id))
    }
}

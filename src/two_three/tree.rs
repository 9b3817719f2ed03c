use super::node::{Node, NodeRef};
use super::tree_iter::{leftmost, successor, Cursor, Iter};
use super::*;
use crate::arena::{Arena, NodeId};
use crate::compare::{Comparator, Natural};
use crate::error::{Error, Result};
use log::{debug, trace};
use std::cmp::Ordering;
use std::fmt;

/// An ordered set stored in a 2-3 tree.
///
/// Every internal node holds one or two values and one child more than values,
/// and all leaves sit at the same depth, so search, insertion and removal take
/// O(log n) steps. Values are ordered by the comparator given at construction;
/// two values comparing `Equal` are the same element.
pub struct TwoThreeSet<T, C = Natural> {
    nodes: Arena<Node<T>>,
    root: Option<NodeId>,
    len: usize,
    /// Bumped by every mutation, invalidates older cursors
    stamp: u64,
    comparator: C,
}

impl<T: Ord> TwoThreeSet<T, Natural> {
    pub fn new() -> Self {
        TwoThreeSet::with_comparator(Natural)
    }

    /// Create an empty set with room for `nodes` nodes before its storage grows
    pub fn with_capacity(nodes: usize) -> Self {
        TwoThreeSet::with_capacity_and_comparator(nodes, Natural)
    }
}

impl<T: Ord> Default for TwoThreeSet<T, Natural> {
    fn default() -> Self {
        TwoThreeSet::new()
    }
}

impl<T, C: Comparator<T>> TwoThreeSet<T, C> {
    pub fn with_comparator(comparator: C) -> Self {
        TwoThreeSet {
            nodes: Arena::new(),
            root: None,
            len: 0,
            stamp: 0,
            comparator,
        }
    }

    pub fn with_capacity_and_comparator(nodes: usize, comparator: C) -> Self {
        TwoThreeSet {
            nodes: Arena::with_capacity(nodes),
            ..TwoThreeSet::with_comparator(comparator)
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Return the total number of values in the set
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Return the number of levels in the tree (zero when empty)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = self.nodes[id].children().first().copied();
        }
        height
    }

    /// Return a read-only view of the root node
    pub fn root(&self) -> Option<NodeRef<T>> {
        self.root.map(|root| NodeRef::new(&self.nodes, root))
    }

    /// Return a sorted iterator over references to the values in the set
    pub fn iter(&self) -> Iter<T> {
        Iter::new(&self.nodes, self.root, self.len)
    }

    /// Return the cursor at the smallest value, or the end cursor if the set is empty
    pub fn begin(&self) -> Cursor {
        let position = self.root.map(|root| (leftmost(&self.nodes, root), 0));
        Cursor::new(position, self.stamp)
    }

    pub fn end(&self) -> Cursor {
        Cursor::new(None, self.stamp)
    }

    /// Return the value under `cursor`
    pub fn get(&self, cursor: Cursor) -> Result<&T> {
        let (node, index) = self.resolve(cursor)?;
        Ok(self.nodes[node].value(index))
    }

    /// Return the cursor following `cursor` in sorted order.
    /// Advancing the end cursor gives the end cursor
    pub fn advance(&self, cursor: Cursor) -> Result<Cursor> {
        self.check_stamp(cursor)?;
        let next = cursor
            .position
            .and_then(|(node, index)| successor(&self.nodes, node, index));
        Ok(Cursor::new(next, self.stamp))
    }

    /// Return the cursor at the value equivalent to `value`, if any
    pub fn find(&self, value: &T) -> Option<Cursor> {
        match self.find_node(value) {
            Some((node, Some(index))) => Some(self.cursor(node, index)),
            _ => None,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        match self.find_node(value) {
            Some((node, _)) => self.nodes[node].contains_value(value, &self.comparator),
            None => false,
        }
    }

    /// Insert `value` and return its position and whether it was actually inserted.
    /// When an equivalent value is already present, the set is not modified and the
    /// position of the present value is returned.
    ///
    /// Panics if node storage can't be allocated; see `try_insert`
    pub fn insert(&mut self, value: T) -> (Cursor, bool) {
        match self.try_insert(value) {
            Ok(result) => result,
            Err(err) => panic!("{}", err),
        }
    }

    /// Like `insert`, but report a failed node allocation instead of panicking.
    /// On error the set is left unchanged
    pub fn try_insert(&mut self, value: T) -> Result<(Cursor, bool)> {
        let (leaf, found) = match self.find_node(&value) {
            None => {
                self.nodes.try_reserve(1)?;
                let root = self.nodes.alloc(Node::with_value(value));
                self.root = Some(root);
                self.mark_inserted();
                return Ok((self.cursor(root, 0), true));
            }
            Some(found) => found,
        };
        if let Some(index) = found {
            return Ok((self.cursor(leaf, index), false));
        }

        // Every allocation of the split chain happens up-front, so that nothing can
        // fail once the tree has been touched
        self.nodes.try_reserve(self.split_allocations(leaf))?;
        let index = self.nodes[leaf].insert_value(value, &self.comparator);
        let (node, index) = self.fix_insert(leaf, index);
        self.mark_inserted();
        Ok((self.cursor(node, index), true))
    }

    /// Insert every value of `values`, returning how many were new
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> usize {
        values
            .into_iter()
            .map(|value| self.insert(value).1)
            .filter(|&inserted| inserted)
            .count()
    }

    /// Remove the value equivalent to `value` and return the number of removed values (0 or 1)
    pub fn erase(&mut self, value: &T) -> usize {
        match self.remove(value) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Remove the value equivalent to `value` and return it
    pub fn remove(&mut self, value: &T) -> Option<T> {
        match self.find_node(value) {
            Some((node, Some(index))) => Some(self.remove_at(node, index)),
            _ => None,
        }
    }

    /// Remove the value under `cursor` and return it
    pub fn erase_at(&mut self, cursor: Cursor) -> Result<T> {
        let (node, index) = self.resolve(cursor)?;
        Ok(self.remove_at(node, index))
    }

    /// Remove every value.
    /// Nodes are released in post-order, walking back up through the parent links
    pub fn clear(&mut self) {
        let mut current = self.root.take();
        while let Some(id) = current {
            if let Some(&child) = self.nodes[id].children().last() {
                current = Some(child);
                continue;
            }
            let parent = self.nodes[id].parent();
            if let Some(parent) = parent {
                let last = self.nodes[parent].child_count() - 1;
                self.nodes.remove_child(parent, last);
            }
            self.nodes.free(id);
            current = parent;
        }
        debug_assert_eq!(self.nodes.len(), 0);
        self.nodes.clear();

        debug!("cleared set of {} values", self.len);
        self.len = 0;
        self.stamp += 1;
    }

    /// Check every structural invariant of the tree and report the first broken one
    pub fn validate(&self) -> Result<()> {
        let root = match self.root {
            None if self.len == 0 => return Ok(()),
            None => return Err(invariant(format!("empty tree with len {}", self.len))),
            Some(root) => root,
        };
        if self.nodes[root].parent().is_some() {
            return Err(invariant("root has a parent".to_string()));
        }

        let mut leaf_depth = None;
        let mut count = 0;
        self.validate_node(root, None, None, 0, &mut leaf_depth, &mut count)?;
        if count != self.len {
            return Err(invariant(format!(
                "found {} values, expected {}",
                count, self.len
            )));
        }
        if count != 0 && self.nodes.len() > count {
            return Err(invariant(format!(
                "{} live nodes for {} values",
                self.nodes.len(),
                count
            )));
        }
        Ok(())
    }

    fn validate_node<'a>(
        &'a self,
        id: NodeId,
        lower: Option<&'a T>,
        upper: Option<&'a T>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        count: &mut usize,
    ) -> Result<()> {
        let node = &self.nodes[id];
        let values = node.values();
        if values.is_empty() || values.len() >= MAX_VALUES {
            return Err(invariant(format!(
                "{:?} holds {} values",
                id,
                values.len()
            )));
        }
        for pair in values.windows(2) {
            if self.comparator.compare(&pair[0], &pair[1]) != Ordering::Less {
                return Err(invariant(format!("{:?} values are not sorted", id)));
            }
        }
        let first = &values[0];
        let last = &values[values.len() - 1];
        if lower.map_or(false, |lower| self.comparator.compare(lower, first) != Ordering::Less)
            || upper.map_or(false, |upper| self.comparator.compare(last, upper) != Ordering::Less)
        {
            return Err(invariant(format!(
                "{:?} values escape the range of their subtree",
                id
            )));
        }
        *count += values.len();

        if node.is_leaf() {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(invariant(format!(
                        "leaf {:?} at depth {}, expected {}",
                        id, depth, expected
                    )))
                }
                _ => {}
            }
            return Ok(());
        }

        if node.child_count() != values.len() + 1 {
            return Err(invariant(format!(
                "{:?} has {} values and {} children",
                id,
                values.len(),
                node.child_count()
            )));
        }
        for (i, &child) in node.children().iter().enumerate() {
            if self.nodes[child].parent() != Some(id) {
                return Err(invariant(format!(
                    "{:?} does not point back to its parent {:?}",
                    child, id
                )));
            }
            let child_lower = if i == 0 { lower } else { Some(&values[i - 1]) };
            let child_upper = if i == values.len() { upper } else { Some(&values[i]) };
            self.validate_node(child, child_lower, child_upper, depth + 1, leaf_depth, count)?;
        }
        Ok(())
    }

    fn cursor(&self, node: NodeId, index: usize) -> Cursor {
        Cursor::new(Some((node, index)), self.stamp)
    }

    fn check_stamp(&self, cursor: Cursor) -> Result<()> {
        if cursor.stamp == self.stamp {
            Ok(())
        } else {
            Err(Error::StaleCursor)
        }
    }

    fn resolve(&self, cursor: Cursor) -> Result<(NodeId, usize)> {
        self.check_stamp(cursor)?;
        cursor.position.ok_or(Error::EndCursor)
    }

    fn mark_inserted(&mut self) {
        self.len += 1;
        self.stamp += 1;
    }

    /// Descend from the root towards `value`.
    /// Return the node holding it and its index, or the leaf where it would be inserted.
    /// Return `None` for an empty tree
    fn find_node(&self, value: &T) -> Option<(NodeId, Option<usize>)> {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            if let Some(index) = node.index_of(value, &self.comparator) {
                return Some((current, Some(index)));
            }
            if node.is_leaf() {
                return Some((current, None));
            }
            current = node.child(node.choose_child_index(value, &self.comparator));
        }
    }

    /// Return how many nodes inserting into `leaf` may allocate: each full node on the way
    /// up splits into two new ones
    fn split_allocations(&self, leaf: NodeId) -> usize {
        let mut needed = 0;
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &self.nodes[id];
            if node.value_count() < MAX_VALUES - 1 {
                break;
            }
            needed += 2;
            current = node.parent();
        }
        needed
    }

    /// Split overflowing nodes from `node` up to the first one with room for the promoted value.
    /// (`node`, `index`) holds the new value; return where it lives afterwards
    fn fix_insert(&mut self, node: NodeId, index: usize) -> (NodeId, usize) {
        let mut holder = (node, index);
        let mut current = node;
        while self.nodes[current].value_count() == MAX_VALUES {
            let left = self.nodes.alloc(Node::new());
            let right = self.nodes.alloc(Node::new());
            self.nodes.split_overflow(current, left, right);
            if holder.0 == current {
                holder = match holder.1 {
                    0 => (left, 0),
                    1 => (current, 0),
                    _ => (right, 0),
                };
            }

            let parent = match self.nodes[current].parent() {
                Some(parent) => parent,
                None => {
                    // The root kept the middle value: the tree is one level taller
                    debug!("root split, height is now {}", self.height());
                    break;
                }
            };
            trace!("split {:?} into {:?} and {:?}", current, left, right);
            let slot = self.nodes.merge_with_child(parent, current);
            if holder.0 == current {
                holder = (parent, slot);
            }
            self.nodes.free(current);
            current = parent;
        }
        debug_assert!(self.nodes[holder.0].value_count() > holder.1);
        holder
    }

    /// Remove the value at (`node`, `index`), rebalancing if a leaf was left empty
    fn remove_at(&mut self, node: NodeId, index: usize) -> T {
        let (leaf, removed) = if self.nodes[node].is_leaf() {
            (node, self.nodes[node].remove_value_at(index))
        } else {
            // The in-order successor always sits in a leaf: take its place
            let leaf = leftmost(&self.nodes, self.nodes[node].child(index + 1));
            let successor = self.nodes[leaf].remove_value_at(0);
            (leaf, self.nodes[node].replace_value(successor, index))
        };
        self.len -= 1;
        self.stamp += 1;

        if self.nodes[leaf].value_count() == 0 {
            if self.root == Some(leaf) {
                self.nodes.free(leaf);
                self.root = None;
            } else {
                self.fix_remove(leaf);
            }
        }
        removed
    }

    /// Rebalance the tree around `hole`, a node left without values.
    /// A hole has at most one child. Merges may move the hole up to the parent; rotations
    /// and merges into a node holding two values end the fix-up
    fn fix_remove(&mut self, mut hole: NodeId) {
        loop {
            let parent = match self.nodes[hole].parent() {
                Some(parent) => parent,
                None => panic!("hole {:?} has no parent", hole),
            };
            let hole_index = match self.nodes[parent].child_position(hole) {
                Some(hole_index) => hole_index,
                None => panic!("hole {:?} is missing from its parent {:?}", hole, parent),
            };

            match self.nodes[parent].value_count() {
                1 => {
                    let sibling_index = if hole_index == 0 { 1 } else { 0 };
                    let sibling = self.nodes[parent].child(sibling_index);
                    match self.nodes[sibling].value_count() {
                        1 => {
                            trace!("merge hole {:?} into sibling {:?}", hole, sibling);
                            let value = self.nodes[parent].remove_value_at(0);
                            self.nodes[sibling].insert_value(value, &self.comparator);
                            self.adopt_orphan(hole, sibling, hole_index < sibling_index);
                            let hole = self.nodes.remove_child(parent, hole_index);
                            self.nodes.free(hole);
                        }
                        2 => {
                            trace!("rotate from sibling {:?} into hole {:?}", sibling, hole);
                            let rotate_left = hole_index < sibling_index;
                            let value = self.nodes[parent].remove_value_at(0);
                            self.nodes[hole].insert_value(value, &self.comparator);
                            let boundary = self.nodes[sibling]
                                .remove_value_at(if rotate_left { 0 } else { 1 });
                            self.nodes[parent].insert_value(boundary, &self.comparator);
                            self.move_grandchild(sibling, hole, rotate_left);
                            return;
                        }
                        count => panic!("sibling {:?} holds {} values", sibling, count),
                    }

                    if self.root == Some(parent) {
                        let new_root = self.nodes.remove_child(parent, 0);
                        self.nodes.free(parent);
                        self.root = Some(new_root);
                        debug!("root merged away, height is now {}", self.height());
                        return;
                    }
                    hole = parent;
                }
                2 => {
                    // An outer hole borrows from the middle child. A middle hole always
                    // uses its left sibling
                    let sibling_index = if hole_index == 1 { 0 } else { 1 };
                    let sibling = self.nodes[parent].child(sibling_index);
                    let rotate_left = hole_index < sibling_index;
                    let separator = hole_index.min(sibling_index);
                    match self.nodes[sibling].value_count() {
                        1 => {
                            trace!("merge hole {:?} into sibling {:?}", hole, sibling);
                            let value = self.nodes[parent].remove_value_at(separator);
                            self.nodes[sibling].insert_value(value, &self.comparator);
                            self.adopt_orphan(hole, sibling, rotate_left);
                            let hole = self.nodes.remove_child(parent, hole_index);
                            self.nodes.free(hole);
                        }
                        2 => {
                            trace!("rotate from sibling {:?} into hole {:?}", sibling, hole);
                            let boundary = self.nodes[sibling]
                                .remove_value_at(if rotate_left { 0 } else { 1 });
                            let value = self.nodes[parent].replace_value(boundary, separator);
                            self.nodes[hole].insert_value(value, &self.comparator);
                            self.move_grandchild(sibling, hole, rotate_left);
                        }
                        count => panic!("sibling {:?} holds {} values", sibling, count),
                    }
                    return;
                }
                count => panic!("parent {:?} of hole {:?} holds {} values", parent, hole, count),
            }
        }
    }

    /// Hand the only child of `hole` (if any) over to `sibling`, at its first slot when the
    /// hole was on its left and at its last slot otherwise
    fn adopt_orphan(&mut self, hole: NodeId, sibling: NodeId, hole_on_left: bool) {
        if self.nodes[hole].is_leaf() {
            return;
        }
        let orphan = self.nodes.remove_child(hole, 0);
        let slot = if hole_on_left {
            0
        } else {
            self.nodes[sibling].child_count()
        };
        self.nodes.insert_child(sibling, orphan, slot);
    }

    /// Move the boundary child of `sibling` next to the hole over to `hole`.
    /// `rotate_left` is set when the sibling is on the right of the hole
    fn move_grandchild(&mut self, sibling: NodeId, hole: NodeId, rotate_left: bool) {
        if self.nodes[sibling].is_leaf() {
            return;
        }
        let (from, to) = if rotate_left {
            (0, 1)
        } else {
            (self.nodes[sibling].child_count() - 1, 0)
        };
        let grandchild = self.nodes.remove_child(sibling, from);
        self.nodes.insert_child(hole, grandchild, to);
    }
}

fn invariant(message: String) -> Error {
    Error::Invariant(message)
}

impl<'a, T, C: Comparator<T>> IntoIterator for &'a TwoThreeSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C: Comparator<T>> Extend<T> for TwoThreeSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<T: Ord> std::iter::FromIterator<T> for TwoThreeSet<T, Natural> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = TwoThreeSet::new();
        set.insert_all(iter);
        set
    }
}

impl<T: fmt::Debug, C: Comparator<T>> fmt::Debug for TwoThreeSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Render a subtree as `[values](children...)`
    fn helper_shape(node: NodeRef<i32>) -> String {
        let values: Vec<_> = node.values().iter().map(|v| v.to_string()).collect();
        let mut shape = format!("[{}]", values.join(","));
        if !node.is_leaf() {
            let children: Vec<_> = node.children().map(helper_shape).collect();
            shape += &format!("({})", children.join(" "));
        }
        shape
    }

    fn helper_tree(values: &[i32]) -> TwoThreeSet<i32> {
        let mut tree = TwoThreeSet::new();
        for &value in values {
            assert!(tree.insert(value).1);
            tree.validate().unwrap();
        }
        tree
    }

    fn helper_assert_shape(tree: &TwoThreeSet<i32>, expected: &str) {
        tree.validate().unwrap();
        assert_eq!(helper_shape(tree.root().unwrap()), expected);
    }

    #[test]
    fn empty_tree() {
        let mut tree: TwoThreeSet<i32> = TwoThreeSet::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.root().is_none());
        assert!(tree.begin().is_end());
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.find(&1), None);
        assert_eq!(tree.erase(&1), 0);
        tree.validate().unwrap();
    }

    #[test]
    fn first_split() {
        let tree = helper_tree(&[10, 15, 4, 20, 8]);
        helper_assert_shape(&tree, "[10]([4,8] [15,20])");
        assert_eq!(tree.iter().cloned().collect::<Vec<_>>(), vec![4, 8, 10, 15, 20]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn split_propagates_to_root() {
        let mut tree = helper_tree(&[10, 15, 4, 20, 7, 23, 17, 25]);
        helper_assert_shape(&tree, "[10,20]([4,7] [15,17] [23,25])");

        let (cursor, inserted) = tree.insert(2);
        assert!(inserted);
        assert_eq!(tree.get(cursor), Ok(&2));
        helper_assert_shape(&tree, "[10]([4]([2] [7]) [20]([15,17] [23,25]))");
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn inserted_value_promoted_by_split() {
        // The new value is the middle one of the overflowing leaf and moves up to the root
        let mut tree = helper_tree(&[10, 30]);
        let (cursor, inserted) = tree.insert(20);
        assert!(inserted);
        assert_eq!(tree.get(cursor), Ok(&20));
        helper_assert_shape(&tree, "[20]([10] [30])");

        let mut tree = helper_tree(&[10, 20, 30, 40, 50, 60, 70, 5, 15]);
        let (cursor, _) = tree.insert(12);
        assert_eq!(tree.get(cursor), Ok(&12));
        tree.validate().unwrap();
    }

    #[test]
    fn duplicate_insert() {
        let mut tree = helper_tree(&[10, 15, 4, 20, 8]);
        let before = helper_shape(tree.root().unwrap());
        let cursor = tree.find(&15).unwrap();

        let (found, inserted) = tree.insert(15);
        assert!(!inserted);
        assert_eq!(found, cursor);
        assert_eq!(helper_shape(tree.root().unwrap()), before);
        assert_eq!(tree.len(), 5);
        // Nothing changed, so earlier cursors stay valid
        assert_eq!(tree.get(cursor), Ok(&15));
    }

    #[test]
    fn erase_merges_up_to_root() {
        let mut tree = helper_tree(&[4, 3, 6, 7, 5, 2, 1]);
        helper_assert_shape(&tree, "[4]([2]([1] [3]) [6]([5] [7]))");

        assert_eq!(tree.erase(&3), 1);
        helper_assert_shape(&tree, "[4,6]([1,2] [5] [7])");
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn erase_merges_into_three_node() {
        let mut tree = helper_tree(&[16, 12, 24, 28, 20, 8, 1, 21, 29, 22, 30]);
        helper_assert_shape(
            &tree,
            "[16,24]([8]([1] [12]) [21]([20] [22]) [29]([28] [30]))",
        );

        assert_eq!(tree.erase(&12), 1);
        helper_assert_shape(&tree, "[24]([16,21]([1,8] [20] [22]) [29]([28] [30]))");
    }

    #[test]
    fn erase_rotates_from_two_node_parent() {
        let mut tree = helper_tree(&[10, 20, 30, 35]);
        helper_assert_shape(&tree, "[20]([10] [30,35])");
        assert_eq!(tree.erase(&10), 1);
        helper_assert_shape(&tree, "[30]([20] [35])");

        let mut tree = helper_tree(&[10, 20, 30, 5]);
        assert_eq!(tree.erase(&30), 1);
        helper_assert_shape(&tree, "[10]([5] [20])");
    }

    #[test]
    fn erase_rotates_internal_hole() {
        let mut tree = helper_tree(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        helper_assert_shape(&tree, "[4]([2]([1] [3]) [6,8]([5] [7] [9,10]))");

        // The hole left by 1 climbs to {2} and borrows through the root from {6, 8}
        assert_eq!(tree.erase(&1), 1);
        helper_assert_shape(&tree, "[6]([4]([2,3] [5]) [8]([7] [9,10]))");
    }

    #[test]
    fn erase_internal_value() {
        let mut tree = helper_tree(&[10, 15, 4, 20, 8]);
        assert_eq!(tree.erase(&10), 1);
        helper_assert_shape(&tree, "[15]([4,8] [20])");
    }

    #[test]
    fn middle_hole_uses_left_sibling() {
        // Left sibling with one value: merge into it even though the right one could lend
        let mut tree = helper_tree(&[10, 20, 30, 40, 50, 45]);
        helper_assert_shape(&tree, "[20,40]([10] [30] [45,50])");
        assert_eq!(tree.erase(&30), 1);
        helper_assert_shape(&tree, "[40]([10,20] [45,50])");

        // Left sibling with two values: rotate from it
        let mut tree = helper_tree(&[10, 20, 30, 40, 50, 5]);
        helper_assert_shape(&tree, "[20,40]([5,10] [30] [50])");
        assert_eq!(tree.erase(&30), 1);
        helper_assert_shape(&tree, "[10,40]([5] [20] [50])");
    }

    #[test]
    fn outer_holes_of_three_node() {
        let mut tree = helper_tree(&[10, 20, 30, 40, 50, 35]);
        helper_assert_shape(&tree, "[20,40]([10] [30,35] [50])");
        assert_eq!(tree.erase(&10), 1);
        helper_assert_shape(&tree, "[30,40]([20] [35] [50])");
        assert_eq!(tree.erase(&50), 1);
        helper_assert_shape(&tree, "[30]([20] [35,40])");
    }

    #[test]
    fn erase_twice() {
        let mut tree = helper_tree(&[4, 3, 6, 7, 5, 2, 1]);
        assert_eq!(tree.erase(&5), 1);
        let after_first = helper_shape(tree.root().unwrap());
        assert_eq!(tree.erase(&5), 0);
        assert_eq!(helper_shape(tree.root().unwrap()), after_first);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn erase_everything() {
        let values: Vec<i32> = (0..200).map(|i| (i * 37) % 200).collect();
        let mut tree = helper_tree(&values);
        for (removed, value) in values.iter().rev().enumerate() {
            assert_eq!(tree.remove(value), Some(*value));
            tree.validate().unwrap();
            assert_eq!(tree.len(), values.len() - removed - 1);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.nodes.len(), 0);
    }

    #[test]
    fn logarithmic_height() {
        let tree: TwoThreeSet<i32> = (0..1000).collect();
        tree.validate().unwrap();
        // 3^6 - 1 < 1000 values <= 2^10 - 1
        assert!((7..=9).contains(&tree.height()));
    }

    #[test]
    fn cursors() {
        let mut tree = helper_tree(&[10, 15, 4, 20, 8]);
        let mut cursor = tree.begin();
        let mut collected = vec![];
        while !cursor.is_end() {
            collected.push(*tree.get(cursor).unwrap());
            cursor = tree.advance(cursor).unwrap();
        }
        assert_eq!(collected, vec![4, 8, 10, 15, 20]);
        assert_eq!(cursor, tree.end());
        assert_eq!(tree.advance(cursor), Ok(tree.end()));
        assert_eq!(tree.get(cursor), Err(Error::EndCursor));
        assert_eq!(tree.erase_at(cursor), Err(Error::EndCursor));

        let found = tree.find(&10).unwrap();
        assert_eq!(tree.erase_at(found), Ok(10));
        assert_eq!(tree.get(found), Err(Error::StaleCursor));
        assert_eq!(tree.erase_at(found), Err(Error::StaleCursor));
        assert_eq!(tree.advance(found), Err(Error::StaleCursor));
        assert_eq!(tree.len(), 4);
        tree.validate().unwrap();

        let found = tree.find(&4).unwrap();
        tree.insert(1);
        assert_eq!(tree.get(found), Err(Error::StaleCursor));
    }

    #[test]
    fn clear() {
        let mut tree: TwoThreeSet<i32> = (0..100).collect();
        let cursor = tree.begin();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.nodes.len(), 0);
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.get(cursor), Err(Error::StaleCursor));

        // Storage is reused afterwards
        tree.extend(vec![3, 1, 2]);
        assert_eq!(tree.iter().cloned().collect::<Vec<_>>(), vec![1, 2, 3]);
        tree.validate().unwrap();
    }

    #[test]
    fn insert_all_counts_new_values() {
        let mut tree = TwoThreeSet::with_capacity(16);
        assert_eq!(tree.insert_all(vec![1, 2, 3, 2, 1]), 3);
        assert_eq!(tree.insert_all(vec![3, 4]), 1);
        assert_eq!(format!("{:?}", tree), "{1, 2, 3, 4}");
    }

    #[test]
    fn detects_broken_invariants() {
        let mut tree = helper_tree(&[10, 15, 4, 20, 8]);
        let root = tree.root.unwrap();
        let left = tree.nodes[root].child(0);
        tree.nodes[left].replace_value(30, 0);
        assert!(matches!(tree.validate(), Err(Error::Invariant(_))));
    }
}

//! Red-black tree ordered index, with set, multiset, map and multimap shapes
//! built on a single engine.
//!
//! [`Heartwood`] is the engine. It stores values in an index-addressed
//! arena, so parent links are plain indices and a node never moves once it is
//! allocated. The container shapes pick a key extraction strategy and a
//! uniqueness policy (see [`policy`]) instead of duplicating the balancing
//! code:
//!
//! | shape                | extraction   | uniqueness |
//! |----------------------|--------------|------------|
//! | [`HeartwoodSet`]      | [`Identity`] | [`Unique`] |
//! | [`HeartwoodMultiSet`] | [`Identity`] | [`Multi`]  |
//! | [`HeartwoodMap`]      | [`First`]    | [`Unique`] |
//! | [`HeartwoodMultiMap`] | [`First`]    | [`Multi`]  |
//!
//! ```
//! use heartwood::HeartwoodSet;
//!
//! let mut set = HeartwoodSet::new();
//! set.insert(3);
//! set.insert(1);
//! set.insert(2);
//!
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! assert!(set.validate().is_ok());
//! ```

extern crate alloc;

mod arena;
mod balance;
mod cursor;
mod error;
mod iter;
mod map;
mod node;
pub mod policy;
mod set;
mod validate;

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;

use alloc::vec::Vec;

use arena::NodeArena;
use balance::Side;
use node::{Anchor, HeartwoodNode, NodeIndex};

pub use cursor::Position;
pub use error::{InvariantViolation, KeyNotPresent};
pub use iter::{IntoIter, Iter, IterMut, Range};
pub use map::{HeartwoodMap, HeartwoodMultiMap};
pub use policy::{Comparator, First, Identity, KeyOf, Multi, NaturalOrder, Unique, Uniqueness};
pub use set::{HeartwoodMultiSet, HeartwoodSet};

/// Ordered index over values of type `V`.
///
/// Values are ordered by the key `X` extracts from them, compared with `C`.
/// `U` decides whether equal keys may coexist. Insertion, erasure and lookup
/// are O(log n); stepping a [`Position`] forwards or backwards is O(1)
/// amortized, and the first, last and end positions are O(1).
pub struct Heartwood<V, X, U, C = NaturalOrder> {
    arena: NodeArena<V>,
    anchor: Anchor,
    compare: C,
    policy: PhantomData<fn() -> (X, U)>,
}

impl<V, X, U, C: Default> Heartwood<V, X, U, C> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, C::default())
    }
}

impl<V, X, U, C> Heartwood<V, X, U, C> {
    #[must_use]
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            arena: NodeArena::new(),
            anchor: Anchor::Empty,
            compare,
            policy: PhantomData,
        }
    }

    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            anchor: Anchor::Empty,
            compare,
            policy: PhantomData,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Reserves room for at least `additional` more values without growing
    /// the node storage again.
    pub fn reserve(&mut self, additional: usize) {
        log::debug!("reserving room for {additional} more nodes");
        self.arena.reserve(additional);
    }

    /// Position of the smallest value, or [`Position::END`] when empty.
    #[must_use]
    pub fn begin(&self) -> Position {
        Position::from_link(self.anchor.min())
    }

    #[must_use]
    pub fn end(&self) -> Position {
        Position::END
    }

    /// Position of the largest value, or [`Position::END`] when empty.
    #[must_use]
    pub fn last(&self) -> Position {
        Position::from_link(self.anchor.max())
    }

    #[must_use]
    pub fn next(&self, position: Position) -> Position {
        cursor::successor(&self.arena, position)
    }

    /// Steps back from `position`. Stepping back from [`Position::END`]
    /// yields the largest value.
    #[must_use]
    pub fn prev(&self, position: Position) -> Position {
        cursor::predecessor(&self.arena, &self.anchor, position)
    }

    /// Value at `position`, or `None` at the end position.
    ///
    /// # Panics
    ///
    /// Panics if the element at `position` was erased.
    pub fn get(&self, position: Position) -> Option<&V> {
        position.index().map(|index| &self.arena[index].value)
    }

    /// Mutable access is crate-private: changing a key in place would break
    /// the ordering.
    pub(crate) fn get_mut(&mut self, position: Position) -> Option<&mut V> {
        position.index().map(|index| &mut self.arena[index].value)
    }

    pub fn first_value(&self) -> Option<&V> {
        self.get(self.begin())
    }

    pub fn last_value(&self) -> Option<&V> {
        self.get(self.last())
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, self.anchor)
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, V> {
        let (anchor, len) = (self.anchor, self.len());

        IterMut::new(self.arena.linked_values_mut(), anchor, len)
    }

    /// Values from `first` up to, excluding, `last`.
    pub fn range_between(&self, first: Position, last: Position) -> Range<'_, V> {
        Range::new(&self.arena, self.anchor, first, last)
    }

    fn in_order_indices(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.len());
        let mut position = self.begin();

        while let Some(index) = position.index() {
            order.push(index);
            position = self.next(position);
        }

        order
    }

    /// Removes the element at `position`, returning its successor's position.
    ///
    /// # Panics
    ///
    /// Panics when `position` is [`Position::END`] or its element was already
    /// erased.
    pub fn erase(&mut self, position: Position) -> Position {
        self.remove_at(position).0
    }

    /// Like [`Heartwood::erase`], also handing back the removed value.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Heartwood::erase`].
    pub fn remove_at(&mut self, position: Position) -> (Position, V) {
        let Some(index) = position.index() else {
            panic!("cannot erase the end position");
        };

        let next = self.next(position);
        balance::unlink(&mut self.arena, &mut self.anchor, index);

        (next, self.arena.deallocate(index))
    }

    /// Removes every element in `[first, last)`, returning `last`.
    pub fn erase_range(&mut self, mut first: Position, last: Position) -> Position {
        if first == self.begin() && last.is_end() {
            self.clear();
            return Position::END;
        }

        while first != last {
            first = self.erase(first);
        }

        last
    }

    pub fn pop_first(&mut self) -> Option<V> {
        let first = self.begin();

        (!first.is_end()).then(|| self.remove_at(first).1)
    }

    pub fn pop_last(&mut self) -> Option<V> {
        let last = self.last();

        (!last.is_end()).then(|| self.remove_at(last).1)
    }

    /// Keeps only the values for which `keep` returns `true`, visiting them
    /// in order.
    pub fn retain<F: FnMut(&V) -> bool>(&mut self, mut keep: F) {
        let mut position = self.begin();

        while let Some(value) = self.get(position) {
            position = if keep(value) {
                self.next(position)
            } else {
                self.erase(position)
            };
        }
    }

    pub fn clear(&mut self) {
        log::debug!("clearing tree of {} nodes", self.len());
        self.arena.clear();
        self.anchor = Anchor::Empty;
    }

    /// Exchanges the contents of two trees in O(1). Positions keep pointing
    /// at the same elements, now owned by the other tree.
    pub fn swap(&mut self, other: &mut Self) {
        log::debug!("swapping trees of {} and {} nodes", self.len(), other.len());
        mem::swap(self, other);
    }

    fn node(&self, index: NodeIndex) -> &HeartwoodNode<V> {
        &self.arena[index]
    }
}

impl<V, X, U, C> Heartwood<V, X, U, C>
where
    X: KeyOf<V>,
    U: Uniqueness,
    C: Comparator<X::Key>,
{
    fn key_at(&self, index: NodeIndex) -> &X::Key {
        X::key_of(&self.node(index).value)
    }

    fn matches(&self, position: Position, key: &X::Key) -> bool {
        position
            .index()
            .is_some_and(|index| self.compare.compare(key, self.key_at(index)) == Ordering::Equal)
    }

    /// First position whose key is not less than `key`.
    pub fn lower_bound(&self, key: &X::Key) -> Position {
        let mut candidate = Position::END;
        let mut current = self.anchor.root();

        while let Some(index) = current {
            if self.compare.compare(self.key_at(index), key) == Ordering::Less {
                current = self.node(index).right;
            } else {
                candidate = Position::at(index);
                current = self.node(index).left;
            }
        }

        candidate
    }

    /// First position whose key is greater than `key`.
    pub fn upper_bound(&self, key: &X::Key) -> Position {
        let mut candidate = Position::END;
        let mut current = self.anchor.root();

        while let Some(index) = current {
            if self.compare.compare(key, self.key_at(index)) == Ordering::Less {
                candidate = Position::at(index);
                current = self.node(index).left;
            } else {
                current = self.node(index).right;
            }
        }

        candidate
    }

    /// `Ok` with the position of the first value with `key`, or `Err` with
    /// the lower bound, which is a valid insertion hint for `key`.
    pub(crate) fn search(&self, key: &X::Key) -> Result<Position, Position> {
        let lower = self.lower_bound(key);

        if self.matches(lower, key) { Ok(lower) } else { Err(lower) }
    }

    /// Position of the first value with `key`, or [`Position::END`].
    pub fn find(&self, key: &X::Key) -> Position {
        self.search(key).unwrap_or(Position::END)
    }

    pub fn contains(&self, key: &X::Key) -> bool {
        !self.find(key).is_end()
    }

    /// Bracket `[lower, upper)` of every value with `key`.
    pub fn equal_range(&self, key: &X::Key) -> (Position, Position) {
        if U::UNIQUE {
            let lower = self.lower_bound(key);
            let upper = if self.matches(lower, key) {
                self.next(lower)
            } else {
                lower
            };

            return (lower, upper);
        }

        (self.lower_bound(key), self.upper_bound(key))
    }

    pub fn range(&self, key: &X::Key) -> Range<'_, V> {
        let (lower, upper) = self.equal_range(key);

        self.range_between(lower, upper)
    }

    pub fn count(&self, key: &X::Key) -> usize {
        let mut position = self.lower_bound(key);
        let mut count = 0;

        while self.matches(position, key) {
            count += 1;
            position = self.next(position);
        }

        count
    }

    /// Walks down to the empty link where a value with `key` belongs.
    ///
    /// Under the unique policy an equal key stops the walk and is returned as
    /// the error. Equal keys otherwise descend right, so duplicates queue up
    /// after the ones already present.
    fn locate(&self, key: &X::Key) -> Result<(Option<NodeIndex>, Side), NodeIndex> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.anchor.root();

        while let Some(index) = current {
            parent = Some(index);

            match self.compare.compare(key, self.key_at(index)) {
                Ordering::Less => {
                    side = Side::Left;
                    current = self.node(index).left;
                }
                Ordering::Equal if U::UNIQUE => return Err(index),
                Ordering::Equal | Ordering::Greater => {
                    side = Side::Right;
                    current = self.node(index).right;
                }
            }
        }

        Ok((parent, side))
    }

    /// Checks whether a value with `key` may sit right before `hint`.
    ///
    /// `None` means the hint is of no use. Otherwise this returns either the
    /// empty link to fill or, under the unique policy, the neighbour that
    /// already holds `key`.
    fn locate_near(&self, hint: Position, key: &X::Key) -> Option<Result<(NodeIndex, Side), NodeIndex>> {
        let before = self.prev(hint);

        if let Some(index) = before.index() {
            match self.compare.compare(self.key_at(index), key) {
                Ordering::Less => {}
                Ordering::Equal if U::UNIQUE => return Some(Err(index)),
                Ordering::Equal => {}
                Ordering::Greater => return None,
            }
        }

        if let Some(index) = hint.index() {
            match self.compare.compare(key, self.key_at(index)) {
                Ordering::Less => {}
                Ordering::Equal if U::UNIQUE => return Some(Err(index)),
                Ordering::Equal => {}
                Ordering::Greater => return None,
            }
        }

        match hint.index() {
            Some(index) if self.node(index).left.is_none() => Some(Ok((index, Side::Left))),
            // `before` is the maximum, or the rightmost node of hint's left
            // subtree: its right link is empty either way
            _ => before.index().map(|index| Ok((index, Side::Right))),
        }
    }

    fn link_new(&mut self, parent: Option<NodeIndex>, side: Side, value: V) -> Position {
        let index = self.arena.allocate(HeartwoodNode::new_isolated(value));
        balance::link(&mut self.arena, &mut self.anchor, index, parent, side);

        Position::at(index)
    }

    /// Inserts `value`.
    ///
    /// Returns the position of the value and whether it was inserted. Under
    /// the unique policy an existing equal key wins: nothing changes and its
    /// position comes back with `false`. Under the multi policy this always
    /// inserts, after any values with an equal key.
    pub fn insert(&mut self, value: V) -> (Position, bool) {
        match self.locate(X::key_of(&value)) {
            Ok((parent, side)) => (self.link_new(parent, side, value), true),
            Err(existing) => (Position::at(existing), false),
        }
    }

    /// Inserts `value`, trying first to place it right before `hint`.
    ///
    /// A correct hint saves the walk from the root; a wrong one costs two
    /// comparisons before falling back to [`Heartwood::insert`]. Under the
    /// unique policy an existing equal key is returned untouched.
    pub fn insert_hint(&mut self, hint: Position, value: V) -> Position {
        match self.locate_near(hint, X::key_of(&value)) {
            Some(Ok((parent, side))) => self.link_new(Some(parent), side, value),
            Some(Err(existing)) => Position::at(existing),
            None => self.insert(value).0,
        }
    }

    /// Removes every value with `key`, returning how many were removed.
    pub fn erase_key(&mut self, key: &X::Key) -> usize {
        let (mut position, upper) = self.equal_range(key);
        let mut removed = 0;

        while position != upper {
            position = self.erase(position);
            removed += 1;
        }

        removed
    }

    /// Removes the first value with `key`.
    pub fn remove(&mut self, key: &X::Key) -> Option<V> {
        let position = self.find(key);

        (!position.is_end()).then(|| self.remove_at(position).1)
    }
}

impl<V, X, U, C: Default> Default for Heartwood<V, X, U, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone, X, U, C: Clone> Clone for Heartwood<V, X, U, C> {
    /// Copies the tree shape node by node, colors included, into a compact
    /// arena. Uses a worklist, so deep trees do not grow the call stack.
    fn clone(&self) -> Self {
        log::debug!("cloning tree of {} nodes", self.len());

        let mut arena = NodeArena::with_capacity(self.len());
        let anchor = match self.anchor {
            Anchor::Empty => Anchor::Empty,
            Anchor::Populated { root, min, max } => {
                let root_copy = arena.allocate(self.node(root).detached_copy(None));
                let (mut min_copy, mut max_copy) = (root_copy, root_copy);
                let mut worklist = alloc::vec![(root, root_copy)];

                while let Some((source, copy)) = worklist.pop() {
                    if source == min {
                        min_copy = copy;
                    }
                    if source == max {
                        max_copy = copy;
                    }

                    if let Some(left) = self.node(source).left {
                        let left_copy = arena.allocate(self.node(left).detached_copy(Some(copy)));
                        arena[copy].left = Some(left_copy);
                        worklist.push((left, left_copy));
                    }
                    if let Some(right) = self.node(source).right {
                        let right_copy = arena.allocate(self.node(right).detached_copy(Some(copy)));
                        arena[copy].right = Some(right_copy);
                        worklist.push((right, right_copy));
                    }
                }

                Anchor::Populated {
                    root: root_copy,
                    min: min_copy,
                    max: max_copy,
                }
            }
        };

        Self {
            arena,
            anchor,
            compare: self.compare.clone(),
            policy: PhantomData,
        }
    }
}

impl<V: fmt::Debug, X, U, C> fmt::Debug for Heartwood<V, X, U, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<V: PartialEq, X, U, C> PartialEq for Heartwood<V, X, U, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq, X, U, C> Eq for Heartwood<V, X, U, C> {}

impl<V, X, U, C> Extend<V> for Heartwood<V, X, U, C>
where
    X: KeyOf<V>,
    U: Uniqueness,
    C: Comparator<X::Key>,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<V, X, U, C> FromIterator<V> for Heartwood<V, X, U, C>
where
    X: KeyOf<V>,
    U: Uniqueness,
    C: Comparator<X::Key> + Default,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);

        tree
    }
}

impl<'a, V, X, U, C> IntoIterator for &'a Heartwood<V, X, U, C> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V, X, U, C> IntoIterator for Heartwood<V, X, U, C> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        let order = self.in_order_indices();

        IntoIter::new(self.arena.into_values_in(&order))
    }
}

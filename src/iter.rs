use core::iter::FusedIterator;

use alloc::vec;
use alloc::vec::Vec;

use crate::arena::{LinkedValue, NodeArena};
use crate::cursor::{self, Position};
use crate::node::{Anchor, NodeIndex};

/// Values between two positions, front to back (or back to front).
///
/// Each step follows at most the links between two neighbours, so walking the
/// whole range is O(n) without any auxiliary stack.
pub struct Range<'a, V> {
    arena: &'a NodeArena<V>,
    anchor: Anchor,
    front: Position,
    back: Position,
}

impl<'a, V> Range<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, anchor: Anchor, front: Position, back: Position) -> Self {
        Self {
            arena,
            anchor,
            front,
            back,
        }
    }
}

impl<'a, V> Iterator for Range<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let arena = self.arena;
        let index = self.front.index()?;
        self.front = cursor::successor(arena, self.front);

        Some(&arena[index].value)
    }
}

impl<V> DoubleEndedIterator for Range<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let arena = self.arena;
        self.back = cursor::predecessor(arena, &self.anchor, self.back);
        let index = self.back.index()?;

        Some(&arena[index].value)
    }
}

impl<V> FusedIterator for Range<'_, V> {}

impl<V> Clone for Range<'_, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            anchor: self.anchor,
            front: self.front,
            back: self.back,
        }
    }
}

/// In-order iterator over a whole tree.
pub struct Iter<'a, V> {
    range: Range<'a, V>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, anchor: Anchor) -> Self {
        Self {
            range: Range::new(arena, anchor, Position::from_link(anchor.min()), Position::END),
            remaining: arena.len(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.range.next()?;
        self.remaining -= 1;

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = self.range.next_back()?;
        self.remaining -= 1;

        Some(value)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            range: self.range.clone(),
            remaining: self.remaining,
        }
    }
}

/// In-order iterator handing out mutable payloads.
///
/// Walks a snapshot of the tree's links with the same cursor steps as
/// [`Range`], taking each payload out of the snapshot as it is reached.
pub struct IterMut<'a, V> {
    nodes: Vec<Option<LinkedValue<'a, V>>>,
    anchor: Anchor,
    front: Position,
    back: Position,
    remaining: usize,
}

impl<'a, V> IterMut<'a, V> {
    pub(crate) fn new(nodes: Vec<Option<LinkedValue<'a, V>>>, anchor: Anchor, len: usize) -> Self {
        Self {
            nodes,
            anchor,
            front: Position::from_link(anchor.min()),
            back: Position::END,
            remaining: len,
        }
    }

    fn take(&mut self, index: NodeIndex) -> Option<&'a mut V> {
        self.nodes.get_mut(index.slot)?.as_mut()?.value.take()
    }
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.front.index()?;
        self.front = cursor::successor(self.nodes.as_slice(), self.front);
        self.remaining -= 1;

        self.take(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.back = cursor::predecessor(self.nodes.as_slice(), &self.anchor, self.back);
        let index = self.back.index()?;
        self.remaining -= 1;

        self.take(index)
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// Owning in-order iterator.
pub struct IntoIter<V> {
    values: vec::IntoIter<V>,
}

impl<V> IntoIter<V> {
    pub(crate) fn new(values: Vec<V>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.values.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.values.next_back()
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

#[cfg(test)]
mod tests {
    use crate::{Heartwood, Identity, Multi, Unique};

    type Tree = Heartwood<usize, Identity, Unique>;

    #[test]
    pub fn iteration_meets_in_the_middle() {
        let tree: Tree = (0..6).collect();
        let mut iter = tree.iter();

        assert_eq!(iter.len(), 6);
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    pub fn reverse_iteration() {
        let tree: Tree = [4, 9, 1, 7].into_iter().collect();

        assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), vec![9, 7, 4, 1]);
    }

    #[test]
    pub fn range_covers_equal_run() {
        let tree: Heartwood<usize, Identity, Multi> = [1, 2, 2, 2, 3].into_iter().collect();

        assert_eq!(tree.range(&2).count(), 3);
        assert_eq!(tree.range(&2).rev().count(), 3);
        assert_eq!(tree.range(&5).next(), None);
    }

    #[test]
    pub fn mutable_iteration_visits_in_order() {
        let mut tree: Heartwood<(usize, usize), crate::First, Unique> = [(2, 0), (1, 0), (3, 0)].into_iter().collect();

        for (step, value) in tree.iter_mut().enumerate() {
            value.1 = step;
        }

        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![(1, 0), (2, 1), (3, 2)]);
    }

    #[test]
    pub fn mutable_iteration_meets_in_the_middle_around_holes() {
        let mut tree: Heartwood<(usize, usize), crate::First, Unique> = (0..10).map(|key| (key, 0)).collect();
        for key in [0, 3, 4, 8] {
            tree.remove(&key);
        }

        let mut iter = tree.iter_mut();
        assert_eq!(iter.len(), 6);
        iter.next().unwrap().1 = 1;
        iter.next_back().unwrap().1 = 1;
        iter.next().unwrap().1 = 1;
        assert_eq!(iter.len(), 3);
        let rest: Vec<_> = iter.rev().map(|pair| pair.0).collect();

        assert_eq!(rest, vec![7, 6, 5]);
        let touched: Vec<_> = tree.iter().filter(|pair| pair.1 == 1).map(|pair| pair.0).collect();
        assert_eq!(touched, vec![1, 2, 9]);
    }

    #[test]
    pub fn mutable_iteration_over_empty_tree() {
        let mut tree = Tree::new();

        assert_eq!(tree.iter_mut().next(), None);
        assert_eq!(tree.iter_mut().next_back(), None);
    }
}

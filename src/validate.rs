//! Whole-tree consistency checks.
//!
//! Nothing on the insert/erase paths calls into this module; it exists for
//! test suites and for callers who want to audit a comparator.

use core::cmp::Ordering;

use alloc::vec;

use crate::Heartwood;
use crate::cursor::{Position, leftmost, rightmost};
use crate::error::InvariantViolation;
use crate::node::NodeIndex;
use crate::policy::{Comparator, KeyOf, Uniqueness};

impl<V, X, U, C> Heartwood<V, X, U, C> {
    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        let Some(root) = self.anchor.root() else {
            return 0;
        };

        let mut tallest = 0;
        let mut worklist = vec![(root, 1)];

        while let Some((index, depth)) = worklist.pop() {
            tallest = tallest.max(depth);

            let node = self.node(index);
            for child in [node.left, node.right].into_iter().flatten() {
                worklist.push((child, depth + 1));
            }
        }

        tallest
    }
}

impl<V, X, U, C> Heartwood<V, X, U, C>
where
    X: KeyOf<V>,
    U: Uniqueness,
    C: Comparator<X::Key>,
{
    /// Walks the whole tree and reports the first broken invariant:
    /// - the root is black and has no parent,
    /// - no red node has a red child,
    /// - every path down to an empty link crosses the same number of black nodes,
    /// - children point back at their parent,
    /// - the cached minimum and maximum are the extreme nodes,
    /// - the recorded size matches the reachable node count,
    /// - in-order neighbours are ordered (strictly under the unique policy),
    ///   and the comparator answers both directions consistently.
    ///
    /// O(n) time, O(height) extra space.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.anchor.root() else {
            return match self.len() {
                0 => Ok(()),
                recorded => Err(InvariantViolation::SizeMismatch {
                    recorded,
                    reachable: 0,
                }),
            };
        };

        if self.node(root).parent.is_some() {
            return Err(InvariantViolation::BrokenParentLink {
                node: Position::at(root),
            });
        }
        if self.node(root).is_red() {
            return Err(InvariantViolation::RedRoot);
        }

        let leftmost = Position::at(leftmost(&self.arena, root));
        if self.begin() != leftmost {
            return Err(InvariantViolation::StaleMinimum {
                cached: self.begin(),
                actual: leftmost,
            });
        }
        let rightmost = Position::at(rightmost(&self.arena, root));
        if self.last() != rightmost {
            return Err(InvariantViolation::StaleMaximum {
                cached: self.last(),
                actual: rightmost,
            });
        }

        self.validate_shape(root)?;
        self.validate_order()
    }

    fn validate_shape(&self, root: NodeIndex) -> Result<(), InvariantViolation> {
        let recorded = self.len();
        let mut expected_blacks = None;
        let mut reachable = 0;
        let mut worklist = vec![(root, 1)];

        while let Some((index, blacks)) = worklist.pop() {
            reachable += 1;
            if reachable > recorded {
                return Err(InvariantViolation::SizeMismatch { recorded, reachable });
            }

            let node = self.node(index);
            for link in [node.left, node.right] {
                let Some(child) = link else {
                    match expected_blacks {
                        None => expected_blacks = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(InvariantViolation::BlackHeightMismatch {
                                node: Position::at(index),
                                expected,
                                found: blacks,
                            });
                        }
                        Some(_) => {}
                    }
                    continue;
                };

                let child_node = self.node(child);
                if child_node.parent != Some(index) {
                    return Err(InvariantViolation::BrokenParentLink {
                        node: Position::at(child),
                    });
                }
                if node.is_red() && child_node.is_red() {
                    return Err(InvariantViolation::RedRedEdge {
                        node: Position::at(index),
                        child: Position::at(child),
                    });
                }

                worklist.push((child, blacks + usize::from(!child_node.is_red())));
            }
        }

        if reachable != recorded {
            return Err(InvariantViolation::SizeMismatch { recorded, reachable });
        }

        Ok(())
    }

    fn validate_order(&self) -> Result<(), InvariantViolation> {
        let mut position = self.begin();

        while let Some(index) = position.index() {
            let next = self.next(position);
            let Some(next_index) = next.index() else {
                break;
            };

            let (current_key, next_key) = (self.key_at(index), self.key_at(next_index));
            let forward = self.compare.compare(current_key, next_key);

            if forward != self.compare.compare(next_key, current_key).reverse() {
                return Err(InvariantViolation::AsymmetricComparator { node: position });
            }

            match forward {
                Ordering::Greater => return Err(InvariantViolation::OutOfOrder { node: position }),
                Ordering::Equal if U::UNIQUE => return Err(InvariantViolation::DuplicateKey { node: next }),
                Ordering::Less | Ordering::Equal => {}
            }

            position = next;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::cmp::Ordering;

    use crate::node::{Anchor, NodeColor};
    use crate::{Heartwood, Identity, InvariantViolation, Position, Unique};

    type Tree = Heartwood<u32, Identity, Unique>;

    #[test]
    pub fn empty_and_small_trees_are_valid() {
        let mut tree = Tree::new();
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(tree.height(), 0);

        tree.insert(1);
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(tree.height(), 1);
    }

    #[test]
    pub fn detects_red_root() {
        let mut tree: Tree = (0..3).collect();
        let root = tree.anchor.root().unwrap();
        tree.arena[root].color = NodeColor::Red;

        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot));
    }

    #[test]
    pub fn detects_red_red_edge() {
        let mut tree: Tree = (0..4).collect();
        let two = tree.find(&2).index().unwrap();
        let three = tree.find(&3).index().unwrap();
        tree.arena[two].color = NodeColor::Red;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RedRedEdge {
                node: Position::at(two),
                child: Position::at(three)
            })
        );
    }

    #[test]
    pub fn detects_black_height_mismatch() {
        let mut tree: Tree = (0..3).collect();
        let zero = tree.find(&0).index().unwrap();
        tree.arena[zero].color = NodeColor::Black;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch {
                node: Position::at(zero),
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    pub fn detects_stale_minimum() {
        let mut tree: Tree = (0..3).collect();
        let Anchor::Populated { root, max, .. } = tree.anchor else {
            unreachable!();
        };
        tree.anchor = Anchor::Populated { root, min: root, max };

        assert!(matches!(tree.validate(), Err(InvariantViolation::StaleMinimum { .. })));
    }

    #[test]
    pub fn detects_out_of_order_values() {
        let mut tree: Tree = (0..3).collect();
        let first = tree.begin().index().unwrap();
        tree.arena[first].value = 50;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::OutOfOrder {
                node: Position::at(first)
            })
        );
    }

    #[test]
    pub fn detects_asymmetric_comparator() {
        let lie = Cell::new(false);
        let compare = |a: &u32, b: &u32| {
            if lie.get() { Ordering::Less } else { a.cmp(b) }
        };
        let mut tree = Heartwood::<u32, Identity, Unique, _>::with_comparator(compare);
        tree.extend([1, 2, 3]);
        assert_eq!(tree.validate(), Ok(()));

        lie.set(true);
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::AsymmetricComparator { .. })
        ));
    }

    #[test]
    pub fn ascending_insertions_stay_logarithmic() {
        let tree: Tree = (1..=1000).collect();

        assert_eq!(tree.validate(), Ok(()));
        // 2 * log2(1001)
        assert!(tree.height() <= 19);
    }
}

use crate::error::InvariantViolation;
use crate::iter::{IntoIter, Iter, Range};
use crate::policy::{Comparator, Identity, Multi, NaturalOrder, Unique};
use crate::{Heartwood, Position};

/// An ordered set of unique values.
///
/// ```
/// use heartwood::HeartwoodSet;
///
/// let mut set: HeartwoodSet<_> = [5, 1, 3].into_iter().collect();
///
/// assert!(!set.insert(3));
/// assert_eq!(set.first(), Some(&1));
/// assert_eq!(set.range_from(&2).copied().collect::<Vec<_>>(), vec![3, 5]);
/// ```
pub struct HeartwoodSet<T, C = NaturalOrder> {
    tree: Heartwood<T, Identity, Unique, C>,
}

impl<T> HeartwoodSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { tree: Heartwood::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: Heartwood::with_capacity(capacity),
        }
    }
}

impl<T, C> HeartwoodSet<T, C> {
    #[must_use]
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            tree: Heartwood::with_comparator(compare),
        }
    }

    /// The underlying engine, for position-level traversal.
    pub fn engine(&self) -> &Heartwood<T, Identity, Unique, C> {
        &self.tree
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first_value()
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last_value()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.tree.retain(keep);
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<T, C: Comparator<T>> HeartwoodSet<T, C> {
    /// Adds `value`; returns `false`, leaving the set untouched, when an
    /// equal value is already present.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert(value).1
    }

    /// Adds `value`, returning its position (or the position of the equal
    /// value already present) and whether it was inserted.
    pub fn insert_full(&mut self, value: T) -> (Position, bool) {
        self.tree.insert(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    pub fn get(&self, value: &T) -> Option<&T> {
        self.tree.get(self.tree.find(value))
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.tree.remove(value).is_some()
    }

    pub fn take(&mut self, value: &T) -> Option<T> {
        self.tree.remove(value)
    }

    /// Values not less than `value`, in order.
    pub fn range_from(&self, value: &T) -> Range<'_, T> {
        self.tree.range_between(self.tree.lower_bound(value), Position::END)
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate()
    }
}

/// An ordered collection of values that keeps duplicates, each new duplicate
/// after the equal values already present.
pub struct HeartwoodMultiSet<T, C = NaturalOrder> {
    tree: Heartwood<T, Identity, Multi, C>,
}

impl<T> HeartwoodMultiSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { tree: Heartwood::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: Heartwood::with_capacity(capacity),
        }
    }
}

impl<T, C> HeartwoodMultiSet<T, C> {
    #[must_use]
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            tree: Heartwood::with_comparator(compare),
        }
    }

    pub fn engine(&self) -> &Heartwood<T, Identity, Multi, C> {
        &self.tree
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first_value()
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last_value()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<T, C: Comparator<T>> HeartwoodMultiSet<T, C> {
    pub fn insert(&mut self, value: T) -> Position {
        self.tree.insert(value).0
    }

    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    pub fn count(&self, value: &T) -> usize {
        self.tree.count(value)
    }

    pub fn equal_range(&self, value: &T) -> (Position, Position) {
        self.tree.equal_range(value)
    }

    /// Every stored value equal to `value`, in insertion order.
    pub fn range(&self, value: &T) -> Range<'_, T> {
        self.tree.range(value)
    }

    /// Removes a single value equal to `value`, the earliest inserted one.
    pub fn remove_one(&mut self, value: &T) -> bool {
        self.tree.remove(value).is_some()
    }

    pub fn remove_all(&mut self, value: &T) -> usize {
        self.tree.erase_key(value)
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate()
    }
}

macro_rules! set_common_impls {
    ($set:ident) => {
        impl<T, C: Default> Default for $set<T, C> {
            fn default() -> Self {
                Self {
                    tree: Heartwood::default(),
                }
            }
        }

        impl<T: Clone, C: Clone> Clone for $set<T, C> {
            fn clone(&self) -> Self {
                Self {
                    tree: self.tree.clone(),
                }
            }
        }

        impl<T: core::fmt::Debug, C> core::fmt::Debug for $set<T, C> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Debug::fmt(&self.tree, f)
            }
        }

        impl<T: PartialEq, C> PartialEq for $set<T, C> {
            fn eq(&self, other: &Self) -> bool {
                self.tree == other.tree
            }
        }

        impl<T: Eq, C> Eq for $set<T, C> {}

        impl<T, C: Comparator<T>> Extend<T> for $set<T, C> {
            fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
                self.tree.extend(iter);
            }
        }

        impl<T, C: Comparator<T> + Default> FromIterator<T> for $set<T, C> {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                Self {
                    tree: iter.into_iter().collect(),
                }
            }
        }

        impl<'a, T, C> IntoIterator for &'a $set<T, C> {
            type Item = &'a T;
            type IntoIter = Iter<'a, T>;

            fn into_iter(self) -> Self::IntoIter {
                self.tree.iter()
            }
        }

        impl<T, C> IntoIterator for $set<T, C> {
            type Item = T;
            type IntoIter = IntoIter<T>;

            fn into_iter(self) -> Self::IntoIter {
                self.tree.into_iter()
            }
        }
    };
}

set_common_impls!(HeartwoodSet);
set_common_impls!(HeartwoodMultiSet);

#[cfg(test)]
mod tests {
    use super::{HeartwoodMultiSet, HeartwoodSet};

    #[test]
    pub fn set_rejects_duplicates() {
        let mut set = HeartwoodSet::<usize>::new();

        assert!(set.insert(3));
        assert!(set.insert(1));
        assert!(!set.insert(3));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&3), Some(&3));
        assert_eq!(set.get(&2), None);
    }

    #[test]
    pub fn set_remove_and_take() {
        let mut set: HeartwoodSet<String> = ["elm", "ash", "yew"].into_iter().map(String::from).collect();

        assert!(set.remove(&String::from("ash")));
        assert!(!set.remove(&String::from("ash")));
        assert_eq!(set.take(&String::from("yew")), Some(String::from("yew")));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["elm"]);
        assert!(set.validate().is_ok());
    }

    #[test]
    pub fn set_debug_lists_in_order() {
        let set: HeartwoodSet<u8> = [3, 1, 2].into_iter().collect();

        assert_eq!(format!("{set:?}"), "{1, 2, 3}");
    }

    #[test]
    pub fn multiset_counts_duplicates() {
        let mut bag = HeartwoodMultiSet::<char>::new();
        for c in "mississippi".chars() {
            bag.insert(c);
        }

        assert_eq!(bag.len(), 11);
        assert_eq!(bag.count(&'s'), 4);
        assert_eq!(bag.count(&'i'), 4);
        assert_eq!(bag.count(&'z'), 0);

        assert!(bag.remove_one(&'s'));
        assert_eq!(bag.count(&'s'), 3);
        assert_eq!(bag.remove_all(&'i'), 4);
        assert!(!bag.contains(&'i'));
        assert_eq!(bag.iter().collect::<String>(), "mppsss");
        assert!(bag.validate().is_ok());
    }

    #[test]
    pub fn multiset_equal_range_brackets_run() {
        let bag: HeartwoodMultiSet<u32> = [5, 1, 5, 9, 5].into_iter().collect();
        let (lower, upper) = bag.equal_range(&5);

        assert_eq!(bag.engine().get(lower), Some(&5));
        assert_eq!(bag.engine().get(upper), Some(&9));
        assert_eq!(bag.range(&5).count(), 3);
    }

    #[test]
    pub fn natural_order_constructors_infer_comparator() {
        let mut set = HeartwoodSet::new();
        set.insert(3u8);
        let mut sized = HeartwoodSet::with_capacity(4);
        sized.insert(3u8);

        let mut bag = HeartwoodMultiSet::new();
        bag.insert('a');
        let mut sized_bag = HeartwoodMultiSet::with_capacity(4);
        for c in "abba".chars() {
            sized_bag.insert(c);
        }

        assert_eq!(set.iter().collect::<Vec<_>>(), sized.iter().collect::<Vec<_>>());
        assert_eq!(bag.count(&'a'), 1);
        assert_eq!(sized_bag.count(&'b'), 2);
        assert_eq!(sized_bag.iter().collect::<String>(), "aabb");
        assert!(sized_bag.validate().is_ok());
    }
}

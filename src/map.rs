use core::fmt;

use crate::error::{InvariantViolation, KeyNotPresent};
use crate::iter::{IntoIter, Range};
use crate::policy::{Comparator, First, Multi, NaturalOrder, Unique};
use crate::{Heartwood, Position};

/// An associative array, storing key-value pairs.
///
/// Uses a Heartwood red-black tree ordered by the first component of each
/// stored pair.
///
/// ```
/// use heartwood::HeartwoodMap;
///
/// let mut ages = HeartwoodMap::new();
/// ages.insert("ash", 40);
/// *ages.get_or_default("elm") += 3;
///
/// assert_eq!(ages.at(&"elm"), Ok(&3));
/// assert!(ages.at(&"oak").is_err());
/// ```
pub struct HeartwoodMap<K, M, C = NaturalOrder> {
    tree: Heartwood<(K, M), First, Unique, C>,
}

impl<K, M> HeartwoodMap<K, M> {
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

impl<K, M, C> HeartwoodMap<K, M, C> {
    #[must_use]
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            tree: Heartwood::with_comparator(compare),
        }
    }

    /// The underlying engine, for position-level traversal.
    pub fn engine(&self) -> &Heartwood<(K, M), First, Unique, C> {
        &self.tree
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &M)> + ExactSizeIterator {
        self.tree.iter().map(|(key, mapped)| (key, mapped))
    }

    /// Mapped values are mutable; keys never are.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (&K, &mut M)> + ExactSizeIterator {
        self.tree.iter_mut().map(|(key, mapped)| (&*key, mapped))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.tree.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &M> + ExactSizeIterator {
        self.tree.iter().map(|(_, mapped)| mapped)
    }

    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut M> + ExactSizeIterator {
        self.tree.iter_mut().map(|(_, mapped)| mapped)
    }

    pub fn first_key_value(&self) -> Option<(&K, &M)> {
        self.tree.first_value().map(|(key, mapped)| (key, mapped))
    }

    pub fn last_key_value(&self) -> Option<(&K, &M)> {
        self.tree.last_value().map(|(key, mapped)| (key, mapped))
    }

    pub fn pop_first(&mut self) -> Option<(K, M)> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<(K, M)> {
        self.tree.pop_last()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    fn mapped_mut(&mut self, position: Position) -> &mut M {
        match self.tree.get_mut(position) {
            Some((_, mapped)) => mapped,
            None => unreachable!("lookups and insertions that succeed never yield the end position"),
        }
    }
}

impl<K, M, C: Comparator<K>> HeartwoodMap<K, M, C> {
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Maps `key` to `mapped` unless `key` is already present, in which case
    /// the existing mapping is kept and `false` is returned.
    pub fn insert(&mut self, key: K, mapped: M) -> bool {
        self.tree.insert((key, mapped)).1
    }

    /// Maps `key` to `mapped`, overwriting any existing mapping. Returns the
    /// entry's position and whether the key is new.
    pub fn insert_or_assign(&mut self, key: K, mapped: M) -> (Position, bool) {
        match self.tree.search(&key) {
            Ok(found) => {
                *self.mapped_mut(found) = mapped;
                (found, false)
            }
            Err(hint) => (self.tree.insert_hint(hint, (key, mapped)), true),
        }
    }

    /// Maps `key` to `make()` if `key` is absent; `make` is not called
    /// otherwise.
    pub fn try_insert_with<F: FnOnce() -> M>(&mut self, key: K, make: F) -> (Position, bool) {
        match self.tree.search(&key) {
            Ok(found) => (found, false),
            Err(hint) => (self.tree.insert_hint(hint, (key, make())), true),
        }
    }

    /// Mapped value for `key`, inserting `make()` first if `key` is absent.
    ///
    /// One descent locates either the entry or its insertion point; the
    /// insertion then links at that point without a second walk.
    pub fn get_or_insert_with<F: FnOnce() -> M>(&mut self, key: K, make: F) -> &mut M {
        let (position, _) = self.try_insert_with(key, make);

        self.mapped_mut(position)
    }

    pub fn get_or_default(&mut self, key: K) -> &mut M
    where
        M: Default,
    {
        self.get_or_insert_with(key, M::default)
    }

    pub fn get(&self, key: &K) -> Option<&M> {
        self.tree.get(self.tree.find(key)).map(|(_, mapped)| mapped)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut M> {
        let position = self.tree.find(key);

        self.tree.get_mut(position).map(|(_, mapped)| mapped)
    }

    /// Like [`HeartwoodMap::get`], failing loudly on a missing key.
    pub fn at(&self, key: &K) -> Result<&M, KeyNotPresent> {
        self.get(key).ok_or(KeyNotPresent)
    }

    pub fn at_mut(&mut self, key: &K) -> Result<&mut M, KeyNotPresent> {
        self.get_mut(key).ok_or(KeyNotPresent)
    }

    pub fn remove(&mut self, key: &K) -> Option<M> {
        self.remove_entry(key).map(|(_, mapped)| mapped)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, M)> {
        self.tree.remove(key)
    }

    /// Entries whose key is not less than `key`, in order.
    pub fn range_from(&self, key: &K) -> impl DoubleEndedIterator<Item = (&K, &M)> {
        self.tree
            .range_between(self.tree.lower_bound(key), Position::END)
            .map(|(key, mapped)| (key, mapped))
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate()
    }
}

/// An associative array keeping every pair inserted, including pairs with
/// equal keys. Equal keys stay in insertion order.
pub struct HeartwoodMultiMap<K, M, C = NaturalOrder> {
    tree: Heartwood<(K, M), First, Multi, C>,
}

impl<K, M> HeartwoodMultiMap<K, M> {
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

impl<K, M, C> HeartwoodMultiMap<K, M, C> {
    #[must_use]
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            tree: Heartwood::with_comparator(compare),
        }
    }

    pub fn engine(&self) -> &Heartwood<(K, M), First, Multi, C> {
        &self.tree
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &M)> + ExactSizeIterator {
        self.tree.iter().map(|(key, mapped)| (key, mapped))
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K, M, C: Comparator<K>> HeartwoodMultiMap<K, M, C> {
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Adds the pair after any pairs already stored under an equal key.
    pub fn insert(&mut self, key: K, mapped: M) -> Position {
        self.tree.insert((key, mapped)).0
    }

    pub fn count(&self, key: &K) -> usize {
        self.tree.count(key)
    }

    pub fn equal_range(&self, key: &K) -> (Position, Position) {
        self.tree.equal_range(key)
    }

    /// Every pair stored under `key`, in insertion order.
    pub fn get_all(&self, key: &K) -> Range<'_, (K, M)> {
        self.tree.range(key)
    }

    pub fn remove_all(&mut self, key: &K) -> usize {
        self.tree.erase_key(key)
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate()
    }
}

macro_rules! map_common_impls {
    ($map:ident) => {
        impl<K, M, C: Default> Default for $map<K, M, C> {
            fn default() -> Self {
                Self {
                    tree: Heartwood::default(),
                }
            }
        }

        impl<K: Clone, M: Clone, C: Clone> Clone for $map<K, M, C> {
            fn clone(&self) -> Self {
                Self {
                    tree: self.tree.clone(),
                }
            }
        }

        impl<K: fmt::Debug, M: fmt::Debug, C> fmt::Debug for $map<K, M, C> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map().entries(self.iter()).finish()
            }
        }

        impl<K: PartialEq, M: PartialEq, C> PartialEq for $map<K, M, C> {
            fn eq(&self, other: &Self) -> bool {
                self.tree == other.tree
            }
        }

        impl<K: Eq, M: Eq, C> Eq for $map<K, M, C> {}

        impl<K, M, C: Comparator<K>> Extend<(K, M)> for $map<K, M, C> {
            fn extend<I: IntoIterator<Item = (K, M)>>(&mut self, iter: I) {
                self.tree.extend(iter);
            }
        }

        impl<K, M, C: Comparator<K> + Default> FromIterator<(K, M)> for $map<K, M, C> {
            fn from_iter<I: IntoIterator<Item = (K, M)>>(iter: I) -> Self {
                Self {
                    tree: iter.into_iter().collect(),
                }
            }
        }

        impl<K, M, C> IntoIterator for $map<K, M, C> {
            type Item = (K, M);
            type IntoIter = IntoIter<(K, M)>;

            fn into_iter(self) -> Self::IntoIter {
                self.tree.into_iter()
            }
        }
    };
}

map_common_impls!(HeartwoodMap);
map_common_impls!(HeartwoodMultiMap);

//! Compile-time policies that let one engine serve every container shape.
//!
//! A [`Heartwood`](crate::Heartwood) tree is parameterized by:
//! - a [`KeyOf`] strategy extracting the ordering key from a stored value,
//! - a [`Uniqueness`] marker deciding whether equal keys may coexist,
//! - a [`Comparator`] ordering the extracted keys.

use core::cmp::Ordering;

/// Maps a stored value to the key it is ordered by.
pub trait KeyOf<V> {
    type Key;

    fn key_of(value: &V) -> &Self::Key;
}

/// The value is its own key (set-like shapes).
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<T> KeyOf<T> for Identity {
    type Key = T;

    #[inline]
    fn key_of(value: &T) -> &T {
        value
    }
}

/// The key is the first component of a pair (map-like shapes).
#[derive(Debug, Default, Clone, Copy)]
pub struct First;

impl<K, M> KeyOf<(K, M)> for First {
    type Key = K;

    #[inline]
    fn key_of(value: &(K, M)) -> &K {
        &value.0
    }
}

/// Whether a tree rejects a value whose key is already present.
pub trait Uniqueness {
    const UNIQUE: bool;
}

/// Equal keys are rejected on insertion.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unique;

impl Uniqueness for Unique {
    const UNIQUE: bool = true;
}

/// Equal keys are kept, later insertions after earlier ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct Multi;

impl Uniqueness for Multi {
    const UNIQUE: bool = false;
}

/// Total order over keys.
///
/// Implementations must behave like a strict weak order: `compare(a, b)` is
/// `Less` exactly when `compare(b, a)` is `Greater`, and the relation is
/// transitive. The engine does not defend against violations; `validate()`
/// reports the symptoms it can observe.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

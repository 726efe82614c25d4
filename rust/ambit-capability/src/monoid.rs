use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::ops::AddAssign;

/// An associative append operation with an identity element.
///
/// Writers accumulate their output with it. Implementations must satisfy
/// `empty().combine(a) == a`, `a.combine(empty()) == a` and
/// `a.combine(b).combine(c) == a.combine(b.combine(c))`.
pub trait Monoid: Sized {
    /// The identity element.
    fn empty() -> Self;

    /// Append `other` after `self`, in place.
    fn append(&mut self, other: Self);

    /// Append `other` after `self`, by value.
    fn combine(mut self, other: Self) -> Self {
        Monoid::append(&mut self, other);
        self
    }
}

impl Monoid for () {
    fn empty() -> Self {}

    fn append(&mut self, _other: Self) {}
}

impl Monoid for String {
    fn empty() -> Self {
        String::new()
    }

    fn append(&mut self, other: Self) {
        self.push_str(&other);
    }
}

impl<T> Monoid for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn append(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<T> Monoid for VecDeque<T> {
    fn empty() -> Self {
        VecDeque::new()
    }

    fn append(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<T: Ord> Monoid for BTreeSet<T> {
    fn empty() -> Self {
        BTreeSet::new()
    }

    fn append(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<T: Hash + Eq, S: BuildHasher + Default> Monoid for HashSet<T, S> {
    fn empty() -> Self {
        HashSet::default()
    }

    fn append(&mut self, other: Self) {
        self.extend(other);
    }
}

/// Union of the key sets; values under the same key are appended.
impl<K: Ord, V: Monoid> Monoid for BTreeMap<K, V> {
    fn empty() -> Self {
        BTreeMap::new()
    }

    fn append(&mut self, other: Self) {
        for (key, value) in other {
            match self.entry(key) {
                std::collections::btree_map::Entry::Occupied(mut entry) => {
                    Monoid::append(entry.get_mut(), value)
                }
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
    }
}

/// Union of the key sets; values under the same key are appended.
impl<K: Hash + Eq, V: Monoid, S: BuildHasher + Default> Monoid for HashMap<K, V, S> {
    fn empty() -> Self {
        HashMap::default()
    }

    fn append(&mut self, other: Self) {
        for (key, value) in other {
            match self.entry(key) {
                std::collections::hash_map::Entry::Occupied(mut entry) => {
                    Monoid::append(entry.get_mut(), value)
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
    }
}

impl<A: Monoid, B: Monoid> Monoid for (A, B) {
    fn empty() -> Self {
        (A::empty(), B::empty())
    }

    fn append(&mut self, other: Self) {
        Monoid::append(&mut self.0, other.0);
        Monoid::append(&mut self.1, other.1);
    }
}

/// Numbers under addition.
///
/// Overflow behaves like `+=` on `T`: it panics in debug builds and wraps in
/// release builds. Wrap the number in [`Wrapping`](std::num::Wrapping) or
/// [`Saturating`](std::num::Saturating) for overflow that is the same in
/// every build, or pick a type wide enough for the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sum<T>(pub T);

impl<T: Default + AddAssign> Monoid for Sum<T> {
    fn empty() -> Self {
        Sum(T::default())
    }

    fn append(&mut self, other: Self) {
        self.0 += other.0;
    }
}

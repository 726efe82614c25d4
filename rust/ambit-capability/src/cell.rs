//! Mutable cells that can back state, writer and stream capabilities.
//!
//! A context is shared by reference, so every mutation goes through interior
//! mutability. [`Mutable`] is the primitive the [`Ref`](crate::Ref) strategy
//! builds state on. Implementations differ in what they guarantee when the
//! context is shared across threads:
//!
//! | Cell | `update` under contention |
//! |------|---------------------------|
//! | `Atomic*` | atomic, lock-free: compare-and-swap loop, `f` may run several times |
//! | `std::sync::{Mutex, RwLock}` | atomic: `f` runs once under the write lock |
//! | `parking_lot::{Mutex, RwLock}` | atomic: `f` runs once under the write lock |
//! | `Cell`, `RefCell` | not shareable: `!Sync` confines them to one thread |
//!
//! Lock-backed cells hold the lock while the closure given to `view` or
//! `update` runs. A closure that reaches back into the same cell, such as
//! `gets(|_| put(..))` on one tag, deadlocks on a lock and panics on a
//! `RefCell`. Atomics and `Cell` hand the closure a copy and hold nothing.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{
    AtomicBool, AtomicI8, AtomicI16, AtomicI32, AtomicIsize, AtomicU8, AtomicU16, AtomicU32,
    AtomicUsize, Ordering,
};
#[cfg(target_has_atomic = "64")]
use std::sync::atomic::{AtomicI64, AtomicU64};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{trace, warn};

/// A mutable cell usable through a shared reference.
pub trait Mutable {
    /// The value held by the cell.
    type Value;

    /// Apply `f` to a borrow of the current value.
    fn view<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R;

    /// Replace the current value.
    fn store(&self, value: Self::Value);

    /// Replace the current value with the second component of `f`'s result
    /// and return the first, as one read-modify-write step.
    ///
    /// `f` must be pure: lock-free cells call it again whenever another
    /// writer got in between the read and the write.
    fn update<R>(&self, f: impl FnMut(&Self::Value) -> (R, Self::Value)) -> R;
}

impl<T: Copy> Mutable for Cell<T> {
    type Value = T;

    fn view<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.get())
    }

    fn store(&self, value: T) {
        self.set(value);
    }

    fn update<R>(&self, mut f: impl FnMut(&T) -> (R, T)) -> R {
        let (out, next) = f(&self.get());
        self.set(next);
        out
    }
}

/// Panics if `f` reaches back into the same cell, like any overlapping
/// `RefCell` borrow.
impl<T> Mutable for RefCell<T> {
    type Value = T;

    fn view<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.borrow())
    }

    fn store(&self, value: T) {
        *self.borrow_mut() = value;
    }

    fn update<R>(&self, mut f: impl FnMut(&T) -> (R, T)) -> R {
        let mut slot = self.borrow_mut();
        let (out, next) = f(&*slot);
        *slot = next;
        out
    }
}

/// Acquire a std mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("recovering value from a poisoned mutex");
        poisoned.into_inner()
    })
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("recovering value from a poisoned rwlock");
        poisoned.into_inner()
    })
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("recovering value from a poisoned rwlock");
        poisoned.into_inner()
    })
}

/// Holds the lock while `f` runs, so `f` must not reach back into the same
/// mutex: that deadlocks.
impl<T> Mutable for Mutex<T> {
    type Value = T;

    fn view<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*lock(self))
    }

    fn store(&self, value: T) {
        *lock(self) = value;
    }

    fn update<R>(&self, mut f: impl FnMut(&T) -> (R, T)) -> R {
        let mut guard = lock(self);
        let (out, next) = f(&*guard);
        *guard = next;
        out
    }
}

/// Holds the read lock while `view`'s closure runs and the write lock while
/// `update`'s does. Reaching back into the same lock from either deadlocks.
impl<T> Mutable for RwLock<T> {
    type Value = T;

    fn view<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*read(self))
    }

    fn store(&self, value: T) {
        *write(self) = value;
    }

    fn update<R>(&self, mut f: impl FnMut(&T) -> (R, T)) -> R {
        let mut guard = write(self);
        let (out, next) = f(&*guard);
        *guard = next;
        out
    }
}

/// Holds the lock while `f` runs, so `f` must not reach back into the same
/// mutex: that deadlocks.
impl<T> Mutable for parking_lot::Mutex<T> {
    type Value = T;

    fn view<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.lock())
    }

    fn store(&self, value: T) {
        *self.lock() = value;
    }

    fn update<R>(&self, mut f: impl FnMut(&T) -> (R, T)) -> R {
        let mut guard = self.lock();
        let (out, next) = f(&*guard);
        *guard = next;
        out
    }
}

/// Holds the read lock while `view`'s closure runs and the write lock while
/// `update`'s does. Reaching back into the same lock from either deadlocks.
impl<T> Mutable for parking_lot::RwLock<T> {
    type Value = T;

    fn view<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.read())
    }

    fn store(&self, value: T) {
        *self.write() = value;
    }

    fn update<R>(&self, mut f: impl FnMut(&T) -> (R, T)) -> R {
        let mut guard = self.write();
        let (out, next) = f(&*guard);
        *guard = next;
        out
    }
}

macro_rules! atomic_mutable {
    ($($(#[$meta:meta])* $atomic:ident => $value:ty),+ $(,)?) => {
        $(
            $(#[$meta])*
            impl Mutable for $atomic {
                type Value = $value;

                fn view<R>(&self, f: impl FnOnce(&$value) -> R) -> R {
                    f(&$atomic::load(self, Ordering::Acquire))
                }

                fn store(&self, value: $value) {
                    $atomic::store(self, value, Ordering::Release)
                }

                fn update<R>(&self, mut f: impl FnMut(&$value) -> (R, $value)) -> R {
                    let mut current = $atomic::load(self, Ordering::Acquire);
                    let mut attempt: usize = 0;
                    loop {
                        let (out, next) = f(&current);
                        match $atomic::compare_exchange_weak(
                            self,
                            current,
                            next,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        ) {
                            Ok(_) => return out,
                            Err(actual) => {
                                attempt += 1;
                                trace!(attempt, "compare-and-swap lost a race, retrying");
                                current = actual;
                            }
                        }
                    }
                }
            }
        )+
    };
}

atomic_mutable! {
    AtomicBool => bool,
    AtomicU8 => u8,
    AtomicU16 => u16,
    AtomicU32 => u32,
    #[cfg(target_has_atomic = "64")]
    AtomicU64 => u64,
    AtomicUsize => usize,
    AtomicI8 => i8,
    AtomicI16 => i16,
    AtomicI32 => i32,
    #[cfg(target_has_atomic = "64")]
    AtomicI64 => i64,
    AtomicIsize => isize,
}

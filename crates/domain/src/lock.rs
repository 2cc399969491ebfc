//! Lock helpers for the in-memory collections.
//!
//! Collections are only written after every precondition has been checked,
//! so a guard left behind by a panicking writer still protects consistent
//! data and poisoning is recovered rather than propagated.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

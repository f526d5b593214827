/*!
 * External Lock Contract
 *
 * The condition variable releases the caller's lock while it blocks and
 * reacquires it before returning; `Lockable` is the contract it needs from
 * that lock, and `Relocker` is the scoped helper that guarantees the
 * reacquisition on every exit path.
 */

use parking_lot::lock_api::RawMutex as RawMutexTrait;
use parking_lot::RawMutex;

/// Contract for an external lock a condition variable can release and
/// reacquire on the caller's behalf.
///
/// # Contract
///
/// - `lock` blocks until the lock is held exclusively.
/// - `unlock` releases it, and must only be called by the holder.
/// - An `unlock` followed by a `lock` of the same lock forms a
///   happens-before edge.
pub trait Lockable {
    /// Block until the lock is held.
    fn lock(&self);
    /// Release the lock. Callers must hold it.
    fn unlock(&self);
}

impl Lockable for RawMutex {
    #[inline]
    fn lock(&self) {
        RawMutexTrait::lock(self);
    }

    #[inline]
    fn unlock(&self) {
        // Relocker only calls this while the lock is held.
        unsafe { RawMutexTrait::unlock(self) }
    }
}

/// Releases the borrowed lock at most once and reacquires it on drop,
/// covering normal return, timeout, and unwind alike.
pub(crate) struct Relocker<'a, L: Lockable + ?Sized> {
    lock: &'a L,
    unlocked: bool,
}

impl<'a, L: Lockable + ?Sized> Relocker<'a, L> {
    pub(crate) fn new(lock: &'a L) -> Self {
        Self {
            lock,
            unlocked: false,
        }
    }

    pub(crate) fn unlock(&mut self) {
        self.lock.unlock();
        self.unlocked = true;
    }
}

impl<L: Lockable + ?Sized> Drop for Relocker<'_, L> {
    fn drop(&mut self) {
        if self.unlocked {
            self.lock.lock();
        }
    }
}

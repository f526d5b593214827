/*!
 * Condition Variable Front Ends
 *
 * Two public surfaces over the shared wait core:
 *
 * - [`Condvar`] pairs with [`parking_lot::Mutex`], taking the guard like
 *   `parking_lot`'s own condvar does.
 * - [`CondvarAny`] pairs with any external lock implementing [`Lockable`].
 *
 * Timeouts are surfaced as [`WaitError::Timeout`]; spurious wakes and stale
 * bucket permits never reach the caller.
 */

use super::lock::Lockable;
use super::wait::WaitCore;
use parking_lot::{MutexGuard, RawMutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result type for timed waits
pub type WaitResult<T> = Result<T, WaitError>;

/// Timed-wait errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    #[error("wait deadline elapsed before a notification arrived")]
    Timeout,
}

/// Borrow the raw lock behind a guard so the wait core can release and
/// reacquire it while the guard stays in place.
fn raw_lock<'a, T: ?Sized>(guard: &'a MutexGuard<'_, T>) -> &'a RawMutex {
    // The wait core reacquires the lock before returning, so the guard's
    // unlock-on-drop stays balanced.
    unsafe { MutexGuard::mutex(guard).raw() }
}

/// Condition variable for [`parking_lot::Mutex`] guards.
///
/// Waiters that were enrolled when a notification was issued are the only
/// ones that can consume it; a thread that starts waiting afterwards cannot
/// steal it.
///
/// # Examples
///
/// ```
/// use parking_lot::Mutex;
/// use std::sync::Arc;
/// use std::thread;
/// use waitgen::Condvar;
///
/// let pair = Arc::new((Mutex::new(false), Condvar::new()));
/// let pair2 = Arc::clone(&pair);
///
/// thread::spawn(move || {
///     let (lock, cvar) = &*pair2;
///     let mut started = lock.lock();
///     *started = true;
///     cvar.notify_one();
/// });
///
/// let (lock, cvar) = &*pair;
/// let mut started = lock.lock();
/// cvar.wait_while(&mut started, |started| !*started);
/// assert!(*started);
/// ```
pub struct Condvar {
    core: WaitCore,
}

impl Condvar {
    /// Create a new condition variable.
    pub const fn new() -> Self {
        Self {
            core: WaitCore::new(),
        }
    }

    /// Block until notified.
    ///
    /// The mutex behind `guard` is released while blocking and reacquired
    /// before returning. Wake-ups are never spurious from the caller's
    /// perspective, but pairing `wait` with a predicate loop (or using
    /// [`Condvar::wait_while`]) remains the robust pattern.
    pub fn wait<T: ?Sized>(&self, guard: &mut MutexGuard<'_, T>) {
        self.core.wait_on(raw_lock(guard), None);
    }

    /// Block while `condition` returns `true`, rechecking it on every
    /// wake-up with the mutex held.
    pub fn wait_while<T: ?Sized, F>(&self, guard: &mut MutexGuard<'_, T>, mut condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut **guard) {
            self.wait(guard);
        }
    }

    /// Block until notified or `deadline`.
    ///
    /// On `Err(Timeout)` the mutex is still held on return. A timed-out
    /// waiter leaves its enrollment behind: one later `notify_one` aimed at
    /// its cohort spends a permit no thread collects, which is why timed
    /// waits should be paired with a predicate check.
    pub fn wait_until<T: ?Sized>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        deadline: Instant,
    ) -> WaitResult<()> {
        if self.core.wait_on(raw_lock(guard), Some(deadline)) {
            Ok(())
        } else {
            Err(WaitError::Timeout)
        }
    }

    /// Block until notified, for at most `timeout`.
    pub fn wait_for<T: ?Sized>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        timeout: Duration,
    ) -> WaitResult<()> {
        self.wait_until(guard, Instant::now() + timeout)
    }

    /// Block while `condition` returns `true`, failing with `Timeout` as
    /// soon as a timed wait expires while the condition still holds.
    pub fn wait_while_until<T: ?Sized, F>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        mut condition: F,
        deadline: Instant,
    ) -> WaitResult<()>
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut **guard) {
            self.wait_until(guard, deadline)?;
        }
        Ok(())
    }

    /// Release one enrolled waiter, oldest cohort first.
    ///
    /// Returns immediately when no waiter is enrolled.
    #[inline]
    pub fn notify_one(&self) {
        self.core.notify_one();
    }

    /// Release every currently enrolled waiter.
    #[inline]
    pub fn notify_all(&self) {
        self.core.notify_all();
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}

/// Condition variable for arbitrary external locks.
///
/// The caller must hold `lock` across every wait call; the lock is released
/// while blocking and reacquired before the call returns, on success,
/// timeout, and unwind alike. Because the lock is not represented by a
/// guard, predicates close over the protected state themselves.
pub struct CondvarAny {
    core: WaitCore,
}

impl CondvarAny {
    /// Create a new condition variable.
    pub const fn new() -> Self {
        Self {
            core: WaitCore::new(),
        }
    }

    /// Block until notified. `lock` must be held by the caller.
    pub fn wait<L: Lockable + ?Sized>(&self, lock: &L) {
        self.core.wait_on(lock, None);
    }

    /// Block while `condition` returns `true`; the lock is held whenever
    /// the condition runs.
    pub fn wait_while<L: Lockable + ?Sized, F>(&self, lock: &L, mut condition: F)
    where
        F: FnMut() -> bool,
    {
        while condition() {
            self.wait(lock);
        }
    }

    /// Block until notified or `deadline`. The lock is held again on
    /// return, including on `Err(Timeout)`.
    pub fn wait_until<L: Lockable + ?Sized>(&self, lock: &L, deadline: Instant) -> WaitResult<()> {
        if self.core.wait_on(lock, Some(deadline)) {
            Ok(())
        } else {
            Err(WaitError::Timeout)
        }
    }

    /// Block until notified, for at most `timeout`.
    pub fn wait_for<L: Lockable + ?Sized>(&self, lock: &L, timeout: Duration) -> WaitResult<()> {
        self.wait_until(lock, Instant::now() + timeout)
    }

    /// Block while `condition` returns `true`, failing with `Timeout` as
    /// soon as a timed wait expires while the condition still holds.
    pub fn wait_while_until<L: Lockable + ?Sized, F>(
        &self,
        lock: &L,
        mut condition: F,
        deadline: Instant,
    ) -> WaitResult<()>
    where
        F: FnMut() -> bool,
    {
        while condition() {
            self.wait_until(lock, deadline)?;
        }
        Ok(())
    }

    /// Release one enrolled waiter, oldest cohort first.
    #[inline]
    pub fn notify_one(&self) {
        self.core.notify_one();
    }

    /// Release every currently enrolled waiter.
    #[inline]
    pub fn notify_all(&self) {
        self.core.notify_all();
    }
}

impl Default for CondvarAny {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wake_one() {
        let pair = Arc::new((Mutex::new(false), Condvar::new()));
        let pair2 = Arc::clone(&pair);

        let handle = thread::spawn(move || {
            let (lock, cvar) = &*pair2;
            let mut ready = lock.lock();
            while !*ready {
                cvar.wait(&mut ready);
            }
            *ready
        });

        thread::sleep(Duration::from_millis(50));
        {
            let (lock, cvar) = &*pair;
            let mut ready = lock.lock();
            *ready = true;
            cvar.notify_one();
        }

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_wait_until_timeout_keeps_lock() {
        let mutex = Mutex::new(41);
        let cvar = Condvar::new();

        let mut value = mutex.lock();
        let start = Instant::now();
        let result = cvar.wait_until(&mut value, Instant::now() + Duration::from_millis(50));
        assert_eq!(result, Err(WaitError::Timeout));
        assert!(start.elapsed() >= Duration::from_millis(50));

        // Guard still usable: the lock was reacquired.
        *value += 1;
        assert_eq!(*value, 42);
    }

    #[test]
    fn test_wait_while_sees_final_state() {
        let pair = Arc::new((Mutex::new(0u32), Condvar::new()));
        let pair2 = Arc::clone(&pair);

        let handle = thread::spawn(move || {
            let (lock, cvar) = &*pair2;
            let mut count = lock.lock();
            cvar.wait_while(&mut count, |count| *count < 3);
            *count
        });

        for _ in 0..3 {
            thread::sleep(Duration::from_millis(20));
            let (lock, cvar) = &*pair;
            let mut count = lock.lock();
            *count += 1;
            cvar.notify_one();
        }

        assert_eq!(handle.join().unwrap(), 3);
    }

    #[test]
    fn test_notify_without_waiters_does_not_pre_signal() {
        let mutex = Mutex::new(());
        let cvar = Condvar::new();

        cvar.notify_one();
        cvar.notify_all();

        // The notifications above targeted nobody; a later wait must block.
        let mut guard = mutex.lock();
        let result = cvar.wait_until(&mut guard, Instant::now() + Duration::from_millis(50));
        assert_eq!(result, Err(WaitError::Timeout));
    }

    #[test]
    fn test_default_is_usable() {
        let cvar = Condvar::default();
        cvar.notify_all();
        let cvar_any = CondvarAny::default();
        cvar_any.notify_all();
    }
}

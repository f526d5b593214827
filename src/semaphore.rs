/*!
 * Counted Semaphore
 *
 * In-process counted semaphore with OS-handle-like duplication semantics,
 * built from a mutex + condition pair.
 */

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a timed acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A permit was consumed.
    Signaled,
    /// The deadline elapsed before a permit became available.
    TimedOut,
}

impl WaitOutcome {
    /// Check whether a permit was consumed
    #[inline(always)]
    pub fn is_signaled(&self) -> bool {
        matches!(self, WaitOutcome::Signaled)
    }
}

struct SemState {
    permits: Mutex<Permits>,
    available: Condvar,
}

struct Permits {
    count: i64,
    ceiling: i64,
}

/// Counted semaphore handle
///
/// Cloning yields an independent handle referring to the same underlying
/// semaphore; the semaphore itself is freed when the last handle drops.
///
/// # Semantics
///
/// - `release(n)` adds `n` permits and never blocks. The ceiling given at
///   construction is advisory: releases saturate there rather than fail.
/// - Acquires consume one permit each; blocked acquirers are woken as
///   permits arrive. No fairness order is guaranteed among them.
#[derive(Clone)]
pub struct Semaphore {
    shared: Arc<SemState>,
}

impl Semaphore {
    /// Create a semaphore with `initial` permits and an advisory `ceiling`.
    pub fn new(initial: u32, ceiling: u32) -> Self {
        Self {
            shared: Arc::new(SemState {
                permits: Mutex::new(Permits {
                    count: i64::from(initial),
                    ceiling: i64::from(ceiling),
                }),
                available: Condvar::new(),
            }),
        }
    }

    /// Add `permits` permits. Never blocks.
    pub fn release(&self, permits: u32) {
        if permits == 0 {
            return;
        }
        let mut state = self.shared.permits.lock();
        state.count = (state.count + i64::from(permits)).min(state.ceiling);
        if permits == 1 {
            self.shared.available.notify_one();
        } else {
            self.shared.available.notify_all();
        }
    }

    /// Consume one permit, blocking until one is available.
    pub fn acquire(&self) {
        let mut state = self.shared.permits.lock();
        while state.count == 0 {
            self.shared.available.wait(&mut state);
        }
        state.count -= 1;
    }

    /// Consume one permit, blocking until `deadline` at the latest.
    ///
    /// `None` waits forever. A deadline already in the past degenerates to
    /// a poll.
    pub fn acquire_until(&self, deadline: Option<Instant>) -> WaitOutcome {
        let mut state = self.shared.permits.lock();
        loop {
            if state.count > 0 {
                state.count -= 1;
                return WaitOutcome::Signaled;
            }
            match deadline {
                None => self.shared.available.wait(&mut state),
                Some(at) => {
                    if self.shared.available.wait_until(&mut state, at).timed_out() {
                        // A release may have slipped in right at the deadline.
                        if state.count > 0 {
                            state.count -= 1;
                            return WaitOutcome::Signaled;
                        }
                        return WaitOutcome::TimedOut;
                    }
                }
            }
        }
    }

    /// Consume one permit only if one is immediately available.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.shared.permits.lock();
        if state.count > 0 {
            state.count -= 1;
            true
        } else {
            false
        }
    }

    /// Snapshot of the available permit count (for diagnostics)
    pub fn permits(&self) -> i64 {
        self.shared.permits.lock().count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_release_then_acquire() {
        let sem = Semaphore::new(0, u32::MAX);
        sem.release(2);
        sem.acquire();
        sem.acquire();
        assert_eq!(sem.permits(), 0);
    }

    #[test]
    fn test_try_acquire() {
        let sem = Semaphore::new(0, u32::MAX);
        assert!(!sem.try_acquire());
        sem.release(1);
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_acquire_until_timeout() {
        let sem = Semaphore::new(0, u32::MAX);
        let start = Instant::now();
        let outcome = sem.acquire_until(Some(Instant::now() + Duration::from_millis(50)));
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_past_deadline_polls() {
        let sem = Semaphore::new(1, u32::MAX);
        let outcome = sem.acquire_until(Some(Instant::now() - Duration::from_millis(1)));
        assert_eq!(outcome, WaitOutcome::Signaled);
    }

    #[test]
    fn test_handles_share_permits() {
        let sem = Semaphore::new(0, u32::MAX);
        let dup = sem.clone();

        let handle = thread::spawn(move || dup.acquire_until(Some(Instant::now() + Duration::from_secs(1))));

        thread::sleep(Duration::from_millis(50));
        sem.release(1);

        assert_eq!(handle.join().unwrap(), WaitOutcome::Signaled);
    }

    #[test]
    fn test_release_n_wakes_n() {
        let sem = Semaphore::new(0, u32::MAX);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let dup = sem.clone();
                thread::spawn(move || dup.acquire_until(Some(Instant::now() + Duration::from_secs(2))))
            })
            .collect();

        // Give threads time to block
        thread::sleep(Duration::from_millis(100));
        sem.release(3);

        for handle in handles {
            assert_eq!(handle.join().unwrap(), WaitOutcome::Signaled);
        }
        assert_eq!(sem.permits(), 0);
    }

    #[test]
    fn test_ceiling_saturates() {
        let sem = Semaphore::new(0, 2);
        sem.release(5);
        assert_eq!(sem.permits(), 2);
    }
}

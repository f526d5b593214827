/*!
 * Generation-Bucketed Wait/Notify Primitives
 *
 * Condition variables built on counted semaphores, with waiters grouped into
 * generations so that notifications only reach threads that were already
 * waiting when the notification was issued.
 *
 * # Architecture
 *
 * Waiters enroll into the youngest of up to three *generations*, each backed
 * by a lazily created counted semaphore. A notifier drains generations from
 * oldest to youngest, releasing one bucket permit per selected waiter plus
 * one permit on a global *wake* semaphore. A woken waiter probes the wake
 * semaphore without blocking to tell a targeted notification apart from a
 * stale bucket release, and re-enrolls when the probe fails.
 *
 * Two condition-variable front ends share this machinery:
 *
 * - [`Condvar`] works with [`parking_lot::Mutex`] guards, like
 *   `parking_lot`'s own condvar.
 * - [`CondvarAny`] works with any external lock implementing [`Lockable`].
 *
 * The counted [`Semaphore`] underneath is exported as well.
 *
 * # Use Cases
 *
 * - Classic monitor-style coordination (shared state + predicate)
 * - Building higher-level blocking primitives on top of [`Semaphore`]
 */

pub mod condvar;
pub mod semaphore;

pub use condvar::{Condvar, CondvarAny, Lockable, WaitError, WaitResult};
pub use semaphore::{Semaphore, WaitOutcome};

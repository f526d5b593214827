/*!
 * Condition Variables
 *
 * Generation-bucketed condition variables over the counted semaphore.
 *
 * # Architecture
 *
 * `generations` holds the three-slot waiter ring and the notify algorithm,
 * `wait` composes it with the enrollment counter and the relocker into the
 * blocking wait loop, and `condvar` exposes the two public front ends:
 * [`Condvar`] for `parking_lot` mutex guards and [`CondvarAny`] for any
 * external lock implementing [`Lockable`].
 */

mod condvar;
mod counter;
mod generations;
mod lock;
mod wait;

pub use condvar::{Condvar, CondvarAny, WaitError, WaitResult};
pub use lock::Lockable;

/*!
 * Wait Core
 *
 * The blocking wait loop and the notify entry points shared by both public
 * condition-variable front ends.
 *
 * # Lost-Wakeup Discipline
 *
 * A waiter publishes its enrollment (release store of the counter) before
 * the external lock is released, and notifiers check the counter with an
 * acquire load before doing anything else. A notifier that observes zero
 * therefore linearized before any enrollment it missed, and the external
 * lock carries the happens-before edge the caller relies on ("set the
 * condition, then notify").
 */

use super::counter::AtomicCounter;
use super::generations::GenerationTable;
use super::lock::{Lockable, Relocker};
use parking_lot::Mutex;
use std::time::Instant;

pub(crate) struct WaitCore {
    table: Mutex<GenerationTable>,
    total: AtomicCounter,
}

impl WaitCore {
    pub(crate) const fn new() -> Self {
        Self {
            table: Mutex::new(GenerationTable::new()),
            total: AtomicCounter::new(),
        }
    }

    /// Block on the condition variable until notified or `deadline`.
    ///
    /// The external lock is held on entry; it is released exactly once,
    /// after this waiter's enrollment is visible to notifiers, and
    /// reacquired before returning on every path. Returns `true` iff a
    /// notification targeted this waiter before the deadline.
    pub(crate) fn wait_on<L: Lockable + ?Sized>(
        &self,
        external: &L,
        deadline: Option<Instant>,
    ) -> bool {
        let mut relocker = Relocker::new(external);

        let (wake_probe, mut cohort_sem) = {
            let mut table = self.table.lock();
            self.total.set(self.total.get() + 1);
            // Enrollment is published; the notifier fast path can no longer
            // miss this waiter once the external lock drops.
            relocker.unlock();
            let wake_probe = table.wake_handle();
            table.ensure_open_generation(&self.total);
            (wake_probe, table.enroll())
        };

        let mut woken = false;
        while !woken {
            if !cohort_sem.acquire_until(deadline).is_signaled() {
                // Timed out. The bucket and counter contributions stay
                // behind and are reaped by a later notify as an extra wake.
                break;
            }
            if wake_probe.try_acquire() {
                woken = true;
            } else {
                // Stale bucket permit (eviction broadcast or a raced
                // notifier); enroll again and keep waiting.
                let mut table = self.table.lock();
                self.total.set(self.total.get() + 1);
                cohort_sem = table.enroll();
            }
        }
        woken
    }

    pub(crate) fn notify_one(&self) {
        if self.total.get() == 0 {
            return;
        }
        let mut table = self.table.lock();
        table.notify_one(&self.total);
    }

    pub(crate) fn notify_all(&self) {
        if self.total.get() == 0 {
            return;
        }
        let mut table = self.table.lock();
        table.notify_all(&self.total);
    }
}

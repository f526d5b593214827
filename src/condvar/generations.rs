/*!
 * Generation Table
 *
 * Waiters are grouped into *generations*: cohorts that share one counted
 * semaphore and one `notified` flag. The front generation (index 0) accepts
 * new waiters; older generations are closed cohorts draining toward empty.
 * Notifications target the oldest live cohort first, so a waiter arriving
 * after a notification cannot steal a permit meant for one that was already
 * blocked when the notification was issued.
 *
 * Three slots suffice: at most two notified cohorts can be outstanding
 * between a shift and the moment the oldest drains, and the third slot
 * absorbs the race. When all three hold live waiters, the oldest is evicted
 * with a plain broadcast (no wake permits); its waiters fail the wake probe
 * and re-enroll.
 *
 * Everything here runs with the internal mutex held.
 */

use super::counter::AtomicCounter;
use crate::semaphore::Semaphore;

pub(crate) const GENERATION_COUNT: usize = 3;

/// Permit ceiling for the cohort and wake semaphores.
const PERMIT_CEILING: u32 = u32::MAX;

/// One cohort of waiters.
pub(crate) struct Generation {
    /// Created when the first waiter enrolls, closed when the cohort drains.
    sem: Option<Semaphore>,
    /// Waiters currently blocked on `sem`.
    waiters: i32,
    /// A notify_one hit this cohort while waiters still resided in it.
    notified: bool,
}

impl Generation {
    const EMPTY: Generation = Generation {
        sem: None,
        waiters: 0,
        notified: false,
    };

    fn has_waiters(&self) -> bool {
        self.waiters > 0
    }

    fn is_empty(&self) -> bool {
        self.waiters == 0 && self.sem.is_none() && !self.notified
    }

    /// Close the semaphore and clear the notified flag.
    fn reset(&mut self) {
        self.sem = None;
        self.notified = false;
    }
}

/// Fixed ring of waiter cohorts plus the global wake semaphore.
pub(crate) struct GenerationTable {
    generations: [Generation; GENERATION_COUNT],
    /// How many leading slots are in use, `0..=GENERATION_COUNT`.
    active_generations: usize,
    /// One permit per targeted notification in flight; probed non-blockingly
    /// by woken waiters.
    wake_sem: Option<Semaphore>,
}

impl GenerationTable {
    pub(crate) const fn new() -> Self {
        Self {
            generations: [Generation::EMPTY; GENERATION_COUNT],
            active_generations: 0,
            wake_sem: None,
        }
    }

    /// Duplicate a handle to the wake semaphore, creating it on first use.
    pub(crate) fn wake_handle(&mut self) -> Semaphore {
        self.wake_sem
            .get_or_insert_with(|| Semaphore::new(0, PERMIT_CEILING))
            .clone()
    }

    /// First-enrollment fix-up: once the front generation has been hit by a
    /// notify_one, it stops accepting waiters and must be shifted down.
    pub(crate) fn ensure_open_generation(&mut self, total: &AtomicCounter) {
        if self.generations[0].notified {
            self.shift_generations_down(total);
        }
    }

    /// Enroll one waiter into the front generation and duplicate its
    /// semaphore handle.
    ///
    /// Also reactivates the front slot when the table is idle. Re-enrollment
    /// after a stale wake takes this same path, so a waiter that looped
    /// while a broadcast drained the table is still visible to the next
    /// notify scan.
    pub(crate) fn enroll(&mut self) -> Semaphore {
        if self.active_generations == 0 {
            self.active_generations = 1;
        }
        let front = &mut self.generations[0];
        let sem = front
            .sem
            .get_or_insert_with(|| Semaphore::new(0, PERMIT_CEILING))
            .clone();
        front.waiters += 1;
        sem
    }

    /// Make room for a fresh front generation.
    ///
    /// Compacts empty slots out (preserving the relative order of live
    /// cohorts), evicts the oldest cohort when all three are live, then
    /// shifts the survivors one position older and installs an empty front.
    fn shift_generations_down(&mut self, total: &AtomicCounter) {
        let mut kept = 0;
        for idx in 0..GENERATION_COUNT {
            if self.generations[idx].has_waiters() {
                self.generations.swap(kept, idx);
                kept += 1;
            }
        }
        for idx in kept..GENERATION_COUNT {
            debug_assert!(self.generations[idx].is_empty());
        }

        if kept == GENERATION_COUNT {
            // Evicted waiters get no wake permits: nothing selected them,
            // they fail the probe and re-enroll.
            log::trace!(
                "all {} generations hold live waiters; evicting the oldest cohort",
                GENERATION_COUNT
            );
            self.broadcast(GENERATION_COUNT - 1, false, total);
            kept = GENERATION_COUNT - 1;
        }

        self.active_generations = kept + 1;
        self.generations[0..=kept].rotate_right(1);
    }

    /// Drain one cohort: release one bucket permit per waiter (plus one wake
    /// permit each when `wake`), zero the count, and close the semaphore.
    fn broadcast(&mut self, idx: usize, wake: bool, total: &AtomicCounter) {
        let to_wake = self.generations[idx].waiters;
        total.set(total.get() - to_wake);
        if wake {
            if let Some(wake_sem) = &self.wake_sem {
                wake_sem.release(to_wake as u32);
            }
        }
        if let Some(sem) = &self.generations[idx].sem {
            sem.release(to_wake as u32);
        }
        self.generations[idx].waiters = 0;
        self.generations[idx].reset();
    }

    /// Release one waiter from the oldest live cohort.
    ///
    /// The wake permit goes out before the scan even when no cohort has a
    /// waiter left; a later enroller's failed probe absorbs the surplus.
    pub(crate) fn notify_one(&mut self, total: &AtomicCounter) {
        if let Some(wake_sem) = &self.wake_sem {
            wake_sem.release(1);
        }
        for idx in (0..self.active_generations).rev() {
            if !self.generations[idx].has_waiters() {
                continue;
            }
            total.set(total.get() - 1);
            let entry = &mut self.generations[idx];
            entry.notified = true;
            if let Some(sem) = &entry.sem {
                sem.release(1);
            }
            entry.waiters -= 1;
            if entry.waiters == 0 {
                entry.reset();
                if idx + 1 == self.active_generations {
                    self.active_generations -= 1;
                }
            }
            return;
        }
    }

    /// Release every enrolled waiter, oldest cohort first.
    pub(crate) fn notify_all(&mut self, total: &AtomicCounter) {
        for idx in (0..self.active_generations).rev() {
            if self.generations[idx].has_waiters() {
                self.broadcast(idx, true, total);
            }
        }
        self.active_generations = 0;
    }
}

/*!
 * Enrollment Counter
 */

use std::sync::atomic::{AtomicI32, Ordering};

/// 32-bit signed counter with acquire loads and release stores.
///
/// Mutated only under the internal mutex; the release store pairs with the
/// acquire load in the notify fast paths so that a notifier observing zero
/// has linearized before any enrollment it failed to see.
pub(crate) struct AtomicCounter(AtomicI32);

impl AtomicCounter {
    pub(crate) const fn new() -> Self {
        Self(AtomicI32::new(0))
    }

    #[inline(always)]
    pub(crate) fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub(crate) fn set(&self, value: i32) {
        self.0.store(value, Ordering::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.get(), 0);
        counter.set(7);
        assert_eq!(counter.get(), 7);
        counter.set(counter.get() - 7);
        assert_eq!(counter.get(), 0);
    }
}

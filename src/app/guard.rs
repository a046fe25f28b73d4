//! Single-flight guard for form submissions.

use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one outstanding submission of a form.
///
/// The view disables its submit button while a [`SubmitPermit`] is alive;
/// a second `try_begin` in that window returns `None`.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::app::SubmitGuard;
///
/// let guard = SubmitGuard::new();
/// let permit = guard.try_begin().unwrap();
/// assert!(guard.is_busy());
/// assert!(guard.try_begin().is_none());
///
/// drop(permit);
/// assert!(guard.try_begin().is_some());
/// ```
#[derive(Debug, Default)]
pub struct SubmitGuard {
    busy: AtomicBool,
}

impl SubmitGuard {
    /// Creates an idle guard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claims the guard, or returns `None` while a submission is in flight.
    #[must_use]
    pub fn try_begin(&self) -> Option<SubmitPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SubmitPermit { guard: self })
    }

    /// Returns `true` while a permit is held.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one submission; releases the guard on drop.
#[derive(Debug)]
pub struct SubmitPermit<'a> {
    guard: &'a SubmitGuard,
}

impl Drop for SubmitPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_second_submission_is_rejected() {
        let guard = SubmitGuard::new();
        let _permit = guard.try_begin().unwrap();
        assert!(guard.try_begin().is_none());
    }

    #[test]
    fn test_permit_released_on_drop() {
        let guard = SubmitGuard::new();
        {
            let _permit = guard.try_begin().unwrap();
            assert!(guard.is_busy());
        }
        assert!(!guard.is_busy());
    }

    #[test]
    fn test_only_one_thread_wins() {
        let guard = Arc::new(SubmitGuard::new());
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    let permit = guard.try_begin();
                    let won = permit.is_some();
                    barrier.wait();
                    won
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}

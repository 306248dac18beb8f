//! Deterministic allocation-failure injection.
//!
//! Every fallible allocation the queue performs (a boxed handle, an element, or the copy of an
//! inserted value) first asks this module for permission. Nothing fails unless a plan is armed
//! with [`fail_after`], so the check costs one thread-local read in normal operation.
//!
//! Plans are one-shot and per thread: once the planned failure has fired, allocations succeed
//! again until the next [`fail_after`]. This keeps tests running in parallel from tripping over
//! each other.

use std::cell::Cell;

thread_local! {
    static REMAINING: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Lets the next `successes` allocations through, then fails exactly one.
pub fn fail_after(successes: usize) {
    REMAINING.with(|remaining| remaining.set(Some(successes)));
}

/// Drops any pending plan.
pub fn disarm() {
    REMAINING.with(|remaining| remaining.set(None));
}

pub fn is_armed() -> bool {
    REMAINING.with(|remaining| remaining.get().is_some())
}

/// Consumes one step of the plan. Returns `false` if this allocation has to fail.
pub(crate) fn permit() -> bool {
    REMAINING.with(|remaining| match remaining.get() {
        None => true,
        Some(0) => {
            remaining.set(None);
            tracing::debug!("injected allocation failure");
            false
        }
        Some(n) => {
            remaining.set(Some(n - 1));
            true
        }
    })
}

//! Status-returning operations on an optional queue handle.
//!
//! These mirror the methods of [`Queue`], but take `None` as the handle of a queue that was never
//! constructed (or whose construction failed) and answer with a plain `bool`. Nothing here panics
//! on a missing handle: destroying, sizing or reversing `None` does nothing, and inserting into or
//! removing from it fails.

use crate::Queue;

/// Constructs an empty queue, or `None` if its handle could not be allocated.
pub fn new() -> Option<Box<Queue>> {
    Queue::try_new()
        .map_err(|err| tracing::debug!(%err, "queue construction failed"))
        .ok()
}

/// Releases the queue and every value it still owns.
pub fn free(queue: Option<Box<Queue>>) {
    drop(queue);
}

pub fn insert_head(queue: Option<&mut Queue>, value: &str) -> bool {
    let Some(queue) = queue else {
        tracing::debug!("insert at head into missing queue");
        return false;
    };
    queue
        .push_front(value)
        .map_err(|err| tracing::debug!(%err, "insert at head failed"))
        .is_ok()
}

pub fn insert_tail(queue: Option<&mut Queue>, value: &str) -> bool {
    let Some(queue) = queue else {
        tracing::debug!("insert at tail into missing queue");
        return false;
    };
    queue
        .push_back(value)
        .map_err(|err| tracing::debug!(%err, "insert at tail failed"))
        .is_ok()
}

/// Removes the head, copying it into `buf` if one is given. See [`Queue::remove_head`] for how
/// the value is truncated.
pub fn remove_head(queue: Option<&mut Queue>, buf: Option<&mut [u8]>) -> bool {
    let Some(queue) = queue else {
        tracing::debug!("remove from missing queue");
        return false;
    };
    queue
        .remove_head(buf)
        .map_err(|err| tracing::debug!(%err, "remove at head failed"))
        .is_ok()
}

pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::len)
}

pub fn reverse(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.reverse();
    }
}

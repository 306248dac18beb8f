//! Read-only walk over the values of a [`Queue`](crate::Queue), head to tail.
//!
//! ```text
//!   node
//!    |
//!    v
//!   head -> elem -> elem -> tail -> None
//! ```
//!
//! One step of iteration yields the value of `node` and moves `node` along its `next` link. The
//! chain ends in `None`, never in a dangling pointer, so there's no separate "finished" flag.

use std::marker::PhantomData;

use crate::{Element, Link};

pub(crate) struct Iter<'queue> {
    node: Link,
    _bound_to_queue: PhantomData<&'queue Element>,
}

impl<'queue> Iter<'queue> {
    /// # Safety
    ///
    /// `start` must be the head of a chain that stays alive and unmodified for `'queue`.
    pub(crate) unsafe fn new(start: Link) -> Self {
        Self {
            node: start,
            _bound_to_queue: PhantomData,
        }
    }
}

impl<'queue> Iterator for Iter<'queue> {
    type Item = &'queue str;

    fn next(&mut self) -> Option<&'queue str> {
        // SAFETY: delegated to the contract of `new`
        let element = unsafe { self.node?.as_ref() };
        self.node = element.next;
        Some(&element.value)
    }
}

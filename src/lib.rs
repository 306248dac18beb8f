//! A deque of owned strings, backed by a singly-linked chain of heap-allocated elements.
//!
//! Values go in at either end and come out at the front, so the queue serves as both a FIFO
//! ([`Queue::push_back`] + [`Queue::pop_front`]) and a LIFO ([`Queue::push_front`] +
//! [`Queue::pop_front`]). Every allocation is fallible and reported through [`QueueError`]; a
//! failed operation leaves the queue exactly as it was.


mod error;
pub mod fault;
pub mod handle;
mod iter;
pub mod script;

pub use error::{Allocation, QueueError, Result};

use std::{
    alloc::{self, Layout},
    fmt, mem,
    ptr::NonNull,
};

type Link = Option<NonNull<Element>>;

pub struct Queue {
    head: Link,
    tail: Link,
    len: usize,
}

struct Element {
    value: String,
    next: Link,
}

impl Queue {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty queue behind a fallibly allocated box.
    pub fn try_new() -> Result<Box<Self>> {
        let slot = allocate::<Self>(Allocation::Handle)?;
        // SAFETY: `slot` was allocated by the global allocator with `Layout::new::<Self>()`,
        //         which is exactly the allocation a `Box<Self>` owns
        unsafe {
            slot.as_ptr().write(Self::new());
            Ok(Box::from_raw(slot.as_ptr()))
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn iter(&self) -> iter::Iter<'_> {
        // SAFETY: the iterator borrows `self`, so no element can be unlinked while it lives
        unsafe { iter::Iter::new(self.head) }
    }

    /// Copies `value` into a new element placed before the current head.
    pub fn push_front(&mut self, value: &str) -> Result<()> {
        let element = new_element(value, self.head)?;

        self.head = Some(element);
        if self.tail.is_none() {
            self.tail = Some(element);
        }
        self.len += 1;

        tracing::trace!(len = self.len, "inserted at head");
        Ok(())
    }

    /// Copies `value` into a new element placed after the current tail. _O_(1).
    pub fn push_back(&mut self, value: &str) -> Result<()> {
        let element = new_element(value, None)?;

        match self.tail {
            // SAFETY: `tail` always points at the last live element of this queue
            Some(mut tail) => unsafe { tail.as_mut().next = Some(element) },
            None => self.head = Some(element),
        }
        self.tail = Some(element);
        self.len += 1;

        tracing::trace!(len = self.len, "inserted at tail");
        Ok(())
    }

    /// Unlinks the first element and hands its value over to the caller.
    pub fn pop_front(&mut self) -> Option<String> {
        let head = self.head?;

        // SAFETY: elements are only created by `new_element`, with the layout a `Box<Element>`
        //         expects, and this one is unlinked below before anything else can reach it
        let element = unsafe { Box::from_raw(head.as_ptr()) };
        let Element { value, next } = *element;

        self.head = next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;

        Some(value)
    }

    /// Removes the first element, copying its value into `buf` as a NUL-terminated byte string
    /// if a buffer is given. Returns how many value bytes were written.
    ///
    /// At most `buf.len() - 1` bytes of the value are copied, followed by a single `0`; longer
    /// values are cut off silently. Copying also stops at an interior NUL, so the count returned
    /// is always the C-string length the caller sees. A zero-length buffer receives nothing.
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidOperation`] if the queue is empty, in which case `buf` is untouched.
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Result<usize> {
        let value = self
            .pop_front()
            .ok_or(QueueError::InvalidOperation("remove from empty queue"))?;

        Ok(buf.map_or(0, |buf| copy_truncated(&value, buf)))
    }

    /// Reverses the queue by relinking its elements. Nothing is allocated or freed.
    pub fn reverse(&mut self) {
        if self.len < 2 {
            return;
        }

        let mut prev: Link = None;
        let mut current = self.head;
        while let Some(mut element) = current {
            // SAFETY: `element` is live and owned by this queue, and no references into the
            //         chain exist while `self` is borrowed mutably
            unsafe {
                current = element.as_ref().next;
                element.as_mut().next = prev;
            }
            prev = Some(element);
        }
        mem::swap(&mut self.head, &mut self.tail);

        tracing::trace!(len = self.len, "reversed");
    }

    /// Walks the chain and checks it against the bookkeeping in the handle.
    pub(crate) fn audit(&self) -> std::result::Result<(), &'static str> {
        if self.head.is_none() != self.tail.is_none() {
            return Err("head and tail disagree about emptiness");
        }
        if (self.len == 0) != self.head.is_none() {
            return Err("count disagrees with head about emptiness");
        }

        let mut walked = 0;
        let mut last = None;
        let mut current = self.head;
        while let Some(element) = current {
            walked += 1;
            if walked > self.len {
                return Err("chain is longer than the count");
            }
            last = Some(element);
            // SAFETY: reachable elements are live for as long as `self` is borrowed
            current = unsafe { element.as_ref().next };
        }

        if walked != self.len {
            Err("chain is shorter than the count")
        } else if last != self.tail {
            Err("tail is not the last element of the chain")
        } else {
            Ok(())
        }
    }
}

/// Allocates storage for one element, then the copy of `value`, in that order. If the copy
/// fails, the element storage is handed back before returning.
fn new_element(value: &str, next: Link) -> Result<NonNull<Element>> {
    let slot = allocate::<Element>(Allocation::Element)?;

    let value = match copy_value(value) {
        Ok(value) => value,
        Err(err) => {
            // SAFETY: `slot` came from `allocate` and was never initialized
            unsafe { release(slot) };
            return Err(err);
        }
    };

    // SAFETY: `slot` is non-null, aligned for `Element` and uninitialized
    unsafe { slot.as_ptr().write(Element { value, next }) };
    Ok(slot)
}

fn allocate<T>(what: Allocation) -> Result<NonNull<T>> {
    if !fault::permit() {
        return Err(QueueError::AllocationFailure(what));
    }

    let layout = Layout::new::<T>();
    debug_assert_ne!(layout.size(), 0, "zero-sized types are never allocated");
    // SAFETY: the layout is not zero-sized
    let ptr = unsafe { alloc::alloc(layout) }.cast::<T>();
    NonNull::new(ptr).ok_or(QueueError::AllocationFailure(what))
}

/// # Safety
///
/// `ptr` must come from [`allocate`] with the same `T`, and must not hold a live value.
unsafe fn release<T>(ptr: NonNull<T>) {
    alloc::dealloc(ptr.as_ptr().cast(), Layout::new::<T>());
}

fn copy_value(value: &str) -> Result<String> {
    let failed = QueueError::AllocationFailure(Allocation::Value);
    if !fault::permit() {
        return Err(failed);
    }

    let mut copy = String::new();
    copy.try_reserve_exact(value.len()).map_err(|_| failed)?;
    copy.push_str(value);
    Ok(copy)
}

fn copy_truncated(value: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };

    let bytes = value.as_bytes();
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let copied = len.min(room);
    buf[..copied].copy_from_slice(&bytes[..copied]);
    buf[copied] = 0;
    copied
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}

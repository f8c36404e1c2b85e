use std::ptr::NonNull;

use crate::cell::Value;
use crate::util::alloc::{dealloc, try_alloc, try_realloc};
use crate::util::error::Error;

/// The raw, growable slot buffer underneath [`Vector`](super::Vector).
///
/// Holds `cap` slots of possibly-uninitialized [`Value`] storage; the owner tracks which slots
/// are live. Reallocation relocates slots bytewise, which every slot type tolerates: values are
/// plain moves, with no per-element relocation notification.
pub(crate) struct RawBuf {
    ptr: NonNull<Value>,
    cap: usize,
}

impl RawBuf {
    /// An empty buffer; no allocation until the first reallocation.
    pub const fn new() -> RawBuf {
        RawBuf {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// A pointer to slot `index`. The slot's initialization state is the caller's to track.
    pub fn slot(&self, index: usize) -> NonNull<Value> {
        debug_assert!(index <= self.cap);
        // SAFETY: index is within the allocated range (or one-past for the zero-slot buffer,
        // where the dangling pointer is never dereferenced).
        unsafe { self.ptr.add(index) }
    }

    /// Resizes to exactly `new_cap` slots. On [`Error::NoMem`] the old buffer and capacity are
    /// untouched. Slot contents are preserved bytewise up to `min(cap, new_cap)`.
    pub fn try_realloc(&mut self, new_cap: usize) -> Result<(), Error> {
        if new_cap == self.cap {
            return Ok(());
        }

        if new_cap == 0 {
            // SAFETY: cap != new_cap, so the buffer was allocated with a layout for cap slots.
            unsafe { dealloc::<Value>(self.ptr, self.cap) };
            self.ptr = NonNull::dangling();
        } else if self.cap == 0 {
            // SAFETY: new_cap is non-zero.
            self.ptr = unsafe { try_alloc::<Value>(new_cap)? };
        } else {
            // SAFETY: The buffer was allocated with a layout for cap slots and both counts are
            // non-zero.
            self.ptr = unsafe { try_realloc::<Value>(self.ptr, self.cap, new_cap)? };
        }

        self.cap = new_cap;
        Ok(())
    }
}

impl Drop for RawBuf {
    fn drop(&mut self) {
        if self.cap > 0 {
            // SAFETY: The buffer was allocated with a layout for cap slots; live slot teardown is
            // the owner's responsibility and has already happened.
            unsafe { dealloc::<Value>(self.ptr, self.cap) };
        }
    }
}

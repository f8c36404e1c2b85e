//! Fallible raw allocation helpers.
//!
//! Allocation failure is the one failure mode every mutating container operation must survive
//! without losing state, so these wrappers report [`Error::NoMem`] instead of calling
//! [`handle_alloc_error`](std::alloc::handle_alloc_error).

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::util::error::Error;

/// Computes the layout for `count` values of `T`, reporting overflow as [`Error::NoMem`].
pub(crate) fn array_layout<T>(count: usize) -> Result<Layout, Error> {
    Layout::array::<T>(count).map_err(|_| Error::NoMem)
}

/// Allocates storage for `count` values of `T`.
///
/// # Safety
/// `count` must be non-zero; zero-capacity buffers are represented by dangling pointers and must
/// never reach the allocator.
pub(crate) unsafe fn try_alloc<T>(count: usize) -> Result<NonNull<T>, Error> {
    let layout = array_layout::<T>(count)?;
    debug_assert!(layout.size() > 0);

    // SAFETY: The layout has non-zero size per this function's contract.
    let ptr = unsafe { alloc::alloc(layout) };
    NonNull::new(ptr.cast()).ok_or(Error::NoMem)
}

/// Reallocates a buffer previously obtained from [`try_alloc`] for a new count. On failure, the
/// original buffer is untouched and remains valid.
///
/// # Safety
/// `ptr` must have been allocated with a layout for `old_count` values of `T`, and both counts
/// must be non-zero.
pub(crate) unsafe fn try_realloc<T>(
    ptr: NonNull<T>,
    old_count: usize,
    new_count: usize,
) -> Result<NonNull<T>, Error> {
    let old_layout = array_layout::<T>(old_count)?;
    let new_layout = array_layout::<T>(new_count)?;
    debug_assert!(old_layout.size() > 0 && new_layout.size() > 0);

    // SAFETY: ptr was allocated with old_layout per this function's contract and the new size is
    // non-zero and doesn't overflow isize (checked by Layout::array).
    let raw = unsafe { alloc::realloc(ptr.as_ptr().cast(), old_layout, new_layout.size()) };
    NonNull::new(raw.cast()).ok_or(Error::NoMem)
}

/// Frees a buffer previously obtained from [`try_alloc`] or [`try_realloc`].
///
/// # Safety
/// `ptr` must have been allocated with a layout for `count` values of `T`, with `count` non-zero,
/// and must not be used afterwards.
pub(crate) unsafe fn dealloc<T>(ptr: NonNull<T>, count: usize) {
    // The layout was valid at allocation time, so it can't fail here.
    if let Ok(layout) = array_layout::<T>(count) {
        debug_assert!(layout.size() > 0);
        // SAFETY: ptr was allocated with this exact layout per this function's contract.
        unsafe { alloc::dealloc(ptr.as_ptr().cast(), layout) }
    }
}

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::mem;
use std::ptr::NonNull;
use std::slice;

use crate::util::alloc::{dealloc, try_alloc, try_realloc};
use crate::util::error::Error;

/// Content shorter than this lives inline in the string itself, avoiding any heap allocation.
pub const INLINE_CAP: usize = 16;

const MIN_CAP: usize = 8;

/// A byte comparator for [`ByteString::try_cmp`]. Must return exactly an [`Ordering`]; an
/// [`Err`] aborts the comparison and is propagated.
pub type ByteCompareFn = fn(u8, u8) -> Result<Ordering, Error>;

/// Where the bytes currently live.
///
/// The inline buffer is used only while the content has always fit it; once the string has grown
/// onto the heap it never reverts to inline, even if later shortened.
enum Repr {
    Inline([u8; INLINE_CAP]),
    Heap { ptr: NonNull<u8>, cap: usize },
}

/// A byte string with a small-buffer optimization.
///
/// Unlike the other containers, the string holds raw bytes directly rather than going through
/// [`TypedCell`](crate::cell::TypedCell) views; it participates in the cell machinery as the
/// [`TypeTag::Str`](crate::cell::TypeTag::Str) kind, where nesting it inside another container
/// routes its copy and teardown through the operation-table defaults.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of bytes in the string.
/// - `m`: The number of bytes being spliced in or out.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` / `cap` | `O(1)` |
/// | `try_push` | `O(1)`*, `O(n)` |
/// | `try_insert_at` | `O(n+m)` |
/// | `erase_at` | `O(n)` |
/// | `try_cmp` | `O(n)` |
///
/// \* `O(n)` when the push has to grow the buffer.
pub struct ByteString {
    len: usize,
    repr: Repr,
}

impl ByteString {
    /// Creates an empty string. No allocation happens until the content outgrows the inline
    /// buffer.
    pub const fn new() -> ByteString {
        ByteString {
            len: 0,
            repr: Repr::Inline([0; INLINE_CAP]),
        }
    }

    /// Creates a string holding a copy of `bytes`, inline when they fit.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<ByteString, Error> {
        let mut string = ByteString::new();
        string.try_insert_at(0, bytes)?;
        Ok(string)
    }

    /// Returns the length of the content in bytes.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the string contains no bytes.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current capacity: [`INLINE_CAP`] while inline, the heap allocation's size
    /// afterwards.
    pub const fn cap(&self) -> usize {
        match &self.repr {
            Repr::Inline(_) => INLINE_CAP,
            Repr::Heap { cap, .. } => *cap,
        }
    }

    /// True while the content still lives in the inline buffer.
    pub const fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }

    /// The content as a byte slice.
    pub const fn as_bytes(&self) -> &[u8] {
        // SAFETY: Bytes 0..len are always initialized content, inline or on the heap.
        unsafe { slice::from_raw_parts(self.base(), self.len) }
    }

    /// The content as a mutable byte slice. Bytes can be changed but not added or removed here.
    pub const fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: Bytes 0..len are always initialized content, and self is borrowed mutably.
        unsafe { slice::from_raw_parts_mut(self.base_mut(), self.len) }
    }

    /// Returns the byte at `index`, if in bounds.
    pub const fn get(&self, index: usize) -> Option<u8> {
        if index < self.len {
            Some(self.as_bytes()[index])
        } else {
            None
        }
    }

    /// Ensures capacity for at least `target` bytes.
    ///
    /// No-op when the capacity already suffices; otherwise the new capacity is
    /// `max(target, cap + cap/2, 8)`. Growing out of the inline buffer copies the inline bytes
    /// into the fresh allocation before switching representation. On [`Error::NoMem`] the string
    /// is untouched.
    pub fn try_grow(&mut self, target: usize) -> Result<(), Error> {
        let cap = self.cap();
        if cap >= target {
            return Ok(());
        }
        let new_cap = target.max(cap + cap / 2).max(MIN_CAP);

        match &mut self.repr {
            Repr::Inline(buf) => {
                // SAFETY: new_cap > INLINE_CAP > 0.
                let ptr = unsafe { try_alloc::<u8>(new_cap)? };
                // SAFETY: The fresh allocation holds new_cap > len bytes and can't overlap the
                // inline buffer.
                unsafe {
                    ptr.as_ptr().copy_from_nonoverlapping(buf.as_ptr(), self.len);
                }
                self.repr = Repr::Heap { ptr, cap: new_cap };
            },
            Repr::Heap { ptr, cap } => {
                // SAFETY: ptr was allocated with a layout for *cap bytes; both counts are
                // non-zero.
                *ptr = unsafe { try_realloc::<u8>(*ptr, *cap, new_cap)? };
                *cap = new_cap;
            },
        }
        Ok(())
    }

    /// Splices `bytes` into the content at `offset`, shifting the tail right.
    ///
    /// `offset` past the end is [`Error::BadParam`]; inserting an empty slice is always a legal
    /// no-op. On failure the string is unchanged.
    pub fn try_insert_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Error> {
        if offset > self.len {
            return Err(Error::BadParam);
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let new_len = self.len.checked_add(bytes.len()).ok_or(Error::NoMem)?;
        self.try_grow(new_len)?;

        // SAFETY: The buffer holds new_len <= cap bytes; ranges may overlap, so the gap is opened
        // with a copy that tolerates overlap, then filled from the (disjoint) input slice.
        unsafe {
            let base = self.base_mut();
            base.add(offset).copy_to(base.add(offset + bytes.len()), self.len - offset);
            base.add(offset).copy_from_nonoverlapping(bytes.as_ptr(), bytes.len());
        }
        self.len = new_len;
        Ok(())
    }

    /// Splices the bytes of `content` in at `offset`. See [`ByteString::try_insert_at`].
    pub fn try_insert_str(&mut self, offset: usize, content: &str) -> Result<(), Error> {
        self.try_insert_at(offset, content.as_bytes())
    }

    /// Appends a single byte.
    ///
    /// # Examples
    /// ```
    /// # use celled::collections::string::ByteString;
    /// let mut s = ByteString::new();
    /// s.try_insert_str(0, "abc").unwrap();
    /// s.try_push(b'd').unwrap();
    /// assert_eq!(s.as_bytes(), b"abcd");
    /// assert_eq!(s.len(), 4);
    /// ```
    pub fn try_push(&mut self, byte: u8) -> Result<(), Error> {
        self.try_insert_at(self.len, &[byte])
    }

    /// Removes `count` bytes starting at `offset`, shifting the tail left.
    ///
    /// The range must lie within the content ([`Error::BadParam`] otherwise); `count == 0` is
    /// always a legal no-op. Never fails once the range is valid.
    pub fn erase_at(&mut self, offset: usize, count: usize) -> Result<(), Error> {
        let end = offset.checked_add(count).ok_or(Error::BadParam)?;
        if end > self.len {
            return Err(Error::BadParam);
        }
        if count == 0 {
            return Ok(());
        }

        // SAFETY: offset + count <= len, so both ranges are in bounds; the copy tolerates
        // overlap.
        unsafe {
            let base = self.base_mut();
            base.add(end).copy_to(base.add(offset), self.len - end);
        }
        self.len -= count;
        Ok(())
    }

    /// Appends a single zero byte past the logical end without counting it in [`len`], growing if
    /// needed, and returns the content including the terminator. Fails only on allocation
    /// failure.
    ///
    /// [`len`]: ByteString::len
    pub fn to_nul_terminated(&mut self) -> Result<&[u8], Error> {
        self.try_grow(self.len.checked_add(1).ok_or(Error::NoMem)?)?;

        // SAFETY: cap >= len + 1 after the grow.
        unsafe {
            self.base_mut().add(self.len).write(0);
            Ok(slice::from_raw_parts(self.base(), self.len + 1))
        }
    }

    /// Compares byte-wise (or via `cmp` when supplied) lexicographically; when one string is a
    /// strict prefix of the other, the shorter compares less.
    pub fn try_cmp(
        &self,
        other: &ByteString,
        cmp: Option<ByteCompareFn>,
    ) -> Result<Ordering, Error> {
        for (a, b) in self.as_bytes().iter().zip(other.as_bytes()) {
            let ordering = match cmp {
                Some(f) => f(*a, *b)?,
                None => a.cmp(b),
            };
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(self.len.cmp(&other.len))
    }

    /// Deep-copies the content into a fresh string. The copy starts its own life, so short
    /// content ends up inline even when `self` has already moved to the heap.
    pub fn try_clone(&self) -> Result<ByteString, Error> {
        ByteString::try_from_bytes(self.as_bytes())
    }

    /// Empties the content. The representation (and capacity) is kept: a string that has grown
    /// onto the heap stays there.
    pub const fn clear(&mut self) {
        self.len = 0;
    }

    /// Exchanges the contents of two strings. Never fails.
    pub fn swap(&mut self, other: &mut ByteString) {
        mem::swap(self, other);
    }

    /// Constructs an empty string in place at the start of a caller-provided buffer, returning a
    /// pointer to it. The buffer must be at least `size_of::<ByteString>()` bytes and properly
    /// aligned, or the call reports [`Error::BadParam`].
    ///
    /// # Safety
    /// `buf` must be valid for writes of `size` bytes, and the caller takes over the obligation
    /// to drop the constructed string in place before the buffer is reused.
    pub unsafe fn init_at_buffer(buf: NonNull<u8>, size: usize) -> Result<NonNull<ByteString>, Error> {
        if size < size_of::<ByteString>() || buf.as_ptr() as usize % align_of::<ByteString>() != 0 {
            return Err(Error::BadParam);
        }
        let ptr = buf.cast::<ByteString>();
        // SAFETY: The buffer is big enough and aligned per the checks above, and valid for writes
        // per this function's contract.
        unsafe { ptr.write(ByteString::new()) };
        Ok(ptr)
    }

    const fn base(&self) -> *const u8 {
        match &self.repr {
            Repr::Inline(buf) => buf.as_ptr(),
            Repr::Heap { ptr, .. } => ptr.as_ptr(),
        }
    }

    const fn base_mut(&mut self) -> *mut u8 {
        match &mut self.repr {
            Repr::Inline(buf) => buf.as_mut_ptr(),
            Repr::Heap { ptr, .. } => ptr.as_ptr(),
        }
    }
}

impl Default for ByteString {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&str> for ByteString {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ByteString::try_from_bytes(value.as_bytes())
    }
}

impl Drop for ByteString {
    fn drop(&mut self) {
        if let Repr::Heap { ptr, cap } = self.repr {
            // SAFETY: ptr was allocated with a layout for cap bytes and isn't used again.
            unsafe { dealloc::<u8>(ptr, cap) };
        }
    }
}

impl PartialEq for ByteString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteString {}

impl PartialOrd for ByteString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for ByteString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl Debug for ByteString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteString")
            .field("contents", &String::from_utf8_lossy(self.as_bytes()))
            .field("len", &self.len)
            .field("cap", &self.cap())
            .field("inline", &self.is_inline())
            .finish()
    }
}

impl Display for ByteString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

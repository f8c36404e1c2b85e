use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::mem;
use std::ops::Deref;
use std::ptr::NonNull;
use std::slice;

use super::super::raw::RawBuf;
use crate::cell::{CompareFn, OpsTable, TypeTag, TypedCell, Value};
use crate::options::{Direction, FindOptions, Organize};
use crate::util::error::Error;

const MIN_CAP: usize = 8;

/// A contiguous, geometrically-growing collection of uniform-type values, manipulated through
/// [`TypedCell`] views.
///
/// Every element carries the tag of the vector's [`OpsTable`]; inserting a value of any other
/// tag is rejected before anything is mutated. All fallible operations guarantee that an error
/// return leaves the vector exactly as it was.
///
/// # Concurrency
/// The vector keeps one shared, mutable scratch view that is rebound on every element access, so
/// no operation on the same instance may run concurrently, even reads. The raw internals make the
/// type `!Send`/`!Sync`, which enforces this; sharing across threads requires external exclusive
/// ownership.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the Vector.
/// - `i`: The index of the item in question.
///
/// | Method | Complexity |
/// |-|-|
/// | `get` | `O(1)` |
/// | `len` / `cap` | `O(1)` |
/// | `try_push` | `O(1)`*, `O(n)` |
/// | `pop` | `O(1)` |
/// | `try_insert` | `O(n-i)` |
/// | `erase` | `O(n-i)` |
/// | `try_find` | `O(n)` |
/// | `try_cmp` | `O(n)` |
/// | `try_clone` | `O(n)` (deep) |
///
/// \* `O(n)` when the push has to grow the buffer.
pub struct Vector {
    buf: RawBuf,
    len: usize,
    ops: OpsTable,
    view: TypedCell,
}

impl Vector {
    /// Creates an empty vector of elements tagged `tag`, with default per-type operations. No
    /// memory is allocated until the first insertion.
    ///
    /// # Examples
    /// ```
    /// # use celled::cell::TypeTag;
    /// # use celled::collections::contiguous::Vector;
    /// let vec = Vector::new(TypeTag::I32);
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.cap(), 0);
    /// ```
    pub const fn new(tag: TypeTag) -> Vector {
        Vector {
            buf: RawBuf::new(),
            len: 0,
            ops: OpsTable::new(tag),
            view: TypedCell::with_value(Value::Null, None),
        }
    }

    /// Creates an empty vector using the supplied operation table, which may override any of the
    /// per-type operations. Rejects a table whose element size is smaller than the tag's own
    /// storage size with [`Error::BadParam`].
    pub fn try_with_table(table: OpsTable) -> Result<Vector, Error> {
        if table.value_size() < table.tag().value_size() {
            return Err(Error::BadParam);
        }
        Ok(Vector {
            buf: RawBuf::new(),
            len: 0,
            ops: table,
            view: TypedCell::with_value(Value::Null, None),
        })
    }

    /// Constructs an empty vector in place at the start of a caller-provided buffer, returning a
    /// pointer to it. The buffer must be at least `size_of::<Vector>()` bytes and properly
    /// aligned, or the call reports [`Error::BadParam`].
    ///
    /// # Safety
    /// `buf` must be valid for writes of `size` bytes, and the caller takes over the obligation
    /// to drop the constructed vector in place before the buffer is reused.
    pub unsafe fn init_at_buffer(
        buf: NonNull<u8>,
        size: usize,
        tag: TypeTag,
    ) -> Result<NonNull<Vector>, Error> {
        if size < size_of::<Vector>() || buf.as_ptr() as usize % align_of::<Vector>() != 0 {
            return Err(Error::BadParam);
        }
        let ptr = buf.cast::<Vector>();
        // SAFETY: The buffer is big enough and aligned per the checks above, and valid for writes
        // per this function's contract.
        unsafe { ptr.write(Vector::new(tag)) };
        Ok(ptr)
    }

    /// Returns the number of elements.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the vector contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current slot capacity.
    pub const fn cap(&self) -> usize {
        self.buf.cap()
    }

    /// The tag every element of this vector carries.
    pub const fn tag(&self) -> TypeTag {
        self.ops.tag()
    }

    /// The vector's operation table.
    pub const fn ops(&self) -> &OpsTable {
        &self.ops
    }

    /// Ensures capacity for at least `target` elements: a no-op when the capacity already
    /// suffices, otherwise growing to `max(target, cap + cap/2, 8)`. On [`Error::NoMem`] the old
    /// buffer, capacity and contents are untouched.
    pub fn try_grow(&mut self, target: usize) -> Result<(), Error> {
        let cap = self.cap();
        if cap >= target {
            return Ok(());
        }
        self.buf.try_realloc(target.max(cap + cap / 2).max(MIN_CAP))
    }

    /// Returns a reference to the element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<&Value> {
        if index < self.len {
            // SAFETY: Slots below len are initialized.
            Some(unsafe { self.buf.slot(index).as_ref() })
        } else {
            None
        }
    }

    /// Binds the vector's scratch view to the element at `index` and returns it, giving cell-level
    /// access (typed accessors, in-place mutation under the tag rules) to that slot.
    pub fn view_at(&mut self, index: usize) -> Option<&mut TypedCell> {
        if index >= self.len {
            return None;
        }
        let slot = self.buf.slot(index);
        // SAFETY: The slot is initialized and reachable only through self, which stays mutably
        // borrowed for as long as the returned view can be used.
        unsafe { self.view.bind_to(slot, Some(self.ops)) };
        Some(&mut self.view)
    }

    /// Inserts a copy of `value`'s contents before `index` (`index == len` appends).
    ///
    /// Out-of-range indices ([`Error::BadParam`]) and tag mismatches ([`Error::TypeMismatch`])
    /// are rejected before any mutation. The new slot is built with the table's constructor and
    /// copy operations; on any failure the vector is left exactly as it was.
    ///
    /// # Examples
    /// ```
    /// # use celled::cell::{TypeTag, TypedCell, Value};
    /// # use celled::collections::contiguous::Vector;
    /// let mut vec = Vector::new(TypeTag::I32);
    /// vec.try_push(&TypedCell::from(Value::from(7_i32))).unwrap();
    /// assert_eq!(vec.get(0), Some(&Value::from(7_i32)));
    /// ```
    pub fn try_insert(&mut self, index: usize, value: &TypedCell) -> Result<(), Error> {
        self.check_insert(index, value.tag())?;
        self.try_grow(self.len + 1)?;

        let mut staged = TypedCell::with_value(self.ops.construct_value()?, Some(self.ops));
        staged.copy_contents(value)?;

        // Nothing below can fail.
        self.wedge(index, staged.into_value());
        Ok(())
    }

    /// Like [`Vector::try_insert`], but moves the contents out of `value`, which is re-constructed
    /// to its default state. On failure both the vector and `value` are unchanged.
    pub fn try_insert_move(&mut self, index: usize, value: &mut TypedCell) -> Result<(), Error> {
        self.check_insert(index, value.tag())?;
        self.try_grow(self.len + 1)?;

        let mut staged = TypedCell::with_value(self.ops.construct_value()?, Some(self.ops));
        staged.move_contents(value)?;

        self.wedge(index, staged.into_value());
        Ok(())
    }

    /// Appends a copy of `value`'s contents.
    pub fn try_push(&mut self, value: &TypedCell) -> Result<(), Error> {
        self.try_insert(self.len, value)
    }

    /// Appends by moving the contents out of `value`.
    pub fn try_push_move(&mut self, value: &mut TypedCell) -> Result<(), Error> {
        self.try_insert_move(self.len, value)
    }

    /// Removes the element at `index`: destructs the slot, then shifts the tail left. Rejects an
    /// out-of-range index with [`Error::BadParam`]; cannot fail once the index is valid.
    pub fn erase(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.len {
            return Err(Error::BadParam);
        }

        // SAFETY: The slot is initialized and exclusively reachable.
        self.ops.destruct_value(unsafe { self.buf.slot(index).as_mut() });

        // SAFETY: Source and destination lie within the live range; the copy tolerates overlap.
        // The vacated trailing slot is treated as uninitialized from here on.
        unsafe {
            self.buf
                .slot(index + 1)
                .copy_to(self.buf.slot(index), self.len - index - 1);
        }
        self.len -= 1;
        Ok(())
    }

    /// Moves the last element out of the vector, if any. The move bypasses the destructor, like
    /// any relocation.
    pub fn pop(&mut self) -> Option<Value> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: The slot was the last live one; after the read it is treated as
            // uninitialized.
            Some(unsafe { self.buf.slot(self.len).read() })
        }
    }

    /// Scans for the first element comparing [`Ordering::Equal`] to `needle`, starting at `start`
    /// and walking in `options.direction`, using `cmp`, falling back to the table's comparator,
    /// then to the built-in ordering. Returns the hit's index, or [`None`] after a full scan.
    ///
    /// A comparator error aborts the scan immediately and is propagated. Self-organization
    /// policies don't apply to a contiguous buffer and are rejected with [`Error::BadParam`];
    /// [`SearchKind::Binary`](crate::options::SearchKind::Binary) reports
    /// [`Error::NoSuchMethod`].
    pub fn try_find(
        &self,
        start: usize,
        options: FindOptions,
        needle: &TypedCell,
        cmp: Option<CompareFn>,
    ) -> Result<Option<usize>, Error> {
        if options.search.is_binary() {
            return Err(Error::NoSuchMethod);
        }
        if options.organize != Organize::None {
            return Err(Error::BadParam);
        }
        if needle.tag() != self.tag() {
            return Err(Error::mismatch(self.tag(), needle.tag()));
        }
        if self.len == 0 {
            return Ok(None);
        }
        if start >= self.len {
            return Err(Error::BadParam);
        }

        let mut index = start;
        loop {
            // SAFETY: index stays within 0..len throughout the scan.
            let element = unsafe { self.buf.slot(index).as_ref() };
            if self.ops.compare_values(element, needle.value(), cmp)? == Ordering::Equal {
                return Ok(Some(index));
            }
            match options.direction {
                Direction::Forward if index + 1 < self.len => index += 1,
                Direction::Backward if index > 0 => index -= 1,
                _ => return Ok(None),
            }
        }
    }

    /// Visits every element once, forward or backward, rebinding the shared scratch view per
    /// element. The first [`Err`] from the callback aborts the walk and is returned.
    pub fn try_for_each(
        &mut self,
        direction: Direction,
        mut f: impl FnMut(&mut TypedCell) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut view = mem::take(&mut self.view);
        let mut result = Ok(());

        let mut visit = |vector: &Vector, index: usize| {
            let slot = vector.buf.slot(index);
            // SAFETY: Slots below len are initialized; self stays mutably borrowed for the whole
            // walk, so the binding can't outlive the slot.
            unsafe { view.bind_to(slot, Some(vector.ops)) };
            f(&mut view)
        };

        let indices = 0..self.len;
        match direction {
            Direction::Forward => {
                for i in indices {
                    result = visit(self, i);
                    if result.is_err() {
                        break;
                    }
                }
            },
            Direction::Backward => {
                for i in indices.rev() {
                    result = visit(self, i);
                    if result.is_err() {
                        break;
                    }
                }
            },
        }

        drop(visit);
        self.view = view;
        self.view.release();
        result
    }

    /// Compares element-wise lexicographically: the first pair not comparing equal decides; a
    /// strict prefix compares less. The tags of the two vectors must match.
    pub fn try_cmp(&self, other: &Vector, cmp: Option<CompareFn>) -> Result<Ordering, Error> {
        if self.tag() != other.tag() {
            return Err(Error::mismatch(self.tag(), other.tag()));
        }
        for index in 0..self.len.min(other.len) {
            // SAFETY: index is below both lens.
            let (a, b) = unsafe { (self.buf.slot(index).as_ref(), other.buf.slot(index).as_ref()) };
            let ordering = self.ops.compare_values(a, b, cmp)?;
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(self.len.cmp(&other.len))
    }

    /// Deep-copies the vector: every element is copied through the table's copy operation,
    /// recursively for nested containers. The copy shares no storage with the original.
    pub fn try_clone(&self) -> Result<Vector, Error> {
        let mut copy = Vector {
            buf: RawBuf::new(),
            len: 0,
            ops: self.ops,
            view: TypedCell::with_value(Value::Null, None),
        };
        copy.try_grow(self.len)?;

        for index in 0..self.len {
            // SAFETY: index is below len.
            let cloned = self.ops.clone_value(unsafe { self.buf.slot(index).as_ref() })?;
            // SAFETY: Capacity was reserved above; the write fills the next slot in order.
            unsafe { copy.buf.slot(copy.len).write(cloned) };
            copy.len += 1;
        }
        Ok(copy)
    }

    /// Exchanges the contents of two vectors. Never fails.
    pub fn swap(&mut self, other: &mut Vector) {
        mem::swap(self, other);
    }

    /// Destructs every element and resets the length to zero, keeping the capacity.
    pub fn clear(&mut self) {
        for index in 0..self.len {
            // SAFETY: Slots below len are initialized and exclusively reachable.
            self.ops.destruct_value(unsafe { self.buf.slot(index).as_mut() });
        }
        self.len = 0;
    }

    /// The index of the first element, [`None`] when empty (begin primitive).
    pub const fn first_index(&self) -> Option<usize> {
        if self.len == 0 { None } else { Some(0) }
    }

    /// The index of the last element, [`None`] when empty (reverse-begin primitive).
    pub const fn last_index(&self) -> Option<usize> {
        match self.len {
            0 => None,
            len => Some(len - 1),
        }
    }

    /// The index after `index`, [`None`] at the end.
    pub const fn next_index(&self, index: usize) -> Option<usize> {
        if index + 1 < self.len { Some(index + 1) } else { None }
    }

    /// The index before `index`, [`None`] at the front.
    pub const fn prev_index(&self, index: usize) -> Option<usize> {
        if index == 0 || index > self.len { None } else { Some(index - 1) }
    }

    fn check_insert(&self, index: usize, tag: TypeTag) -> Result<(), Error> {
        if index > self.len {
            return Err(Error::BadParam);
        }
        if tag != self.tag() {
            return Err(Error::mismatch(self.tag(), tag));
        }
        Ok(())
    }

    /// Opens a one-slot gap at `index` and writes `value` into it. Capacity must already be
    /// sufficient; this step cannot fail.
    fn wedge(&mut self, index: usize, value: Value) {
        debug_assert!(self.len < self.cap());
        // SAFETY: Capacity allows one more slot; the shift tolerates overlap and the vacated slot
        // is immediately overwritten with the new value.
        unsafe {
            self.buf
                .slot(index)
                .copy_to(self.buf.slot(index + 1), self.len - index);
            self.buf.slot(index).write(value);
        }
        self.len += 1;
    }
}

impl Drop for Vector {
    fn drop(&mut self) {
        // Destruct every live element (custom destructor included) before the buffer itself is
        // freed by RawBuf's drop.
        self.clear();
    }
}

impl Deref for Vector {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Slots 0..len are initialized, contiguous and borrow-checked through self. No
        // DerefMut counterpart exists: slice-level writes could break the uniform-tag invariant.
        unsafe { slice::from_raw_parts(self.buf.slot(0).as_ptr(), self.len) }
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.try_cmp(other, None), Ok(Ordering::Equal))
    }
}

impl Debug for Vector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("tag", &self.tag())
            .field("contents", &&**self)
            .field("len", &self.len)
            .field("cap", &self.cap())
            .finish()
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "![")?;
        for (index, value) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

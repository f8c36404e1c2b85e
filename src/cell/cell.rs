use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::ptr::NonNull;

use super::{CompareFn, OpsTable, TypeTag, Value};
use crate::collections::contiguous::Vector;
use crate::collections::linked::{DoublyLinkedList, SinglyLinkedList};
use crate::collections::string::ByteString;
use crate::util::error::Error;
use crate::util::result::ResultExtension;

/// Where a cell's value lives: inside the cell itself, or in a slot owned by a container.
///
/// A borrowed cell exposes no public way to rebind itself to different storage, which is what
/// makes "constructors, copy-constructors and comparators must never rebind the source" a
/// property of the type rather than a documentation rule. Rebinding is crate-internal
/// ([`TypedCell::bind_to`]) and used only by the containers for their scratch views.
enum Slot {
    Owned(Value),
    Borrowed(NonNull<Value>),
}

impl Default for Slot {
    fn default() -> Slot {
        Slot::Owned(Value::Null)
    }
}

/// The type-erased value holder through which all element access is mediated.
///
/// A cell pairs a [`Slot`] (its own value, or a view into a container's storage) with an optional
/// [`OpsTable`]. A cell carrying a table dispatches every operation through it; one without falls
/// back to the tag's built-in behavior.
///
/// Assigning a new value to a cell that currently references external storage is rejected with
/// [`Error::TypeMismatch`] whenever the assignment would change the slot's type: the owner of that
/// storage sized the slot for the old type and doesn't expect it to change.
#[derive(Default)]
pub struct TypedCell {
    slot: Slot,
    ops: Option<OpsTable>,
}

impl TypedCell {
    /// Creates an owning cell holding a freshly constructed value of the given tag
    /// (bind-and-construct). The construct override of `table` applies when present.
    ///
    /// Reports [`Error::TypeMismatch`] when `table` carries a different tag than `tag`, and
    /// [`Error::NoSuchMethod`] for the reserved [`TypeTag::Map`] kind.
    pub fn try_new(tag: TypeTag, table: Option<OpsTable>) -> Result<TypedCell, Error> {
        if let Some(t) = &table
            && t.tag() != tag
        {
            return Err(Error::mismatch(t.tag(), tag));
        }
        let value = match &table {
            Some(t) => t.construct_value()?,
            None => Value::default_for(tag)?,
        };
        Ok(TypedCell { slot: Slot::Owned(value), ops: table })
    }

    /// Like [`TypedCell::try_new`] but panicking on failure.
    ///
    /// # Panics
    /// Panics if construction fails.
    pub fn new(tag: TypeTag, table: Option<OpsTable>) -> TypedCell {
        TypedCell::try_new(tag, table).throw()
    }

    /// Wraps an already-built value without running any constructor.
    pub const fn with_value(value: Value, ops: Option<OpsTable>) -> TypedCell {
        TypedCell { slot: Slot::Owned(value), ops }
    }

    /// A read-only view of a value owned elsewhere, for handing to comparator callbacks.
    ///
    /// The view is only ever exposed behind a shared reference, so the mutating API can't reach
    /// the underlying value through it.
    pub(crate) fn read_view(value: &Value, ops: Option<OpsTable>) -> TypedCell {
        TypedCell {
            slot: Slot::Borrowed(NonNull::from(value)),
            ops,
        }
    }

    /// A mutable view of a slot owned elsewhere.
    ///
    /// # Safety
    /// `slot` must point to a live, exclusively reachable [`Value`] for as long as the view (or
    /// any rebinding of it) exists.
    pub(crate) const unsafe fn write_view(slot: NonNull<Value>, ops: Option<OpsTable>) -> TypedCell {
        TypedCell { slot: Slot::Borrowed(slot), ops }
    }

    /// Rebinds this cell as a view of another slot, releasing whatever it held before. This is
    /// how containers reuse one scratch cell across every element they touch.
    ///
    /// # Safety
    /// Same contract as [`TypedCell::write_view`].
    pub(crate) unsafe fn bind_to(&mut self, slot: NonNull<Value>, ops: Option<OpsTable>) {
        self.release();
        self.slot = Slot::Borrowed(slot);
        self.ops = ops;
    }

    /// Drops a borrowed binding, returning the cell to an empty owned state. The referenced slot
    /// itself is untouched. Owned contents are kept.
    pub(crate) fn release(&mut self) {
        if let Slot::Borrowed(_) = self.slot {
            self.slot = Slot::Owned(Value::Null);
            self.ops = None;
        }
    }

    /// The tag of the currently held value.
    pub fn tag(&self) -> TypeTag {
        self.value().tag()
    }

    /// The cell's operation table, if it carries one.
    pub const fn ops(&self) -> Option<&OpsTable> {
        self.ops.as_ref()
    }

    /// The storage size of the held type, per the table when present or the tag otherwise.
    pub fn value_size(&self) -> usize {
        match &self.ops {
            Some(t) => t.value_size(),
            None => self.tag().value_size(),
        }
    }

    /// True when the cell references storage owned by a container rather than owning its value.
    pub const fn is_borrowed(&self) -> bool {
        matches!(self.slot, Slot::Borrowed(_))
    }

    /// Read access to the held value.
    pub const fn value(&self) -> &Value {
        match &self.slot {
            Slot::Owned(value) => value,
            // SAFETY: Borrowed slots point to live values per the binding contract.
            Slot::Borrowed(ptr) => unsafe { ptr.as_ref() },
        }
    }

    fn value_mut(&mut self) -> &mut Value {
        match &mut self.slot {
            Slot::Owned(value) => value,
            // SAFETY: Borrowed slots point to live, exclusively reachable values per the binding
            // contract; read-only views are never reachable through &mut.
            Slot::Borrowed(ptr) => unsafe { ptr.as_mut() },
        }
    }

    /// Consumes an owning cell, yielding its value without running destructors.
    pub(crate) fn into_value(mut self) -> Value {
        match mem::take(&mut self.slot) {
            Slot::Owned(value) => value,
            Slot::Borrowed(_) => unreachable!("consuming a borrowed view"),
        }
    }

    /// The table in effect for the current contents.
    fn effective_ops(&self) -> OpsTable {
        self.ops.unwrap_or_else(|| OpsTable::new(self.tag()))
    }

    /// Destructs the held value (custom destructor first, when installed). An owned cell reverts
    /// to [`Value::Null`]; a borrowed cell re-installs the tag's default value, because the slot
    /// belongs to a container that expects it to stay constructed and typed.
    pub fn destroy(&mut self) {
        let ops = self.effective_ops();
        let tag = self.tag();
        ops.destruct_value(self.value_mut());
        if self.is_borrowed()
            && let Ok(value) = Value::default_for(tag)
        {
            *self.value_mut() = value;
        }
    }

    /// Moves the contents of `src` into `self`.
    ///
    /// The tags must already match ([`Error::TypeMismatch`] otherwise). `self`'s previous value
    /// is destructed through its own table, `src`'s value is relocated, and `src` is re-constructed
    /// to its default "empty" state. Fails only if that re-construction fails, in which case both
    /// cells are left unchanged.
    pub fn move_contents(&mut self, src: &mut TypedCell) -> Result<(), Error> {
        if self.tag() != src.tag() {
            return Err(Error::mismatch(self.tag(), src.tag()));
        }

        // Build the replacement first so a construction failure mutates nothing.
        let replacement = match &src.ops {
            Some(t) => t.construct_value()?,
            None => Value::default_for(src.tag())?,
        };

        let moved = mem::replace(src.value_mut(), replacement);
        self.effective_ops().destruct_value(self.value_mut());
        *self.value_mut() = moved;
        Ok(())
    }

    /// Copies the contents of `src` into `self`, leaving `src` unmodified.
    ///
    /// The tags must already match. The copy-constructor used is `self`'s override when
    /// installed, falling back to `src`'s, then to the built-in deep copy. On failure `self` is
    /// left unchanged.
    pub fn copy_contents(&mut self, src: &TypedCell) -> Result<(), Error> {
        if self.tag() != src.tag() {
            return Err(Error::mismatch(self.tag(), src.tag()));
        }

        let ops = self.ops.or(src.ops).unwrap_or_else(|| OpsTable::new(src.tag()));
        let copy = ops.clone_value(src.value())?;

        self.effective_ops().destruct_value(self.value_mut());
        *self.value_mut() = copy;
        Ok(())
    }

    /// Compares the held values of two cells, using `preferred` when supplied, else either
    /// cell's table override, else the built-in ordering.
    pub fn try_cmp(
        &self,
        other: &TypedCell,
        preferred: Option<CompareFn>,
    ) -> Result<Ordering, Error> {
        if self.tag() != other.tag() {
            return Err(Error::mismatch(self.tag(), other.tag()));
        }
        let ops = self.ops.or(other.ops).unwrap_or_else(|| OpsTable::new(self.tag()));
        ops.compare_values(self.value(), other.value(), preferred)
    }

    /// Installs `value` as the cell's new contents, destructing the previous ones.
    ///
    /// Rejected with [`Error::TypeMismatch`] when the cell is borrowed (or carries a table) and
    /// the new value's tag differs from the expected one.
    fn assign(&mut self, value: Value) -> Result<(), Error> {
        let new_tag = value.tag();
        if self.is_borrowed() && new_tag != self.tag() {
            return Err(Error::mismatch(self.tag(), new_tag));
        }
        if let Some(t) = &self.ops
            && t.tag() != new_tag
        {
            return Err(Error::mismatch(t.tag(), new_tag));
        }

        self.effective_ops().destruct_value(self.value_mut());
        *self.value_mut() = value;
        Ok(())
    }
}

macro_rules! scalar_access {
    ($set:ident, $get:ident, $t:ty, $variant:ident) => {
        impl TypedCell {
            #[doc = concat!("Assigns a `", stringify!($t), "` value; see [`TypedCell::assign`] rules.")]
            pub fn $set(&mut self, value: $t) -> Result<(), Error> {
                self.assign(Value::$variant(value))
            }

            #[doc = concat!("The held `", stringify!($t), "`, or [`None`] if the tag differs.")]
            pub fn $get(&self) -> Option<$t> {
                match self.value() {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

scalar_access!(set_i8, as_i8, i8, I8);
scalar_access!(set_u8, as_u8, u8, U8);
scalar_access!(set_i16, as_i16, i16, I16);
scalar_access!(set_u16, as_u16, u16, U16);
scalar_access!(set_i32, as_i32, i32, I32);
scalar_access!(set_u32, as_u32, u32, U32);
scalar_access!(set_i64, as_i64, i64, I64);
scalar_access!(set_u64, as_u64, u64, U64);
scalar_access!(set_f32, as_f32, f32, F32);
scalar_access!(set_f64, as_f64, f64, F64);
scalar_access!(set_ptr, as_ptr, *mut (), Ptr);

macro_rules! container_access {
    ($set:ident, $get:ident, $get_mut:ident, $t:ty, $variant:ident) => {
        impl TypedCell {
            #[doc = concat!(
                "Assigns a deep copy of the supplied [`", stringify!($t), "`]: the cell ends up ",
                "owning an independent copy, never an alias. See [`TypedCell::assign`] rules."
            )]
            pub fn $set(&mut self, value: &$t) -> Result<(), Error> {
                let copy = value.try_clone()?;
                self.assign(Value::$variant(Box::new(copy)))
            }

            #[doc = concat!("The held [`", stringify!($t), "`], or [`None`] if the tag differs.")]
            pub fn $get(&self) -> Option<&$t> {
                match self.value() {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[doc = concat!(
                "Mutable access to the held [`", stringify!($t), "`]. Mutating the container in ",
                "place never changes the slot's tag, so this is legal even for borrowed cells."
            )]
            pub fn $get_mut(&mut self) -> Option<&mut $t> {
                match self.value_mut() {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

container_access!(set_str, as_str, as_str_mut, ByteString, Str);
container_access!(set_vector, as_vector, as_vector_mut, Vector, Vector);
container_access!(set_list, as_list, as_list_mut, SinglyLinkedList, List);
container_access!(set_deque, as_deque, as_deque_mut, DoublyLinkedList, Deque);

impl From<Value> for TypedCell {
    fn from(value: Value) -> TypedCell {
        TypedCell::with_value(value, None)
    }
}

impl Drop for TypedCell {
    fn drop(&mut self) {
        // Owned contents run their custom destructor, if the table installs one; the value's own
        // drop glue follows either way. Borrowed slots belong to their container.
        if let Slot::Owned(value) = &mut self.slot
            && let Some(ops) = self.ops
            && value.tag() == ops.tag()
        {
            ops.destruct_value(value);
        }
    }
}

impl Debug for TypedCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCell")
            .field("tag", &self.tag())
            .field("borrowed", &self.is_borrowed())
            .field("value", self.value())
            .finish()
    }
}

use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::ptr::NonNull;

use super::{TypeTag, TypedCell, Value};
use crate::util::error::Error;

/// Opaque caller context forwarded to every operation override.
pub type UserData = Option<NonNull<()>>;

/// A constructor override. Invoked with a cell already holding the tag's default value; the
/// override customizes it in place (it may not change the cell's type).
pub type ConstructFn = fn(&mut TypedCell, UserData) -> Result<(), Error>;

/// A copy-constructor override. `dest` holds the tag's default value; `src` must be left
/// unmodified.
pub type CloneFn = fn(dest: &mut TypedCell, src: &TypedCell, UserData) -> Result<(), Error>;

/// A destructor override, run before the built-in teardown of the value. Destructors have no
/// failure channel by contract: an override that cannot complete must treat that as fatal.
pub type DestructFn = fn(&mut TypedCell, UserData);

/// A comparator override. Must return exactly an [`Ordering`]; any [`Err`] aborts the surrounding
/// scan and is propagated to the caller.
pub type CompareFn = fn(&TypedCell, &TypedCell, UserData) -> Result<Ordering, Error>;

/// The per-type operation table: optional construct/copy/destruct/compare overrides plus the
/// element's storage size, its [`TypeTag`] and an opaque user pointer.
///
/// A `None` entry means "use the built-in per-tag behavior". The table is [`Copy`]: copying one
/// shares its entries rather than deep-cloning anything, and dropping one frees nothing, which is
/// the whole of the original "shallow-copyable, cheaply destroyed" lifetime contract.
///
/// Every value dispatched through a table must carry the table's tag; a violation is reported as
/// [`Error::TypeMismatch`], never undefined behavior.
#[derive(Clone, Copy)]
pub struct OpsTable {
    pub(crate) tag: TypeTag,
    pub(crate) value_size: usize,
    pub(crate) construct: Option<ConstructFn>,
    pub(crate) clone_from: Option<CloneFn>,
    pub(crate) destruct: Option<DestructFn>,
    pub(crate) compare: Option<CompareFn>,
    pub(crate) user: UserData,
}

impl OpsTable {
    /// Creates a table with the default per-tag behavior for every operation.
    pub const fn new(tag: TypeTag) -> OpsTable {
        OpsTable {
            tag,
            value_size: tag.value_size(),
            construct: None,
            clone_from: None,
            destruct: None,
            compare: None,
            user: None,
        }
    }

    /// The tag every value passing through this table must carry.
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    /// The storage size of one element of this table's type.
    pub const fn value_size(&self) -> usize {
        self.value_size
    }

    /// The opaque user pointer forwarded to every override.
    pub const fn user(&self) -> UserData {
        self.user
    }

    pub const fn with_construct(mut self, f: ConstructFn) -> OpsTable {
        self.construct = Some(f);
        self
    }

    pub const fn with_clone(mut self, f: CloneFn) -> OpsTable {
        self.clone_from = Some(f);
        self
    }

    pub const fn with_destruct(mut self, f: DestructFn) -> OpsTable {
        self.destruct = Some(f);
        self
    }

    pub const fn with_compare(mut self, f: CompareFn) -> OpsTable {
        self.compare = Some(f);
        self
    }

    pub const fn with_user(mut self, user: UserData) -> OpsTable {
        self.user = user;
        self
    }

    /// Constructs a fresh value of this table's type: the per-tag default, refined by the
    /// construct override if one is installed.
    pub(crate) fn construct_value(&self) -> Result<Value, Error> {
        let value = Value::default_for(self.tag)?;
        match self.construct {
            None => Ok(value),
            Some(f) => {
                let mut dest = TypedCell::with_value(value, Some(*self));
                f(&mut dest, self.user)?;
                Ok(dest.into_value())
            },
        }
    }

    /// Deep-copies `value` through the clone override, falling back to [`Value::try_clone`].
    /// The source is never modified; on failure nothing of the copy escapes.
    pub(crate) fn clone_value(&self, value: &Value) -> Result<Value, Error> {
        if value.tag() != self.tag {
            return Err(Error::mismatch(self.tag, value.tag()));
        }
        match self.clone_from {
            None => value.try_clone(),
            Some(f) => {
                let mut dest = TypedCell::with_value(Value::default_for(self.tag)?, Some(*self));
                let src = TypedCell::read_view(value, Some(*self));
                f(&mut dest, &src, self.user)?;
                Ok(dest.into_value())
            },
        }
    }

    /// Destructs `value` in place, running the destruct override first and leaving the slot
    /// holding [`Value::Null`]. Infallible by contract.
    pub(crate) fn destruct_value(&self, value: &mut Value) {
        if let Some(f) = self.destruct {
            // SAFETY: value is exclusively borrowed for the duration of the call and the view is
            // released before this function returns.
            let mut cell = unsafe { TypedCell::write_view(NonNull::from(&mut *value), Some(*self)) };
            f(&mut cell, self.user);
        }
        *value = Value::Null;
    }

    /// Compares two values of this table's type: `preferred` if supplied, else the table's
    /// compare override, else the built-in [`Value::default_cmp`].
    pub(crate) fn compare_values(
        &self,
        lhs: &Value,
        rhs: &Value,
        preferred: Option<CompareFn>,
    ) -> Result<Ordering, Error> {
        match preferred.or(self.compare) {
            None => lhs.default_cmp(rhs),
            Some(f) => {
                let a = TypedCell::read_view(lhs, Some(*self));
                let b = TypedCell::read_view(rhs, Some(*self));
                f(&a, &b, self.user)
            },
        }
    }
}

impl Debug for OpsTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsTable")
            .field("tag", &self.tag)
            .field("value_size", &self.value_size)
            .field("construct", &self.construct.map(|f| f as *const ()))
            .field("clone_from", &self.clone_from.map(|f| f as *const ()))
            .field("destruct", &self.destruct.map(|f| f as *const ()))
            .field("compare", &self.compare.map(|f| f as *const ()))
            .field("user", &self.user)
            .finish()
    }
}

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use derive_more::{From, IsVariant, TryInto};

use super::TypeTag;
use crate::collections::contiguous::Vector;
use crate::collections::linked::{DoublyLinkedList, SinglyLinkedList};
use crate::collections::string::ByteString;
use crate::util::error::Error;

/// A single type-erased element.
///
/// Scalars are stored inline; container kinds are stored behind a [`Box`], so every `Value` is a
/// couple of machine words no matter what it holds. This is the payload type that containers lay
/// out in their buffers and nodes, and that [`TypedCell`](super::TypedCell) mediates access to.
///
/// `Value` deliberately doesn't implement [`Clone`]: duplicating a container can fail on
/// allocation, so deep copies go through [`Value::try_clone`] instead.
#[derive(Debug, Default, PartialEq, From, TryInto, IsVariant)]
pub enum Value {
    #[default]
    Null,
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// An opaque pointer. Never dereferenced; compared and hashed by address.
    Ptr(*mut ()),
    Str(Box<ByteString>),
    Vector(Box<Vector>),
    List(Box<SinglyLinkedList>),
    Deque(Box<DoublyLinkedList>),
}

impl Value {
    /// Returns the [`TypeTag`] describing the currently held kind.
    pub const fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::I8(_) => TypeTag::I8,
            Value::U8(_) => TypeTag::U8,
            Value::I16(_) => TypeTag::I16,
            Value::U16(_) => TypeTag::U16,
            Value::I32(_) => TypeTag::I32,
            Value::U32(_) => TypeTag::U32,
            Value::I64(_) => TypeTag::I64,
            Value::U64(_) => TypeTag::U64,
            Value::F32(_) => TypeTag::F32,
            Value::F64(_) => TypeTag::F64,
            Value::Ptr(_) => TypeTag::Ptr,
            Value::Str(_) => TypeTag::Str,
            Value::Vector(_) => TypeTag::Vector,
            Value::List(_) => TypeTag::List,
            Value::Deque(_) => TypeTag::Deque,
        }
    }

    /// Builds the default ("empty") value for the given tag: zero for numeric kinds, a null
    /// pointer for [`TypeTag::Ptr`], an empty container for container kinds.
    ///
    /// The container defaults allocate nothing, so the only failure here is requesting the
    /// reserved [`TypeTag::Map`] kind, which has no operations at all.
    pub fn default_for(tag: TypeTag) -> Result<Value, Error> {
        Ok(match tag {
            TypeTag::Null => Value::Null,
            TypeTag::I8 => Value::I8(0),
            TypeTag::U8 => Value::U8(0),
            TypeTag::I16 => Value::I16(0),
            TypeTag::U16 => Value::U16(0),
            TypeTag::I32 => Value::I32(0),
            TypeTag::U32 => Value::U32(0),
            TypeTag::I64 => Value::I64(0),
            TypeTag::U64 => Value::U64(0),
            TypeTag::F32 => Value::F32(0.0),
            TypeTag::F64 => Value::F64(0.0),
            TypeTag::Ptr => Value::Ptr(std::ptr::null_mut()),
            TypeTag::Str => Value::Str(Box::new(ByteString::new())),
            TypeTag::Vector => Value::Vector(Box::new(Vector::new(TypeTag::Null))),
            TypeTag::List => Value::List(Box::new(SinglyLinkedList::new(TypeTag::Null))),
            TypeTag::Deque => Value::Deque(Box::new(DoublyLinkedList::new(TypeTag::Null))),
            TypeTag::Map => return Err(Error::NoSuchMethod),
        })
    }

    /// Deep-copies the value. Container kinds recursively copy every element they hold; an
    /// allocation failure anywhere surfaces as [`Error::NoMem`] with the source unmodified.
    pub fn try_clone(&self) -> Result<Value, Error> {
        Ok(match self {
            Value::Null => Value::Null,
            Value::I8(v) => Value::I8(*v),
            Value::U8(v) => Value::U8(*v),
            Value::I16(v) => Value::I16(*v),
            Value::U16(v) => Value::U16(*v),
            Value::I32(v) => Value::I32(*v),
            Value::U32(v) => Value::U32(*v),
            Value::I64(v) => Value::I64(*v),
            Value::U64(v) => Value::U64(*v),
            Value::F32(v) => Value::F32(*v),
            Value::F64(v) => Value::F64(*v),
            Value::Ptr(v) => Value::Ptr(*v),
            Value::Str(v) => Value::Str(Box::new(v.try_clone()?)),
            Value::Vector(v) => Value::Vector(Box::new(v.try_clone()?)),
            Value::List(v) => Value::List(Box::new(v.try_clone()?)),
            Value::Deque(v) => Value::Deque(Box::new(v.try_clone()?)),
        })
    }

    /// The built-in ordering used when no comparator override is installed: numeric order for
    /// numbers (floats by total order), address order for pointers, lexicographic recursion for
    /// containers. Two [`Value::Null`]s compare equal.
    ///
    /// Differing tags report [`Error::TypeMismatch`] rather than an arbitrary ordering.
    pub fn default_cmp(&self, other: &Value) -> Result<Ordering, Error> {
        match (self, other) {
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::I8(a), Value::I8(b)) => Ok(a.cmp(b)),
            (Value::U8(a), Value::U8(b)) => Ok(a.cmp(b)),
            (Value::I16(a), Value::I16(b)) => Ok(a.cmp(b)),
            (Value::U16(a), Value::U16(b)) => Ok(a.cmp(b)),
            (Value::I32(a), Value::I32(b)) => Ok(a.cmp(b)),
            (Value::U32(a), Value::U32(b)) => Ok(a.cmp(b)),
            (Value::I64(a), Value::I64(b)) => Ok(a.cmp(b)),
            (Value::U64(a), Value::U64(b)) => Ok(a.cmp(b)),
            (Value::F32(a), Value::F32(b)) => Ok(a.total_cmp(b)),
            (Value::F64(a), Value::F64(b)) => Ok(a.total_cmp(b)),
            (Value::Ptr(a), Value::Ptr(b)) => Ok((*a as usize).cmp(&(*b as usize))),
            (Value::Str(a), Value::Str(b)) => a.try_cmp(b, None),
            (Value::Vector(a), Value::Vector(b)) => a.try_cmp(b, None),
            (Value::List(a), Value::List(b)) => a.try_cmp(b, None),
            (Value::Deque(a), Value::Deque(b)) => a.try_cmp(b, None),
            (a, b) => Err(Error::mismatch(a.tag(), b.tag())),
        }
    }
}

impl From<ByteString> for Value {
    fn from(value: ByteString) -> Value {
        Value::Str(Box::new(value))
    }
}

impl From<Vector> for Value {
    fn from(value: Vector) -> Value {
        Value::Vector(Box::new(value))
    }
}

impl From<SinglyLinkedList> for Value {
    fn from(value: SinglyLinkedList) -> Value {
        Value::List(Box::new(value))
    }
}

impl From<DoublyLinkedList> for Value {
    fn from(value: DoublyLinkedList) -> Value {
        Value::Deque(Box::new(value))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::I8(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Ptr(v) => write!(f, "{v:p}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::Vector(v) => write!(f, "{v}"),
            Value::List(v) => write!(f, "{v}"),
            Value::Deque(v) => write!(f, "{v}"),
        }
    }
}

use std::fmt::{self, Display, Formatter};

use derive_more::IsVariant;

/// The closed set of element kinds a [`Value`](super::Value) can hold.
///
/// Numeric kinds have fixed, platform-defined storage sizes. Container kinds are recursive (a
/// `Vector`'s elements may themselves be `Vector`s) and are always stored as a single boxed
/// machine-word handle, regardless of the contained type's size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum TypeTag {
    /// The absence of a value; the state of a freshly created cell.
    #[default]
    Null,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// An opaque pointer, compared by address and never dereferenced by this crate.
    Ptr,
    /// A [`ByteString`](crate::collections::string::ByteString).
    Str,
    /// A [`Vector`](crate::collections::contiguous::Vector).
    Vector,
    /// A [`SinglyLinkedList`](crate::collections::linked::SinglyLinkedList).
    List,
    /// A [`DoublyLinkedList`](crate::collections::linked::DoublyLinkedList).
    Deque,
    /// Reserved for a future hash table; carries no operations and can't be constructed.
    Map,
}

impl TypeTag {
    /// The storage size of one element of this kind: the scalar's own size for numeric kinds, one
    /// machine word for container kinds and pointers, zero for [`TypeTag::Null`].
    pub const fn value_size(self) -> usize {
        match self {
            TypeTag::Null => 0,
            TypeTag::I8 | TypeTag::U8 => size_of::<u8>(),
            TypeTag::I16 | TypeTag::U16 => size_of::<u16>(),
            TypeTag::I32 | TypeTag::U32 => size_of::<u32>(),
            TypeTag::I64 | TypeTag::U64 => size_of::<u64>(),
            TypeTag::F32 => size_of::<f32>(),
            TypeTag::F64 => size_of::<f64>(),
            TypeTag::Ptr => size_of::<*mut ()>(),
            TypeTag::Str | TypeTag::Vector | TypeTag::List | TypeTag::Deque | TypeTag::Map => {
                size_of::<usize>()
            },
        }
    }

    /// Returns true for the eleven numeric kinds and [`TypeTag::Ptr`].
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            TypeTag::I8
                | TypeTag::U8
                | TypeTag::I16
                | TypeTag::U16
                | TypeTag::I32
                | TypeTag::U32
                | TypeTag::I64
                | TypeTag::U64
                | TypeTag::F32
                | TypeTag::F64
                | TypeTag::Ptr
        )
    }

    /// Returns true for the container kinds, including the reserved [`TypeTag::Map`].
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            TypeTag::Str | TypeTag::Vector | TypeTag::List | TypeTag::Deque | TypeTag::Map
        )
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

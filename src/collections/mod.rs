//! Containers of tagged values, all parameterized at runtime by a [`TypeTag`](crate::cell::TypeTag)
//! and an optional operation table rather than by a compile-time element type.

pub mod contiguous;
pub mod linked;
pub mod string;

#[doc(inline)]
pub use contiguous::Vector;
#[doc(inline)]
pub use linked::{DoublyLinkedList, SinglyLinkedList};
#[doc(inline)]
pub use string::ByteString;

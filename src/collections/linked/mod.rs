//! Node-based containers: singly- and doubly-linked lists of tagged values, addressed through
//! copyable node handles.

pub mod doubly;
pub mod singly;

#[doc(inline)]
pub use doubly::DoublyLinkedList;
#[doc(inline)]
pub use singly::SinglyLinkedList;

use std::fmt::{self, Debug, Formatter};
use std::ptr::NonNull;

use crate::cell::Value;
use crate::util::alloc::{dealloc, try_alloc};
use crate::util::error::Error;

pub(crate) type Link = Option<NodeRef>;

/// An opaque handle to a node of a [`SinglyLinkedList`](super::SinglyLinkedList).
///
/// Handles are plain copyable tokens, not borrows: one stays meaningful only while it was
/// obtained from the list it is used with and the node hasn't been erased. The list's methods
/// document this as their contract.
pub struct NodeRef(pub(crate) NonNull<Node>);

/// One heap allocation per node: the link header and the element payload together.
pub(crate) struct Node {
    pub value: Value,
    pub next: Link,
}

impl NodeRef {
    /// Allocates a node, handing the node back alongside the error when allocation fails so the
    /// caller can run the payload's destructor.
    pub(crate) fn try_alloc(node: Node) -> Result<NodeRef, (Error, Node)> {
        // SAFETY: One Node is a valid non-zero allocation request.
        match unsafe { try_alloc::<Node>(1) } {
            Ok(ptr) => {
                // SAFETY: ptr is freshly allocated with space for one Node.
                unsafe { ptr.write(node) };
                Ok(NodeRef(ptr))
            },
            Err(error) => Err((error, node)),
        }
    }

    /// Moves the node's contents out and frees the allocation.
    ///
    /// # Safety
    /// The handle must be live and must not be used again, through any copy.
    pub(crate) unsafe fn take_node(self) -> Node {
        // SAFETY: The handle points at a live node per this function's contract.
        let node = unsafe { self.0.read() };
        // SAFETY: The allocation was made by try_alloc for one Node.
        unsafe { dealloc::<Node>(self.0, 1) };
        node
    }

    pub(crate) fn value<'a>(&self) -> &'a Value {
        // SAFETY: The handle points at a live node per the handle contract.
        unsafe { &(*self.0.as_ptr()).value }
    }

    #[allow(clippy::mut_from_ref)]
    pub(crate) fn value_mut<'a>(&self) -> &'a mut Value {
        // SAFETY: The handle points at a live node per the handle contract; exclusivity is
        // enforced by the list methods that call this.
        unsafe { &mut (*self.0.as_ptr()).value }
    }

    pub(crate) fn next<'a>(&self) -> &'a Link {
        // SAFETY: The handle points at a live node per the handle contract.
        unsafe { &(*self.0.as_ptr()).next }
    }

    #[allow(clippy::mut_from_ref)]
    pub(crate) fn next_mut<'a>(&self) -> &'a mut Link {
        // SAFETY: The handle points at a live node per the handle contract; exclusivity is
        // enforced by the list methods that call this.
        unsafe { &mut (*self.0.as_ptr()).next }
    }

    /// The payload slot, for binding a scratch view.
    pub(crate) fn slot(&self) -> NonNull<Value> {
        // SAFETY: The handle points at a live node per the handle contract.
        unsafe { NonNull::new_unchecked(&raw mut (*self.0.as_ptr()).value) }
    }
}

impl Clone for NodeRef {
    fn clone(&self) -> Self {
        *self
    }
}

impl Copy for NodeRef {}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for NodeRef {}

impl Debug for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:p})", self.0)
    }
}

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::mem;
use std::ptr::NonNull;

use super::{Iter, Link, Node, NodeRef};
use crate::cell::{CompareFn, OpsTable, TypeTag, TypedCell, Value};
use crate::options::{Direction, FindOptions, Organize};
use crate::util::error::Error;

/// A forward-only chain of individually heap-resident nodes; each node is one allocation holding
/// the link header and the element payload.
///
/// Handles ([`NodeRef`]) are copyable tokens: using one with a list it didn't come from, or after
/// the node was erased, is a contract violation. For plain traversal prefer [`SinglyLinkedList::iter`].
///
/// # Concurrency
/// Like the other containers, a shared mutable scratch view means no operation on the same
/// instance may run concurrently, even reads; the raw internals make the type `!Send`/`!Sync`.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the list.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `try_insert_after` | `O(1)` |
/// | `erase_after` | `O(1)` |
/// | `try_find` | `O(n)` |
/// | `reverse` | `O(n)` |
/// | `try_cmp` | `O(n)` |
/// | `try_clone` | `O(n)` (deep) |
pub struct SinglyLinkedList {
    head: Link,
    len: usize,
    ops: OpsTable,
    view: TypedCell,
}

impl SinglyLinkedList {
    /// Creates an empty list of elements tagged `tag`, with default per-type operations.
    pub const fn new(tag: TypeTag) -> SinglyLinkedList {
        SinglyLinkedList {
            head: None,
            len: 0,
            ops: OpsTable::new(tag),
            view: TypedCell::with_value(Value::Null, None),
        }
    }

    /// Creates an empty list using the supplied operation table. Rejects a table whose element
    /// size is smaller than the tag's own storage size with [`Error::BadParam`].
    pub fn try_with_table(table: OpsTable) -> Result<SinglyLinkedList, Error> {
        if table.value_size() < table.tag().value_size() {
            return Err(Error::BadParam);
        }
        Ok(SinglyLinkedList {
            head: None,
            len: 0,
            ops: table,
            view: TypedCell::with_value(Value::Null, None),
        })
    }

    /// Constructs an empty list in place at the start of a caller-provided buffer; see
    /// [`Vector::init_at_buffer`](crate::collections::contiguous::Vector::init_at_buffer) for
    /// the shared conventions.
    ///
    /// # Safety
    /// `buf` must be valid for writes of `size` bytes, and the caller takes over the obligation
    /// to drop the constructed list in place before the buffer is reused.
    pub unsafe fn init_at_buffer(
        buf: NonNull<u8>,
        size: usize,
        tag: TypeTag,
    ) -> Result<NonNull<SinglyLinkedList>, Error> {
        if size < size_of::<SinglyLinkedList>()
            || buf.as_ptr() as usize % align_of::<SinglyLinkedList>() != 0
        {
            return Err(Error::BadParam);
        }
        let ptr = buf.cast::<SinglyLinkedList>();
        // SAFETY: The buffer is big enough and aligned per the checks above, and valid for writes
        // per this function's contract.
        unsafe { ptr.write(SinglyLinkedList::new(tag)) };
        Ok(ptr)
    }

    /// Returns the number of live nodes.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The tag every element of this list carries.
    pub const fn tag(&self) -> TypeTag {
        self.ops.tag()
    }

    /// The list's operation table.
    pub const fn ops(&self) -> &OpsTable {
        &self.ops
    }

    /// The first node (begin primitive), [`None`] when empty.
    pub const fn head(&self) -> Option<NodeRef> {
        self.head
    }

    /// The node after `node`, [`None`] at the tail.
    pub fn next(&self, node: NodeRef) -> Option<NodeRef> {
        *node.next()
    }

    /// The payload of `node` (node-to-value extraction).
    pub fn value(&self, node: NodeRef) -> &Value {
        node.value()
    }

    /// Mutable access to `node`'s payload. Replacing it with a value of a different tag makes
    /// later typed operations report [`Error::TypeMismatch`]; for checked access prefer
    /// [`SinglyLinkedList::view_of`].
    pub fn value_mut(&mut self, node: NodeRef) -> &mut Value {
        node.value_mut()
    }

    /// Binds the list's scratch view to `node`'s payload, giving cell-level access to it.
    pub fn view_of(&mut self, node: NodeRef) -> &mut TypedCell {
        // SAFETY: The node is live per the handle contract and reachable only through self, which
        // stays mutably borrowed for as long as the returned view can be used.
        unsafe { self.view.bind_to(node.slot(), Some(self.ops)) };
        &mut self.view
    }

    /// Inserts a copy of `value`'s contents after `after` (`None` inserts at the head),
    /// returning the new node. O(1).
    ///
    /// Tag mismatches are rejected before anything is mutated; on construction, copy or
    /// allocation failure the partially-built node is destructed and freed and the list is
    /// unchanged.
    pub fn try_insert_after(
        &mut self,
        after: Option<NodeRef>,
        value: &TypedCell,
    ) -> Result<NodeRef, Error> {
        if value.tag() != self.tag() {
            return Err(Error::mismatch(self.tag(), value.tag()));
        }
        let mut staged = TypedCell::with_value(self.ops.construct_value()?, Some(self.ops));
        staged.copy_contents(value)?;

        // Dropping staged on the failure path runs the element's destructor.
        let node = self.alloc_after(after)?;
        *node.value_mut() = staged.into_value();
        self.link(after, node);
        Ok(node)
    }

    /// Like [`SinglyLinkedList::try_insert_after`], but moves the contents out of `value`, which
    /// is re-constructed to its default state. On failure both the list and `value` are
    /// unchanged.
    pub fn try_insert_move(
        &mut self,
        after: Option<NodeRef>,
        value: &mut TypedCell,
    ) -> Result<NodeRef, Error> {
        if value.tag() != self.tag() {
            return Err(Error::mismatch(self.tag(), value.tag()));
        }
        let mut staged = TypedCell::with_value(self.ops.construct_value()?, Some(self.ops));

        let node = self.alloc_after(after)?;
        if let Err(error) = staged.move_contents(value) {
            // Nothing was linked yet; give the placeholder node back.
            // SAFETY: node was freshly allocated above and no copy of the handle escaped.
            unsafe { node.take_node() };
            return Err(error);
        }
        *node.value_mut() = staged.into_value();
        self.link(after, node);
        Ok(node)
    }

    /// Inserts at the head; shorthand for `try_insert_after(None, value)`.
    pub fn try_push_front(&mut self, value: &TypedCell) -> Result<NodeRef, Error> {
        self.try_insert_after(None, value)
    }

    /// Removes the node after `after` (the head node when `None`). Erasing past the tail is a
    /// no-op, not an error. O(1).
    pub fn erase_after(&mut self, after: Option<NodeRef>) {
        let target = match after {
            None => self.head,
            Some(node) => *node.next(),
        };
        let Some(target) = target else { return };

        let next = *target.next();
        match after {
            None => self.head = next,
            Some(node) => *node.next_mut() = next,
        }
        self.len -= 1;

        // SAFETY: target was just unlinked; no handle to it remains inside the list.
        let mut node = unsafe { target.take_node() };
        self.ops.destruct_value(&mut node.value);
    }

    /// Scans forward for the first element comparing [`Ordering::Equal`] to `needle`, applying
    /// `options.organize` on a hit and returning the node now holding the matched value.
    ///
    /// Policies: [`Organize::None`] leaves the order alone; [`Organize::MoveToFront`] swaps the
    /// found payload with the head's; [`Organize::Transpose`] swaps the found payload with the
    /// node **after** it, so repeated hits bubble a value away from the head rather than toward
    /// it. Long-standing behavior that callers may rely on, kept as is; the doubly-linked list
    /// transposes toward the scan origin instead.
    ///
    /// Map-only policies and backward scans are rejected with [`Error::BadParam`];
    /// [`SearchKind::Binary`](crate::options::SearchKind::Binary) reports
    /// [`Error::NoSuchMethod`]. A comparator error aborts the scan and is propagated.
    pub fn try_find(
        &mut self,
        options: FindOptions,
        needle: &TypedCell,
        cmp: Option<CompareFn>,
    ) -> Result<Option<NodeRef>, Error> {
        if options.search.is_binary() {
            return Err(Error::NoSuchMethod);
        }
        if options.direction.is_backward()
            || matches!(options.organize, Organize::CountBased | Organize::Auto)
        {
            return Err(Error::BadParam);
        }
        if needle.tag() != self.tag() {
            return Err(Error::mismatch(self.tag(), needle.tag()));
        }

        let mut current = self.head;
        while let Some(node) = current {
            if self.ops.compare_values(node.value(), needle.value(), cmp)? == Ordering::Equal {
                return Ok(Some(self.reorganize(node, options.organize)));
            }
            current = *node.next();
        }
        Ok(None)
    }

    /// Applies the self-organization policy to a hit, returning the node now holding the matched
    /// payload.
    fn reorganize(&mut self, node: NodeRef, organize: Organize) -> NodeRef {
        match organize {
            Organize::MoveToFront => match self.head {
                Some(head) if head != node => {
                    mem::swap(head.value_mut(), node.value_mut());
                    head
                },
                _ => node,
            },
            // Membership order changes, not node identity: payloads are swapped in place.
            Organize::Transpose => match *node.next() {
                Some(next) => {
                    mem::swap(node.value_mut(), next.value_mut());
                    next
                },
                None => node,
            },
            _ => node,
        }
    }

    /// Reverses the list in place by relinking pointers. O(n), no allocation, never fails.
    pub fn reverse(&mut self) {
        let mut prev: Link = None;
        let mut current = self.head;
        while let Some(node) = current {
            current = mem::replace(node.next_mut(), prev);
            prev = Some(node);
        }
        self.head = prev;
    }

    /// Visits every element once, rebinding the shared scratch view per element. The first
    /// [`Err`] from the callback aborts the walk and is returned. Only forward walks are
    /// possible; [`Direction::Backward`] is rejected with [`Error::BadParam`].
    pub fn try_for_each(
        &mut self,
        direction: Direction,
        mut f: impl FnMut(&mut TypedCell) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if direction.is_backward() {
            return Err(Error::BadParam);
        }
        let mut view = mem::take(&mut self.view);
        let ops = self.ops;
        let mut result = Ok(());

        let mut current = self.head;
        while let Some(node) = current {
            // SAFETY: The node is live and reachable only through self, which stays mutably
            // borrowed for the whole walk.
            unsafe { view.bind_to(node.slot(), Some(ops)) };
            result = f(&mut view);
            if result.is_err() {
                break;
            }
            current = *node.next();
        }

        self.view = view;
        self.view.release();
        result
    }

    /// Compares element-wise lexicographically, first non-equal pair deciding, strict prefix
    /// comparing less. The tags of the two lists must match.
    pub fn try_cmp(
        &self,
        other: &SinglyLinkedList,
        cmp: Option<CompareFn>,
    ) -> Result<Ordering, Error> {
        if self.tag() != other.tag() {
            return Err(Error::mismatch(self.tag(), other.tag()));
        }

        let mut a = self.head;
        let mut b = other.head;
        while let (Some(node_a), Some(node_b)) = (a, b) {
            let ordering = self.ops.compare_values(node_a.value(), node_b.value(), cmp)?;
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
            a = *node_a.next();
            b = *node_b.next();
        }
        Ok(self.len.cmp(&other.len))
    }

    /// Deep-copies the list, every element through the table's copy operation.
    pub fn try_clone(&self) -> Result<SinglyLinkedList, Error> {
        let mut copy = SinglyLinkedList {
            head: None,
            len: 0,
            ops: self.ops,
            view: TypedCell::with_value(Value::Null, None),
        };

        let mut tail: Link = None;
        let mut current = self.head;
        while let Some(node) = current {
            let cloned = self.ops.clone_value(node.value())?;
            let new_node = match NodeRef::try_alloc(Node { value: cloned, next: None }) {
                Ok(new_node) => new_node,
                Err((error, mut node)) => {
                    copy.ops.destruct_value(&mut node.value);
                    return Err(error);
                },
            };
            copy.link(tail, new_node);
            tail = Some(new_node);
            current = *node.next();
        }
        Ok(copy)
    }

    /// Exchanges the contents of two lists. Never fails.
    pub fn swap(&mut self, other: &mut SinglyLinkedList) {
        mem::swap(self, other);
    }

    /// Destructs and frees every node.
    pub fn clear(&mut self) {
        let mut current = self.head;
        self.head = None;
        self.len = 0;

        while let Some(ptr) = current {
            // SAFETY: The chain is walked exactly once and the list no longer references it.
            let mut node = unsafe { ptr.take_node() };
            current = node.next;
            self.ops.destruct_value(&mut node.value);
        }
    }

    /// Borrowed iteration over the payloads, front to back.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Allocates an unlinked placeholder node whose `next` already points where it will end up.
    fn alloc_after(&mut self, after: Option<NodeRef>) -> Result<NodeRef, Error> {
        let next = match after {
            None => self.head,
            Some(node) => *node.next(),
        };
        NodeRef::try_alloc(Node { value: Value::Null, next }).map_err(|(error, _)| error)
    }

    fn link(&mut self, after: Option<NodeRef>, node: NodeRef) {
        match after {
            None => self.head = Some(node),
            Some(prev) => *prev.next_mut() = Some(node),
        }
        self.len += 1;
    }
}

impl Drop for SinglyLinkedList {
    fn drop(&mut self) {
        self.clear();
    }
}

impl PartialEq for SinglyLinkedList {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.try_cmp(other, None), Ok(Ordering::Equal))
    }
}

impl Debug for SinglyLinkedList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinglyLinkedList")
            .field("tag", &self.tag())
            .field("contents", &self.iter().collect::<Vec<_>>())
            .field("len", &self.len)
            .finish()
    }
}

impl Display for SinglyLinkedList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})",
            self.iter()
                .map(|value| format!("{value}"))
                .collect::<Vec<String>>()
                .join(") -> (")
        )
    }
}

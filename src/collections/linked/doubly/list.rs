use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::mem;
use std::ptr::NonNull;

use super::{Iter, Link, Node, NodeRef};
use crate::cell::{CompareFn, OpsTable, TypeTag, TypedCell, Value};
use crate::options::{Direction, FindOptions, Organize};
use crate::util::error::Error;

/// A bidirectional chain of heap-resident nodes, each one allocation holding both link headers
/// and the element payload.
///
/// Interior nodes always satisfy `node.next.prev == node` and `node.prev.next == node`; the
/// head has no `prev` and the tail no `next`. Erasing an arbitrary known node is O(1), and
/// scans run from either end.
///
/// Handles ([`NodeRef`]) follow the same contract as the singly-linked variant: copyable tokens
/// valid only for the list they came from and while the node is live.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the list.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `try_insert_after` | `O(1)` |
/// | `erase` | `O(1)` |
/// | `try_find` | `O(n)` |
/// | `reverse` | `O(n)` |
/// | `try_cmp` | `O(n)` |
/// | `try_clone` | `O(n)` (deep) |
pub struct DoublyLinkedList {
    head: Link,
    tail: Link,
    len: usize,
    ops: OpsTable,
    view: TypedCell,
}

impl DoublyLinkedList {
    /// Creates an empty list of elements tagged `tag`, with default per-type operations.
    pub const fn new(tag: TypeTag) -> DoublyLinkedList {
        DoublyLinkedList {
            head: None,
            tail: None,
            len: 0,
            ops: OpsTable::new(tag),
            view: TypedCell::with_value(Value::Null, None),
        }
    }

    /// Creates an empty list using the supplied operation table. Rejects a table whose element
    /// size is smaller than the tag's own storage size with [`Error::BadParam`].
    pub fn try_with_table(table: OpsTable) -> Result<DoublyLinkedList, Error> {
        if table.value_size() < table.tag().value_size() {
            return Err(Error::BadParam);
        }
        Ok(DoublyLinkedList {
            head: None,
            tail: None,
            len: 0,
            ops: table,
            view: TypedCell::with_value(Value::Null, None),
        })
    }

    /// Constructs an empty list in place at the start of a caller-provided buffer.
    ///
    /// # Safety
    /// `buf` must be valid for writes of `size` bytes, and the caller takes over the obligation
    /// to drop the constructed list in place before the buffer is reused.
    pub unsafe fn init_at_buffer(
        buf: NonNull<u8>,
        size: usize,
        tag: TypeTag,
    ) -> Result<NonNull<DoublyLinkedList>, Error> {
        if size < size_of::<DoublyLinkedList>()
            || buf.as_ptr() as usize % align_of::<DoublyLinkedList>() != 0
        {
            return Err(Error::BadParam);
        }
        let ptr = buf.cast::<DoublyLinkedList>();
        // SAFETY: The buffer is big enough and aligned per the checks above, and valid for writes
        // per this function's contract.
        unsafe { ptr.write(DoublyLinkedList::new(tag)) };
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

    /// The first node, [`None`] when empty.
    pub const fn head(&self) -> Option<NodeRef> {
        self.head
    }

    /// The last node, [`None`] when empty.
    pub const fn tail(&self) -> Option<NodeRef> {
        self.tail
    }

    /// The node after `node`, [`None`] at the tail.
    pub fn next(&self, node: NodeRef) -> Option<NodeRef> {
        *node.next()
    }

    /// The node before `node`, [`None`] at the head.
    pub fn prev(&self, node: NodeRef) -> Option<NodeRef> {
        *node.prev()
    }

    /// The payload of `node`.
    pub fn value(&self, node: NodeRef) -> &Value {
        node.value()
    }

    /// Mutable access to `node`'s payload. Replacing it with a value of a different tag makes
    /// later typed operations report [`Error::TypeMismatch`]; for checked access prefer
    /// [`DoublyLinkedList::view_of`].
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
    /// returning the new node. O(1), with the same failure-restore contract as the
    /// singly-linked variant.
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
        self.link(node);
        Ok(node)
    }

    /// Like [`DoublyLinkedList::try_insert_after`], but moves the contents out of `value`,
    /// which is re-constructed to its default state. On failure both the list and `value` are
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
        self.link(node);
        Ok(node)
    }

    /// Inserts at the head; shorthand for `try_insert_after(None, value)`.
    pub fn try_push_front(&mut self, value: &TypedCell) -> Result<NodeRef, Error> {
        self.try_insert_after(None, value)
    }

    /// Appends at the tail; shorthand for `try_insert_after(self.tail(), value)`.
    pub fn try_push_back(&mut self, value: &TypedCell) -> Result<NodeRef, Error> {
        self.try_insert_after(self.tail, value)
    }

    /// Unlinks and destructs `node`. O(1) for any known node.
    pub fn erase(&mut self, node: NodeRef) {
        self.unlink(node);
        // SAFETY: node was just unlinked; no handle to it remains inside the list.
        let mut node = unsafe { node.take_node() };
        self.ops.destruct_value(&mut node.value);
    }

    /// Removes the node after `after` (the head node when `None`). Erasing past the tail is a
    /// no-op, not an error.
    pub fn erase_after(&mut self, after: Option<NodeRef>) {
        let target = match after {
            None => self.head,
            Some(node) => *node.next(),
        };
        if let Some(target) = target {
            self.erase(target);
        }
    }

    /// Scans from the head (forward) or the tail (backward) for the first element comparing
    /// [`Ordering::Equal`] to `needle`, applying `options.organize` on a hit and returning the
    /// node now holding the matched value.
    ///
    /// Policies: [`Organize::MoveToFront`] swaps the found payload with the scan origin's, so
    /// a backward scan promotes toward the tail. [`Organize::Transpose`] swaps it with the
    /// neighbor on the scan-origin side (`prev` when forward, `next` when backward), bubbling
    /// hot values toward the origin one position per hit. Map-only policies are rejected with
    /// [`Error::BadParam`]; [`SearchKind::Binary`](crate::options::SearchKind::Binary)
    /// reports [`Error::NoSuchMethod`]. Comparator errors abort the scan and propagate.
    pub fn try_find(
        &mut self,
        options: FindOptions,
        needle: &TypedCell,
        cmp: Option<CompareFn>,
    ) -> Result<Option<NodeRef>, Error> {
        if options.search.is_binary() {
            return Err(Error::NoSuchMethod);
        }
        if matches!(options.organize, Organize::CountBased | Organize::Auto) {
            return Err(Error::BadParam);
        }
        if needle.tag() != self.tag() {
            return Err(Error::mismatch(self.tag(), needle.tag()));
        }

        let mut current = match options.direction {
            Direction::Forward => self.head,
            Direction::Backward => self.tail,
        };
        while let Some(node) = current {
            if self.ops.compare_values(node.value(), needle.value(), cmp)? == Ordering::Equal {
                return Ok(Some(self.reorganize(node, options)));
            }
            current = match options.direction {
                Direction::Forward => *node.next(),
                Direction::Backward => *node.prev(),
            };
        }
        Ok(None)
    }

    /// Applies the self-organization policy to a hit, returning the node now holding the
    /// matched payload. Payloads are swapped in place; node identity never changes.
    fn reorganize(&mut self, node: NodeRef, options: FindOptions) -> NodeRef {
        let origin = match options.direction {
            Direction::Forward => self.head,
            Direction::Backward => self.tail,
        };
        let toward_origin = match options.direction {
            Direction::Forward => *node.prev(),
            Direction::Backward => *node.next(),
        };
        match options.organize {
            Organize::MoveToFront => match origin {
                Some(origin) if origin != node => {
                    mem::swap(origin.value_mut(), node.value_mut());
                    origin
                },
                _ => node,
            },
            Organize::Transpose => match toward_origin {
                Some(neighbor) => {
                    mem::swap(neighbor.value_mut(), node.value_mut());
                    neighbor
                },
                None => node,
            },
            _ => node,
        }
    }

    /// Reverses the list in place: one pass flips every `next` link, a second pass from the old
    /// tail flips every `prev` link, then head and tail swap roles. O(n), no allocation, never
    /// fails.
    pub fn reverse(&mut self) {
        let mut prev: Link = None;
        let mut current = self.head;
        while let Some(node) = current {
            current = mem::replace(node.next_mut(), prev);
            prev = Some(node);
        }

        let mut next: Link = None;
        let mut current = self.tail;
        while let Some(node) = current {
            current = mem::replace(node.prev_mut(), next);
            next = Some(node);
        }

        mem::swap(&mut self.head, &mut self.tail);
    }

    /// Visits every element once in the given direction, rebinding the shared scratch view per
    /// element. The first [`Err`] from the callback aborts the walk and is returned.
    pub fn try_for_each(
        &mut self,
        direction: Direction,
        mut f: impl FnMut(&mut TypedCell) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut view = mem::take(&mut self.view);
        let ops = self.ops;
        let mut result = Ok(());

        let mut current = match direction {
            Direction::Forward => self.head,
            Direction::Backward => self.tail,
        };
        while let Some(node) = current {
            // SAFETY: The node is live and reachable only through self, which stays mutably
            // borrowed for the whole walk.
            unsafe { view.bind_to(node.slot(), Some(ops)) };
            result = f(&mut view);
            if result.is_err() {
                break;
            }
            current = match direction {
                Direction::Forward => *node.next(),
                Direction::Backward => *node.prev(),
            };
        }

        self.view = view;
        self.view.release();
        result
    }

    /// Compares element-wise lexicographically from the head, first non-equal pair deciding,
    /// strict prefix comparing less. The tags of the two lists must match.
    pub fn try_cmp(
        &self,
        other: &DoublyLinkedList,
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
    pub fn try_clone(&self) -> Result<DoublyLinkedList, Error> {
        let mut copy = DoublyLinkedList {
            head: None,
            tail: None,
            len: 0,
            ops: self.ops,
            view: TypedCell::with_value(Value::Null, None),
        };

        let mut current = self.head;
        while let Some(node) = current {
            let cloned = self.ops.clone_value(node.value())?;
            let new_node = match NodeRef::try_alloc(Node {
                value: cloned,
                prev: copy.tail,
                next: None,
            }) {
                Ok(new_node) => new_node,
                Err((error, mut node)) => {
                    copy.ops.destruct_value(&mut node.value);
                    return Err(error);
                },
            };
            copy.link(new_node);
            current = *node.next();
        }
        Ok(copy)
    }

    /// Exchanges the contents of two lists. Never fails.
    pub fn swap(&mut self, other: &mut DoublyLinkedList) {
        mem::swap(self, other);
    }

    /// Destructs and frees every node.
    pub fn clear(&mut self) {
        let mut current = self.head;
        self.head = None;
        self.tail = None;
        self.len = 0;

        while let Some(ptr) = current {
            // SAFETY: The chain is walked exactly once and the list no longer references it.
            let mut node = unsafe { ptr.take_node() };
            current = node.next;
            self.ops.destruct_value(&mut node.value);
        }
    }

    /// Borrowed double-ended iteration over the payloads.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Allocates an unlinked node with both neighbor links already pointing at its final
    /// position.
    fn alloc_after(&mut self, after: Option<NodeRef>) -> Result<NodeRef, Error> {
        let next = match after {
            None => self.head,
            Some(node) => *node.next(),
        };
        NodeRef::try_alloc(Node { value: Value::Null, prev: after, next })
            .map_err(|(error, _)| error)
    }

    /// Splices a node whose `prev`/`next` fields already describe its position.
    fn link(&mut self, node: NodeRef) {
        match *node.prev() {
            None => self.head = Some(node),
            Some(prev) => *prev.next_mut() = Some(node),
        }
        match *node.next() {
            None => self.tail = Some(node),
            Some(next) => *next.prev_mut() = Some(node),
        }
        self.len += 1;
    }

    fn unlink(&mut self, node: NodeRef) {
        match *node.prev() {
            None => self.head = *node.next(),
            Some(prev) => *prev.next_mut() = *node.next(),
        }
        match *node.next() {
            None => self.tail = *node.prev(),
            Some(next) => *next.prev_mut() = *node.prev(),
        }
        self.len -= 1;
    }
}

impl Drop for DoublyLinkedList {
    fn drop(&mut self) {
        self.clear();
    }
}

impl PartialEq for DoublyLinkedList {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.try_cmp(other, None), Ok(Ordering::Equal))
    }
}

impl Debug for DoublyLinkedList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoublyLinkedList")
            .field("tag", &self.tag())
            .field("contents", &self.iter().collect::<Vec<_>>())
            .field("len", &self.len)
            .finish()
    }
}

impl Display for DoublyLinkedList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})",
            self.iter()
                .map(|value| format!("{value}"))
                .collect::<Vec<String>>()
                .join(") <-> (")
        )
    }
}

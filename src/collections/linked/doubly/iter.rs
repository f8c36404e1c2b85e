use std::marker::PhantomData;

use super::{DoublyLinkedList, Link};
use crate::cell::Value;

/// Borrowed double-ended iterator over a [`DoublyLinkedList`]'s payloads.
pub struct Iter<'a> {
    front: Link,
    back: Link,
    remaining: usize,
    _list: PhantomData<&'a DoublyLinkedList>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.front = *node.next();
        self.remaining -= 1;
        Some(node.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<&'a Value> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.back = *node.prev();
        self.remaining -= 1;
        Some(node.value())
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a DoublyLinkedList {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        Iter {
            front: self.head(),
            back: self.tail(),
            remaining: self.len(),
            _list: PhantomData,
        }
    }
}

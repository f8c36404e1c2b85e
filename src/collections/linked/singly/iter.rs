use std::marker::PhantomData;

use super::{Link, SinglyLinkedList};
use crate::cell::Value;

/// Borrowed forward iterator over a [`SinglyLinkedList`]'s payloads.
pub struct Iter<'a> {
    current: Link,
    remaining: usize,
    _list: PhantomData<&'a SinglyLinkedList>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        let node = self.current?;
        self.current = *node.next();
        self.remaining -= 1;
        Some(node.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a SinglyLinkedList {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        Iter {
            current: self.head(),
            remaining: self.len(),
            _list: PhantomData,
        }
    }
}

#![cfg(test)]

use std::cmp::Ordering;
use std::ptr::NonNull;

use super::SinglyLinkedList;
use crate::cell::{OpsTable, TypeTag, TypedCell, UserData, Value};
use crate::options::{Direction, FindOptions, Organize, SearchKind};
use crate::util::error::Error;

fn cell(value: i64) -> TypedCell {
    TypedCell::from(Value::I64(value))
}

fn list_of(values: &[i64]) -> SinglyLinkedList {
    let mut list = SinglyLinkedList::new(TypeTag::I64);
    let mut tail = None;
    for &value in values {
        tail = Some(list.try_insert_after(tail, &cell(value)).unwrap());
    }
    list
}

fn contents(list: &SinglyLinkedList) -> Vec<i64> {
    list.iter()
        .map(|value| match value {
            Value::I64(i) => *i,
            other => panic!("unexpected payload: {other:?}"),
        })
        .collect()
}

fn counting_destruct(_cell: &mut TypedCell, user: UserData) {
    if let Some(ptr) = user {
        // SAFETY: The test installed a pointer to a counter that outlives the list.
        unsafe { *ptr.cast::<usize>().as_mut() += 1 };
    }
}

#[test]
fn test_insert_after_links_in_order() {
    let mut list = SinglyLinkedList::new(TypeTag::I64);
    assert!(list.is_empty());
    assert_eq!(list.head(), None);

    let first = list.try_push_front(&cell(1)).unwrap();
    let third = list.try_insert_after(Some(first), &cell(3)).unwrap();
    list.try_insert_after(Some(first), &cell(2)).unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(contents(&list), vec![1, 2, 3]);
    assert_eq!(list.head(), Some(first));
    assert_eq!(list.next(third), None);
    assert_eq!(list.value(first), &Value::I64(1));
}

#[test]
fn test_insert_rejects_wrong_tag() {
    let mut list = SinglyLinkedList::new(TypeTag::I64);
    assert_eq!(
        list.try_push_front(&TypedCell::from(Value::F64(1.0))),
        Err(Error::mismatch(TypeTag::I64, TypeTag::F64))
    );
    assert!(list.is_empty());
}

#[test]
fn test_insert_move_resets_source() {
    let mut list = SinglyLinkedList::new(TypeTag::I64);
    let mut src = cell(7);
    list.try_insert_move(None, &mut src).unwrap();

    assert_eq!(contents(&list), vec![7]);
    assert_eq!(src.as_i64(), Some(0));
    assert_eq!(src.tag(), TypeTag::I64);
}

#[test]
fn test_view_rejects_retag() {
    let mut list = list_of(&[1]);
    let head = list.head().unwrap();

    let view = list.view_of(head);
    assert_eq!(
        view.set_f64(1.0),
        Err(Error::mismatch(TypeTag::I64, TypeTag::F64)),
        "A view into a node may not change the slot's type."
    );
    assert_eq!(view.as_i64(), Some(1), "A rejected assignment should leave the slot intact.");
    assert_eq!(contents(&list), vec![1]);
}

#[test]
fn test_failed_insert_leaves_list_unchanged() {
    fn failing_clone(_dest: &mut TypedCell, _src: &TypedCell, _user: UserData) -> Result<(), Error> {
        Err(Error::Failure)
    }

    let table = OpsTable::new(TypeTag::I64).with_clone(failing_clone);
    let mut list = SinglyLinkedList::try_with_table(table).unwrap();

    assert_eq!(list.try_push_front(&cell(1)), Err(Error::Failure));
    assert!(list.is_empty(), "A failed insert should leave no partial node behind.");
    assert_eq!(list.head(), None);

    // Moves bypass the copy operation, so a node can still be seeded.
    let mut seed = cell(7);
    let node = list.try_insert_move(None, &mut seed).unwrap();
    assert_eq!(list.try_insert_after(Some(node), &cell(8)), Err(Error::Failure));
    assert_eq!(contents(&list), vec![7]);
    assert_eq!(list.next(node), None);
}

#[test]
fn test_erase_after() {
    let mut list = list_of(&[1, 2, 3]);
    let head = list.head().unwrap();

    list.erase_after(Some(head));
    assert_eq!(contents(&list), vec![1, 3]);

    list.erase_after(None);
    assert_eq!(contents(&list), vec![3]);

    // Erasing past the tail does nothing.
    let tail = list.head().unwrap();
    list.erase_after(Some(tail));
    assert_eq!(contents(&list), vec![3]);
}

#[test]
fn test_erase_runs_destructor() {
    let mut destructed: usize = 0;
    let table = OpsTable::new(TypeTag::I64)
        .with_destruct(counting_destruct)
        .with_user(NonNull::new((&raw mut destructed).cast()));
    let mut list = SinglyLinkedList::try_with_table(table).unwrap();

    list.try_push_front(&cell(1)).unwrap();
    list.try_push_front(&cell(2)).unwrap();
    list.erase_after(None);
    assert_eq!(destructed, 1);

    drop(list);
    assert_eq!(destructed, 2);
}

#[test]
fn test_find_linear() {
    let mut list = list_of(&[10, 20, 30]);
    let needle = cell(20);

    let hit = list
        .try_find(FindOptions::new(), &needle, None)
        .unwrap()
        .unwrap();
    assert_eq!(list.value(hit), &Value::I64(20));
    assert_eq!(contents(&list), vec![10, 20, 30]);

    assert_eq!(list.try_find(FindOptions::new(), &cell(99), None), Ok(None));
}

#[test]
fn test_find_move_to_front_swaps_with_head() {
    let mut list = list_of(&[1, 2, 3]);
    let options = FindOptions::new().with_organize(Organize::MoveToFront);

    let hit = list.try_find(options, &cell(3), None).unwrap().unwrap();
    assert_eq!(contents(&list), vec![3, 2, 1]);
    assert_eq!(hit, list.head().unwrap());

    // A hit already at the head stays put.
    let hit = list.try_find(options, &cell(3), None).unwrap().unwrap();
    assert_eq!(contents(&list), vec![3, 2, 1]);
    assert_eq!(hit, list.head().unwrap());
}

#[test]
fn test_transpose_swaps_with_next_neighbor() {
    // Transposition here exchanges the hit with the node after it, so repeated lookups push a
    // value toward the tail rather than the head. Kept exactly as the original behaved.
    let mut list = list_of(&[1, 2, 3]);
    let options = FindOptions::new().with_organize(Organize::Transpose);

    let hit = list.try_find(options, &cell(2), None).unwrap().unwrap();
    assert_eq!(contents(&list), vec![1, 3, 2]);
    assert_eq!(list.value(hit), &Value::I64(2));

    // A hit at the tail has no next neighbor and stays put.
    let hit = list.try_find(options, &cell(2), None).unwrap().unwrap();
    assert_eq!(contents(&list), vec![1, 3, 2]);
    assert_eq!(list.value(hit), &Value::I64(2));
}

#[test]
fn test_find_rejects_unsupported_options() {
    let mut list = list_of(&[1, 2, 3]);
    let needle = cell(2);

    let backward = FindOptions::new().with_direction(Direction::Backward);
    assert_eq!(list.try_find(backward, &needle, None), Err(Error::BadParam));

    let count_based = FindOptions::new().with_organize(Organize::CountBased);
    assert_eq!(list.try_find(count_based, &needle, None), Err(Error::BadParam));

    let binary = FindOptions::new().with_search(SearchKind::Binary);
    assert_eq!(list.try_find(binary, &needle, None), Err(Error::NoSuchMethod));

    assert_eq!(
        list.try_find(FindOptions::new(), &TypedCell::from(Value::U8(2)), None),
        Err(Error::mismatch(TypeTag::I64, TypeTag::U8))
    );
}

#[test]
fn test_find_custom_comparator() {
    fn modulo_ten(a: &TypedCell, b: &TypedCell, _user: UserData) -> Result<Ordering, Error> {
        match (a.value(), b.value()) {
            (Value::I64(a), Value::I64(b)) => Ok((a % 10).cmp(&(b % 10))),
            _ => Err(Error::Failure),
        }
    }

    let mut list = list_of(&[11, 22, 33]);
    let hit = list
        .try_find(FindOptions::new(), &cell(2), Some(modulo_ten))
        .unwrap()
        .unwrap();
    assert_eq!(list.value(hit), &Value::I64(22));
}

#[test]
fn test_find_propagates_comparator_error() {
    fn failing(_a: &TypedCell, _b: &TypedCell, _user: UserData) -> Result<Ordering, Error> {
        Err(Error::Failure)
    }

    let mut list = list_of(&[1, 2]);
    assert_eq!(
        list.try_find(FindOptions::new(), &cell(2), Some(failing)),
        Err(Error::Failure)
    );
}

#[test]
fn test_reverse() {
    let mut list = list_of(&[1, 2, 3, 4]);
    list.reverse();
    assert_eq!(contents(&list), vec![4, 3, 2, 1]);

    let mut single = list_of(&[9]);
    single.reverse();
    assert_eq!(contents(&single), vec![9]);

    let mut empty = SinglyLinkedList::new(TypeTag::I64);
    empty.reverse();
    assert!(empty.is_empty());
}

#[test]
fn test_reverse_twice_is_identity() {
    let original = list_of(&[1, 2, 3, 4]);
    let mut list = list_of(&[1, 2, 3, 4]);
    list.reverse();
    list.reverse();
    assert_eq!(list, original);
}

#[test]
fn test_erase_undoes_insert() {
    let original = list_of(&[1, 2, 3]);
    let mut list = list_of(&[1, 2, 3]);
    let head = list.head().unwrap();

    list.try_insert_after(Some(head), &cell(9)).unwrap();
    list.erase_after(Some(head));
    assert_eq!(list, original);

    // At the head too.
    list.try_push_front(&cell(9)).unwrap();
    list.erase_after(None);
    assert_eq!(list, original);
}

#[test]
fn test_for_each_mutates_in_place() {
    let mut list = list_of(&[1, 2, 3]);
    list.try_for_each(Direction::Forward, |view| {
        let current = view.as_i64().ok_or(Error::Failure)?;
        view.set_i64(current * 10)
    })
    .unwrap();
    assert_eq!(contents(&list), vec![10, 20, 30]);

    assert_eq!(
        list.try_for_each(Direction::Backward, |_| Ok(())),
        Err(Error::BadParam)
    );
}

#[test]
fn test_for_each_aborts_on_error() {
    let mut list = list_of(&[1, 2, 3]);
    let mut visited = 0;
    let result = list.try_for_each(Direction::Forward, |view| {
        visited += 1;
        if view.as_i64() == Some(2) {
            Err(Error::Failure)
        } else {
            Ok(())
        }
    });

    assert_eq!(result, Err(Error::Failure));
    assert_eq!(visited, 2);
    // A later walk starts from the head again.
    list.try_for_each(Direction::Forward, |_| Ok(())).unwrap();
}

#[test]
fn test_cmp() {
    assert_eq!(
        list_of(&[1, 2, 3]).try_cmp(&list_of(&[1, 2, 3]), None),
        Ok(Ordering::Equal)
    );
    assert_eq!(
        list_of(&[1, 2, 3]).try_cmp(&list_of(&[1, 3, 2]), None),
        Ok(Ordering::Less)
    );
    // A strict prefix compares less.
    assert_eq!(
        list_of(&[1, 2]).try_cmp(&list_of(&[1, 2, 3]), None),
        Ok(Ordering::Less)
    );
    assert_eq!(
        SinglyLinkedList::new(TypeTag::I64).try_cmp(&SinglyLinkedList::new(TypeTag::U8), None),
        Err(Error::mismatch(TypeTag::I64, TypeTag::U8))
    );

    assert_eq!(list_of(&[4, 5]), list_of(&[4, 5]));
    assert_ne!(list_of(&[4, 5]), list_of(&[4]));
}

#[test]
fn test_clone_is_deep() {
    let mut original = list_of(&[1, 2, 3]);
    let copy = original.try_clone().unwrap();
    assert_eq!(contents(&copy), vec![1, 2, 3]);

    let head = original.head().unwrap();
    original.view_of(head).set_i64(99).unwrap();
    assert_eq!(contents(&original), vec![99, 2, 3]);
    assert_eq!(contents(&copy), vec![1, 2, 3]);
}

#[test]
fn test_clear_and_swap() {
    let mut a = list_of(&[1, 2]);
    let mut b = list_of(&[3]);
    a.swap(&mut b);
    assert_eq!(contents(&a), vec![3]);
    assert_eq!(contents(&b), vec![1, 2]);

    b.clear();
    assert!(b.is_empty());
    assert_eq!(b.head(), None);
    b.try_push_front(&cell(8)).unwrap();
    assert_eq!(contents(&b), vec![8]);
}

#[test]
fn test_init_at_buffer() {
    let mut storage = [0_u64; 64];
    let buf = NonNull::new(storage.as_mut_ptr().cast::<u8>()).unwrap();

    // An undersized buffer is rejected without touching it.
    // SAFETY: The buffer is valid for the stated size.
    let undersized = unsafe { SinglyLinkedList::init_at_buffer(buf, 4, TypeTag::I64) };
    assert_eq!(undersized.map(|_| ()), Err(Error::BadParam));

    // SAFETY: The buffer is big enough and u64-aligned.
    let ptr = unsafe { SinglyLinkedList::init_at_buffer(buf, size_of_val(&storage), TypeTag::I64) }
        .unwrap();
    // SAFETY: init_at_buffer constructed a valid list at ptr.
    let list = unsafe { &mut *ptr.as_ptr() };
    list.try_push_front(&cell(5)).unwrap();
    assert_eq!(contents(list), vec![5]);

    // SAFETY: Constructed in place above and not used past this point.
    unsafe { ptr.as_ptr().drop_in_place() };
}

#[test]
fn test_display() {
    assert_eq!(format!("{}", list_of(&[1, 2, 3])), "(1) -> (2) -> (3)");
    assert_eq!(format!("{}", SinglyLinkedList::new(TypeTag::I64)), "()");
}

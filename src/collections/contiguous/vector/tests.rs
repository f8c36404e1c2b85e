#![cfg(test)]

use std::cmp::Ordering;
use std::ptr::NonNull;

use super::Vector;
use crate::cell::{OpsTable, TypeTag, TypedCell, UserData, Value};
use crate::options::{Direction, FindOptions, Organize, SearchKind};
use crate::util::error::Error;

fn cell(value: i64) -> TypedCell {
    TypedCell::from(Value::I64(value))
}

fn vector_of(values: &[i64]) -> Vector {
    let mut vector = Vector::new(TypeTag::I64);
    for &value in values {
        vector.try_push(&cell(value)).unwrap();
    }
    vector
}

fn contents(vector: &Vector) -> Vec<i64> {
    vector
        .iter()
        .map(|value| match value {
            Value::I64(i) => *i,
            other => panic!("unexpected element: {other:?}"),
        })
        .collect()
}

#[test]
fn test_push_find_erase() {
    let mut vector = vector_of(&[1, 2, 3]);
    assert_eq!(vector.len(), 3);

    let hit = vector.try_find(0, FindOptions::new(), &cell(2), None).unwrap();
    assert_eq!(hit, Some(1));

    vector.erase(1).unwrap();
    assert_eq!(contents(&vector), vec![1, 3]);
    assert_eq!(vector.len(), 2);
}

#[test]
fn test_insert_at_index() {
    let mut vector = vector_of(&[1, 3]);
    vector.try_insert(1, &cell(2)).unwrap();
    assert_eq!(contents(&vector), vec![1, 2, 3]);

    // One past the end appends; further is out of bounds.
    vector.try_insert(3, &cell(4)).unwrap();
    assert_eq!(vector.try_insert(9, &cell(9)), Err(Error::BadParam));
    assert_eq!(contents(&vector), vec![1, 2, 3, 4]);

    assert_eq!(
        vector.try_push(&TypedCell::from(Value::F32(1.0))),
        Err(Error::mismatch(TypeTag::I64, TypeTag::F32))
    );
}

#[test]
fn test_insert_move_resets_source() {
    let mut vector = Vector::new(TypeTag::I64);
    let mut src = cell(5);
    vector.try_push_move(&mut src).unwrap();
    assert_eq!(contents(&vector), vec![5]);
    assert_eq!(src.as_i64(), Some(0));
}

#[test]
fn test_view_rejects_retag() {
    let mut vector = vector_of(&[1]);

    let view = vector.view_at(0).unwrap();
    assert_eq!(
        view.set_f64(1.0),
        Err(Error::mismatch(TypeTag::I64, TypeTag::F64)),
        "A view into a slot may not change the slot's type."
    );
    assert_eq!(view.as_i64(), Some(1), "A rejected assignment should leave the slot intact.");
    assert_eq!(contents(&vector), vec![1]);
}

#[test]
fn test_failed_insert_leaves_vector_unchanged() {
    fn failing_clone(_dest: &mut TypedCell, _src: &TypedCell, _user: UserData) -> Result<(), Error> {
        Err(Error::Failure)
    }

    let mut vector = Vector::try_with_table(
        OpsTable::new(TypeTag::I64).with_clone(failing_clone),
    )
    .unwrap();
    assert_eq!(vector.try_insert(0, &cell(1)), Err(Error::Failure));
    assert!(vector.is_empty(), "A failed insert should leave no partial element behind.");
}

#[test]
fn test_erase_bounds() {
    let mut vector = vector_of(&[1]);
    assert_eq!(vector.erase(1), Err(Error::BadParam));
    vector.erase(0).unwrap();
    assert!(vector.is_empty());
    assert_eq!(vector.erase(0), Err(Error::BadParam));
}

#[test]
fn test_erase_runs_destructor() {
    fn counting(_cell: &mut TypedCell, user: UserData) {
        if let Some(ptr) = user {
            // SAFETY: The test installed a pointer to a counter that outlives the vector.
            unsafe { *ptr.cast::<usize>().as_mut() += 1 };
        }
    }

    let mut destructed: usize = 0;
    let table = OpsTable::new(TypeTag::I64)
        .with_destruct(counting)
        .with_user(NonNull::new((&raw mut destructed).cast()));
    let mut vector = Vector::try_with_table(table).unwrap();

    vector.try_push(&cell(1)).unwrap();
    vector.try_push(&cell(2)).unwrap();
    vector.try_push(&cell(3)).unwrap();

    vector.erase(0).unwrap();
    assert_eq!(destructed, 1);

    // pop transfers ownership out instead of destructing.
    assert_eq!(vector.pop(), Some(Value::I64(3)));
    assert_eq!(destructed, 1);

    drop(vector);
    assert_eq!(destructed, 2);
}

#[test]
fn test_pop() {
    let mut vector = vector_of(&[1, 2]);
    assert_eq!(vector.pop(), Some(Value::I64(2)));
    assert_eq!(vector.pop(), Some(Value::I64(1)));
    assert_eq!(vector.pop(), None);
}

#[test]
fn test_find_options_and_direction() {
    let vector = vector_of(&[1, 2, 1]);
    let needle = cell(1);

    let backward = FindOptions::new().with_direction(Direction::Backward);
    assert_eq!(vector.try_find(2, backward, &needle, None), Ok(Some(2)));
    assert_eq!(vector.try_find(1, backward, &needle, None), Ok(Some(0)));

    // A start index at or past len is out of bounds on a non-empty vector.
    assert_eq!(vector.try_find(3, FindOptions::new(), &needle, None), Err(Error::BadParam));
    assert_eq!(
        Vector::new(TypeTag::I64).try_find(0, FindOptions::new(), &needle, None),
        Ok(None)
    );

    let organizing = FindOptions::new().with_organize(Organize::MoveToFront);
    assert_eq!(vector.try_find(0, organizing, &needle, None), Err(Error::BadParam));

    let binary = FindOptions::new().with_search(SearchKind::Binary);
    assert_eq!(vector.try_find(0, binary, &needle, None), Err(Error::NoSuchMethod));
}

#[test]
fn test_find_propagates_comparator_error() {
    fn failing(_a: &TypedCell, _b: &TypedCell, _user: UserData) -> Result<Ordering, Error> {
        Err(Error::Failure)
    }

    let vector = vector_of(&[1]);
    assert_eq!(
        vector.try_find(0, FindOptions::new(), &cell(1), Some(failing)),
        Err(Error::Failure)
    );
}

#[test]
fn test_for_each_both_directions() {
    let mut vector = vector_of(&[1, 2, 3]);
    vector
        .try_for_each(Direction::Forward, |view| {
            let current = view.as_i64().ok_or(Error::Failure)?;
            view.set_i64(current * 2)
        })
        .unwrap();
    assert_eq!(contents(&vector), vec![2, 4, 6]);

    let mut seen = Vec::new();
    vector
        .try_for_each(Direction::Backward, |view| {
            seen.push(view.as_i64().ok_or(Error::Failure)?);
            Ok(())
        })
        .unwrap();
    assert_eq!(seen, vec![6, 4, 2]);
}

#[test]
fn test_for_each_aborts_on_error() {
    let mut vector = vector_of(&[1, 2, 3]);
    let mut visited = 0;
    let result = vector.try_for_each(Direction::Forward, |view| {
        visited += 1;
        if view.as_i64() == Some(2) {
            Err(Error::Failure)
        } else {
            Ok(())
        }
    });
    assert_eq!(result, Err(Error::Failure));
    assert_eq!(visited, 2);
}

#[test]
fn test_cmp() {
    assert_eq!(vector_of(&[1, 2]).try_cmp(&vector_of(&[1, 2]), None), Ok(Ordering::Equal));
    assert_eq!(vector_of(&[1, 2]).try_cmp(&vector_of(&[1, 3]), None), Ok(Ordering::Less));
    assert_eq!(vector_of(&[2]).try_cmp(&vector_of(&[1, 9]), None), Ok(Ordering::Greater));
    // A strict prefix compares less.
    assert_eq!(vector_of(&[1]).try_cmp(&vector_of(&[1, 0]), None), Ok(Ordering::Less));

    assert_eq!(vector_of(&[1]), vector_of(&[1]));
    assert_ne!(vector_of(&[1]), vector_of(&[2]));
}

#[test]
fn test_clone_is_deep_for_nested_vectors() {
    let mut outer = Vector::new(TypeTag::Vector);
    let mut element = TypedCell::new(TypeTag::Vector, None);
    element.set_vector(&vector_of(&[1, 2])).unwrap();
    outer.try_push(&element).unwrap();

    let copy = outer.try_clone().unwrap();

    // Mutating the original's inner vector must not reach the copy.
    let view = outer.view_at(0).unwrap();
    view.as_vector_mut().unwrap().try_push(&cell(3)).unwrap();

    match copy.get(0).unwrap() {
        Value::Vector(inner) => assert_eq!(inner.len(), 2),
        other => panic!("unexpected element: {other:?}"),
    }
    match outer.get(0).unwrap() {
        Value::Vector(inner) => assert_eq!(inner.len(), 3),
        other => panic!("unexpected element: {other:?}"),
    }
}

#[test]
fn test_growth_policy() {
    let mut vector = Vector::new(TypeTag::I64);
    assert_eq!(vector.cap(), 0);

    vector.try_push(&cell(0)).unwrap();
    assert_eq!(vector.cap(), 8, "The first growth should jump to the minimum capacity.");

    for i in 1..9 {
        vector.try_push(&cell(i)).unwrap();
    }
    assert_eq!(vector.cap(), 12, "Growth past the minimum should be half again.");
}

#[test]
fn test_table_size_validation() {
    let mut undersized = OpsTable::new(TypeTag::I64);
    undersized.value_size = 1;
    assert_eq!(Vector::try_with_table(undersized).map(|_| ()), Err(Error::BadParam));
}

#[test]
fn test_index_navigation() {
    let vector = vector_of(&[1, 2]);
    assert_eq!(vector.first_index(), Some(0));
    assert_eq!(vector.last_index(), Some(1));
    assert_eq!(vector.next_index(0), Some(1));
    assert_eq!(vector.next_index(1), None);
    assert_eq!(vector.prev_index(1), Some(0));
    assert_eq!(vector.prev_index(0), None);

    let empty = Vector::new(TypeTag::I64);
    assert_eq!(empty.first_index(), None);
    assert_eq!(empty.last_index(), None);
}

#[test]
fn test_init_at_buffer() {
    let mut storage = [0_u64; 64];
    let buf = NonNull::new(storage.as_mut_ptr().cast::<u8>()).unwrap();

    // SAFETY: The buffer is valid for the stated size.
    let undersized = unsafe { Vector::init_at_buffer(buf, 4, TypeTag::I64) };
    assert_eq!(undersized.map(|_| ()), Err(Error::BadParam));

    // SAFETY: The buffer is big enough and u64-aligned.
    let ptr = unsafe { Vector::init_at_buffer(buf, size_of_val(&storage), TypeTag::I64) }.unwrap();
    // SAFETY: init_at_buffer constructed a valid vector at ptr.
    let vector = unsafe { &mut *ptr.as_ptr() };
    vector.try_push(&cell(3)).unwrap();
    assert_eq!(contents(vector), vec![3]);

    // SAFETY: Constructed in place above and not used past this point.
    unsafe { ptr.as_ptr().drop_in_place() };
}

#[test]
fn test_display() {
    assert_eq!(format!("{}", vector_of(&[1, 2])), "![1, 2]");
}

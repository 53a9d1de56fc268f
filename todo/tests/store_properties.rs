//! Property tests for `TodoListStore`

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use composable_todo_testing::{properties, SequentialIdGenerator};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use todo_list::{TodoListError, TodoListStore};

fn filled(texts: &[String]) -> TodoListStore {
    let mut store = TodoListStore::new();
    for text in texts {
        store.add_task(text.clone());
    }
    store
}

proptest! {
    #[test]
    fn adds_keep_call_order(texts in properties::task_texts(32)) {
        let store = filled(&texts);
        let snapshot = store.snapshot();

        prop_assert_eq!(snapshot.len(), texts.len());
        for (record, text) in snapshot.iter().zip(&texts) {
            prop_assert_eq!(&record.text, text);
        }
    }

    #[test]
    fn add_then_remove_tail_restores_snapshot(
        texts in properties::task_texts(16),
        extra in properties::task_text(),
    ) {
        let mut store = filled(&texts);
        let before = store.snapshot();

        let added = store.add_task(extra.clone());
        let removed = store.remove_task(store.len() - 1).unwrap();

        prop_assert_eq!(removed, added);
        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn remove_shifts_later_records_left((texts, index) in properties::texts_with_index(24)) {
        let mut store = filled(&texts);
        let before = store.snapshot();

        let removed = store.remove_task(index).unwrap();
        let after = store.snapshot();

        prop_assert_eq!(after.len(), before.len() - 1);
        prop_assert_eq!(&removed, &before[index]);
        prop_assert_eq!(&after[..index], &before[..index]);
        prop_assert_eq!(&after[index..], &before[index + 1..]);
    }

    #[test]
    fn remove_at_len_is_out_of_range(texts in properties::task_texts(16), past in 0usize..4) {
        let mut store = filled(&texts);
        let before = store.snapshot();
        let index = texts.len() + past;

        prop_assert_eq!(
            store.remove_task(index),
            Err(TodoListError::OutOfRange { index, len: texts.len() })
        );
        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn ids_are_unique_even_for_equal_text(count in 1usize..64, text in properties::task_text()) {
        let mut store = TodoListStore::new();
        let ids: HashSet<_> = (0..count).map(|_| store.add_task(text.clone()).id).collect();
        prop_assert_eq!(ids.len(), count);
    }

    #[test]
    fn batch_removal_is_atomic(
        (texts, index) in properties::texts_with_index(12),
        bad in 0usize..4,
    ) {
        let mut store = filled(&texts);
        let before = store.snapshot();
        let offsets = [index, texts.len() + bad];

        prop_assert!(store.remove_tasks(&offsets).is_err());
        prop_assert_eq!(store.snapshot(), before);
    }
}

#[test]
fn scenario_buy_milk_walk_dog() {
    let mut store = TodoListStore::with_id_generator(Arc::new(SequentialIdGenerator::new()));

    store.add_task("buy milk");
    assert_eq!(store.texts(), vec!["buy milk"]);

    store.add_task("walk dog");
    assert_eq!(store.texts(), vec!["buy milk", "walk dog"]);

    let removed = store.remove_task(0).unwrap();
    assert_eq!(removed.text, "buy milk");
    assert_eq!(store.texts(), vec!["walk dog"]);
}

#[test]
fn remove_from_empty_list_fails() {
    let mut store = TodoListStore::new();
    assert_eq!(
        store.remove_task(0),
        Err(TodoListError::OutOfRange { index: 0, len: 0 })
    );
    assert!(store.is_empty());
}

#[test]
fn shared_generator_keeps_ids_distinct() {
    let ids = Arc::new(SequentialIdGenerator::new());
    let mut first = TodoListStore::with_id_generator(Arc::clone(&ids) as _);
    let mut second = TodoListStore::with_id_generator(ids);

    let a = first.add_task("same");
    let b = second.add_task("same");
    let c = first.add_task("same");

    assert_ne!(a.id, b.id);
    assert_ne!(a.id, c.id);
}

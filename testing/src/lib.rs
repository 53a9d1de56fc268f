//! # Composable Todo Testing
//!
//! Testing utilities and helpers for reducer-driven state.
//!
//! This crate provides:
//! - Predictable implementations of Environment traits
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Property-based testing strategies
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use composable_todo_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::default())
//!     .given_state(TodoState::default())
//!     .when_action(TodoAction::UpdateNewTask("buy milk".into()))
//!     .then_state(|state| assert_eq!(state.new_task, "buy milk"))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use composable_todo_core::environment::IdGenerator;
use composable_todo_core::Uuid;


pub use reducer_test::{assertions, ReducerTest};

/// Predictable implementations of Environment traits
pub mod mocks {
    use super::{IdGenerator, Uuid};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Id generator that counts up from a starting value
    ///
    /// Ids are `Uuid::from_u128(n)` for `n = start, start + 1, ...`, which
    /// makes them easy to assert on while still never repeating.
    ///
    /// # Example
    ///
    /// ```
    /// use composable_todo_testing::mocks::SequentialIdGenerator;
    /// use composable_todo_core::{environment::IdGenerator, Uuid};
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.generate(), Uuid::from_u128(1));
    /// assert_eq!(ids.generate(), Uuid::from_u128(2));
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start counting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start counting at `start`
        #[must_use]
        pub const fn starting_at(start: u64) -> Self {
            Self {
                next: AtomicU64::new(start),
            }
        }

        /// The value the next generated id will carry
        #[must_use]
        pub fn peek(&self) -> u64 {
            self.next.load(Ordering::SeqCst)
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn generate(&self) -> Uuid {
            Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst)))
        }
    }
}

/// Property-based testing strategies
pub mod properties {
    use proptest::prelude::*;

    /// Arbitrary task text, including empty and whitespace-only strings
    pub fn task_text() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[ \t]{1,4}",
            "[a-zA-Z0-9 ]{1,24}",
            any::<String>(),
        ]
    }

    /// A sequence of up to `max_len` task texts
    pub fn task_texts(max_len: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(task_text(), 0..=max_len)
    }

    /// A non-empty list of texts together with a valid position into it
    pub fn texts_with_index(max_len: usize) -> impl Strategy<Value = (Vec<String>, usize)> {
        prop::collection::vec(task_text(), 1..=max_len.max(1)).prop_flat_map(|texts| {
            let len = texts.len();
            (Just(texts), 0..len)
        })
    }
}

// Re-export commonly used items
pub use mocks::SequentialIdGenerator;

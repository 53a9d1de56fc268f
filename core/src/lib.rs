//! # Composable Todo Core
//!
//! Core traits and types shared by every presentation style of the todo list.
//!
//! The todo list is a tiny state machine: an ordered list of tasks that can be
//! appended to and removed from by position. This crate holds the pieces that
//! are independent of any particular screen wiring:
//!
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Descriptions of follow-up work (not execution)
//! - **Environment**: Injected dependencies, here the task id generator
//!
//! ## Example
//!
//! ```
//! use composable_todo_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Default)]
//! struct CountState {
//!     count: usize,
//! }
//!
//! enum CountAction {
//!     Bump,
//! }
//!
//! struct CountReducer;
//!
//! impl Reducer for CountReducer {
//!     type State = CountState;
//!     type Action = CountAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CountState,
//!         action: CountAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CountAction>; 4]> {
//!         match action {
//!             CountAction::Bump => state.count += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = CountState::default();
//! let effects = CountReducer.reduce(&mut state, CountAction::Bump, &());
//! assert_eq!(state.count, 1);
//! assert!(effects.is_empty());
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};
pub use uuid::Uuid;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all transition logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the store
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Follow-up work descriptions
///
/// Effects are values returned from reducers. The store decides when to run
/// them; reducers never perform them directly.
pub mod effect {
    /// Effect type - describes work to perform after a reduction
    ///
    /// Every effect is synchronous. A store processes the effects of one
    /// action completely before `send` returns.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Feed an action back into the store once the current reduction
        /// has been applied and observers have been notified
        Dispatch(Box<Action>),

        /// Run effects in order
        Sequential(Vec<Effect<Action>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Dispatch(action) => {
                    f.debug_tuple("Effect::Dispatch").field(action).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Describe dispatching a single action
        #[must_use]
        pub fn dispatch(action: Action) -> Effect<Action> {
            Effect::Dispatch(Box::new(action))
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing when run
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Dispatch(_) => false,
                Effect::Sequential(effects) => effects.iter().all(Effect::is_none),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// External sources of non-determinism are abstracted behind traits and
/// injected, so tests can substitute predictable implementations.
pub mod environment {
    use uuid::Uuid;

    /// Source of unique task identifiers
    ///
    /// Implementations must never hand out the same id twice. A list that
    /// draws an id it already holds asks again a bounded number of times,
    /// then switches to random ids.
    ///
    /// # Examples
    ///
    /// ```
    /// use composable_todo_core::environment::{IdGenerator, RandomIdGenerator};
    ///
    /// let ids = RandomIdGenerator;
    /// assert_ne!(ids.generate(), ids.generate());
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn generate(&self) -> Uuid;
    }

    /// Production id generator backed by random (v4) UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIdGenerator;

    impl IdGenerator for RandomIdGenerator {
        fn generate(&self) -> Uuid {
            Uuid::new_v4()
        }
    }
}

//! # Composable Todo Runtime
//!
//! Runtime implementation for reducer-driven state.
//!
//! This crate provides the [`Store`] that coordinates reducer execution,
//! observer notification and effect feedback.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state and runs the reducer for each action
//! - **Observers**: Non-owning callbacks re-run after every state change
//! - **Action broadcast**: Every processed action is published to subscribers
//!
//! Everything is synchronous: when [`Store::send`] returns, the action, all
//! of its feedback actions and every observer notification have completed.
//!
//! ## Example
//!
//! ```ignore
//! use composable_todo_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! let _subscription = store.observe(|state| render(state));
//! store.send(Action::DoSomething)?;
//!
//! let value = store.state(|s| s.some_field);
//! ```

use composable_todo_core::{effect::Effect, reducer::Reducer};
use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// A chain of `Effect::Dispatch` feedback grew past the configured limit
        ///
        /// Actions already processed stay applied; the remaining queued
        /// feedback actions are discarded.
        #[error("Effect feedback exceeded {0} dispatched actions")]
        FeedbackLimitExceeded(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use composable_todo_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_max_feedback_depth(8)
///     .with_broadcast_capacity(64);
/// assert_eq!(config.max_feedback_depth, 8);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of feedback actions a single `send` may process
    ///
    /// Never below one: a command must always be able to dispatch its
    /// notification.
    pub max_feedback_depth: usize,
    /// Number of actions buffered for each action subscriber
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(max_feedback_depth: usize, broadcast_capacity: usize) -> Self {
        Self {
            max_feedback_depth: at_least_one(max_feedback_depth),
            broadcast_capacity,
        }
    }

    /// Set the feedback depth limit
    ///
    /// A depth of zero is raised to one.
    #[must_use]
    pub const fn with_max_feedback_depth(mut self, depth: usize) -> Self {
        self.max_feedback_depth = at_least_one(depth);
        self
    }

    /// Set the action broadcast capacity
    ///
    /// A capacity of zero is raised to one, the smallest channel tokio accepts.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

const fn at_least_one(value: usize) -> usize {
    if value == 0 { 1 } else { value }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_feedback_depth: 64,
            broadcast_capacity: 16,
        }
    }
}

/// A registered observer callback.
struct ObserverSlot<S> {
    callback: Box<dyn Fn(&S) + Send + Sync>,
}

/// Registration handle returned by [`Store::observe`]
///
/// The store only keeps a weak reference to the observer. Dropping the
/// subscription unregisters it before the next notification.
#[must_use = "dropping a Subscription immediately unregisters the observer"]
pub struct Subscription {
    _slot: Arc<dyn Any + Send + Sync>,
}

impl Subscription {
    /// Explicitly stop observing (same as dropping the handle)
    pub fn cancel(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Store module - The runtime coordinator
pub mod store {
    use super::{
        Any, Arc, Effect, Mutex, ObserverSlot, PoisonError, Reducer, RwLock, StoreConfig,
        StoreError, Subscription, VecDeque, Weak,
    };
    use tokio::sync::broadcast;

    type ObserverList<S> = Arc<Mutex<Vec<Weak<ObserverSlot<S>>>>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind an `RwLock`; clones of a store share it)
    /// 2. Reducer (transition logic)
    /// 3. Environment (injected dependencies)
    /// 4. Observers and the action broadcast
    ///
    /// Each call to [`send`](Store::send) is applied atomically: the reducer
    /// runs under the write lock and observers only ever see fully-applied
    /// state.
    ///
    /// Observers run after the write lock is released. Actions sent from one
    /// thread are observed in order, but when clones of a store send from
    /// several threads at once, an observer may receive an older snapshot
    /// after a newer one. Read [`state`](Store::state) inside the callback
    /// when only the latest state matters.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        observers: ObserverList<S>,
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        S: Clone + Send + Sync + 'static,
        A: Clone + std::fmt::Debug,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            mut config: StoreConfig,
        ) -> Self {
            // The fields are public, so a literal may still carry zeros
            config.max_feedback_depth = config.max_feedback_depth.max(1);
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                observers: Arc::new(Mutex::new(Vec::new())),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer, notifies observers, broadcasts the action and then
        /// processes any `Effect::Dispatch` feedback in FIFO order, each
        /// feedback action going through the same cycle.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] when more than
        /// `max_feedback_depth` feedback actions are produced.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) -> Result<(), StoreError> {
            let mut pending = VecDeque::from([action]);
            let mut feedback = 0_usize;
            let mut first = true;

            while let Some(action) = pending.pop_front() {
                if !first {
                    feedback += 1;
                    if feedback > self.config.max_feedback_depth {
                        tracing::warn!(
                            limit = self.config.max_feedback_depth,
                            discarded = pending.len() + 1,
                            "Effect feedback limit exceeded"
                        );
                        return Err(StoreError::FeedbackLimitExceeded(
                            self.config.max_feedback_depth,
                        ));
                    }
                }
                first = false;

                tracing::debug!(?action, "Processing action");
                metrics::counter!("store.actions.total").increment(1);

                let (effects, snapshot) = self.reduce(action.clone());
                if let Some(snapshot) = snapshot {
                    self.notify(&snapshot);
                }

                // No receivers is fine
                let _ = self.action_broadcast.send(action);

                for effect in effects {
                    enqueue(effect, &mut pending);
                }
            }

            Ok(())
        }

        /// Run the reducer under the write lock.
        ///
        /// Returns a copy of the new state only when someone is observing.
        fn reduce(&self, action: A) -> (Vec<Effect<A>>, Option<S>) {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            tracing::trace!("Reducer completed, returned {} effects", effects.len());

            let snapshot = self.has_observers().then(|| state.clone());
            (effects.into_vec(), snapshot)
        }

        fn has_observers(&self) -> bool {
            self.observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .any(|observer| observer.strong_count() > 0)
        }

        /// Call every live observer in registration order, pruning dead ones.
        ///
        /// No lock is held while callbacks run, so observers may send actions.
        fn notify(&self, snapshot: &S) {
            let live: Vec<Arc<ObserverSlot<S>>> = {
                let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
                observers.retain(|observer| observer.strong_count() > 0);
                observers.iter().filter_map(Weak::upgrade).collect()
            };

            metrics::counter!("store.observers.notified")
                .increment(u64::try_from(live.len()).unwrap_or(u64::MAX));

            for observer in live {
                (observer.callback)(snapshot);
            }
        }

        /// Register a callback run with the new state after every action
        ///
        /// The store holds the callback weakly; keep the returned
        /// [`Subscription`] alive for as long as notifications are wanted.
        pub fn observe<F>(&self, callback: F) -> Subscription
        where
            F: Fn(&S) + Send + Sync + 'static,
        {
            let slot = Arc::new(ObserverSlot {
                callback: Box::new(callback),
            });
            self.observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Arc::downgrade(&slot));

            let slot: Arc<dyn Any + Send + Sync> = slot;
            Subscription { _slot: slot }
        }

        /// Number of observers whose subscription is still alive
        #[must_use]
        pub fn observer_count(&self) -> usize {
            self.observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|observer| observer.strong_count() > 0)
                .count()
        }

        /// Subscribe to every action processed by this store
        ///
        /// Includes actions sent directly and actions fed back by effects.
        /// A receiver that falls more than `broadcast_capacity` actions behind
        /// observes `RecvError::Lagged`.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let task_count = store.state(|s| s.tasks.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&state)
        }

        /// The environment this store was built with
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }
    }

    /// Flatten an effect into the pending action queue, preserving order.
    fn enqueue<A>(effect: Effect<A>, pending: &mut VecDeque<A>) {
        match effect {
            Effect::None => {},
            Effect::Dispatch(action) => pending.push_back(*action),
            Effect::Sequential(effects) => {
                for effect in effects {
                    enqueue(effect, pending);
                }
            },
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config.clone(),
                observers: Arc::clone(&self.observers),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use composable_todo_core::{smallvec, SmallVec};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast::error::TryRecvError;

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
        IncrementTwiceLater,
        ChainedFeedback,
        Loop,
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Decrement => {
                    state.value -= 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => SmallVec::new(),
                TestAction::IncrementTwiceLater => smallvec![
                    Effect::dispatch(TestAction::Increment),
                    Effect::dispatch(TestAction::Increment),
                ],
                TestAction::ChainedFeedback => smallvec![Effect::chain(vec![
                    Effect::dispatch(TestAction::Increment),
                    Effect::None,
                    Effect::dispatch(TestAction::Decrement),
                    Effect::dispatch(TestAction::Increment),
                ])],
                TestAction::Loop => {
                    state.value += 1;
                    smallvec![Effect::dispatch(TestAction::Loop)]
                },
            }
        }
    }

    fn new_store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv)
    }

    #[test]
    fn test_store_creation() {
        let store = new_store();
        assert_eq!(store.state(|s| s.value), 0);
    }

    #[test]
    fn test_send_action() {
        let store = new_store();
        store.send(TestAction::Increment).unwrap();
        assert_eq!(store.state(|s| s.value), 1);
    }

    #[test]
    fn test_multiple_actions() {
        let store = new_store();
        store.send(TestAction::Increment).unwrap();
        store.send(TestAction::Increment).unwrap();
        store.send(TestAction::Decrement).unwrap();
        assert_eq!(store.state(|s| s.value), 1);
    }

    #[test]
    fn test_effect_none() {
        let store = new_store();
        store.send(TestAction::NoOp).unwrap();
        assert_eq!(store.state(|s| s.value), 0);
    }

    #[test]
    fn test_dispatch_feedback_runs_before_send_returns() {
        let store = new_store();
        store.send(TestAction::IncrementTwiceLater).unwrap();
        assert_eq!(store.state(|s| s.value), 2);
    }

    #[test]
    fn test_sequential_feedback_order() {
        let store = new_store();
        let mut rx = store.subscribe_actions();

        store.send(TestAction::ChainedFeedback).unwrap();
        assert_eq!(store.state(|s| s.value), 1);

        let mut seen = Vec::new();
        while let Ok(action) = rx.try_recv() {
            seen.push(action);
        }
        assert_eq!(
            seen,
            vec![
                TestAction::ChainedFeedback,
                TestAction::Increment,
                TestAction::Decrement,
                TestAction::Increment,
            ]
        );
    }

    #[test]
    fn test_feedback_limit() {
        let config = StoreConfig::default().with_max_feedback_depth(5);
        let store = Store::with_config(TestState { value: 0 }, TestReducer, TestEnv, config);

        let result = store.send(TestAction::Loop);
        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded(5)));
        // Initial action plus five feedback actions were applied
        assert_eq!(store.state(|s| s.value), 6);
    }

    #[test]
    fn test_observers_notified_in_order() {
        let store = new_store();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first_log = Arc::clone(&log);
        let _first = store.observe(move |s: &TestState| {
            first_log.lock().unwrap().push(("first", s.value));
        });
        let second_log = Arc::clone(&log);
        let _second = store.observe(move |s: &TestState| {
            second_log.lock().unwrap().push(("second", s.value));
        });

        store.send(TestAction::Increment).unwrap();

        assert_eq!(*log.lock().unwrap(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn test_dropped_subscription_stops_notifications() {
        let store = new_store();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let subscription = store.observe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.observer_count(), 1);

        store.send(TestAction::Increment).unwrap();
        subscription.cancel();
        store.send(TestAction::Increment).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn test_observer_sees_each_feedback_step() {
        let store = new_store();
        let values = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&values);
        let _subscription = store.observe(move |s: &TestState| {
            seen.lock().unwrap().push(s.value);
        });

        store.send(TestAction::IncrementTwiceLater).unwrap();
        assert_eq!(*values.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_observer_may_send() {
        let store = new_store();
        let inner = store.clone();
        let _subscription = store.observe(move |s: &TestState| {
            if s.value < 3 {
                inner.send(TestAction::Increment).unwrap();
            }
        });

        store.send(TestAction::Increment).unwrap();
        assert_eq!(store.state(|s| s.value), 3);
    }

    #[test]
    fn test_store_clone_shares_state() {
        let store1 = new_store();
        let store2 = store1.clone();

        store1.send(TestAction::Increment).unwrap();
        assert_eq!(store2.state(|s| s.value), 1);

        store2.send(TestAction::Increment).unwrap();
        assert_eq!(store1.state(|s| s.value), 2);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ok() {
        let store = new_store();
        assert!(store.send(TestAction::Increment).is_ok());

        let mut rx = store.subscribe_actions();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_subscribe_actions_async() {
        let store = new_store();
        let mut rx = store.subscribe_actions();

        store.send(TestAction::Decrement).unwrap();

        assert_eq!(rx.recv().await.unwrap(), TestAction::Decrement);
    }

    #[test]
    fn test_concurrent_sends() {
        let store = new_store();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.send(TestAction::Increment))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(store.state(|s| s.value), 10);
    }

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.max_feedback_depth, 64);
        assert_eq!(config.broadcast_capacity, 16);

        let custom = StoreConfig::new(1, 2).with_broadcast_capacity(32);
        assert_eq!(custom.max_feedback_depth, 1);
        assert_eq!(custom.broadcast_capacity, 32);
    }

    #[test]
    fn test_zero_feedback_depth_still_allows_one_dispatch() {
        assert_eq!(StoreConfig::new(0, 16).max_feedback_depth, 1);
        assert_eq!(StoreConfig::default().with_max_feedback_depth(0).max_feedback_depth, 1);

        let literal = StoreConfig {
            max_feedback_depth: 0,
            broadcast_capacity: 16,
        };
        let store = Store::with_config(TestState { value: 0 }, TestReducer, TestEnv, literal);

        // The first action and one feedback action are applied
        assert_eq!(store.send(TestAction::Loop), Err(StoreError::FeedbackLimitExceeded(1)));
        assert_eq!(store.state(|s| s.value), 2);
    }

    #[test]
    fn test_observers_notified_counter() {
        use metrics::{
            Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
        };
        use std::sync::atomic::AtomicU64;

        struct NotifiedRecorder {
            notified: Arc<AtomicU64>,
        }

        impl Recorder for NotifiedRecorder {
            fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
            fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
            fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

            fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
                if key.name() == "store.observers.notified" {
                    Counter::from_arc(Arc::clone(&self.notified))
                } else {
                    Counter::noop()
                }
            }

            fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
                Gauge::noop()
            }

            fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
                Histogram::noop()
            }
        }

        let recorder = NotifiedRecorder {
            notified: Arc::new(AtomicU64::new(0)),
        };

        metrics::with_local_recorder(&recorder, || {
            let store = new_store();
            let _first = store.observe(|_| {});
            let _second = store.observe(|_| {});

            store.send(TestAction::Increment).unwrap();
            store.send(TestAction::Increment).unwrap();
        });

        // Two observers notified on each of two sends
        assert_eq!(recorder.notified.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_concurrent_sends_notify_once_per_action() {
        let store = new_store();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        let _subscription = store.observe(move |s: &TestState| {
            log.lock().unwrap().push(s.value);
        });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.send(TestAction::Increment))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        // Delivery order across threads is not fixed; each applied state is
        // delivered exactly once.
        let mut values = seen.lock().unwrap().clone();
        values.sort_unstable();
        assert_eq!(values, (1..=8).collect::<Vec<_>>());
    }
}

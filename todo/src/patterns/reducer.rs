//! Reducer-driven screen (TCA).
//!
//! State and actions are plain data; [`TodoReducer`] is the only code that
//! changes the list. Commands that succeed or fail dispatch a notification
//! action back through the store, which is how the screen learns the
//! outcome of each command.

use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::{TaskRecord, TodoListError};
use crate::view::{RecordingView, TodoView};
use composable_todo_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use composable_todo_runtime::{Store, StoreConfig, Subscription};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// State of the todo feature
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// The list
    pub tasks: TodoListStore,
    /// Text input contents
    pub new_task: String,
    /// Error from the last failed command, cleared by the next success
    pub last_error: Option<TodoListError>,
}

impl TodoState {
    /// State over an existing list with an empty input
    #[must_use]
    pub fn new(tasks: TodoListStore) -> Self {
        Self {
            tasks,
            new_task: String::new(),
            last_error: None,
        }
    }
}

/// Actions of the todo feature
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // Commands
    /// The text input changed
    UpdateNewTask(String),
    /// "Add" was pressed
    AddTask,
    /// Rows at these offsets were deleted
    RemoveTasks(Vec<usize>),

    // Notifications
    /// A task was appended
    TaskAdded(TaskRecord),
    /// Tasks were removed, in ascending position order
    TasksRemoved(Vec<TaskRecord>),
    /// The input was refused by the empty-input policy
    InputRejected,
    /// A removal was refused; the list is unchanged
    RemoveFailed(TodoListError),
}

/// Environment for the todo reducer
#[derive(Clone, Copy, Debug)]
pub struct TodoEnvironment {
    /// Empty-input policy applied to `AddTask`
    pub policy: InputPolicy,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub const fn new(policy: InputPolicy) -> Self {
        Self { policy }
    }
}

/// Reducer for the todo feature
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::UpdateNewTask(text) => {
                state.new_task = text;
                SmallVec::new()
            },

            TodoAction::AddTask => {
                if !env.policy.accepts(&state.new_task) {
                    return smallvec![Effect::dispatch(TodoAction::InputRejected)];
                }

                let text = std::mem::take(&mut state.new_task);
                let record = state.tasks.add_task(text);
                state.last_error = None;

                smallvec![Effect::dispatch(TodoAction::TaskAdded(record))]
            },

            TodoAction::RemoveTasks(offsets) => match state.tasks.remove_tasks(&offsets) {
                Ok(removed) => {
                    state.last_error = None;
                    smallvec![Effect::dispatch(TodoAction::TasksRemoved(removed))]
                },
                Err(error) => {
                    state.last_error = Some(error.clone());
                    smallvec![Effect::dispatch(TodoAction::RemoveFailed(error))]
                },
            },

            // ========== Notifications ==========
            TodoAction::TaskAdded(_)
            | TodoAction::TasksRemoved(_)
            | TodoAction::InputRejected
            | TodoAction::RemoveFailed(_) => SmallVec::new(),
        }
    }
}

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Screen rendering a reducer store
///
/// The view is re-rendered by a store observer after every action; the
/// screen itself never touches the view after construction.
pub struct ReducerTodoView<V: TodoView> {
    store: TodoStore,
    view: Arc<Mutex<V>>,
    _subscription: Subscription,
}

impl<V: TodoView + Send + 'static> ReducerTodoView<V> {
    /// Creates the store over `tasks` and binds `view` to it
    pub fn new(view: V, tasks: TodoListStore, policy: InputPolicy, config: StoreConfig) -> Self {
        let store = Store::with_config(
            TodoState::new(tasks),
            TodoReducer::new(),
            TodoEnvironment::new(policy),
            config,
        );

        let view = Arc::new(Mutex::new(view));
        store.state(|state| lock(&view).reload(state.tasks.as_slice()));

        let bound = Arc::clone(&view);
        let subscription = store.observe(move |state: &TodoState| {
            lock(&bound).reload(state.tasks.as_slice());
        });

        Self {
            store,
            view,
            _subscription: subscription,
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Send `action` and return the notification it produced, if any.
    fn dispatch(&self, action: TodoAction) -> Result<Option<TodoAction>, ScreenError> {
        let mut actions = self.store.subscribe_actions();
        self.store.send(action)?;
        Ok(last_notification(&mut actions))
    }
}

fn lock<V>(view: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drain `actions`, keeping the last notification seen.
///
/// A lagging receiver still ends on the newest action, which for a single
/// command is its notification.
fn last_notification(actions: &mut broadcast::Receiver<TodoAction>) -> Option<TodoAction> {
    let mut outcome = None;
    loop {
        match actions.try_recv() {
            Ok(
                action @ (TodoAction::TaskAdded(_)
                | TodoAction::TasksRemoved(_)
                | TodoAction::InputRejected
                | TodoAction::RemoveFailed(_)),
            ) => outcome = Some(action),
            Ok(_) => {},
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Action receiver lagged");
            },
            Err(TryRecvError::Empty | TryRecvError::Closed) => return outcome,
        }
    }
}

impl TodoScreen for ReducerTodoView<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::Tca
    }

    fn policy(&self) -> InputPolicy {
        self.store.environment().policy
    }

    fn set_draft(&mut self, text: &str) {
        // UpdateNewTask never dispatches feedback, so send cannot fail
        if let Err(error) = self.store.send(TodoAction::UpdateNewTask(text.to_string())) {
            tracing::error!(%error, "Failed to update input");
        }
    }

    fn draft(&self) -> String {
        self.store.state(|state| state.new_task.clone())
    }

    fn submit(&mut self) -> Result<Option<TaskRecord>, ScreenError> {
        match self.dispatch(TodoAction::AddTask)? {
            Some(TodoAction::TaskAdded(record)) => Ok(Some(record)),
            Some(TodoAction::InputRejected) => Ok(None),
            _ => Err(ScreenError::MissingOutcome("AddTask")),
        }
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        self.delete_offsets(&[index])?
            .pop()
            .ok_or(ScreenError::MissingOutcome("RemoveTasks"))
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        match self.dispatch(TodoAction::RemoveTasks(offsets.to_vec()))? {
            Some(TodoAction::TasksRemoved(removed)) => Ok(removed),
            Some(TodoAction::RemoveFailed(error)) => Err(error.into()),
            _ => Err(ScreenError::MissingOutcome("RemoveTasks")),
        }
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.store.state(|state| state.tasks.snapshot())
    }

    fn rows(&self) -> Vec<String> {
        lock(&self.view).rows().to_vec()
    }
}

//! Reactive adapters.
//!
//! The list is published through a `tokio::sync::watch` channel, which plays
//! the part of a behavior relay: it always holds the latest snapshot and
//! every subscriber sees the current value on subscription. The view is
//! bound to a receiver and re-renders whenever that receiver reports a
//! change.
//!
//! The relay variant drives a bare [`TaskRelay`]; the view-model variant goes
//! through [`RxTodoViewModel`] inputs and outputs.

use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::{TaskRecord, TodoListError};
use crate::view::{RecordingView, TodoView};
use tokio::sync::watch;

/// Task list paired with a watch channel carrying its latest snapshot
#[derive(Debug)]
pub struct TaskRelay {
    tasks: TodoListStore,
    sender: watch::Sender<Vec<TaskRecord>>,
}

impl TaskRelay {
    /// Creates a relay seeded with the current contents of `tasks`
    #[must_use]
    pub fn new(tasks: TodoListStore) -> Self {
        let (sender, _) = watch::channel(tasks.snapshot());
        Self { tasks, sender }
    }

    /// Latest published snapshot
    #[must_use]
    pub fn value(&self) -> Vec<TaskRecord> {
        self.sender.borrow().clone()
    }

    /// Subscribe to snapshots; the current one is already visible
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<TaskRecord>> {
        self.sender.subscribe()
    }

    /// Append a task and publish
    pub fn accept_new(&mut self, text: &str) -> TaskRecord {
        let record = self.tasks.add_task(text);
        self.publish();
        record
    }

    /// Remove the task at `index` and publish
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`]; nothing is published on error.
    pub fn accept_removal(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        let record = self.tasks.remove_task(index)?;
        self.publish();
        Ok(record)
    }

    /// Remove the tasks at `offsets` and publish
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`]; nothing is published on error.
    pub fn accept_removals(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        let removed = self.tasks.remove_tasks(offsets)?;
        self.publish();
        Ok(removed)
    }

    fn publish(&self) {
        // Replacing keeps the value even with no receivers alive
        self.sender.send_replace(self.tasks.snapshot());
    }
}

/// View model with push-style inputs and a snapshot stream output
#[derive(Debug)]
pub struct RxTodoViewModel {
    relay: TaskRelay,
}

impl RxTodoViewModel {
    /// Creates a view model over `tasks`
    #[must_use]
    pub fn new(tasks: TodoListStore) -> Self {
        Self {
            relay: TaskRelay::new(tasks),
        }
    }

    /// Output: the task list stream
    #[must_use]
    pub fn tasks(&self) -> watch::Receiver<Vec<TaskRecord>> {
        self.relay.subscribe()
    }

    /// Input: add a task
    pub fn add_task(&mut self, text: &str) -> TaskRecord {
        self.relay.accept_new(text)
    }

    /// Input: remove the task at `index`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`].
    pub fn remove_task_at(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        self.relay.accept_removal(index)
    }

    /// Input: remove the tasks at `offsets`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`].
    pub fn remove_tasks_at(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        self.relay.accept_removals(offsets)
    }
}

#[derive(Debug)]
enum Source {
    Relay(TaskRelay),
    ViewModel(RxTodoViewModel),
}

impl Source {
    fn add(&mut self, text: &str) -> TaskRecord {
        match self {
            Self::Relay(relay) => relay.accept_new(text),
            Self::ViewModel(view_model) => view_model.add_task(text),
        }
    }

    fn remove(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        match self {
            Self::Relay(relay) => relay.accept_removal(index),
            Self::ViewModel(view_model) => view_model.remove_task_at(index),
        }
    }

    fn remove_all(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        match self {
            Self::Relay(relay) => relay.accept_removals(offsets),
            Self::ViewModel(view_model) => view_model.remove_tasks_at(offsets),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Vec<TaskRecord>> {
        match self {
            Self::Relay(relay) => relay.subscribe(),
            Self::ViewModel(view_model) => view_model.tasks(),
        }
    }
}

/// Controller whose view is bound to a snapshot stream
#[derive(Debug)]
pub struct RxTodoController<V: TodoView> {
    source: Source,
    binding: watch::Receiver<Vec<TaskRecord>>,
    view: V,
    draft: String,
    policy: InputPolicy,
}

impl<V: TodoView> RxTodoController<V> {
    /// Controller driving a relay directly
    pub fn bound_to_relay(view: V, tasks: TodoListStore, policy: InputPolicy) -> Self {
        Self::bind(view, Source::Relay(TaskRelay::new(tasks)), policy)
    }

    /// Controller driving a view model
    pub fn bound_to_view_model(view: V, tasks: TodoListStore, policy: InputPolicy) -> Self {
        Self::bind(view, Source::ViewModel(RxTodoViewModel::new(tasks)), policy)
    }

    fn bind(view: V, source: Source, policy: InputPolicy) -> Self {
        let mut binding = source.subscribe();
        binding.mark_changed();

        let mut controller = Self {
            source,
            binding,
            view,
            draft: String::new(),
            policy,
        };
        controller.sync_view();
        controller
    }

    /// Render the bound snapshot if it changed since the last render.
    fn sync_view(&mut self) {
        if self.binding.has_changed().unwrap_or(false) {
            let tasks = self.binding.borrow_and_update();
            self.view.reload(&tasks);
        }
    }
}

impl TodoScreen for RxTodoController<RecordingView> {
    fn architecture(&self) -> Architecture {
        match self.source {
            Source::Relay(_) => Architecture::Rx,
            Source::ViewModel(_) => Architecture::RxMvvm,
        }
    }

    fn policy(&self) -> InputPolicy {
        self.policy
    }

    fn set_draft(&mut self, text: &str) {
        text.clone_into(&mut self.draft);
    }

    fn draft(&self) -> String {
        self.draft.clone()
    }

    fn submit(&mut self) -> Result<Option<TaskRecord>, ScreenError> {
        if !self.policy.accepts(&self.draft) {
            return Ok(None);
        }

        let text = std::mem::take(&mut self.draft);
        let record = self.source.add(&text);
        self.view.clear_input();
        self.sync_view();
        Ok(Some(record))
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        let record = self.source.remove(index)?;
        self.sync_view();
        Ok(record)
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        let removed = self.source.remove_all(offsets)?;
        self.sync_view();
        Ok(removed)
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.binding.borrow().clone()
    }

    fn rows(&self) -> Vec<String> {
        self.view.rows().to_vec()
    }
}

//! Model-View-ViewModel, imperative and observed.
//!
//! [`TodoViewModel`] owns the list and the pending input. Two screens sit on
//! top of it:
//!
//! - [`MvvmTodoController`] calls the view model and reloads its view by hand.
//! - [`ObservedTodoView`] registers an observer and re-renders whenever the
//!   view model publishes a change.

use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::{TaskRecord, TodoListError};
use crate::view::{RecordingView, TodoView};
use std::cell::RefCell;
use std::rc::Rc;

type ChangeObserver = Box<dyn FnMut(&[TaskRecord])>;

/// View model holding the task list and the text being typed
pub struct TodoViewModel {
    tasks: TodoListStore,
    new_task: String,
    observers: Vec<ChangeObserver>,
}

impl TodoViewModel {
    /// Creates a view model over `tasks`
    #[must_use]
    pub fn new(tasks: TodoListStore) -> Self {
        Self {
            tasks,
            new_task: String::new(),
            observers: Vec::new(),
        }
    }

    /// Call `observer` with the list after every change
    pub fn on_change(&mut self, observer: impl FnMut(&[TaskRecord]) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current list
    #[must_use]
    pub fn tasks(&self) -> &[TaskRecord] {
        self.tasks.as_slice()
    }

    /// Pending input text
    #[must_use]
    pub fn new_task(&self) -> &str {
        &self.new_task
    }

    /// Replace the pending input text
    pub fn set_new_task(&mut self, text: &str) {
        text.clone_into(&mut self.new_task);
    }

    /// Add `text` as a task
    pub fn add(&mut self, text: &str) -> TaskRecord {
        let record = self.tasks.add_task(text);
        self.publish();
        record
    }

    /// Add the pending input as a task and clear it
    pub fn add_task(&mut self) -> TaskRecord {
        let text = std::mem::take(&mut self.new_task);
        self.add(&text)
    }

    /// Remove the task at `index`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] for an invalid position.
    pub fn remove(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        let record = self.tasks.remove_task(index)?;
        self.publish();
        Ok(record)
    }

    /// Remove the tasks at `offsets`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] if any offset is invalid.
    pub fn remove_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        let removed = self.tasks.remove_tasks(offsets)?;
        self.publish();
        Ok(removed)
    }

    fn publish(&mut self) {
        let tasks = self.tasks.as_slice();
        for observer in &mut self.observers {
            observer(tasks);
        }
    }
}

impl std::fmt::Debug for TodoViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoViewModel")
            .field("tasks", &self.tasks)
            .field("new_task", &self.new_task)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// UIKit-style MVVM: the controller reloads the view after each call
#[derive(Debug)]
pub struct MvvmTodoController<V: TodoView> {
    view_model: TodoViewModel,
    view: V,
    policy: InputPolicy,
}

impl<V: TodoView> MvvmTodoController<V> {
    /// Creates the controller and renders the initial list
    pub fn new(view: V, tasks: TodoListStore, policy: InputPolicy) -> Self {
        let mut controller = Self {
            view_model: TodoViewModel::new(tasks),
            view,
            policy,
        };
        controller.view.reload(controller.view_model.tasks());
        controller
    }

    /// The view model
    pub const fn view_model(&self) -> &TodoViewModel {
        &self.view_model
    }
}

impl TodoScreen for MvvmTodoController<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::Mvvm
    }

    fn policy(&self) -> InputPolicy {
        self.policy
    }

    fn set_draft(&mut self, text: &str) {
        self.view_model.set_new_task(text);
    }

    fn draft(&self) -> String {
        self.view_model.new_task().to_string()
    }

    fn submit(&mut self) -> Result<Option<TaskRecord>, ScreenError> {
        if !self.policy.accepts(self.view_model.new_task()) {
            return Ok(None);
        }
        let record = self.view_model.add_task();
        self.view.reload(self.view_model.tasks());
        self.view.clear_input();
        Ok(Some(record))
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        let record = self.view_model.remove(index)?;
        self.view.delete_row(index, self.view_model.tasks());
        Ok(record)
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        let removed = self.view_model.remove_offsets(offsets)?;
        self.view.reload(self.view_model.tasks());
        Ok(removed)
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.view_model.tasks().to_vec()
    }

    fn rows(&self) -> Vec<String> {
        self.view.rows().to_vec()
    }
}

/// Declarative MVVM: the view re-renders from view model notifications
pub struct ObservedTodoView<V: TodoView> {
    view_model: TodoViewModel,
    view: Rc<RefCell<V>>,
    policy: InputPolicy,
}

impl<V: TodoView + 'static> ObservedTodoView<V> {
    /// Binds `view` to `view_model` and renders the initial list
    pub fn new(view: V, mut view_model: TodoViewModel, policy: InputPolicy) -> Self {
        let view = Rc::new(RefCell::new(view));
        view.borrow_mut().reload(view_model.tasks());

        let bound = Rc::clone(&view);
        view_model.on_change(move |tasks| bound.borrow_mut().reload(tasks));

        Self {
            view_model,
            view,
            policy,
        }
    }
}

impl<V: TodoView> std::fmt::Debug for ObservedTodoView<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservedTodoView")
            .field("view_model", &self.view_model)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl TodoScreen for ObservedTodoView<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::SwiftUiMvvm
    }

    fn policy(&self) -> InputPolicy {
        self.policy
    }

    fn set_draft(&mut self, text: &str) {
        self.view_model.set_new_task(text);
    }

    fn draft(&self) -> String {
        self.view_model.new_task().to_string()
    }

    fn submit(&mut self) -> Result<Option<TaskRecord>, ScreenError> {
        if !self.policy.accepts(self.view_model.new_task()) {
            return Ok(None);
        }
        Ok(Some(self.view_model.add_task()))
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        Ok(self.view_model.remove(index)?)
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        Ok(self.view_model.remove_offsets(offsets)?)
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.view_model.tasks().to_vec()
    }

    fn rows(&self) -> Vec<String> {
        self.view.borrow().rows().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn view_model_publishes_each_change() {
        let mut view_model = TodoViewModel::new(TodoListStore::new());
        let lengths = Rc::new(RefCell::new(Vec::new()));

        let seen = Rc::clone(&lengths);
        view_model.on_change(move |tasks| seen.borrow_mut().push(tasks.len()));

        view_model.add("a");
        view_model.add("b");
        view_model.remove(0).unwrap();
        assert!(view_model.remove(5).is_err());

        assert_eq!(*lengths.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn add_task_consumes_pending_input() {
        let mut view_model = TodoViewModel::new(TodoListStore::new());
        view_model.set_new_task("walk dog");

        let record = view_model.add_task();
        assert_eq!(record.text, "walk dog");
        assert_eq!(view_model.new_task(), "");
    }

    #[test]
    fn controller_reloads_manually() {
        let mut controller = MvvmTodoController::new(
            RecordingView::new(),
            TodoListStore::new(),
            InputPolicy::RejectBlank,
        );
        controller.enter("a").unwrap();
        assert!(controller.enter("").unwrap().is_none());

        assert_eq!(controller.rows(), vec!["a"]);
        assert_eq!(controller.view.reloads(), 2);
        assert_eq!(controller.view_model().tasks().len(), 1);
    }

    #[test]
    fn observed_view_renders_from_notifications() {
        let mut screen = ObservedTodoView::new(
            RecordingView::new(),
            TodoViewModel::new(TodoListStore::new()),
            InputPolicy::AcceptAll,
        );
        screen.enter("a").unwrap();
        screen.enter("").unwrap();
        screen.delete_offsets(&[0]).unwrap();

        assert_eq!(screen.rows(), vec![""]);
        // initial render + three published changes
        assert_eq!(screen.view.borrow().reloads(), 4);
    }

    #[test]
    fn observers_run_in_registration_order() {
        let mut view_model = TodoViewModel::new(TodoListStore::new());
        let order = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(Cell::new(0));

        for name in ["first", "second"] {
            let order = Rc::clone(&order);
            let calls = Rc::clone(&calls);
            view_model.on_change(move |_| {
                order.borrow_mut().push(name);
                calls.set(calls.get() + 1);
            });
        }

        view_model.add("x");
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(calls.get(), 2);
    }
}

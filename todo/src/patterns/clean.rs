//! Clean Architecture: use case, presenter, view controller.
//!
//! The use case owns the list. The presenter forwards to it and updates the
//! view through a weak reference, so a presenter never keeps a dismissed
//! screen alive.

use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::{TaskRecord, TodoListError};
use crate::view::{RecordingView, TodoView};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Application use cases for the todo list
pub trait TodoUseCase {
    /// Append a task
    fn add_task(&mut self, text: &str) -> TaskRecord;

    /// Remove the task at `index`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] for an invalid position.
    fn remove_task(&mut self, index: usize) -> Result<TaskRecord, TodoListError>;

    /// Remove the tasks at `offsets` in one step
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] if any offset is invalid.
    fn remove_tasks(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError>;

    /// Current list
    fn tasks(&self) -> &[TaskRecord];
}

/// Use case implementation backed by a [`TodoListStore`]
#[derive(Debug, Default)]
pub struct TodoInteractor {
    tasks: TodoListStore,
}

impl TodoInteractor {
    /// Creates an interactor over `tasks`
    #[must_use]
    pub const fn new(tasks: TodoListStore) -> Self {
        Self { tasks }
    }
}

impl TodoUseCase for TodoInteractor {
    fn add_task(&mut self, text: &str) -> TaskRecord {
        self.tasks.add_task(text)
    }

    fn remove_task(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        self.tasks.remove_task(index)
    }

    fn remove_tasks(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        self.tasks.remove_tasks(offsets)
    }

    fn tasks(&self) -> &[TaskRecord] {
        self.tasks.as_slice()
    }
}

/// Presenter between the use case and a weakly held view
pub struct CleanTodoPresenter<V> {
    use_case: Box<dyn TodoUseCase>,
    view: Weak<RefCell<V>>,
}

impl<V: TodoView> CleanTodoPresenter<V> {
    /// Creates a presenter with no view attached
    #[must_use]
    pub fn new(use_case: Box<dyn TodoUseCase>) -> Self {
        Self {
            use_case,
            view: Weak::new(),
        }
    }

    /// Attach the view the presenter updates
    pub fn attach(&mut self, view: &Rc<RefCell<V>>) {
        self.view = Rc::downgrade(view);
    }

    /// Add a task and refresh the view
    pub fn add_task(&mut self, text: &str) -> TaskRecord {
        let record = self.use_case.add_task(text);
        if let Some(view) = self.view.upgrade() {
            let mut view = view.borrow_mut();
            view.reload(self.use_case.tasks());
            view.clear_input();
        }
        record
    }

    /// Remove a task and delete its row
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`]; the view is left alone.
    pub fn remove_task(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        let record = self.use_case.remove_task(index)?;
        if let Some(view) = self.view.upgrade() {
            view.borrow_mut().delete_row(index, self.use_case.tasks());
        }
        Ok(record)
    }

    /// Remove several tasks and reload the view
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`]; the view is left alone.
    pub fn remove_tasks(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        let removed = self.use_case.remove_tasks(offsets)?;
        if let Some(view) = self.view.upgrade() {
            view.borrow_mut().reload(self.use_case.tasks());
        }
        Ok(removed)
    }

    /// Current list
    #[must_use]
    pub fn tasks(&self) -> &[TaskRecord] {
        self.use_case.tasks()
    }
}

/// View controller owning its view and presenter
pub struct CleanTodoViewController<V: TodoView> {
    view: Rc<RefCell<V>>,
    presenter: CleanTodoPresenter<V>,
    draft: String,
    policy: InputPolicy,
}

impl<V: TodoView> CleanTodoViewController<V> {
    /// Wires view, presenter and use case, then renders the initial list
    pub fn new(view: V, use_case: Box<dyn TodoUseCase>, policy: InputPolicy) -> Self {
        let view = Rc::new(RefCell::new(view));
        let mut presenter = CleanTodoPresenter::new(use_case);
        presenter.attach(&view);
        view.borrow_mut().reload(presenter.tasks());

        Self {
            view,
            presenter,
            draft: String::new(),
            policy,
        }
    }
}

impl TodoScreen for CleanTodoViewController<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::Clean
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
        Ok(Some(self.presenter.add_task(&text)))
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        Ok(self.presenter.remove_task(index)?)
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        Ok(self.presenter.remove_tasks(offsets)?)
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.presenter.tasks().to_vec()
    }

    fn rows(&self) -> Vec<String> {
        self.view.borrow().rows().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn presenter_updates_attached_view() {
        let view = Rc::new(RefCell::new(RecordingView::new()));
        let mut presenter =
            CleanTodoPresenter::new(Box::new(TodoInteractor::new(TodoListStore::new())));
        presenter.attach(&view);

        presenter.add_task("a");
        presenter.add_task("b");
        presenter.remove_task(0).unwrap();

        let view = view.borrow();
        assert_eq!(view.rows(), ["b"]);
        assert_eq!(view.input_clears(), 2);
        assert_eq!(view.deleted_rows(), [0]);
    }

    #[test]
    fn presenter_does_not_keep_view_alive() {
        let view = Rc::new(RefCell::new(RecordingView::new()));
        let mut presenter =
            CleanTodoPresenter::new(Box::new(TodoInteractor::new(TodoListStore::new())));
        presenter.attach(&view);
        drop(view);

        // Dismissed view: the use case still runs
        presenter.add_task("a");
        assert_eq!(presenter.tasks().len(), 1);
    }

    #[test]
    fn out_of_range_leaves_view_untouched() {
        let mut controller = CleanTodoViewController::new(
            RecordingView::new(),
            Box::new(TodoInteractor::default()),
            InputPolicy::RejectBlank,
        );
        controller.enter("a").unwrap();
        let before = controller.view.borrow().clone();

        assert_eq!(
            controller.delete(1),
            Err(ScreenError::List(TodoListError::OutOfRange { index: 1, len: 1 }))
        );
        assert_eq!(*controller.view.borrow(), before);
    }
}

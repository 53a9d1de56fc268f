//! VIPER: view, interactor, presenter, entity, router.
//!
//! The interactor is the Clean use case ([`TodoInteractor`]). The presenter
//! is only known to the view through [`ViperPresenterInput`], and the router
//! is the one place that wires the module together.

use super::clean::{TodoInteractor, TodoUseCase};
use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::types::{TaskRecord, TodoListError};
use crate::view::{RecordingView, TodoView};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// What the view may ask of its presenter
pub trait ViperPresenterInput {
    /// Add a task
    fn add_task(&mut self, text: &str) -> TaskRecord;

    /// Remove the task at `index`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] for an invalid position.
    fn remove_task(&mut self, index: usize) -> Result<TaskRecord, TodoListError>;

    /// Remove the tasks at `offsets`
    ///
    /// # Errors
    ///
    /// [`TodoListError::OutOfRange`] if any offset is invalid.
    fn remove_tasks(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError>;

    /// Current list
    fn tasks(&self) -> &[TaskRecord];
}

/// Presenter holding the interactor and a weak view reference
pub struct ViperTodoPresenter<V> {
    view: Weak<RefCell<V>>,
    interactor: Box<dyn TodoUseCase>,
}

impl<V: TodoView> ViperTodoPresenter<V> {
    /// Creates a presenter for `view`
    #[must_use]
    pub fn new(view: &Rc<RefCell<V>>, interactor: Box<dyn TodoUseCase>) -> Self {
        Self {
            view: Rc::downgrade(view),
            interactor,
        }
    }
}

impl<V: TodoView> ViperPresenterInput for ViperTodoPresenter<V> {
    fn add_task(&mut self, text: &str) -> TaskRecord {
        let record = self.interactor.add_task(text);
        if let Some(view) = self.view.upgrade() {
            let mut view = view.borrow_mut();
            view.reload(self.interactor.tasks());
            view.clear_input();
        }
        record
    }

    fn remove_task(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        let record = self.interactor.remove_task(index)?;
        if let Some(view) = self.view.upgrade() {
            view.borrow_mut().delete_row(index, self.interactor.tasks());
        }
        Ok(record)
    }

    fn remove_tasks(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        let removed = self.interactor.remove_tasks(offsets)?;
        if let Some(view) = self.view.upgrade() {
            view.borrow_mut().reload(self.interactor.tasks());
        }
        Ok(removed)
    }

    fn tasks(&self) -> &[TaskRecord] {
        self.interactor.tasks()
    }
}

/// View controller that only talks to a presenter interface
pub struct ViperTodoViewController<V: TodoView> {
    view: Rc<RefCell<V>>,
    presenter: Box<dyn ViperPresenterInput>,
    draft: String,
    policy: InputPolicy,
}

/// Assembles VIPER modules
#[derive(Debug, Clone, Copy, Default)]
pub struct ViperTodoRouter;

impl ViperTodoRouter {
    /// Build a todo module around `view` and `interactor`
    pub fn create_module<V: TodoView + 'static>(
        view: V,
        interactor: TodoInteractor,
        policy: InputPolicy,
    ) -> ViperTodoViewController<V> {
        let view = Rc::new(RefCell::new(view));
        let presenter = ViperTodoPresenter::new(&view, Box::new(interactor));
        view.borrow_mut().reload(presenter.tasks());

        ViperTodoViewController {
            view,
            presenter: Box::new(presenter),
            draft: String::new(),
            policy,
        }
    }
}

impl TodoScreen for ViperTodoViewController<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::Viper
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

//! Model-View-Controller.
//!
//! The controller owns both the model and the view and pushes every change
//! to the view itself.

use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::TaskRecord;
use crate::view::{RecordingView, TodoView};

/// Controller owning the task list and its view
#[derive(Debug)]
pub struct MvcTodoController<V: TodoView> {
    tasks: TodoListStore,
    view: V,
    draft: String,
    policy: InputPolicy,
}

impl<V: TodoView> MvcTodoController<V> {
    /// Creates the controller and renders the initial list
    pub fn new(view: V, tasks: TodoListStore, policy: InputPolicy) -> Self {
        let mut controller = Self {
            tasks,
            view,
            draft: String::new(),
            policy,
        };
        controller.view.reload(controller.tasks.as_slice());
        controller
    }

    /// The controlled view
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Add button handler
    pub fn add_task(&mut self) -> Option<TaskRecord> {
        if !self.policy.accepts(&self.draft) {
            return None;
        }

        let record = self.tasks.add_task(std::mem::take(&mut self.draft));
        self.view.reload(self.tasks.as_slice());
        self.view.clear_input();
        Some(record)
    }

    /// Swipe-to-delete handler
    ///
    /// # Errors
    ///
    /// Propagates [`OutOfRange`](crate::TodoListError::OutOfRange).
    pub fn delete_task(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        let record = self.tasks.remove_task(index)?;
        self.view.delete_row(index, self.tasks.as_slice());
        Ok(record)
    }
}

impl TodoScreen for MvcTodoController<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::Mvc
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
        Ok(self.add_task())
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        self.delete_task(index)
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        let removed = self.tasks.remove_tasks(offsets)?;
        self.view.reload(self.tasks.as_slice());
        Ok(removed)
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.tasks.snapshot()
    }

    fn rows(&self) -> Vec<String> {
        self.view.rows().to_vec()
    }
}

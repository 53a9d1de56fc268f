//! Declarative view owning its own state.
//!
//! The list and the text input live inside the view. Any state change,
//! typing included, re-evaluates the body, which renders the whole list.

use super::{Architecture, ScreenError, TodoScreen};
use crate::policy::InputPolicy;
use crate::store::TodoListStore;
use crate::types::TaskRecord;
use crate::view::{RecordingView, TodoView};

/// Screen whose state is local to the view
#[derive(Debug)]
pub struct DeclarativeTodoView<V: TodoView> {
    tasks: TodoListStore,
    new_task: String,
    view: V,
    policy: InputPolicy,
}

impl<V: TodoView> DeclarativeTodoView<V> {
    /// Creates the screen and evaluates its body once
    pub fn new(view: V, tasks: TodoListStore, policy: InputPolicy) -> Self {
        let mut screen = Self {
            tasks,
            new_task: String::new(),
            view,
            policy,
        };
        screen.body();
        screen
    }

    /// Re-render from the current state.
    fn body(&mut self) {
        self.view.reload(self.tasks.as_slice());
    }
}

impl TodoScreen for DeclarativeTodoView<RecordingView> {
    fn architecture(&self) -> Architecture {
        Architecture::SwiftUi
    }

    fn policy(&self) -> InputPolicy {
        self.policy
    }

    fn set_draft(&mut self, text: &str) {
        text.clone_into(&mut self.new_task);
        self.body();
    }

    fn draft(&self) -> String {
        self.new_task.clone()
    }

    fn submit(&mut self) -> Result<Option<TaskRecord>, ScreenError> {
        if !self.policy.accepts(&self.new_task) {
            return Ok(None);
        }
        let record = self.tasks.add_task(std::mem::take(&mut self.new_task));
        self.body();
        Ok(Some(record))
    }

    fn delete(&mut self, index: usize) -> Result<TaskRecord, ScreenError> {
        let record = self.tasks.remove_task(index)?;
        self.body();
        Ok(record)
    }

    fn delete_offsets(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, ScreenError> {
        let removed = self.tasks.remove_tasks(offsets)?;
        self.body();
        Ok(removed)
    }

    fn snapshot(&self) -> Vec<TaskRecord> {
        self.tasks.snapshot()
    }

    fn rows(&self) -> Vec<String> {
        self.view.rows().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn typing_re_renders_body() {
        let mut screen =
            DeclarativeTodoView::new(RecordingView::new(), TodoListStore::new(), InputPolicy::AcceptAll);
        screen.set_draft("b");
        screen.set_draft("bu");

        assert_eq!(screen.view.reloads(), 3);
        assert!(screen.rows().is_empty());
    }

    #[test]
    fn offsets_delete_in_one_render() {
        let mut screen =
            DeclarativeTodoView::new(RecordingView::new(), TodoListStore::new(), InputPolicy::AcceptAll);
        for text in ["a", "b", "c"] {
            screen.tasks.add_task(text);
        }

        let removed = screen.delete_offsets(&[0, 2]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(screen.rows(), vec!["b"]);
        assert_eq!(screen.view.reloads(), 2);
    }
}

//! Headless view contract used by the presentation adapters.
//!
//! Real widget code is outside this crate. Adapters talk to anything that
//! implements [`TodoView`]; [`RecordingView`] keeps the rendered rows in
//! memory so screens can be driven and inspected without a UI toolkit.

use crate::types::TaskRecord;

/// What a screen's list widget must support
pub trait TodoView {
    /// Re-render the whole list
    fn reload(&mut self, tasks: &[TaskRecord]);

    /// Remove a single row; `tasks` is the list after removal
    fn delete_row(&mut self, _index: usize, tasks: &[TaskRecord]) {
        self.reload(tasks);
    }

    /// Clear the text input after a successful add
    fn clear_input(&mut self) {}
}

/// In-memory view that records what it was asked to render
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingView {
    rows: Vec<String>,
    reloads: usize,
    deleted_rows: Vec<usize>,
    input_clears: usize,
}

impl RecordingView {
    /// Creates an empty view
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row texts as last rendered
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Number of full reloads
    #[must_use]
    pub const fn reloads(&self) -> usize {
        self.reloads
    }

    /// Row positions removed with [`TodoView::delete_row`], in call order
    #[must_use]
    pub fn deleted_rows(&self) -> &[usize] {
        &self.deleted_rows
    }

    /// Number of times the input was cleared
    #[must_use]
    pub const fn input_clears(&self) -> usize {
        self.input_clears
    }

    fn render(&mut self, tasks: &[TaskRecord]) {
        self.rows = tasks.iter().map(|task| task.text.clone()).collect();
    }
}

impl TodoView for RecordingView {
    fn reload(&mut self, tasks: &[TaskRecord]) {
        self.render(tasks);
        self.reloads += 1;
        tracing::trace!(rows = self.rows.len(), "View reloaded");
    }

    fn delete_row(&mut self, index: usize, tasks: &[TaskRecord]) {
        self.render(tasks);
        self.deleted_rows.push(index);
        tracing::trace!(index, rows = self.rows.len(), "View row deleted");
    }

    fn clear_input(&mut self) {
        self.input_clears += 1;
    }
}

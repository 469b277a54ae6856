use super::{OperationKind, TextOperation, active_operations};
use crate::{
    error::{EngineError, Result},
    theme,
};
use rand::seq::SliceRandom;
use ratatui::style::Color;

/// the user's ordered list of text operations
pub struct OperationBar {
    operations: Vec<TextOperation>,
    palette: Vec<Color>,
}

impl OperationBar {
    /// bar with the default palette in a random order
    pub fn new() -> Self {
        let mut palette = theme::OPERATION_COLORS.to_vec();
        palette.shuffle(&mut rand::thread_rng());
        Self::with_palette(palette)
    }

    /// bar handing out `palette` in order; an empty palette falls back to the default color
    pub fn with_palette(palette: Vec<Color>) -> Self {
        Self {
            operations: Vec::new(),
            palette,
        }
    }

    /// append a new selected operation
    ///
    /// fails with [`EngineError::EmptyOperation`] for empty text and with
    /// [`EngineError::DuplicateOperation`] when an operation with the same
    /// text exists, whatever its kind
    pub fn add(&mut self, text: impl Into<String>, kind: OperationKind) -> Result<&TextOperation> {
        let text = text.into();
        if text.is_empty() {
            return Err(EngineError::EmptyOperation);
        }
        if self.contains(&text) {
            return Err(EngineError::DuplicateOperation(text));
        }

        let color = self.next_color();
        log::debug!("Adding {} operation `{}`", kind.label(), text);
        self.operations
            .push(TextOperation::new(text, kind).with_color(color));
        let last = self.operations.len() - 1;
        Ok(&self.operations[last])
    }

    pub fn remove(&mut self, index: usize) -> Option<TextOperation> {
        (index < self.operations.len()).then(|| self.operations.remove(index))
    }

    /// returns false when `index` is out of range
    pub fn set_selected(&mut self, index: usize, selected: bool) -> bool {
        match self.operations.get_mut(index) {
            Some(op) => {
                op.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        match self.operations.get(index) {
            Some(op) => {
                let selected = !op.selected;
                self.set_selected(index, selected)
            }
            None => false,
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.operations.iter().any(|op| op.text == text)
    }

    pub fn operations(&self) -> &[TextOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// list to submit to a document after an edit
    pub fn active(&self) -> Vec<TextOperation> {
        active_operations(&self.operations)
    }

    fn next_color(&self) -> Color {
        if self.palette.is_empty() {
            return theme::DEFAULT_OPERATION_COLOR;
        }
        self.palette[self.operations.len() % self.palette.len()]
    }
}

impl Default for OperationBar {
    fn default() -> Self {
        Self::new()
    }
}

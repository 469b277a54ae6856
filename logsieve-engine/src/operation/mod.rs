//! User-defined text operations.
//!
//! A [`TextOperation`] is a piece of text plus what to do with the lines that
//! contain it. Operations are identified by their text alone: submitting
//! `"err"` as a filter and then `"err"` as a highlight is a duplicate.
//!
//! ```text
//! Filter       keep lines containing text (also highlights it)
//! Shield       hide lines containing text
//! Highlight    color text, never changes which lines are shown
//! RegexFilter  keep lines where the pattern matches
//! RegexShield  hide lines where the pattern matches
//! ```

mod bar;

pub use bar::OperationBar;

use crate::theme;
use itertools::Itertools;
use ratatui::style::Color;
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationKind {
    #[default]
    Filter,
    Shield,
    Highlight,
    RegexFilter,
    RegexShield,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Filter,
        OperationKind::Shield,
        OperationKind::Highlight,
        OperationKind::RegexFilter,
        OperationKind::RegexShield,
    ];

    /// takes part in deciding which lines are kept
    pub fn is_filter(self) -> bool {
        matches!(self, OperationKind::Filter | OperationKind::RegexFilter)
    }

    /// takes part in deciding which lines are hidden
    pub fn is_shield(self) -> bool {
        matches!(self, OperationKind::Shield | OperationKind::RegexShield)
    }

    /// colors its matches when rendering
    pub fn is_highlight(self) -> bool {
        matches!(self, OperationKind::Highlight | OperationKind::Filter)
    }

    pub fn is_regex(self) -> bool {
        matches!(self, OperationKind::RegexFilter | OperationKind::RegexShield)
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Filter => "filter",
            OperationKind::Shield => "shield",
            OperationKind::Highlight => "highlight",
            OperationKind::RegexFilter => "regex filter",
            OperationKind::RegexShield => "regex shield",
        }
    }

    /// next kind in [`Self::ALL`], wrapping around
    pub fn cycle(self) -> Self {
        let pos = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone)]
pub struct TextOperation {
    pub text: String,
    pub kind: OperationKind,
    pub selected: bool,
    pub color: Color,
}

impl TextOperation {
    pub fn new(text: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            text: text.into(),
            kind,
            selected: true,
            color: theme::DEFAULT_OPERATION_COLOR,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// operations are the same operation iff their texts are equal
    pub fn same_text(&self, other: &TextOperation) -> bool {
        self.text == other.text
    }
}

fn contains_text(ops: &[TextOperation], op: &TextOperation) -> bool {
    ops.iter().any(|o| o.same_text(op))
}

/// order-independent comparison by operation text
pub fn same_operations(a: &[TextOperation], b: &[TextOperation]) -> bool {
    a.len() == b.len()
        && a.iter().all(|op| contains_text(b, op))
        && b.iter().all(|op| contains_text(a, op))
}

/// the list submitted to a document after every edit: selected operations,
/// longest text first, ties kept in bar order
///
/// length is the number of Unicode scalar values (`chars`), so text outside
/// the Basic Multilingual Plane counts one per character, not two as in UTF-16
pub fn active_operations(ops: &[TextOperation]) -> Vec<TextOperation> {
    ops.iter()
        .filter(|op| op.selected)
        .sorted_by_key(|op| Reverse(op.text.chars().count()))
        .cloned()
        .collect()
}

pub fn highlight_operations(ops: &[TextOperation]) -> Vec<TextOperation> {
    ops.iter().filter(|op| op.kind.is_highlight()).cloned().collect()
}

pub fn filter_operations(ops: &[TextOperation]) -> Vec<TextOperation> {
    ops.iter().filter(|op| op.kind.is_filter()).cloned().collect()
}

pub fn shield_operations(ops: &[TextOperation]) -> Vec<TextOperation> {
    ops.iter().filter(|op| op.kind.is_shield()).cloned().collect()
}

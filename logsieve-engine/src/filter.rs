use crate::{
    error::PatternError,
    log_line::LogLine,
    operation::{OperationKind, TextOperation},
};
use rayon::prelude::*;
use regex::Regex;

pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// true if any shield operation hides `line`
///
/// invalid regex shields never match; see [`CompiledOperations`] to find out which ones failed
pub fn is_shielded(line: &str, shield_ops: &[TextOperation]) -> bool {
    shield_ops.iter().any(|op| match op.kind {
        OperationKind::Shield => line.contains(op.text.as_str()),
        OperationKind::RegexShield => Regex::new(&op.text).is_ok_and(|re| re.is_match(line)),
        OperationKind::Filter | OperationKind::Highlight | OperationKind::RegexFilter => false,
    })
}

/// true if `line` is kept by the filter operations; no operations keeps everything
pub fn matches(line: &str, filter_ops: &[TextOperation]) -> bool {
    if filter_ops.is_empty() {
        return true;
    }
    filter_ops.iter().any(|op| match op.kind {
        OperationKind::RegexFilter => Regex::new(&op.text).is_ok_and(|re| re.is_match(line)),
        OperationKind::Filter => line.contains(op.text.as_str()),
        OperationKind::Shield | OperationKind::Highlight | OperationKind::RegexShield => false,
    })
}

pub fn passes(line: &str, filter_ops: &[TextOperation], shield_ops: &[TextOperation]) -> bool {
    !is_shielded(line, shield_ops) && matches(line, filter_ops)
}

enum Matcher {
    Literal(String),
    Pattern(Regex),
    /// failed to compile; never matches
    Invalid,
}

impl Matcher {
    fn compile(op: &TextOperation, errors: &mut Vec<PatternError>) -> Self {
        if !op.kind.is_regex() {
            return Matcher::Literal(op.text.clone());
        }
        match Regex::new(&op.text) {
            Ok(re) => Matcher::Pattern(re),
            Err(e) => {
                let err = PatternError::new(op.text.clone(), &e);
                log::warn!("{}", err);
                errors.push(err);
                Matcher::Invalid
            }
        }
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Literal(text) => line.contains(text.as_str()),
            Matcher::Pattern(re) => re.is_match(line),
            Matcher::Invalid => false,
        }
    }
}

/// filter and shield operations with every regex compiled once
pub struct CompiledOperations {
    filters: Vec<Matcher>,
    shields: Vec<Matcher>,
    errors: Vec<PatternError>,
}

impl CompiledOperations {
    pub fn compile(filter_ops: &[TextOperation], shield_ops: &[TextOperation]) -> Self {
        let mut errors = Vec::new();
        let filters = filter_ops
            .iter()
            .filter(|op| op.kind.is_filter())
            .map(|op| Matcher::compile(op, &mut errors))
            .collect();
        let shields = shield_ops
            .iter()
            .filter(|op| op.kind.is_shield())
            .map(|op| Matcher::compile(op, &mut errors))
            .collect();
        Self {
            filters,
            shields,
            errors,
        }
    }

    pub fn is_shielded(&self, line: &str) -> bool {
        self.shields.iter().any(|m| m.is_match(line))
    }

    pub fn matches(&self, line: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|m| m.is_match(line))
    }

    pub fn passes(&self, line: &str) -> bool {
        !self.is_shielded(line) && self.matches(line)
    }

    pub fn errors(&self) -> &[PatternError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<PatternError> {
        self.errors
    }
}

/// result of streaming the whole list through the operations
#[derive(Debug, Default)]
pub struct Rebuild {
    /// indices into the whole list, ascending
    pub indices: Vec<usize>,
    pub pattern_errors: Vec<PatternError>,
}

/// rebuilds filtered index lists, in parallel for large documents
#[derive(Debug, Clone, Copy)]
pub struct FilterEngine {
    parallel_threshold: usize,
}

impl FilterEngine {
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// indices of the lines in `lines` that pass, in original order
    pub fn rebuild(
        &self,
        lines: &[LogLine],
        filter_ops: &[TextOperation],
        shield_ops: &[TextOperation],
    ) -> Rebuild {
        if filter_ops.is_empty() && shield_ops.is_empty() {
            return Rebuild {
                indices: (0..lines.len()).collect(),
                pattern_errors: Vec::new(),
            };
        }

        let compiled = CompiledOperations::compile(filter_ops, shield_ops);
        let indices = if lines.len() > self.parallel_threshold {
            self.filter_parallel(lines, &compiled)
        } else {
            self.filter_sequential(lines, &compiled)
        };

        Rebuild {
            indices,
            pattern_errors: compiled.into_errors(),
        }
    }

    fn filter_sequential(&self, lines: &[LogLine], compiled: &CompiledOperations) -> Vec<usize> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| compiled.passes(line.content()))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn filter_parallel(&self, lines: &[LogLine], compiled: &CompiledOperations) -> Vec<usize> {
        // indexed parallel iterators keep the original order on collect
        lines
            .par_iter()
            .enumerate()
            .filter(|(_, line)| compiled.passes(line.content()))
            .map(|(idx, _)| idx)
            .collect()
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PARALLEL_THRESHOLD)
    }
}

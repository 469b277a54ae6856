use crate::{
    error::PatternError,
    filter::{FilterEngine, Rebuild},
    log_line::LogLine,
    operation::{
        TextOperation, filter_operations, highlight_operations, same_operations,
        shield_operations,
    },
};
use itertools::Itertools;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Ready,
}

/// the three synchronized views of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Whole,
    Filtered,
    Marked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// the submitted list is set-equal to the stored one
    Unchanged,
    Changed {
        /// the filtered list was rebuilt; callers should re-resolve scroll positions
        filtered_rebuilt: bool,
        pattern_errors: Vec<PatternError>,
    },
}

impl ApplyOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, ApplyOutcome::Changed { .. })
    }

    pub fn filtered_rebuilt(&self) -> bool {
        matches!(
            self,
            ApplyOutcome::Changed {
                filtered_rebuilt: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStyle {
    /// line content only
    Plain,
    /// `"{line_number}    {content}"`
    Numbered,
}

/// a new operation list plus everything needed to apply it, detached from the store
///
/// taken under a short lock; [`OperationPlan::compute`] then runs without one
pub struct OperationPlan {
    operations: Vec<TextOperation>,
    filter_ops: Vec<TextOperation>,
    shield_ops: Vec<TextOperation>,
    /// set when the filtered list has to be rebuilt
    lines: Option<Arc<Vec<LogLine>>>,
    filter_engine: FilterEngine,
}

impl OperationPlan {
    pub fn compute(self) -> OperationUpdate {
        let rebuild = self.lines.map(|lines| {
            self.filter_engine
                .rebuild(&lines, &self.filter_ops, &self.shield_ops)
        });
        OperationUpdate {
            highlight: highlight_operations(&self.operations),
            operations: self.operations,
            filter_ops: self.filter_ops,
            shield_ops: self.shield_ops,
            rebuild,
        }
    }
}

/// work computed from a new operation list, ready to be swapped in
#[derive(Debug)]
pub struct OperationUpdate {
    operations: Vec<TextOperation>,
    highlight: Vec<TextOperation>,
    filter_ops: Vec<TextOperation>,
    shield_ops: Vec<TextOperation>,
    rebuild: Option<Rebuild>,
}

/// the whole list and the filtered view at one point in time
///
/// cloning it is cheap; it stays valid while the store moves on
#[derive(Clone)]
pub struct LineSnapshot {
    whole: Arc<Vec<LogLine>>,
    filtered: Arc<Vec<usize>>,
}

impl LineSnapshot {
    pub fn whole(&self) -> &[LogLine] {
        &self.whole
    }

    pub fn filtered(&self) -> impl ExactSizeIterator<Item = &LogLine> + '_ {
        self.filtered.iter().map(|&idx| &self.whole[idx])
    }
}

/// lines of one document: the whole list, the filtered view and the marks
///
/// the whole list and the filtered indices are shared with snapshots; marking
/// a line while a snapshot is alive copies the whole list once
pub struct LineStore {
    state: LoadState,
    whole: Arc<Vec<LogLine>>,
    /// indices into `whole`, which are also line numbers
    filtered: Arc<Vec<usize>>,
    /// marked line numbers, ascending
    marked: Vec<usize>,
    operations: Vec<TextOperation>,
    highlight: Vec<TextOperation>,
    last_filter_ops: Vec<TextOperation>,
    last_shield_ops: Vec<TextOperation>,
    filter_engine: FilterEngine,
}

impl LineStore {
    pub fn new(filter_engine: FilterEngine) -> Self {
        Self {
            state: LoadState::Empty,
            whole: Arc::new(Vec::new()),
            filtered: Arc::new(Vec::new()),
            marked: Vec::new(),
            operations: Vec::new(),
            highlight: Vec::new(),
            last_filter_ops: Vec::new(),
            last_shield_ops: Vec::new(),
            filter_engine,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn begin_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// ingestion failed; nothing was loaded
    pub fn fail_loading(&mut self) {
        self.state = LoadState::Empty;
    }

    /// install freshly ingested lines; the filtered view starts equal to the whole list
    pub fn load(&mut self, lines: Vec<LogLine>) {
        debug_assert!(lines.iter().enumerate().all(|(i, l)| l.line_number() == i));
        self.filtered = Arc::new((0..lines.len()).collect());
        self.whole = Arc::new(lines);
        self.marked.clear();
        self.operations.clear();
        self.highlight.clear();
        self.last_filter_ops.clear();
        self.last_shield_ops.clear();
        self.state = LoadState::Ready;
    }

    // ------------------------------------------------------------------------
    // operations
    // ------------------------------------------------------------------------

    /// decide what `new_ops` would change; cheap, no line is scanned
    ///
    /// returns `None` when `new_ops` is set-equal to the stored list
    pub fn plan_operations(&self, new_ops: &[TextOperation]) -> Option<OperationPlan> {
        if same_operations(&self.operations, new_ops) {
            return None;
        }

        let filter_ops = filter_operations(new_ops);
        let shield_ops = shield_operations(new_ops);
        let subsets_unchanged = same_operations(&self.last_filter_ops, &filter_ops)
            && same_operations(&self.last_shield_ops, &shield_ops);

        Some(OperationPlan {
            operations: new_ops.to_vec(),
            filter_ops,
            shield_ops,
            lines: (!subsets_unchanged).then(|| self.whole.clone()),
            filter_engine: self.filter_engine,
        })
    }

    /// compute what `new_ops` would change, without touching the store
    pub fn prepare_operations(&self, new_ops: &[TextOperation]) -> Option<OperationUpdate> {
        self.plan_operations(new_ops).map(OperationPlan::compute)
    }

    /// swap a prepared update in
    pub fn commit(&mut self, update: OperationUpdate) -> ApplyOutcome {
        self.operations = update.operations;
        self.highlight = update.highlight;

        match update.rebuild {
            Some(rebuild) => {
                self.filtered = Arc::new(rebuild.indices);
                self.last_filter_ops = update.filter_ops;
                self.last_shield_ops = update.shield_ops;
                ApplyOutcome::Changed {
                    filtered_rebuilt: true,
                    pattern_errors: rebuild.pattern_errors,
                }
            }
            None => ApplyOutcome::Changed {
                filtered_rebuilt: false,
                pattern_errors: Vec::new(),
            },
        }
    }

    pub fn apply_operations(&mut self, new_ops: &[TextOperation]) -> ApplyOutcome {
        match self.prepare_operations(new_ops) {
            Some(update) => self.commit(update),
            None => ApplyOutcome::Unchanged,
        }
    }

    pub fn operations(&self) -> &[TextOperation] {
        &self.operations
    }

    /// highlight-eligible operations, in submission order
    pub fn highlight_operations(&self) -> &[TextOperation] {
        &self.highlight
    }

    // ------------------------------------------------------------------------
    // views
    // ------------------------------------------------------------------------

    pub fn whole(&self) -> &[LogLine] {
        &self.whole
    }

    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            whole: self.whole.clone(),
            filtered: self.filtered.clone(),
        }
    }

    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    pub fn filtered(&self) -> impl ExactSizeIterator<Item = &LogLine> + '_ {
        self.filtered.iter().map(|&idx| &self.whole[idx])
    }

    pub fn marked(&self) -> impl ExactSizeIterator<Item = &LogLine> + '_ {
        self.marked.iter().map(|&idx| &self.whole[idx])
    }

    pub fn line(&self, line_number: usize) -> Option<&LogLine> {
        self.whole.get(line_number)
    }

    pub fn panel_len(&self, panel: Panel) -> usize {
        match panel {
            Panel::Whole => self.whole.len(),
            Panel::Filtered => self.filtered.len(),
            Panel::Marked => self.marked.len(),
        }
    }

    /// line shown at `index` of `panel`
    pub fn panel_line(&self, panel: Panel, index: usize) -> Option<&LogLine> {
        let line_number = match panel {
            Panel::Whole => index,
            Panel::Filtered => *self.filtered.get(index)?,
            Panel::Marked => *self.marked.get(index)?,
        };
        self.whole.get(line_number)
    }

    pub fn line_number_at(&self, panel: Panel, index: usize) -> Option<usize> {
        self.panel_line(panel, index).map(LogLine::line_number)
    }

    /// index in `panel` to scroll to for `line_number`; see [`index_for_line_number`]
    pub fn jump_index(&self, panel: Panel, line_number: usize) -> usize {
        match panel {
            Panel::Whole => nearest_index(&self.whole[..], line_number, LogLine::line_number),
            Panel::Filtered => nearest_index(&self.filtered[..], line_number, |&n| n),
            Panel::Marked => nearest_index(&self.marked, line_number, |&n| n),
        }
    }

    // ------------------------------------------------------------------------
    // marks
    // ------------------------------------------------------------------------

    /// returns false when no such line exists
    pub fn set_mark(&mut self, line_number: usize, marked: bool) -> bool {
        if line_number >= self.whole.len() {
            return false;
        }
        if self.whole[line_number].is_marked() != marked {
            Arc::make_mut(&mut self.whole)[line_number].set_marked(marked);
        }

        if marked {
            if let Err(pos) = self.marked.binary_search(&line_number) {
                self.marked.insert(pos, line_number);
            }
        } else {
            self.marked.retain(|&n| n != line_number);
        }
        true
    }

    pub fn toggle_mark(&mut self, line_number: usize) -> bool {
        match self.whole.get(line_number) {
            Some(line) => {
                let marked = !line.is_marked();
                self.set_mark(line_number, marked)
            }
            None => false,
        }
    }

    pub fn clear_marks(&mut self) {
        if self.marked.is_empty() {
            return;
        }
        let whole = Arc::make_mut(&mut self.whole);
        for &n in &self.marked {
            whole[n].set_marked(false);
        }
        self.marked.clear();
    }

    /// marked lines as text for the clipboard, sentinel stripped
    pub fn export_marked(&self, style: ExportStyle) -> String {
        self.marked()
            .map(|line| match style {
                ExportStyle::Plain => line.content().to_string(),
                ExportStyle::Numbered => format!("{}    {}", line.line_number(), line.content()),
            })
            .join("\n")
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new(FilterEngine::default())
    }
}

/// index to jump to for `target` in a list ordered by line number
///
/// an exact hit returns its index; a missing line resolves to the nearest
/// preceding entry, floored at 0 (also for targets before every entry and for
/// empty lists)
pub fn index_for_line_number(lines: &[LogLine], target: usize) -> usize {
    nearest_index(lines, target, LogLine::line_number)
}

fn nearest_index<T>(items: &[T], target: usize, key: impl Fn(&T) -> usize) -> usize {
    let pos = items.partition_point(|item| key(item) < target);
    match items.get(pos) {
        Some(item) if key(item) == target => pos,
        _ => pos.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{operation::OperationKind, source::read_lines_from};

    fn store(text: &str) -> LineStore {
        let mut store = LineStore::default();
        store.begin_loading();
        store.load(read_lines_from(text.as_bytes()).unwrap());
        store
    }

    fn op(text: &str, kind: OperationKind) -> TextOperation {
        TextOperation::new(text, kind)
    }

    fn filtered_contents(store: &LineStore) -> Vec<String> {
        store.filtered().map(|l| l.content().to_string()).collect()
    }

    #[test]
    fn test_load_state_machine() {
        let mut store = LineStore::default();
        assert_eq!(store.state(), LoadState::Empty);
        store.begin_loading();
        assert_eq!(store.state(), LoadState::Loading);
        store.fail_loading();
        assert_eq!(store.state(), LoadState::Empty);
        store.begin_loading();
        store.load(Vec::new());
        assert_eq!(store.state(), LoadState::Ready);
    }

    #[test]
    fn test_filtered_equals_whole_without_operations() {
        let store = store("a\n\nb\nc");
        assert_eq!(store.filtered_indices(), &[0, 1, 2, 3]);
        let whole: Vec<usize> = store.whole().iter().map(|l| l.line_number()).collect();
        let filtered: Vec<usize> = store.filtered().map(|l| l.line_number()).collect();
        assert_eq!(whole, filtered);
    }

    #[test]
    fn test_shield_scenario() {
        let mut store = store("abc\nxyz\na");
        let outcome = store.apply_operations(&[op("a", OperationKind::Shield)]);
        assert!(outcome.filtered_rebuilt());
        assert_eq!(filtered_contents(&store), vec!["xyz"]);
    }

    #[test]
    fn test_apply_twice_is_noop() {
        let mut store = store("abc\nxyz\na");
        let ops = vec![
            op("a", OperationKind::Shield),
            op("x", OperationKind::Highlight),
        ];
        assert!(store.apply_operations(&ops).is_changed());

        let reordered = vec![ops[1].clone(), ops[0].clone()];
        assert_eq!(store.apply_operations(&reordered), ApplyOutcome::Unchanged);
        assert_eq!(filtered_contents(&store), vec!["xyz"]);
    }

    #[test]
    fn test_highlight_only_change_skips_rebuild() {
        let mut store = store("abc\nxyz");
        store.apply_operations(&[op("a", OperationKind::Filter)]);
        let before = store.filtered_indices().to_vec();

        let outcome = store.apply_operations(&[
            op("a", OperationKind::Filter),
            op("b", OperationKind::Highlight),
        ]);
        assert_eq!(
            outcome,
            ApplyOutcome::Changed {
                filtered_rebuilt: false,
                pattern_errors: Vec::new(),
            }
        );
        assert_eq!(store.filtered_indices(), before.as_slice());
        let highlight: Vec<&str> = store
            .highlight_operations()
            .iter()
            .map(|o| o.text.as_str())
            .collect();
        assert_eq!(highlight, vec!["a", "b"]);
    }

    #[test]
    fn test_removing_all_operations_restores_whole() {
        let mut store = store("abc\nxyz\na");
        store.apply_operations(&[op("a", OperationKind::Filter)]);
        assert_eq!(store.filtered_indices(), &[0, 2]);

        let outcome = store.apply_operations(&[]);
        assert!(outcome.filtered_rebuilt());
        assert_eq!(store.filtered_indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_pattern_error_reported_not_fatal() {
        let mut store = store("abc\nxyz");
        let outcome = store.apply_operations(&[
            op("[", OperationKind::RegexShield),
            op("x", OperationKind::Shield),
        ]);
        match outcome {
            ApplyOutcome::Changed {
                filtered_rebuilt,
                pattern_errors,
            } => {
                assert!(filtered_rebuilt);
                assert_eq!(pattern_errors.len(), 1);
                assert_eq!(pattern_errors[0].text, "[");
            }
            ApplyOutcome::Unchanged => panic!("expected a change"),
        }
        assert_eq!(filtered_contents(&store), vec!["abc"]);
    }

    #[test]
    fn test_filtered_is_subsequence_of_whole() {
        let mut store = store("e1\nok\ne2\nok\ne3");
        store.apply_operations(&[op(r"e\d", OperationKind::RegexFilter)]);
        let indices = store.filtered_indices();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| i < store.whole().len()));
        assert_eq!(indices, &[0, 2, 4]);
    }

    #[test]
    fn test_mark_membership_and_order() {
        let mut store = store("a\nb\nc\nd");
        assert!(store.set_mark(3, true));
        assert!(store.set_mark(1, true));
        assert!(store.set_mark(1, true));
        assert!(!store.set_mark(10, true));

        let marked: Vec<usize> = store.marked().map(|l| l.line_number()).collect();
        assert_eq!(marked, vec![1, 3]);
        assert!(store.line(1).unwrap().is_marked());

        store.set_mark(3, false);
        store.set_mark(3, false);
        let marked: Vec<usize> = store.marked().map(|l| l.line_number()).collect();
        assert_eq!(marked, vec![1]);
        assert!(!store.line(3).unwrap().is_marked());
    }

    #[test]
    fn test_marks_survive_filtering() {
        let mut store = store("keep\nhide\nkeep");
        store.set_mark(1, true);
        store.apply_operations(&[op("hide", OperationKind::Shield)]);
        assert_eq!(store.panel_len(Panel::Marked), 1);
        assert_eq!(store.panel_len(Panel::Filtered), 2);
        assert!(store.line(1).unwrap().is_marked());
    }

    #[test]
    fn test_toggle_and_clear_marks() {
        let mut store = store("a\nb");
        assert!(store.toggle_mark(0));
        assert!(store.line(0).unwrap().is_marked());
        assert!(store.toggle_mark(0));
        assert!(!store.line(0).unwrap().is_marked());

        store.set_mark(0, true);
        store.set_mark(1, true);
        store.clear_marks();
        assert_eq!(store.panel_len(Panel::Marked), 0);
        assert!(store.whole().iter().all(|l| !l.is_marked()));
    }

    #[test]
    fn test_export_marked_strips_sentinel() {
        let mut store = store("first line\n\n  third\t");
        store.set_mark(0, true);
        store.set_mark(2, true);
        assert_eq!(store.export_marked(ExportStyle::Plain), "first line\n  third\t");
        assert_eq!(
            store.export_marked(ExportStyle::Numbered),
            "0    first line\n2      third\t"
        );
    }

    #[test]
    fn test_index_for_line_number_policy() {
        let lines: Vec<LogLine> = [2usize, 5, 9]
            .iter()
            .map(|&n| LogLine::from_raw(n, "x"))
            .collect();
        assert_eq!(index_for_line_number(&lines, 5), 1);
        assert_eq!(index_for_line_number(&lines, 6), 1);
        assert_eq!(index_for_line_number(&lines, 9), 2);
        assert_eq!(index_for_line_number(&lines, 0), 0);
        assert_eq!(index_for_line_number(&lines, 2), 0);
        assert_eq!(index_for_line_number(&lines, 100), 2);
        assert_eq!(index_for_line_number(&[], 3), 0);
    }

    #[test]
    fn test_jump_between_panels() {
        let mut store = store("a0\nb1\na2\nb3\na4");
        store.apply_operations(&[op("a", OperationKind::Filter)]);
        store.set_mark(3, true);

        // line 3 is filtered out, so the jump lands on line 2
        assert_eq!(store.jump_index(Panel::Filtered, 3), 1);
        assert_eq!(store.jump_index(Panel::Filtered, 4), 2);
        assert_eq!(store.jump_index(Panel::Whole, 3), 3);
        assert_eq!(store.jump_index(Panel::Marked, 3), 0);

        assert_eq!(store.line_number_at(Panel::Filtered, 1), Some(2));
        assert_eq!(store.line_number_at(Panel::Marked, 0), Some(3));
        assert_eq!(store.line_number_at(Panel::Filtered, 9), None);
    }

    #[test]
    fn test_plan_computes_while_store_keeps_changing() {
        let mut store = store("keep 0\ndrop 1\nkeep 2");
        let plan = store
            .plan_operations(&[op("drop", OperationKind::Shield)])
            .unwrap();

        // the plan owns its lines, so the store stays usable meanwhile
        assert!(store.set_mark(1, true));
        let update = plan.compute();
        let outcome = store.commit(update);

        assert!(outcome.filtered_rebuilt());
        assert_eq!(store.filtered_indices(), &[0, 2]);
        assert!(store.line(1).unwrap().is_marked());
        let marked: Vec<usize> = store.marked().map(|l| l.line_number()).collect();
        assert_eq!(marked, vec![1]);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_changes() {
        let mut store = store("a\nb\nc");
        let snapshot = store.snapshot();

        store.set_mark(0, true);
        store.apply_operations(&[op("b", OperationKind::Filter)]);

        assert_eq!(snapshot.filtered().len(), 3);
        assert!(!snapshot.whole()[0].is_marked());
        assert_eq!(store.filtered_indices(), &[1]);
        assert!(store.line(0).unwrap().is_marked());
    }

    #[test]
    fn test_highlight_only_plan_skips_lines() {
        let mut store = store("abc");
        store.apply_operations(&[op("a", OperationKind::Filter)]);
        let plan = store
            .plan_operations(&[
                op("a", OperationKind::Filter),
                op("c", OperationKind::Highlight),
            ])
            .unwrap();
        assert!(plan.lines.is_none());
    }

    #[test]
    fn test_filtered_out_first_line_floors_at_zero() {
        let mut store = store("b0\na1\na2");
        store.apply_operations(&[op("a", OperationKind::Filter)]);
        assert_eq!(store.jump_index(Panel::Filtered, 0), 0);
    }
}

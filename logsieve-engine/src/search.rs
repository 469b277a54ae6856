use crate::{
    error::{EngineError, Result},
    line_store::{LineSnapshot, LineStore},
    log_line::LINE_SENTINEL,
};

/// one occurrence of the search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub line_number: usize,
    /// position of the line in the filtered list at search time
    pub filtered_index: usize,
    /// position of this match among all matches
    pub ordinal: usize,
    /// byte offsets into the line text
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// previous results, if any, were kept
    NoResults,
    Found {
        total: usize,
        /// filtered index of the first match
        jump_index: usize,
    },
}

/// check a query coming from the user before it reaches a document
///
/// a single trailing sentinel (left over from copying a whole line) is
/// dropped; line breaks and any other use of the sentinel are rejected
pub fn validate_query(query: &str) -> Result<&str> {
    if query.contains('\n') || query.contains('\r') {
        return Err(EngineError::UnsupportedQuery(
            "query spans more than one line".to_string(),
        ));
    }

    let query = query.strip_suffix(LINE_SENTINEL).unwrap_or(query);
    if query.contains(LINE_SENTINEL) {
        return Err(EngineError::UnsupportedQuery(
            "query spans more than one line".to_string(),
        ));
    }
    if query.is_empty() {
        return Err(EngineError::EmptyQuery);
    }
    Ok(query)
}

/// every non-overlapping occurrence of `query` in the filtered lines of `lines`
pub fn find_matches(query: &str, lines: &LineSnapshot) -> Vec<SearchMatch> {
    let mut results = Vec::new();
    if query.is_empty() {
        return results;
    }

    for (filtered_index, line) in lines.filtered().enumerate() {
        for (start, matched) in line.content().match_indices(query) {
            results.push(SearchMatch {
                line_number: line.line_number(),
                filtered_index,
                ordinal: results.len(),
                start,
                end: start + matched.len(),
            });
        }
    }

    results
}

/// literal search over a document's filtered lines with a navigable cursor
#[derive(Default)]
pub struct SearchEngine {
    query: String,
    results: Vec<SearchMatch>,
    cursor: Option<usize>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&mut self, query: &str, store: &LineStore) -> SearchOutcome {
        let results = find_matches(query, &store.snapshot());
        self.publish(query, results)
    }

    /// install results computed elsewhere; empty results keep the previous state
    pub fn publish(&mut self, query: &str, results: Vec<SearchMatch>) -> SearchOutcome {
        let Some(first) = results.first() else {
            return SearchOutcome::NoResults;
        };
        let jump_index = first.filtered_index;
        let total = results.len();

        self.query = query.to_string();
        self.results = results;
        self.cursor = Some(0);
        SearchOutcome::Found { total, jump_index }
    }

    /// move to the previous match, staying on the first one
    pub fn previous(&mut self) {
        if let Some(cursor) = self.cursor {
            self.cursor = Some(cursor.saturating_sub(1));
        }
    }

    /// move to the next match, staying on the last one
    pub fn next(&mut self) {
        if let Some(cursor) = self.cursor {
            let last = self.results.len().saturating_sub(1);
            self.cursor = Some((cursor + 1).min(last));
        }
    }

    pub fn stop(&mut self) {
        self.results.clear();
        self.cursor = None;
        self.query.clear();
    }

    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchMatch] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// ordinal of the current match
    pub fn current_ordinal(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.results.get(self.cursor?)
    }

    /// filtered index of the line holding the current match
    pub fn jump_index(&self) -> Option<usize> {
        self.current().map(|m| m.filtered_index)
    }

    /// matches on one line, in offset order
    pub fn matches_for_line(&self, line_number: usize) -> &[SearchMatch] {
        let start = self
            .results
            .partition_point(|m| m.line_number < line_number);
        let end = self
            .results
            .partition_point(|m| m.line_number <= line_number);
        &self.results[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        operation::{OperationKind, TextOperation},
        source::read_lines_from,
    };

    fn store(text: &str) -> LineStore {
        let mut store = LineStore::default();
        store.load(read_lines_from(text.as_bytes()).unwrap());
        store
    }

    #[test]
    fn test_single_match_scenario() {
        let store = store("abc\nxyz");
        let mut engine = SearchEngine::new();
        let outcome = engine.search("b", &store);
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                total: 1,
                jump_index: 0
            }
        );
        assert_eq!(
            engine.results(),
            &[SearchMatch {
                line_number: 0,
                filtered_index: 0,
                ordinal: 0,
                start: 1,
                end: 2,
            }]
        );
        assert_eq!(engine.current_ordinal(), Some(0));
    }

    #[test]
    fn test_all_non_overlapping_occurrences() {
        let store = store("aaaa\nbaab");
        let mut engine = SearchEngine::new();
        engine.search("aa", &store);
        let spans: Vec<(usize, usize, usize)> = engine
            .results()
            .iter()
            .map(|m| (m.line_number, m.start, m.end))
            .collect();
        assert_eq!(spans, vec![(0, 0, 2), (0, 2, 4), (1, 1, 3)]);
        let ordinals: Vec<usize> = engine.results().iter().map(|m| m.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_only_sees_filtered_lines() {
        let mut store = store("hit one\nhidden hit\nhit two");
        store.apply_operations(&[TextOperation::new("hidden", OperationKind::Shield)]);
        let mut engine = SearchEngine::new();
        engine.search("hit", &store);

        let located: Vec<(usize, usize)> = engine
            .results()
            .iter()
            .map(|m| (m.line_number, m.filtered_index))
            .collect();
        assert_eq!(located, vec![(0, 0), (2, 1)]);
    }

    #[test]
    fn test_no_results_keeps_previous_state() {
        let store = store("abc\nabd");
        let mut engine = SearchEngine::new();
        engine.search("ab", &store);
        engine.next();

        assert_eq!(engine.search("zzz", &store), SearchOutcome::NoResults);
        assert_eq!(engine.total(), 2);
        assert_eq!(engine.current_ordinal(), Some(1));
        assert_eq!(engine.query(), "ab");
    }

    #[test]
    fn test_search_is_deterministic() {
        let store = store("x1 x2\nnone\nx3");
        let mut engine = SearchEngine::new();
        engine.search("x", &store);
        let first = engine.results().to_vec();
        engine.search("x", &store);
        assert_eq!(engine.results(), first.as_slice());
    }

    #[test]
    fn test_navigation_clamps() {
        let store = store("a a\na");
        let mut engine = SearchEngine::new();
        engine.search("a", &store);
        assert_eq!(engine.total(), 3);

        engine.previous();
        assert_eq!(engine.current_ordinal(), Some(0));

        engine.next();
        engine.next();
        assert_eq!(engine.current_ordinal(), Some(2));
        engine.next();
        assert_eq!(engine.current_ordinal(), Some(2));
        assert_eq!(engine.jump_index(), Some(1));
    }

    #[test]
    fn test_stop_clears_everything() {
        let store = store("abc");
        let mut engine = SearchEngine::new();
        engine.search("a", &store);
        engine.stop();
        assert!(!engine.is_active());
        assert_eq!(engine.total(), 0);
        assert_eq!(engine.current_ordinal(), None);
        assert_eq!(engine.query(), "");
        assert_eq!(engine.jump_index(), None);

        engine.next();
        assert_eq!(engine.current_ordinal(), None);
    }

    #[test]
    fn test_matches_for_line() {
        let store = store("a\nb\naa\na");
        let mut engine = SearchEngine::new();
        engine.search("a", &store);
        assert_eq!(engine.matches_for_line(2).len(), 2);
        assert_eq!(engine.matches_for_line(1).len(), 0);
        assert_eq!(engine.matches_for_line(3)[0].ordinal, 3);
    }

    #[test]
    fn test_sentinel_is_not_searchable() {
        let store = store("abc");
        assert!(find_matches(LINE_SENTINEL, &store.snapshot()).is_empty());
    }

    #[test]
    fn test_line_separator_is_ordinary_text() {
        let store = store("json {\"a\":\"x\u{2028}y\"}\nplain");
        let query = validate_query("x\u{2028}y").unwrap();
        let results = find_matches(query, &store.snapshot());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].line_number, 0);
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("error").unwrap(), "error");
        let copied = format!("error{LINE_SENTINEL}");
        assert_eq!(validate_query(&copied).unwrap(), "error");

        assert!(matches!(
            validate_query("two\nlines"),
            Err(EngineError::UnsupportedQuery(_))
        ));
        let spanning = format!("a{LINE_SENTINEL}b");
        assert!(matches!(
            validate_query(&spanning),
            Err(EngineError::UnsupportedQuery(_))
        ));
        let doubled = format!("a{LINE_SENTINEL}{LINE_SENTINEL}");
        assert!(matches!(
            validate_query(&doubled),
            Err(EngineError::UnsupportedQuery(_))
        ));
        assert!(matches!(validate_query(""), Err(EngineError::EmptyQuery)));
    }
}

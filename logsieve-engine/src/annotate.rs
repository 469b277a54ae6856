use crate::{operation::TextOperation, search::SearchMatch, theme};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    Highlight(Color),
    /// the match under the search cursor
    SearchActive,
    SearchInactive,
}

impl StyleTag {
    pub fn style(self) -> Style {
        match self {
            StyleTag::Highlight(color) => Style::new().fg(color),
            StyleTag::SearchActive => theme::SEARCH_ACTIVE_STYLE,
            StyleTag::SearchInactive => theme::SEARCH_INACTIVE_STYLE,
        }
    }
}

/// one paint layer over a line; byte offsets into the line text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub start: usize,
    pub end: usize,
    pub tag: StyleTag,
}

/// highlight layers for `text`, in operation order; later layers paint over earlier ones
pub fn annotate(text: &str, highlight_ops: &[TextOperation]) -> Vec<StyledSpan> {
    let mut spans = Vec::new();
    for op in highlight_ops.iter().filter(|op| op.kind.is_highlight()) {
        if op.text.is_empty() {
            continue;
        }
        spans.extend(text.match_indices(op.text.as_str()).map(|(start, matched)| {
            StyledSpan {
                start,
                end: start + matched.len(),
                tag: StyleTag::Highlight(op.color),
            }
        }));
    }
    spans
}

/// [`annotate`] plus the search matches of this line painted on top
pub fn annotate_with_search(
    text: &str,
    highlight_ops: &[TextOperation],
    line_matches: &[SearchMatch],
    active_ordinal: Option<usize>,
) -> Vec<StyledSpan> {
    let mut spans = annotate(text, highlight_ops);
    spans.extend(
        line_matches
            .iter()
            .filter(|m| m.end <= text.len())
            .map(|m| StyledSpan {
                start: m.start,
                end: m.end,
                tag: if Some(m.ordinal) == active_ordinal {
                    StyleTag::SearchActive
                } else {
                    StyleTag::SearchInactive
                },
            }),
    );
    spans
}

/// resolve paint layers into contiguous segments covering all of `text`
///
/// each segment's style is `base` patched with every layer covering it, in order
pub fn flatten(text: &str, spans: &[StyledSpan], base: Style) -> Vec<(Range<usize>, Style)> {
    let mut bounds: Vec<usize> = Vec::with_capacity(spans.len() * 2 + 2);
    bounds.push(0);
    bounds.push(text.len());
    for span in spans {
        bounds.push(span.start.min(text.len()));
        bounds.push(span.end.min(text.len()));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut segments: Vec<(Range<usize>, Style)> = Vec::new();
    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        let style = spans
            .iter()
            .filter(|s| s.start <= start && end <= s.end)
            .fold(base, |style, s| style.patch(s.tag.style()));

        // merge with the previous segment when nothing changes
        match segments.last_mut() {
            Some((range, last_style)) if *last_style == style => range.end = end,
            _ => segments.push((start..end, style)),
        }
    }
    segments
}

/// renderable line for `text` with `spans` applied
pub fn to_line(text: &str, spans: &[StyledSpan], base: Style) -> Line<'static> {
    if spans.is_empty() {
        return Line::styled(text.to_string(), base);
    }
    let spans: Vec<Span<'static>> = flatten(text, spans, base)
        .into_iter()
        .map(|(range, style)| Span::styled(text[range].to_string(), style))
        .collect();
    Line::from(spans)
}

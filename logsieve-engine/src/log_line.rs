/// appended to every non-empty ingested line; turned back into a line break
/// whenever text leaves the engine (selection copy, clipboard export)
///
/// U+FDD0 is a noncharacter reserved for internal use, so it does not show up
/// in log text the way U+2028 does in JSON and JavaScript output
pub const LINE_SENTINEL: &str = "\u{FDD0}";

/// a single ingested line of a document
#[derive(Debug, Clone)]
pub struct LogLine {
    line_number: usize,
    text: String,
    is_marked: bool,
}

impl LogLine {
    /// build a line from raw input; non-empty text gets the sentinel appended
    pub fn from_raw(line_number: usize, raw: &str) -> Self {
        let text = if raw.is_empty() {
            String::new()
        } else {
            format!("{raw}{LINE_SENTINEL}")
        };
        Self {
            line_number,
            text,
            is_marked: false,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// stored text, including the trailing sentinel
    pub fn text(&self) -> &str {
        &self.text
    }

    /// text without the trailing sentinel; offsets are shared with [`Self::text`]
    pub fn content(&self) -> &str {
        strip_sentinel(&self.text)
    }

    pub fn is_marked(&self) -> bool {
        self.is_marked
    }

    pub(crate) fn set_marked(&mut self, marked: bool) {
        self.is_marked = marked;
    }

    /// identity comparison: line number plus mark state, text is ignored
    pub fn same_line(&self, other: &LogLine) -> bool {
        self.line_number == other.line_number && self.is_marked == other.is_marked
    }
}

/// drop a single trailing sentinel, if any
pub fn strip_sentinel(text: &str) -> &str {
    text.strip_suffix(LINE_SENTINEL).unwrap_or(text)
}

/// stored text of one line as copied out of a view: the trailing sentinel
/// becomes a line break, everything else is kept byte for byte
pub fn restore_line_breaks(text: &str) -> String {
    match text.strip_suffix(LINE_SENTINEL) {
        Some(content) => format!("{content}\n"),
        None => text.to_string(),
    }
}

/// several lines copied out together, each restored on its own
pub fn copy_lines<'a>(lines: impl IntoIterator<Item = &'a LogLine>) -> String {
    lines
        .into_iter()
        .map(|line| restore_line_breaks(line.text()))
        .collect()
}

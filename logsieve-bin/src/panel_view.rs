use logsieve_engine::Panel;

/// selection and scroll offset of one list panel
///
/// the panel's length lives in the document, so every move takes the current
/// length and clamps against it
pub struct PanelView {
    pub panel: Panel,
    selected: Option<usize>,
    offset: usize,
}

impl PanelView {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            selected: None,
            offset: 0,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn select(&mut self, index: usize, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(index.min(len - 1));
    }

    pub fn select_next(&mut self, len: usize) {
        let next = match self.selected {
            Some(i) => i.saturating_add(1),
            None => 0, // select first item if nothing is selected
        };
        self.select(next, len);
    }

    pub fn select_previous(&mut self, len: usize) {
        let prev = match self.selected {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.select(prev, len);
    }

    pub fn select_first(&mut self, len: usize) {
        self.select(0, len);
    }

    pub fn select_last(&mut self, len: usize) {
        self.select(len.saturating_sub(1), len);
    }

    pub fn page_down(&mut self, step: usize, len: usize) {
        let next = self.selected.unwrap_or(0).saturating_add(step);
        self.select(next, len);
    }

    pub fn page_up(&mut self, step: usize, len: usize) {
        let prev = self.selected.unwrap_or(0).saturating_sub(step);
        self.select(prev, len);
    }

    /// re-validate after the panel's content changed underneath us
    pub fn clamp(&mut self, len: usize) {
        if let Some(i) = self.selected {
            self.select(i, len);
        }
        self.offset = self.offset.min(len.saturating_sub(1));
    }

    /// scroll so the selection is inside a viewport of `height` rows
    pub fn ensure_visible(&mut self, height: usize) {
        let Some(selected) = self.selected else {
            return;
        };
        if height == 0 {
            return;
        }
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + height {
            self.offset = selected + 1 - height;
        }
    }

    /// put `index` at the top of the viewport and select it
    pub fn scroll_to(&mut self, index: usize, len: usize) {
        self.select(index, len);
        self.offset = self.selected.unwrap_or(0);
    }

    /// rows `offset..offset + height` that exist in a panel of `len` lines
    pub fn visible_range(&self, height: usize, len: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        start..(start + height).min(len)
    }
}

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};
use std::time::{Duration, Instant};

/// temporary message shown in the footer
pub struct DisplayEvent {
    pub text: String,
    pub duration: Duration,
    pub start_time: Instant,
    pub style: Style,
}

impl DisplayEvent {
    pub fn new(text: String, duration: Duration, style: Style) -> Self {
        Self {
            text,
            duration,
            start_time: Instant::now(),
            style,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }

    pub fn check_and_clear(event: Option<Self>) -> Option<Self> {
        match event {
            Some(e) if e.is_expired() => None,
            other => other,
        }
    }
}

/// one-line footer with left, centered and right sections
#[derive(Default)]
pub struct StatusBar {
    left: Vec<Span<'static>>,
    mid: Vec<Span<'static>>,
    right: Vec<Span<'static>>,
    style: Style,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(mut self, span: impl Into<Span<'static>>) -> Self {
        self.left.push(span.into());
        self
    }

    pub fn mid(mut self, span: impl Into<Span<'static>>) -> Self {
        self.mid.push(span.into());
        self
    }

    pub fn right(mut self, span: impl Into<Span<'static>>) -> Self {
        self.right.push(span.into());
        self
    }

    pub fn set_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn joined(segments: Vec<Span<'static>>) -> (Vec<Span<'static>>, usize) {
        let mut spans = Vec::new();
        let mut width = 0;
        for (i, span) in segments.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" | "));
                width += 3;
            }
            width += span.width();
            spans.push(span);
        }
        (spans, width)
    }

    pub fn render(self, area: Rect, buf: &mut Buffer) {
        let total_width = area.width as usize;

        let (left, left_len) = Self::joined(self.left);
        let (mid, mid_len) = Self::joined(self.mid);
        let (right, right_len) = Self::joined(self.right);

        let mid_start = total_width.saturating_sub(mid_len) / 2;
        let left_pad = mid_start.saturating_sub(left_len);
        let right_start = total_width.saturating_sub(right_len);
        let right_pad = right_start.saturating_sub(mid_start + mid_len);

        let mut spans = left;
        spans.push(Span::raw(" ".repeat(left_pad)));
        spans.extend(mid);
        spans.push(Span::raw(" ".repeat(right_pad)));
        spans.extend(right);

        Paragraph::new(Line::from(spans))
            .style(self.style)
            .render(area, buf);
    }
}

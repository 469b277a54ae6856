use super::{App, Focus, HELP_POPUP_WIDTH};
use crate::{panel_view::PanelView, status_bar::StatusBar};
use logsieve_engine::{DocumentState, LoadState, OperationKind, Panel, theme, to_line};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

fn kind_tag(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Filter => "F",
        OperationKind::Shield => "S",
        OperationKind::Highlight => "H",
        OperationKind::RegexFilter => "RF",
        OperationKind::RegexShield => "RS",
    }
}

fn panel_title(panel: Panel) -> &'static str {
    match panel {
        Panel::Whole => "Whole",
        Panel::Filtered => "Filtered",
        Panel::Marked => "Marked",
    }
}

/// visible rows of `view`, with line numbers and styled spans
fn panel_lines(
    state: &DocumentState,
    view: &PanelView,
    height: usize,
    with_search: bool,
    focused: bool,
) -> Vec<Line<'static>> {
    let store = state.store();
    let len = store.panel_len(view.panel);
    let number_width = store.whole().len().to_string().len();

    view.visible_range(height, len)
        .filter_map(|index| {
            let line = store.panel_line(view.panel, index)?;
            let spans = if with_search {
                state.annotate_with_search(line)
            } else {
                state.annotate(line)
            };
            let base = if line.is_marked() {
                theme::MARKED_STYLE.fg(theme::TEXT_FG_COLOR)
            } else {
                Style::new().fg(theme::TEXT_FG_COLOR)
            };

            let mut rendered = to_line(line.content(), &spans, base);
            rendered.spans.insert(
                0,
                Span::styled(
                    format!("{:>width$} ", line.line_number(), width = number_width),
                    theme::LINE_NUMBER_STYLE,
                ),
            );
            if focused && view.selected() == Some(index) {
                rendered = rendered.patch_style(theme::SELECTED_STYLE);
            }
            Some(rendered)
        })
        .collect()
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border_color = if focused {
        Color::White
    } else {
        Color::DarkGray
    };
    Block::default()
        .borders(Borders::TOP | Borders::LEFT)
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(border_color))
        .title(title)
}

impl App {
    pub(super) fn render_operation_bar(&self, area: Rect, buf: &mut Buffer) {
        let line = if self.focus == Focus::OperationInput {
            Line::from(vec![
                Span::styled(
                    format!(" add {} (tab: kind): ", self.input_kind.label()),
                    Style::new().bold(),
                ),
                Span::raw(format!("{}_", self.operation_input)),
            ])
        } else if self.bar.is_empty() {
            Line::from(Span::styled(
                " no operations, press a to add one",
                Style::new().fg(Color::DarkGray),
            ))
        } else {
            let mut spans = vec![Span::raw(" ")];
            for (i, op) in self.bar.operations().iter().enumerate() {
                let mut style = Style::new().fg(op.color);
                if !op.selected {
                    style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
                }
                if self.focus == Focus::Operations && i == self.selected_operation {
                    style = style.patch(theme::FOCUS_STYLE);
                }
                spans.push(Span::styled(
                    format!("[{}] {}", kind_tag(op.kind), op.text),
                    style,
                ));
                spans.push(Span::raw("  "));
            }
            Line::from(spans)
        };

        Paragraph::new(line)
            .style(theme::OPERATION_BAR_STYLE)
            .render(area, buf);
    }

    pub(super) fn render_panels(&mut self, main_area: Rect, bottom_area: Rect, buf: &mut Buffer) {
        let main_focused = self.focus != Focus::Bottom;
        let main_block = panel_block(String::new(), main_focused);
        let bottom_block = panel_block(String::new(), !main_focused);
        let main_inner = main_block.inner(main_area);
        let bottom_inner = bottom_block.inner(bottom_area);
        self.last_main_height = main_inner.height as usize;
        self.last_bottom_height = bottom_inner.height as usize;

        let Some(doc) = self.session.get(self.page) else {
            return;
        };
        let state = doc.read();
        let store = state.store();

        let main_len = store.panel_len(self.main_view.panel);
        let bottom_len = store.panel_len(self.bottom_view.panel);
        self.main_view.clamp(main_len);
        self.bottom_view.clamp(bottom_len);
        self.main_view.ensure_visible(self.last_main_height);
        self.bottom_view.ensure_visible(self.last_bottom_height);

        let main_title = match store.state() {
            LoadState::Loading => format!("[1]─{} (loading)", doc.name()),
            LoadState::Empty => format!("[1]─{} (empty)", doc.name()),
            LoadState::Ready => format!(
                "[1]─{} {}/{}",
                doc.name(),
                main_len,
                store.whole().len()
            ),
        };
        let bottom_title = format!("[2]─{} {}", panel_title(self.bottom_view.panel), bottom_len);

        let main_lines = panel_lines(
            &state,
            &self.main_view,
            self.last_main_height,
            true,
            main_focused,
        );
        let bottom_lines = panel_lines(
            &state,
            &self.bottom_view,
            self.last_bottom_height,
            false,
            !main_focused,
        );

        Paragraph::new(main_lines)
            .block(panel_block(main_title, main_focused))
            .render(main_area, buf);
        Paragraph::new(bottom_lines)
            .block(panel_block(bottom_title, !main_focused))
            .render(bottom_area, buf);
    }

    pub(super) fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let (left, mid) = match self.document() {
            Some(doc) => {
                let state = doc.read();
                let search = state.search();
                let left = match search.current_ordinal() {
                    Some(ordinal) => format!("match {}/{}", ordinal + 1, search.total()),
                    None => String::new(),
                };
                let mid = if search.is_active() {
                    format!("search: {}", search.query())
                } else {
                    "?: help | q: quit".to_string()
                };
                (left, mid)
            }
            None => (String::new(), "?: help | q: quit".to_string()),
        };

        let mut status_bar = StatusBar::new();
        if let Some(event) = &self.display_event {
            status_bar = status_bar.mid(event.text.clone()).set_style(event.style);
        } else if self.focus == Focus::SearchInput {
            status_bar = status_bar
                .mid(format!("/{}_", self.search_input))
                .set_style(theme::FOCUS_STYLE);
        } else {
            status_bar = status_bar
                .left(Span::styled(left, Style::new().fg(Color::DarkGray)))
                .mid(mid)
                .right(Span::styled(
                    format!("v{}", env!("CARGO_PKG_VERSION")),
                    Style::new().fg(Color::DarkGray),
                ));
        }

        status_bar.render(area, buf);
    }

    pub(super) fn render_help_popup(&self, area: Rect, buf: &mut Buffer) {
        let help_text = vec![
            Line::from("Navigation:".bold()),
            Line::from("  j/k/↑/↓     - Move to next/prev line"),
            Line::from("  g/G         - Jump to first/last line"),
            Line::from("  Ctrl+d/u    - Half page down/up"),
            Line::from("  Tab         - Switch focus between panels"),
            Line::from("  Enter       - Show selected line in the other panel"),
            Line::from(""),
            Line::from("Search:".bold()),
            Line::from("  /           - Search the filtered lines"),
            Line::from("  n/N         - Next/prev match"),
            Line::from("  Esc         - Stop search / go back"),
            Line::from(""),
            Line::from("Operations:".bold()),
            Line::from("  a           - Add operation (Tab cycles kind)"),
            Line::from("  o           - Focus operation bar"),
            Line::from("  ←/→ space d - Select, toggle, delete operation"),
            Line::from(""),
            Line::from("Marks:".bold()),
            Line::from("  m / M       - Toggle mark / clear all marks"),
            Line::from("  b           - Bottom panel: marked or whole"),
            Line::from("  y / c       - Copy marked lines / selected line"),
            Line::from("  q           - Quit program"),
        ];

        // calculate popup height: content lines + 2 for borders
        let popup_height = help_text.len() as u16 + 2;

        let popup_area = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(popup_height),
            Constraint::Fill(1),
        ])
        .split(area)[1];

        let popup_area = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(HELP_POPUP_WIDTH),
            Constraint::Fill(1),
        ])
        .split(popup_area)[1];

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::TEXT_FG_COLOR));

        Paragraph::new(help_text)
            .block(block)
            .fg(theme::TEXT_FG_COLOR)
            .render(popup_area, buf);
    }
}

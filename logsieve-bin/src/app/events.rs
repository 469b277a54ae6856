use super::{App, Focus};
use crate::panel_view::PanelView;
use anyhow::Result;
use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use logsieve_engine::{DocumentEvent, ExportStyle, Panel, copy_lines};

impl App {
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // help popup mode has higher priority
        if self.show_help_popup {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => {
                    self.show_help_popup = false;
                    return Ok(());
                }
                KeyCode::Char('q') => {
                    // let 'q' fall through to quit the program
                }
                _ => return Ok(()),
            }
        }

        match self.focus {
            Focus::SearchInput => {
                self.handle_search_input(key);
                return Ok(());
            }
            Focus::OperationInput => {
                self.handle_operation_input(key);
                return Ok(());
            }
            Focus::Operations => {
                if self.handle_operations_key(key) {
                    return Ok(());
                }
            }
            Focus::Main | Focus::Bottom => {}
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => {
                log::debug!("Quit key pressed");
                self.is_exiting = true;
            }
            KeyCode::Char('?') => self.show_help_popup = true,
            KeyCode::Char('d') if ctrl => self.move_selection(Movement::HalfPageDown),
            KeyCode::Char('u') if ctrl => self.move_selection(Movement::HalfPageUp),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(Movement::Next),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(Movement::Previous),
            KeyCode::Char('g') | KeyCode::Home => self.move_selection(Movement::First),
            KeyCode::Char('G') | KeyCode::End => self.move_selection(Movement::Last),
            KeyCode::Char('/') => {
                self.search_input.clear();
                self.focus = Focus::SearchInput;
            }
            KeyCode::Char('n') => self.navigate_search(true),
            KeyCode::Char('N') => self.navigate_search(false),
            KeyCode::Esc => self.go_back(),
            KeyCode::Char('m') => self.toggle_mark(),
            KeyCode::Char('M') => {
                if let Some(doc) = self.document() {
                    doc.clear_marks();
                }
                self.set_display_event("Marks cleared".to_string(), None);
            }
            KeyCode::Char('b') => self.switch_bottom_panel(),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Bottom => Focus::Main,
                    _ => Focus::Bottom,
                };
            }
            KeyCode::Enter => self.jump_to_other_panel(),
            KeyCode::Char('a') => {
                self.operation_input.clear();
                self.focus = Focus::OperationInput;
            }
            KeyCode::Char('o') => {
                if self.bar.is_empty() {
                    self.set_display_event("No operations yet, press a to add one".into(), None);
                } else {
                    self.selected_operation = self.selected_operation.min(self.bar.len() - 1);
                    self.focus = Focus::Operations;
                }
            }
            KeyCode::Char('y') => self.yank_marked_lines(),
            KeyCode::Char('c') => self.yank_selected_line(),
            _ => {}
        }
        Ok(())
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search_input.clear();
                self.focus = Focus::Main;
            }
            KeyCode::Enter => {
                self.focus = Focus::Main;
                let query = self.search_input.clone();
                self.submit_search(query);
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) => self.search_input.push(c),
            _ => {}
        }
    }

    fn handle_operation_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.operation_input.clear();
                self.focus = Focus::Main;
            }
            KeyCode::Tab => self.input_kind = self.input_kind.cycle(),
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.operation_input);
                match self.bar.add(text, self.input_kind) {
                    Ok(_) => {
                        self.focus = Focus::Main;
                        self.submit_operations();
                    }
                    Err(e) => self.show_error(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                self.operation_input.pop();
            }
            KeyCode::Char(c) => self.operation_input.push(c),
            _ => {}
        }
    }

    /// returns true when the key was consumed by the operation bar
    fn handle_operations_key(&mut self, key: KeyEvent) -> bool {
        let last = self.bar.len().saturating_sub(1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_operation = self.selected_operation.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected_operation = (self.selected_operation + 1).min(last);
            }
            KeyCode::Char(' ') => {
                if self.bar.toggle(self.selected_operation) {
                    self.submit_operations();
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(removed) = self.bar.remove(self.selected_operation) {
                    log::debug!("Removed operation `{}`", removed.text);
                    self.submit_operations();
                }
                if self.bar.is_empty() {
                    self.focus = Focus::Main;
                } else {
                    self.selected_operation = self.selected_operation.min(self.bar.len() - 1);
                }
            }
            KeyCode::Esc | KeyCode::Char('o') => self.focus = Focus::Main,
            _ => return false,
        }
        true
    }

    pub(super) fn handle_document_event(&mut self, event: DocumentEvent) {
        match event {
            DocumentEvent::Loaded { lines, .. } => {
                let len = self.panel_len(Panel::Filtered);
                self.main_view.select_first(len);
                self.set_display_event(format!("Loaded {} lines", lines), None);
            }
            DocumentEvent::IngestionFailed { message, .. } => self.show_error(message),
            DocumentEvent::OperationsApplied { outcome, .. } => {
                if outcome.filtered_rebuilt() {
                    self.reanchor_main_view();
                }
            }
            DocumentEvent::PatternRejected { error, .. } => self.show_error(error.to_string()),
            DocumentEvent::SearchFinished {
                total,
                jump_index,
                first_visible,
                ..
            } => {
                let len = self.panel_len(Panel::Filtered);
                let viewport = first_visible..first_visible + self.last_main_height;
                if viewport.contains(&jump_index) {
                    self.main_view.select(jump_index, len);
                } else {
                    self.main_view.scroll_to(jump_index, len);
                }
                self.focus = Focus::Main;
                self.set_display_event(format!("{} matches", total), None);
            }
            DocumentEvent::SearchNotFound { query, .. } => {
                self.show_error(format!("No results for `{}`", query));
            }
        }
    }

    // ------------------------------------------------------------------------
    // navigation
    // ------------------------------------------------------------------------

    fn move_selection(&mut self, movement: Movement) {
        let (panel, height) = match self.focus {
            Focus::Bottom => (self.bottom_view.panel, self.last_bottom_height),
            _ => (self.main_view.panel, self.last_main_height),
        };
        let len = self.panel_len(panel);
        let view = match self.focus {
            Focus::Bottom => &mut self.bottom_view,
            _ => &mut self.main_view,
        };

        let half_page = (height / 2).max(1);
        match movement {
            Movement::Next => view.select_next(len),
            Movement::Previous => view.select_previous(len),
            Movement::First => view.select_first(len),
            Movement::Last => view.select_last(len),
            Movement::HalfPageDown => view.page_down(half_page, len),
            Movement::HalfPageUp => view.page_up(half_page, len),
        }
    }

    fn navigate_search(&mut self, forward: bool) {
        let Some(doc) = self.document() else {
            return;
        };
        if forward {
            doc.search_next();
        } else {
            doc.search_previous();
        }
        let jump = doc.read().search().jump_index();

        if let Some(index) = jump {
            let len = self.panel_len(Panel::Filtered);
            self.main_view.select(index, len);
            self.focus = Focus::Main;
        }
    }

    fn go_back(&mut self) {
        let searching = self
            .document()
            .is_some_and(|doc| doc.read().search().is_active());
        if searching {
            if let Some(doc) = self.document() {
                doc.stop_search();
            }
        } else if self.focus != Focus::Main {
            self.focus = Focus::Main;
        }
    }

    fn toggle_mark(&mut self) {
        let Some(line_number) = self.selected_line_number() else {
            return;
        };
        if let Some(doc) = self.document() {
            doc.toggle_mark(line_number);
        }
    }

    fn switch_bottom_panel(&mut self) {
        let (panel, label) = match self.bottom_view.panel {
            Panel::Marked => (Panel::Whole, "whole"),
            _ => (Panel::Marked, "marked"),
        };

        // keep the bottom panel on the line the main panel is showing
        let target = self.main_view.selected().and_then(|index| {
            let doc = self.document()?;
            let state = doc.read();
            let line_number = state.store().line_number_at(Panel::Filtered, index)?;
            Some(state.store().jump_index(panel, line_number))
        });

        self.bottom_view = PanelView::new(panel);
        let len = self.panel_len(panel);
        self.bottom_view.scroll_to(target.unwrap_or(0), len);
        self.set_display_event(format!("Bottom panel shows {} lines", label), None);
    }

    /// select the focused panel's line in the other panel
    fn jump_to_other_panel(&mut self) {
        let Some(line_number) = self.selected_line_number() else {
            return;
        };
        let target_panel = match self.focus {
            Focus::Bottom => self.main_view.panel,
            _ => self.bottom_view.panel,
        };
        let Some((index, len)) = self.document().map(|doc| {
            let state = doc.read();
            (
                state.store().jump_index(target_panel, line_number),
                state.store().panel_len(target_panel),
            )
        }) else {
            return;
        };

        match self.focus {
            Focus::Bottom => {
                self.main_view.scroll_to(index, len);
                self.focus = Focus::Main;
            }
            _ => {
                self.bottom_view.scroll_to(index, len);
                self.focus = Focus::Bottom;
            }
        }
    }

    /// keep the main selection on the same line after the filtered list was rebuilt
    fn reanchor_main_view(&mut self) {
        let len = self.panel_len(Panel::Filtered);
        let index = match (self.anchor_line, self.document()) {
            (Some(line_number), Some(doc)) => {
                doc.read().store().jump_index(Panel::Filtered, line_number)
            }
            _ => 0,
        };
        self.main_view.scroll_to(index, len);
    }

    // ------------------------------------------------------------------------
    // clipboard
    // ------------------------------------------------------------------------

    fn yank_marked_lines(&mut self) {
        let Some(text) = self
            .document()
            .map(|doc| doc.read().store().export_marked(ExportStyle::Numbered))
        else {
            return;
        };
        if text.is_empty() {
            self.set_display_event("No marked lines to copy".to_string(), None);
            return;
        }

        let count = text.lines().count();
        match copy_to_clipboard(&text) {
            Ok(()) => self.set_display_event(format!("{} marked lines copied", count), None),
            Err(e) => self.show_error(format!("Clipboard error: {}", e)),
        }
    }

    fn yank_selected_line(&mut self) {
        let Some(line_number) = self.selected_line_number() else {
            log::debug!("No line selected for yanking");
            return;
        };
        let Some(text) = self.document().and_then(|doc| {
            let state = doc.read();
            state
                .store()
                .line(line_number)
                .map(|line| copy_lines([line]))
        }) else {
            return;
        };

        match copy_to_clipboard(&text) {
            Ok(()) => self.set_display_event(format!("Line {} copied", line_number), None),
            Err(e) => self.show_error(format!("Clipboard error: {}", e)),
        }
    }
}

#[derive(Clone, Copy)]
enum Movement {
    Next,
    Previous,
    First,
    Last,
    HalfPageDown,
    HalfPageUp,
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    log::debug!("Copied {} chars to clipboard", text.len());
    Ok(())
}

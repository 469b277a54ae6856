use crate::{panel_view::PanelView, status_bar::DisplayEvent};
use anyhow::{Result, anyhow};
use crossterm::event::{self, Event};
use logsieve_engine::{
    Document, DocumentEvent, EngineConfig, LineSource, OperationBar, OperationKind, Panel,
    Session, theme,
};
use ratatui::{Terminal, backend::CrosstermBackend, prelude::*, widgets::Widget};
use std::{
    io,
    sync::mpsc::Receiver,
    time::Duration,
};
use uuid::Uuid;

mod events;
mod render;

// constants
const DEFAULT_EVENT_POLL_INTERVAL_MS: u64 = 16;
const DEFAULT_BOTTOM_PANEL_HEIGHT: u16 = 10;
const HELP_POPUP_WIDTH: u16 = 60;
const DISPLAY_EVENT_DURATION_MS: u64 = 1500;

#[derive(Clone)]
pub struct AppDesc {
    pub event_poll_interval: Duration,
    /// rows of the bottom (marked / whole) panel, borders included
    pub bottom_panel_height: u16,
    /// operations added to the bar before the first frame
    pub initial_operations: Vec<(String, OperationKind)>,
    pub initial_search: Option<String>,
    pub engine: EngineConfig,
}

impl AppDesc {
    pub fn new() -> Self {
        Self {
            event_poll_interval: Duration::from_millis(DEFAULT_EVENT_POLL_INTERVAL_MS),
            bottom_panel_height: DEFAULT_BOTTOM_PANEL_HEIGHT,
            initial_operations: Vec::new(),
            initial_search: None,
            engine: EngineConfig::default(),
        }
    }
}

impl Default for AppDesc {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the application on `source` with custom configuration
pub fn start_with_desc(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    source: LineSource,
    desc: AppDesc,
) -> Result<()> {
    color_eyre::install().or(Err(anyhow!("Error installing color_eyre")))?;

    let app = App::new(source, &desc);
    app.run(terminal, &desc)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum Focus {
    Main,
    Bottom,
    Operations,
    OperationInput,
    SearchInput,
}

struct App {
    is_exiting: bool,
    session: Session,
    events: Receiver<DocumentEvent>,
    page: Uuid,
    bar: OperationBar,
    main_view: PanelView,   // filtered lines
    bottom_view: PanelView, // marked or whole lines
    focus: Focus,
    search_input: String,
    operation_input: String,
    input_kind: OperationKind,
    selected_operation: usize,
    /// line the main selection was on when operations were last submitted
    anchor_line: Option<usize>,
    bottom_panel_height: u16,
    last_main_height: usize,
    last_bottom_height: usize,
    show_help_popup: bool,
    display_event: Option<DisplayEvent>,
}

// ============================================================================
// Initialization
// ============================================================================
impl App {
    fn new(source: LineSource, desc: &AppDesc) -> Self {
        let mut session = Session::new(desc.engine.clone());
        let events = session.subscribe();
        let page = session.open(source).id();

        let mut app = Self {
            is_exiting: false,
            session,
            events,
            page,
            bar: OperationBar::new(),
            main_view: PanelView::new(Panel::Filtered),
            bottom_view: PanelView::new(Panel::Marked),
            focus: Focus::Main,
            search_input: String::new(),
            operation_input: String::new(),
            input_kind: OperationKind::default(),
            selected_operation: 0,
            anchor_line: None,
            bottom_panel_height: desc.bottom_panel_height,
            last_main_height: 1,
            last_bottom_height: 1,
            show_help_popup: false,
            display_event: None,
        };

        // queued behind the ingestion, so they run on the loaded lines
        for (text, kind) in &desc.initial_operations {
            if let Err(e) = app.bar.add(text.clone(), *kind) {
                log::warn!("Skipping initial operation: {}", e);
            }
        }
        if !app.bar.is_empty() {
            app.submit_operations();
        }
        if let Some(query) = &desc.initial_search {
            app.submit_search(query.clone());
        }

        app
    }
}

// ============================================================================
// Lifecycle
// ============================================================================
impl App {
    fn run(
        mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        desc: &AppDesc,
    ) -> Result<()> {
        let event_poll_interval = desc.event_poll_interval;

        while !self.is_exiting {
            self.poll_event(event_poll_interval)?;
            self.drain_document_events();
            self.check_and_clear_expired_event();
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
        }

        log::debug!("Exiting, closing {} page(s)", self.session.len());
        Ok(())
    }

    fn poll_event(&mut self, poll_interval: Duration) -> Result<()> {
        if event::poll(poll_interval)? {
            match event::read()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Resize(width, height) => {
                    log::debug!("Terminal resized to {}x{}", width, height);
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn drain_document_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if event.page() == self.page {
                self.handle_document_event(event);
            }
        }
    }
}

// ============================================================================
// Document access
// ============================================================================
impl App {
    fn document(&self) -> Option<&Document> {
        self.session.get(self.page)
    }

    fn focused_view(&self) -> &PanelView {
        match self.focus {
            Focus::Bottom => &self.bottom_view,
            _ => &self.main_view,
        }
    }

    /// line number under the selection of the focused panel
    fn selected_line_number(&self) -> Option<usize> {
        let view = self.focused_view();
        let index = view.selected()?;
        let doc = self.document()?;
        let state = doc.read();
        state.store().line_number_at(view.panel, index)
    }

    fn panel_len(&self, panel: Panel) -> usize {
        self.document()
            .map(|doc| doc.read().store().panel_len(panel))
            .unwrap_or(0)
    }

    fn submit_operations(&mut self) {
        self.anchor_line = self.main_view.selected().and_then(|index| {
            let doc = self.document()?;
            let state = doc.read();
            state.store().line_number_at(Panel::Filtered, index)
        });

        let operations = self.bar.active();
        let result = match self.document() {
            Some(doc) => doc.apply_operations(operations),
            None => return,
        };
        if let Err(e) = result {
            self.show_error(e.to_string());
        }
    }

    fn submit_search(&mut self, query: String) {
        let first_visible = self.main_view.offset();
        let result = match self.document() {
            Some(doc) => doc.search(&query, first_visible),
            None => return,
        };
        if let Err(e) = result {
            self.show_error(e.to_string());
        }
    }
}

// ============================================================================
// Display events
// ============================================================================
impl App {
    /// Set a display event to show in the footer
    fn set_display_event(&mut self, text: String, style: Option<Style>) {
        self.display_event = Some(DisplayEvent::new(
            text,
            Duration::from_millis(DISPLAY_EVENT_DURATION_MS),
            style.unwrap_or(theme::DISPLAY_EVENT_STYLE),
        ));
    }

    fn show_error(&mut self, text: String) {
        log::warn!("{}", text);
        self.set_display_event(
            text,
            Some(Style::new().fg(Color::White).bg(Color::Red)),
        );
    }

    fn check_and_clear_expired_event(&mut self) {
        self.display_event = DisplayEvent::check_and_clear(self.display_event.take());
    }
}

// ============================================================================
// Widget implementation
// ============================================================================
impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [operations_area, main_area, bottom_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(self.bottom_panel_height),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_operation_bar(operations_area, buf);
        self.render_panels(main_area, bottom_area, buf);
        self.render_footer(footer_area, buf);

        if self.show_help_popup {
            self.render_help_popup(area, buf);
        }
    }
}

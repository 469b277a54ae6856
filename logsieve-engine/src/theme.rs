use ratatui::{prelude::*, style::Color};

/// colors handed out to new text operations, in bar order once shuffled
pub const OPERATION_COLORS: [Color; 13] = [
    Color::Red,
    Color::Yellow,
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Rgb(33, 150, 255),
    Color::Rgb(239, 83, 80),
    Color::Rgb(221, 173, 0),
    Color::Rgb(255, 64, 129),
    Color::Rgb(251, 140, 0),
    Color::Rgb(201, 79, 79),
    Color::Rgb(120, 130, 254),
    Color::Rgb(220, 253, 139),
];

/// color of operations created outside an operation bar
pub const DEFAULT_OPERATION_COLOR: Color = Color::Gray;

pub const TEXT_FG_COLOR: Color = Color::Gray;

pub const SEARCH_ACTIVE_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

pub const SEARCH_INACTIVE_STYLE: Style = Style::new()
    .fg(Color::Rgb(169, 183, 198))
    .bg(Color::Rgb(50, 89, 61));

pub const MARKED_STYLE: Style = Style::new().bg(Color::Rgb(41, 65, 127));

pub const SELECTED_STYLE: Style = Style::new().bg(Color::DarkGray);

pub const LINE_NUMBER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const DISPLAY_EVENT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const OPERATION_BAR_STYLE: Style = Style::new().bg(Color::Rgb(61, 50, 35));

pub const FOCUS_STYLE: Style = Style::new().bg(Color::DarkGray);

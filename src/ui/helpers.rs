use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::preferences::{HexColor, Theme};

/// Colors for the editor chrome. The preview uses the invoice colors
/// instead.
#[derive(Clone, Copy)]
pub(crate) struct Palette {
    pub(crate) base: Style,
    pub(crate) accent: Color,
    pub(crate) muted: Color,
    pub(crate) active: Color,
    pub(crate) highlight: Style,
}

impl Palette {
    pub(crate) fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                base: Style::default().fg(Color::Black).bg(Color::White),
                accent: Color::Blue,
                muted: Color::DarkGray,
                active: Color::Magenta,
                highlight: Style::default()
                    .bg(Color::Rgb(0xdd, 0xe6, 0xf5))
                    .add_modifier(Modifier::BOLD),
            },
            Theme::Dark => Self {
                base: Style::default().fg(Color::White).bg(Color::Rgb(0x1e, 0x1e, 0x24)),
                accent: Color::Cyan,
                muted: Color::Gray,
                active: Color::Yellow,
                highlight: Style::default()
                    .bg(Color::Rgb(0x33, 0x3a, 0x4a))
                    .add_modifier(Modifier::BOLD),
            },
        }
    }
}

pub(crate) fn rgb(color: HexColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Render one `Name: value` line of a modal form, with a placeholder for
/// empty values and the active field highlighted.
pub(crate) fn field_line(
    name: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{name}: ")),
        Span::styled(display, style),
    ])
}

/// Pad or truncate `text` to exactly `width` characters. Truncated text ends
/// with `…`.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut padded = text.to_string();
        padded.push_str(&" ".repeat(width - count));
        return padded;
    }
    if width == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(width - 1).collect();
    truncated.push('…');
    truncated
}

/// Right-align `text` in `width` characters, truncating from the left.
pub(crate) fn fit_right(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count >= width {
        return text.chars().skip(count - width).collect();
    }
    format!("{}{}", " ".repeat(width - count), text)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

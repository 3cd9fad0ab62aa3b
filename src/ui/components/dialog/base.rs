//! Base dialog component

use crate::ui::widgets::wrap_text;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Horizontal padding inside the border, both sides together
const PADDING: u16 = 4;

/// Configuration for rendering a dialog
pub struct DialogConfig<'a> {
    pub title: &'a str,
    pub title_color: Color,
    pub border_color: Color,
    /// Message content (can be multi-line with \n)
    pub message: &'a str,
    /// Hint text shown at the bottom (e.g., "Press Enter to dismiss")
    pub hint: Option<Vec<Span<'a>>>,
    pub max_width: u16,
}

impl Default for DialogConfig<'_> {
    fn default() -> Self {
        Self {
            title: "Dialog",
            title_color: Color::White,
            border_color: Color::White,
            message: "",
            hint: None,
            max_width: 60,
        }
    }
}

/// Centered rectangle for a dialog, clamped to the screen
fn dialog_area(screen: Rect, content_width: u16, content_height: u16) -> Rect {
    let width = (content_width + PADDING + 2).min(screen.width);
    let height = (content_height + 2).max(5).min(screen.height);
    Rect {
        x: screen.x + screen.width.saturating_sub(width) / 2,
        y: screen.y + screen.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Render a centered dialog overlay
pub fn render_dialog(frame: &mut Frame, config: DialogConfig) {
    let screen = frame.area();
    let max_width = config.max_width.min(screen.width);
    let max_line_width = max_width.saturating_sub(PADDING + 2).max(1) as usize;

    let wrapped_lines = wrap_text(config.message, max_line_width);
    let content_width = wrapped_lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(config.title.chars().count()) as u16;

    // title + blank + message (+ blank + hint)
    let hint_lines = if config.hint.is_some() { 2 } else { 0 };
    let content_height = 2 + wrapped_lines.len() as u16 + hint_lines;
    let area = dialog_area(screen, content_width, content_height);

    // Clear the area behind the dialog
    frame.render_widget(Clear, area);

    let mut content = vec![
        Line::from(Span::styled(
            config.title,
            Style::default()
                .fg(config.title_color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    content.extend(wrapped_lines.into_iter().map(Line::from));
    if let Some(hint_spans) = config.hint {
        content.push(Line::from(""));
        content.push(Line::from(hint_spans));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(config.border_color))
        .padding(ratatui::widgets::Padding::horizontal(PADDING / 2))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(Paragraph::new(content).block(block), area);
}

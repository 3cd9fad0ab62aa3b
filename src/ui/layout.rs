//! Layout components (header, footer buttons, status bar)

use super::components::{render_button, BUTTON_HEIGHT, BUTTON_WIDTH};
use crate::app::{App, Focus};
use crate::platform::{DISMISS_SHORTCUT, SUBMIT_SHORTCUT};
use dynamic_popup::state::SubmissionPhase;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Screen regions of the popup
pub struct PopupLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
    pub status: Rect,
}

/// Split the screen into header, body, footer and status bar
pub fn create_layout(area: Rect) -> PopupLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Title + rule
            Constraint::Min(0),                // Form body
            Constraint::Length(BUTTON_HEIGHT), // Buttons
            Constraint::Length(1),             // Status bar
        ])
        .split(area);

    PopupLayout {
        header: chunks[0],
        body: chunks[1],
        footer: chunks[2],
        status: chunks[3],
    }
}

/// Draw the title, with a close hint when the form can be dismissed
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!(" {}", app.form.title()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if !app.form.is_blocking() {
        spans.push(Span::styled(
            format!("  ({DISMISS_SHORTCUT} to close)"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, area);
}

/// Draw the Submit and Cancel buttons
pub fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let submitting = app.form.phase() == SubmissionPhase::Submitting;
    let submit_label = if submitting { "Submitting" } else { "Submit" };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Length(1),
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Min(0),
        ])
        .split(area);

    render_button(
        frame,
        chunks[1],
        submit_label,
        app.focus == Focus::Submit,
        !submitting,
    );
    if !app.form.is_blocking() {
        render_button(
            frame,
            chunks[3],
            "Cancel",
            app.focus == Focus::Cancel,
            !submitting,
        );
    }
}

/// Key hints, or the latest status message
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    if let Some(msg) = &app.status_message {
        spans.push(Span::styled(format!(" {msg} "), Style::default().fg(Color::Yellow)));
    } else if app.form.has_validation_errors() {
        spans.push(Span::styled(
            " Some fields need attention ",
            Style::default().fg(Color::Red),
        ));
    }

    if app.show_hints {
        if !spans.is_empty() {
            spans.push(Span::raw("| "));
        }
        spans.push(Span::styled(
            format!(" Tab: next  Space: select  {SUBMIT_SHORTCUT}: submit"),
            Style::default().fg(Color::Gray),
        ));
        if !app.form.is_blocking() {
            spans.push(Span::styled(
                format!("  {DISMISS_SHORTCUT}: cancel"),
                Style::default().fg(Color::Gray),
            ));
        }
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);
}

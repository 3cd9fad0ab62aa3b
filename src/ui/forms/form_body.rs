//! Scrollable form body built from the content flow

use super::field_renderer::{field_lines, FieldView};
use crate::app::{App, Focus};
use crate::ui::prose::prose_lines;
use crate::ui::widgets::render_scrollable_list;
use dynamic_popup::parser::ContentElement;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, List, ListItem, Padding},
    Frame,
};

/// Prose and visible fields in document order, plus the index of the
/// focused field's item
pub fn body_items(app: &App, width: usize) -> (Vec<ListItem<'static>>, Option<usize>) {
    let mut items = Vec::new();
    let mut selected = None;

    for element in app.form.content_flow() {
        match element {
            ContentElement::Prose(text) => {
                let mut lines = prose_lines(text, width);
                if !lines.is_empty() {
                    lines.push(Line::default());
                    items.push(ListItem::new(lines));
                }
            }
            ContentElement::Field(field) => {
                if !app.form.is_visible(field.id()) {
                    continue;
                }
                let is_focused = app.is_focused(field.id());
                if is_focused {
                    selected = Some(items.len());
                }
                let mut lines = field_lines(&FieldView {
                    field,
                    value: app.form.value(field.id()),
                    is_focused,
                    is_required: app.form.is_required(field.id()),
                    has_error: app.form.has_error(field.id()),
                    option_cursor: app.option_cursor,
                });
                lines.push(Line::default());
                items.push(ListItem::new(lines));
            }
        }
    }

    // Buttons live below the body; keep its end in view
    if matches!(app.focus, Focus::Submit | Focus::Cancel) {
        selected = items.len().checked_sub(1);
    }
    (items, selected)
}

/// Draw the form body
pub fn draw_form_body(frame: &mut Frame, area: Rect, app: &App) {
    let width = area.width.saturating_sub(2) as usize;
    let (items, selected) = body_items(app, width);
    let list = List::new(items).block(Block::default().padding(Padding::horizontal(1)));
    render_scrollable_list(frame, area, list, selected);
}

//! Reusable UI widget helpers

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListState},
    Frame,
};

/// Render a list that scrolls to keep `selected` in view.
///
/// With nothing selected the list stays at the top.
pub fn render_scrollable_list(frame: &mut Frame, area: Rect, list: List, selected: Option<usize>) {
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Word-wrap plain text; `\n` starts a new line
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = current_line.chars().count() + word.chars().count() + 1;
            if needed > max_width && !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }
        lines.push(current_line);
    }

    lines
}

/// Word-wrap styled spans, keeping each word's style
pub fn wrap_spans(spans: Vec<Span<'static>>, max_width: usize) -> Vec<Line<'static>> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0;

    for span in spans {
        let style = span.style;
        for word in span.content.split_inclusive(' ') {
            let visible = word.trim_end().chars().count();
            if current_width + visible > max_width && current_width > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            current.push(Span::styled(word.to_string(), style));
            current_width += word.chars().count();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

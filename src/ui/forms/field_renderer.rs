//! Field rendering: one form field to styled lines

use dynamic_popup::state::{Field, FieldType, FieldValue};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Text shown under a field that failed validation
pub const REQUIRED_ERROR: &str = "This field is required";

const CURSOR: &str = "▌";
const INDENT: &str = "  ";

/// Everything needed to draw one field
pub struct FieldView<'a> {
    pub field: &'a Field,
    pub value: Option<&'a FieldValue>,
    pub is_focused: bool,
    pub is_required: bool,
    pub has_error: bool,
    /// Highlighted option when focused
    pub option_cursor: usize,
}

fn accent(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Label, control and error marker for a field
pub fn field_lines(view: &FieldView) -> Vec<Line<'static>> {
    let mut lines = vec![label_line(view)];
    match view.field.field_type {
        FieldType::TextField => lines.push(text_field_line(view)),
        FieldType::TextArea => lines.extend(text_area_lines(view)),
        FieldType::RadioButton => lines.extend(choice_lines(view, "(•)", "( )")),
        FieldType::Checkbox => lines.extend(choice_lines(view, "[x]", "[ ]")),
        FieldType::Dropdown if view.is_focused => lines.extend(choice_lines(view, "✓", " ")),
        FieldType::Dropdown => lines.push(dropdown_line(view)),
    }
    if view.has_error {
        lines.push(Line::from(Span::styled(
            format!("{INDENT}! {REQUIRED_ERROR}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn label_line(view: &FieldView) -> Line<'static> {
    let marker = if view.is_focused { "▶ " } else { INDENT };
    let mut spans = vec![
        Span::styled(marker, accent(view.is_focused)),
        Span::styled(
            view.field.label.clone(),
            accent(view.is_focused).add_modifier(Modifier::BOLD),
        ),
    ];
    if view.is_required {
        spans.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn placeholder(view: &FieldView) -> Option<Span<'static>> {
    view.field
        .placeholder
        .as_ref()
        .map(|p| Span::styled(p.clone(), dim().add_modifier(Modifier::ITALIC)))
}

fn text_value<'a>(view: &FieldView<'a>) -> &'a str {
    view.value.map(FieldValue::as_text).unwrap_or_default()
}

fn text_field_line(view: &FieldView) -> Line<'static> {
    let text = text_value(view);
    let mut spans = vec![Span::raw(INDENT), Span::styled("› ", dim())];
    if text.is_empty() && !view.is_focused {
        spans.push(placeholder(view).unwrap_or_else(|| Span::styled("(empty)", dim())));
    } else {
        spans.push(Span::raw(text.to_string()));
    }
    if view.is_focused {
        spans.push(Span::styled(CURSOR, Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

/// Between `min_lines` and `max_lines` rows; the tail is kept when longer
fn text_area_lines(view: &FieldView) -> Vec<Line<'static>> {
    let text = text_value(view);
    let min = view.field.min_lines() as usize;
    let max = view.field.max_lines() as usize;
    let border = Span::styled(format!("{INDENT}│ "), accent(view.is_focused));

    let mut rows: Vec<Vec<Span<'static>>> = if text.is_empty() {
        vec![if view.is_focused {
            Vec::new()
        } else {
            placeholder(view).into_iter().collect()
        }]
    } else {
        text.split('\n').map(|l| vec![Span::raw(l.to_string())]).collect()
    };
    if view.is_focused {
        if let Some(last) = rows.last_mut() {
            last.push(Span::styled(CURSOR, Style::default().fg(Color::Cyan)));
        }
    }
    if rows.len() > max {
        rows.drain(..rows.len() - max);
    }
    while rows.len() < min {
        rows.push(Vec::new());
    }

    rows.into_iter()
        .map(|row| {
            let mut spans = vec![border.clone()];
            spans.extend(row);
            Line::from(spans)
        })
        .collect()
}

fn is_selected(view: &FieldView, value: &str) -> bool {
    match view.value {
        Some(FieldValue::Text(picked)) => picked == value,
        Some(FieldValue::Selection(picked)) => picked.iter().any(|p| p == value),
        _ => false,
    }
}

fn choice_lines(view: &FieldView, on: &str, off: &str) -> Vec<Line<'static>> {
    if view.field.options.is_empty() {
        return vec![Line::from(Span::styled(format!("{INDENT}(no options)"), dim()))];
    }
    view.field
        .options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let mark = if is_selected(view, option.value()) { on } else { off };
            let under_cursor = view.is_focused && idx == view.option_cursor;
            let style = if under_cursor {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let pointer = if under_cursor { "› " } else { INDENT };
            Line::from(vec![
                Span::raw(INDENT),
                Span::styled(pointer, style),
                Span::styled(format!("{mark} {}", option.text), style),
            ])
        })
        .collect()
}

fn dropdown_line(view: &FieldView) -> Line<'static> {
    let picked = match view.value {
        Some(FieldValue::Text(value)) => view.field.option_by_value(value),
        _ => None,
    };
    let shown = match picked {
        Some(option) => Span::raw(option.text.clone()),
        None => placeholder(view).unwrap_or_else(|| Span::styled("Select...", dim())),
    };
    Line::from(vec![Span::raw(INDENT), Span::styled("▾ ", dim()), shown])
}

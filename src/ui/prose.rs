//! Prose rendering: markdown blocks to styled lines

use super::widgets::wrap_spans;
use dynamic_popup::parser::markdown::{parse_blocks, Block, Inline};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

fn heading_style(level: u8) -> Style {
    match level {
        1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        2 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::BOLD),
    }
}

fn inline_span(inline: &Inline, base: Style) -> Span<'static> {
    let style = match inline {
        Inline::Text(_) => base,
        Inline::Bold(_) => base.add_modifier(Modifier::BOLD),
        Inline::Italic(_) => base.add_modifier(Modifier::ITALIC),
        Inline::Link { .. } => base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
    };
    Span::styled(inline.text().to_string(), style)
}

fn inline_spans(inlines: &[Inline], base: Style) -> Vec<Span<'static>> {
    inlines.iter().map(|i| inline_span(i, base)).collect()
}

/// Lines for one prose span, wrapped to `width`, blocks separated by a
/// blank line
pub fn prose_lines(markdown: &str, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in parse_blocks(markdown) {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        match block {
            Block::Heading { level, content } => {
                lines.extend(wrap_spans(inline_spans(&content, heading_style(level)), width));
            }
            Block::Paragraph(paragraph) => {
                for line in paragraph {
                    lines.extend(wrap_spans(inline_spans(&line, Style::default()), width));
                }
            }
        }
    }
    lines
}

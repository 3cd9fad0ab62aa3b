//! Minimal markdown for prose spans
//!
//! Supports `#`/`##`/`###` headings, `**bold**`, `*italic*`, `[text](url)`
//! links, blank-line separated paragraphs and hard line breaks. Nothing else.

use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(?P<bold>.+?)\*\*|\*(?P<italic>.+?)\*|\[(?P<text>[^\]]*)\]\((?P<url>[^)]*)\)")
        .unwrap()
});

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3}) (.*)$").unwrap());

/// A run of inline text with one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Link { text: String, url: String },
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(s) | Inline::Bold(s) | Inline::Italic(s) => s,
            Inline::Link { text, .. } => text,
        }
    }
}

/// A block-level element of a prose span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    /// Lines of a paragraph, split on single newlines
    Paragraph(Vec<Vec<Inline>>),
}

/// Split a prose span into blocks
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<Vec<Inline>> = Vec::new();

    for line in markdown.trim().lines() {
        let line = line.trim_end();
        if let Some(caps) = HEADING_REGEX.captures(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            blocks.push(Block::Heading {
                level: caps[1].len() as u8,
                content: parse_inlines(&caps[2]),
            });
        } else if line.trim().is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
        } else {
            paragraph.push(parse_inlines(line));
        }
    }
    flush_paragraph(&mut blocks, &mut paragraph);
    blocks
}

fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut Vec<Vec<Inline>>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(std::mem::take(paragraph)));
    }
}

/// Split one line into styled runs
pub fn parse_inlines(line: &str) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut last = 0;

    for caps in INLINE_REGEX.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            inlines.push(Inline::Text(line[last..whole.start()].to_string()));
        }
        let inline = if let Some(bold) = caps.name("bold") {
            Inline::Bold(bold.as_str().to_string())
        } else if let Some(italic) = caps.name("italic") {
            Inline::Italic(italic.as_str().to_string())
        } else {
            Inline::Link {
                text: caps.name("text").map_or("", |m| m.as_str()).to_string(),
                url: caps.name("url").map_or("", |m| m.as_str()).to_string(),
            }
        };
        inlines.push(inline);
        last = whole.end();
    }
    if last < line.len() {
        inlines.push(Inline::Text(line[last..].to_string()));
    }
    inlines
}

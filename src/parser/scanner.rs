//! Tag scanner and content assembly
//!
//! Walks the raw text left to right, splitting it into prose spans and
//! `:::dc<...>` components. A component that cannot be turned into a field is
//! skipped and recorded as a diagnostic; the rest of the document still parses.

use super::attributes::Attributes;
use super::builder::FieldBuilder;
use crate::error::PopupError;
use crate::state::{Field, FieldOption};
use once_cell::sync::Lazy;
use regex::Regex;

/// Opening tag: name, raw attributes, and an optional self-closing slash
static OPEN_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":::dc\s*<([a-zA-Z]+)([^>]*?)(/?)>").unwrap());

/// `<option id="...">text</option>`, id optional
static OPTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<option(?:\s+id="([^"]*)")?>([^<]+)</option>"#).unwrap());

/// `dc:::` directly after a self-closing tag or a closing tag
static SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*dc:::").unwrap());

/// One element of the content flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentElement {
    Prose(String),
    Field(Field),
}

impl ContentElement {
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            ContentElement::Field(field) => Some(field),
            ContentElement::Prose(_) => None,
        }
    }

    pub fn as_prose(&self) -> Option<&str> {
        match self {
            ContentElement::Prose(text) => Some(text),
            ContentElement::Field(_) => None,
        }
    }
}

/// Result of scanning a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    pub content_flow: Vec<ContentElement>,
    /// Components that were skipped, in document order
    pub diagnostics: Vec<PopupError>,
}

impl ParsedContent {
    /// Fields in document order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.content_flow.iter().filter_map(ContentElement::as_field)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields().find(|f| f.id() == id)
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }
}

/// Parse raw text into a content flow. Never fails: malformed components are
/// skipped and reported through `diagnostics`.
pub fn parse_document(text: &str) -> ParsedContent {
    let mut parsed = ParsedContent::default();
    let mut builder = FieldBuilder::new();
    let mut last_end = 0;
    let mut search_from = 0;

    while let Some(caps) = OPEN_TAG_REGEX.captures_at(text, search_from) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let tag = caps[1].to_lowercase();
        let raw_attrs = caps.get(2).map_or("", |m| m.as_str());
        let self_closing = &caps[3] == "/";

        push_prose(&mut parsed.content_flow, &text[last_end..whole.start()]);

        let mut end = whole.end();
        let mut options = Vec::new();
        if self_closing {
            if let Some(suffix) = SUFFIX_REGEX.find(&text[end..]) {
                end += suffix.end();
            }
        } else {
            match find_closing(&text[end..], &tag) {
                Some((inner_len, consumed)) => {
                    options = parse_options(&text[end..end + inner_len]);
                    end += consumed;
                }
                None => {
                    tracing::debug!("no closing tag for <{tag}> at byte {}", whole.start());
                }
            }
        }

        match builder.build(&tag, &Attributes::parse(raw_attrs), options) {
            Ok(field) => {
                tracing::debug!(id = field.id(), "parsed {} field", field.field_type);
                parsed.content_flow.push(ContentElement::Field(field));
                last_end = end;
            }
            Err(err) => {
                tracing::warn!("Error parsing component at byte {}: {err}", whole.start());
                parsed.diagnostics.push(recoverable(whole.start(), err));
                last_end = whole.end();
            }
        }
        search_from = last_end;
    }

    push_prose(&mut parsed.content_flow, &text[last_end..]);
    parsed
}

fn push_prose(flow: &mut Vec<ContentElement>, chunk: &str) {
    if !chunk.trim().is_empty() {
        flow.push(ContentElement::Prose(chunk.to_string()));
    }
}

fn recoverable(offset: usize, err: PopupError) -> PopupError {
    if err.is_recoverable_parse_error() {
        err
    } else {
        PopupError::ParseRecoverable {
            offset,
            message: err.to_string(),
        }
    }
}

/// Locate `</tag>` followed by `dc:::` in `remainder`.
/// Returns the inner content length and the number of bytes consumed.
fn find_closing(remainder: &str, tag: &str) -> Option<(usize, usize)> {
    let closing = format!("</{tag}>");
    let mut from = 0;
    while let Some(found) = remainder[from..].find(&closing) {
        let start = from + found;
        let after = start + closing.len();
        if let Some(suffix) = SUFFIX_REGEX.find(&remainder[after..]) {
            return Some((start, after + suffix.end()));
        }
        from = after;
    }
    None
}

/// Extract `<option>` entries from the inner content of a paired tag
pub fn parse_options(inner: &str) -> Vec<FieldOption> {
    OPTION_REGEX
        .captures_iter(inner)
        .map(|caps| {
            let option_id = caps
                .get(1)
                .map(|m| m.as_str())
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            FieldOption::new(option_id, caps[2].trim())
        })
        .collect()
}

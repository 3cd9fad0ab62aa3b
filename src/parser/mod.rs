//! Parsing of markdown content with embedded `:::dc<...>` components
//!
//! - `scanner`: finds component tags and assembles the content flow
//! - `attributes`: parses the attribute string of a tag
//! - `builder`: turns a tag into a typed field
//! - `markdown`: the small markdown subset used for prose spans

mod attributes;
mod builder;
pub mod markdown;
mod scanner;

pub use attributes::Attributes;
pub use builder::FieldBuilder;
pub use scanner::{parse_document, parse_options, ContentElement, ParsedContent};

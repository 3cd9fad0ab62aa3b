//! Attribute string parsing for component tags

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// `name` or `name="value"`
static ATTRIBUTE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([a-zA-Z0-9_-]+)(?:="([^"]*)")?"#).unwrap());

/// Value recorded for attributes given without `=`
pub const PRESENT: &str = "true";

/// Attributes of one tag, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
}

impl Attributes {
    /// Parse the text between the tag name and the closing `>`
    pub fn parse(raw: &str) -> Self {
        let values = ATTRIBUTE_REGEX
            .captures_iter(raw)
            .map(|caps| {
                let name = caps[1].to_string();
                let value = caps
                    .get(2)
                    .map_or_else(|| PRESENT.to_string(), |m| m.as_str().to_string());
                (name, value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Like `get`, but an empty value counts as absent
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

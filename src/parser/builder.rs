//! Turns a parsed tag into a typed field

use super::attributes::Attributes;
use crate::error::{PopupError, Result};
use crate::state::{Condition, ConditionalLogic, Field, FieldOption, FieldType, DEFAULT_LABEL};
use std::collections::HashSet;

/// Builds fields for one parse, handing out synthesized ids
#[derive(Debug, Default)]
pub struct FieldBuilder {
    next_synthesized: usize,
    seen_ids: HashSet<String>,
}

impl FieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field from a lowercased tag name, its attributes and options
    pub fn build(&mut self, tag: &str, attrs: &Attributes, options: Vec<FieldOption>) -> Result<Field> {
        let field_type = FieldType::from_tag(tag)
            .ok_or_else(|| PopupError::UnsupportedComponentType(tag.to_string()))?;

        let id = match attrs.non_empty("id") {
            Some(id) => id.to_string(),
            None => self.synthesize_id(),
        };
        self.seen_ids.insert(id.clone());

        let mut field = Field::new(id, field_type)
            .with_label(attrs.non_empty("label").unwrap_or(DEFAULT_LABEL))
            .with_options(options);
        field.is_required = attrs.has("required");
        field.placeholder = attrs.non_empty("placeholder").map(str::to_string);
        field.default_value = attrs.non_empty("default").map(str::to_string);
        field.conditional_logic = conditional_logic(attrs);

        Ok(field)
    }

    fn synthesize_id(&mut self) -> String {
        loop {
            self.next_synthesized += 1;
            let candidate = format!("field-{}", self.next_synthesized);
            if !self.seen_ids.contains(&candidate) {
                return candidate;
            }
        }
    }
}

fn conditional_logic(attrs: &Attributes) -> Option<ConditionalLogic> {
    let depends_on = attrs.get("depends-on")?;

    let mut logic = ConditionalLogic::new(depends_on);
    logic.condition = attrs
        .get("condition")
        .map(Condition::from_attr)
        .unwrap_or_default();
    logic.visibility_value = attrs.get("when-value").map(str::to_string);
    logic.required_when_value = attrs.get("required-when-value").map(str::to_string);
    logic.required_when_visible = attrs
        .get("required-when-visible")
        .map(|v| v.eq_ignore_ascii_case("true"));
    logic.disable_when_hidden = attrs.get("disable-when-hidden") != Some("false");
    Some(logic)
}

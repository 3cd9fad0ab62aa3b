//! Response store: the current value of every field

use super::field::{Field, FieldType};
use std::collections::HashMap;

/// Delimiter used when a checkbox selection is flattened to one string
pub const SELECTION_DELIMITER: &str = ",";

/// Current value of one field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Nothing picked yet (radio buttons and dropdowns)
    #[default]
    Unset,
    Text(String),
    /// Checked option values, in the order they were checked
    Selection(Vec<String>),
}

impl FieldValue {
    /// The value a freshly built field starts with
    pub fn default_for(field: &Field) -> Self {
        match field.field_type {
            FieldType::RadioButton | FieldType::Dropdown => {
                match field.default_value.as_deref() {
                    Some(default) if field.option_by_value(default).is_some() => {
                        FieldValue::Text(default.to_string())
                    }
                    _ => FieldValue::Unset,
                }
            }
            FieldType::Checkbox => {
                let selected = field
                    .default_value
                    .as_deref()
                    .map(|default| {
                        default
                            .split(SELECTION_DELIMITER)
                            .map(str::trim)
                            .filter(|v| field.option_by_value(v).is_some())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                FieldValue::Selection(selected)
            }
            FieldType::TextArea | FieldType::TextField => {
                FieldValue::Text(field.default_value.clone().unwrap_or_default())
            }
        }
    }

    /// Whether a field of `field_type` may hold this value
    pub fn fits(&self, field_type: FieldType) -> bool {
        match self {
            FieldValue::Unset => matches!(field_type, FieldType::RadioButton | FieldType::Dropdown),
            FieldValue::Text(_) => field_type != FieldType::Checkbox,
            FieldValue::Selection(_) => field_type == FieldType::Checkbox,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Unset => "unset",
            FieldValue::Text(_) => "text",
            FieldValue::Selection(_) => "selection",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_selection(&self) -> &[String] {
        match self {
            FieldValue::Selection(values) => values,
            _ => &[],
        }
    }

    /// Scalar rendering used for equality checks and serialization.
    /// Returns `None` when nothing has been picked.
    pub fn to_scalar(&self) -> Option<String> {
        match self {
            FieldValue::Unset => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Selection(values) => Some(values.join(SELECTION_DELIMITER)),
        }
    }

    /// Whether there is something other than whitespace or an empty selection
    pub fn has_content(&self) -> bool {
        match self {
            FieldValue::Unset => false,
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::Selection(values) => !values.is_empty(),
        }
    }
}

/// Mapping from field id to its current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStore {
    values: HashMap<String, FieldValue>,
}

impl ResponseStore {
    /// Seed a store with the default value of every field
    pub fn seeded<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Self {
        let values = fields
            .into_iter()
            .map(|field| (field.id().to_string(), FieldValue::default_for(field)))
            .collect();
        Self { values }
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    /// Value of `id` if present and not `Unset`
    pub fn present(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id).filter(|v| !v.is_unset())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace a value; returns the previous one. Only the form state calls
    /// this, after checking the id and the value kind.
    pub(crate) fn replace(&mut self, id: &str, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(id.to_string(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FieldOption;

    fn choices(field_type: FieldType) -> Field {
        Field::new("c", field_type).with_options(vec![
            FieldOption::new(Some("a".to_string()), "Alpha"),
            FieldOption::new(Some("b".to_string()), "Beta"),
            FieldOption::new(None, "Gamma"),
        ])
    }

    #[test]
    fn test_defaults_by_type() {
        assert_eq!(
            FieldValue::default_for(&Field::new("r", FieldType::RadioButton)),
            FieldValue::Unset
        );
        assert_eq!(
            FieldValue::default_for(&Field::new("d", FieldType::Dropdown)),
            FieldValue::Unset
        );
        assert_eq!(
            FieldValue::default_for(&Field::new("c", FieldType::Checkbox)),
            FieldValue::Selection(vec![])
        );
        assert_eq!(
            FieldValue::default_for(&Field::new("t", FieldType::TextField)),
            FieldValue::Text(String::new())
        );
        assert_eq!(
            FieldValue::default_for(&Field::new("t", FieldType::TextArea)),
            FieldValue::Text(String::new())
        );
    }

    #[test]
    fn test_default_attribute_seeds_choice_only_when_it_is_an_option() {
        let mut field = choices(FieldType::Dropdown);
        field.default_value = Some("b".to_string());
        assert_eq!(FieldValue::default_for(&field), FieldValue::Text("b".to_string()));

        field.default_value = Some("zzz".to_string());
        assert_eq!(FieldValue::default_for(&field), FieldValue::Unset);
    }

    #[test]
    fn test_default_attribute_seeds_checkbox_selection() {
        let mut field = choices(FieldType::Checkbox);
        field.default_value = Some("a, Gamma,nope".to_string());
        assert_eq!(
            FieldValue::default_for(&field),
            FieldValue::Selection(vec!["a".to_string(), "Gamma".to_string()])
        );
    }

    #[test]
    fn test_default_attribute_seeds_text() {
        let mut field = Field::new("t", FieldType::TextField);
        field.default_value = Some("hello".to_string());
        assert_eq!(FieldValue::default_for(&field), FieldValue::Text("hello".to_string()));
    }

    #[test]
    fn test_fits() {
        assert!(FieldValue::Unset.fits(FieldType::RadioButton));
        assert!(!FieldValue::Unset.fits(FieldType::TextField));
        assert!(FieldValue::Text("x".into()).fits(FieldType::Dropdown));
        assert!(!FieldValue::Text("x".into()).fits(FieldType::Checkbox));
        assert!(FieldValue::Selection(vec![]).fits(FieldType::Checkbox));
        assert!(!FieldValue::Selection(vec![]).fits(FieldType::TextArea));
    }

    #[test]
    fn test_checkbox_scalar_round_trip() {
        let value = FieldValue::Selection(vec!["a".to_string(), "b".to_string()]);
        let scalar = value.to_scalar().unwrap();
        assert_eq!(scalar, "a,b");
        let recovered: Vec<&str> = scalar.split(SELECTION_DELIMITER).collect();
        assert_eq!(recovered, vec!["a", "b"]);
    }

    #[test]
    fn test_has_content() {
        assert!(!FieldValue::Unset.has_content());
        assert!(!FieldValue::Text("   ".into()).has_content());
        assert!(FieldValue::Text(" x ".into()).has_content());
        assert!(!FieldValue::Selection(vec![]).has_content());
        assert!(FieldValue::Selection(vec!["a".into()]).has_content());
    }

    #[test]
    fn test_present_skips_unset() {
        let fields = [
            Field::new("r", FieldType::RadioButton),
            Field::new("t", FieldType::TextField),
        ];
        let store = ResponseStore::seeded(fields.iter());
        assert_eq!(store.len(), 2);
        assert!(store.contains("r"));
        assert!(store.present("r").is_none());
        assert!(store.present("t").is_some());
        assert!(store.present("missing").is_none());
    }
}

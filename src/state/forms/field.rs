//! Form field value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of control a field renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    RadioButton,
    Checkbox,
    TextArea,
    TextField,
    Dropdown,
}

impl FieldType {
    /// Map a lowercased tag name to its field type
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "radiobutton" => Some(Self::RadioButton),
            "checkbox" => Some(Self::Checkbox),
            "textarea" => Some(Self::TextArea),
            "textfield" => Some(Self::TextField),
            "dropdown" => Some(Self::Dropdown),
            _ => None,
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, Self::RadioButton | Self::Checkbox | Self::Dropdown)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::TextArea | Self::TextField)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RadioButton => "radioButton",
            Self::Checkbox => "checkbox",
            Self::TextArea => "textArea",
            Self::TextField => "textField",
            Self::Dropdown => "dropdown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `<option>` entry of a choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub option_id: Option<String>,
    pub text: String,
}

impl FieldOption {
    pub fn new(option_id: Option<String>, text: impl Into<String>) -> Self {
        Self {
            option_id,
            text: text.into(),
        }
    }

    /// The value stored when this option is picked
    pub fn value(&self) -> &str {
        self.option_id.as_deref().unwrap_or(&self.text)
    }
}

/// Comparison used by conditional logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
}

impl Condition {
    /// Parse a `condition` attribute; anything unrecognized means equals
    pub fn from_attr(value: &str) -> Self {
        match value {
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "contains" => Self::Contains,
            "notContains" => Self::NotContains,
            other => {
                tracing::debug!("unknown condition '{other}', using equals");
                Self::Equals
            }
        }
    }
}

/// Dependency rule making a field's visibility or requiredness follow
/// another field's value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    pub depends_on: String,
    pub condition: Condition,
    /// `None` means the field is always visible
    pub visibility_value: Option<String>,
    pub disable_when_hidden: bool,
    pub required_when_visible: Option<bool>,
    pub required_when_value: Option<String>,
}

impl ConditionalLogic {
    pub fn new(depends_on: impl Into<String>) -> Self {
        Self {
            depends_on: depends_on.into(),
            condition: Condition::Equals,
            visibility_value: None,
            disable_when_hidden: true,
            required_when_visible: None,
            required_when_value: None,
        }
    }
}

/// A single form control parsed from the tag grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub is_required: bool,
    pub options: Vec<FieldOption>,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub conditional_logic: Option<ConditionalLogic>,
}

/// Label used when the tag has none
pub const DEFAULT_LABEL: &str = "Field";

impl Field {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: DEFAULT_LABEL.to_string(),
            is_required: false,
            options: Vec::new(),
            placeholder: None,
            default_value: None,
            conditional_logic: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    /// Find the option whose value is `value`
    pub fn option_by_value(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value() == value)
    }

    /// Minimum number of rows a renderer should reserve
    pub fn min_lines(&self) -> u16 {
        if self.field_type == FieldType::TextArea {
            2
        } else {
            1
        }
    }

    /// Maximum number of rows a renderer should grow to
    pub fn max_lines(&self) -> u16 {
        if self.field_type == FieldType::TextArea {
            4
        } else {
            1
        }
    }
}

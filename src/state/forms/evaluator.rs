//! Conditional visibility and requiredness
//!
//! All comparisons are case-insensitive: both sides are lowercased before
//! equality, substring and membership checks.

use super::field::{Condition, ConditionalLogic, Field};
use super::responses::{FieldValue, ResponseStore};
use std::collections::HashMap;

impl Condition {
    /// Whether `actual` satisfies this condition against `expected`.
    /// A missing value never matches, whatever the condition.
    pub fn matches(&self, actual: Option<&FieldValue>, expected: &str) -> bool {
        let Some(actual) = actual.filter(|v| !v.is_unset()) else {
            return false;
        };
        let expected = expected.to_lowercase();

        match self {
            Condition::Equals => scalar_lower(actual) == expected,
            Condition::NotEquals => scalar_lower(actual) != expected,
            Condition::Contains => contains(actual, &expected),
            Condition::NotContains => !contains(actual, &expected),
        }
    }
}

fn scalar_lower(value: &FieldValue) -> String {
    value.to_scalar().unwrap_or_default().to_lowercase()
}

fn contains(value: &FieldValue, expected_lower: &str) -> bool {
    match value {
        FieldValue::Selection(values) => values.iter().any(|v| v.to_lowercase() == expected_lower),
        FieldValue::Text(s) => s.to_lowercase().contains(expected_lower),
        FieldValue::Unset => false,
    }
}

impl ConditionalLogic {
    /// Visibility given the dependency's current value
    pub fn is_visibility_met(&self, dependency: Option<&FieldValue>) -> bool {
        match &self.visibility_value {
            None => true,
            Some(expected) => self.condition.matches(dependency, expected),
        }
    }

    /// `Some(required)` when a `required-when-value` rule is present
    pub fn required_by_value(&self, dependency: Option<&FieldValue>) -> Option<bool> {
        self.required_when_value
            .as_deref()
            .map(|expected| self.condition.matches(dependency, expected))
    }
}

/// Whether `field` is currently shown
pub fn is_visible(field: &Field, store: &ResponseStore) -> bool {
    match &field.conditional_logic {
        None => true,
        Some(logic) => logic.is_visibility_met(store.get(&logic.depends_on)),
    }
}

/// Whether `field` must be filled in right now.
///
/// A `required-when-value` rule decides on its own. Otherwise a
/// `required-when-visible` override applies while visible, and failing that
/// the static `required` flag applies while visible.
pub fn is_required(field: &Field, store: &ResponseStore) -> bool {
    if let Some(logic) = &field.conditional_logic {
        if let Some(required) = logic.required_by_value(store.get(&logic.depends_on)) {
            return required;
        }
        if let Some(when_visible) = logic.required_when_visible {
            return when_visible && is_visible(field, store);
        }
    }
    field.is_required && is_visible(field, store)
}

/// Visibility and requiredness of every field at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    visible: HashMap<String, bool>,
    required: HashMap<String, bool>,
}

impl Evaluation {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.required.get(id).copied().unwrap_or(false)
    }

    /// Ids whose visibility differs between `self` and `other`
    pub fn visibility_changes(&self, other: &Evaluation) -> Vec<String> {
        diff(&self.visible, &other.visible)
    }

    /// Ids whose requiredness differs between `self` and `other`
    pub fn required_changes(&self, other: &Evaluation) -> Vec<String> {
        diff(&self.required, &other.required)
    }
}

fn diff(a: &HashMap<String, bool>, b: &HashMap<String, bool>) -> Vec<String> {
    let mut changed: Vec<String> = a
        .iter()
        .filter(|(id, value)| b.get(id.as_str()) != Some(value))
        .map(|(id, _)| id.clone())
        .chain(b.keys().filter(|id| !a.contains_key(id.as_str())).cloned())
        .collect();
    changed.sort();
    changed
}

/// Evaluate every field against the store
pub fn evaluate<'a>(fields: impl IntoIterator<Item = &'a Field>, store: &ResponseStore) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for field in fields {
        evaluation
            .visible
            .insert(field.id().to_string(), is_visible(field, store));
        evaluation
            .required
            .insert(field.id().to_string(), is_required(field, store));
    }
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FieldType;
    use proptest::prelude::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn selection(values: &[&str]) -> FieldValue {
        FieldValue::Selection(values.iter().map(|v| v.to_string()).collect())
    }

    /// Build a store holding `a` (a radio button) and the field under test
    fn store_with(a: FieldValue, field: &Field) -> ResponseStore {
        let source = Field::new("a", FieldType::RadioButton);
        let mut store = ResponseStore::seeded([&source, field]);
        store.replace("a", a);
        store
    }

    fn dependent(logic: ConditionalLogic) -> Field {
        Field::new("b", FieldType::TextField).with_logic(logic)
    }

    mod conditions {
        use super::*;

        #[test]
        fn test_equals_is_case_insensitive() {
            assert!(Condition::Equals.matches(Some(&text("YES")), "yes"));
            assert!(!Condition::Equals.matches(Some(&text("no")), "yes"));
        }

        #[test]
        fn test_not_equals() {
            assert!(Condition::NotEquals.matches(Some(&text("no")), "yes"));
            assert!(!Condition::NotEquals.matches(Some(&text("Yes")), "yes"));
        }

        #[test]
        fn test_contains_on_text_is_substring() {
            assert!(Condition::Contains.matches(Some(&text("Hello World")), "world"));
            assert!(!Condition::Contains.matches(Some(&text("Hello")), "world"));
            assert!(Condition::NotContains.matches(Some(&text("Hello")), "world"));
        }

        #[test]
        fn test_contains_on_selection_is_membership() {
            let value = selection(&["tech", "Music"]);
            assert!(Condition::Contains.matches(Some(&value), "music"));
            assert!(!Condition::Contains.matches(Some(&value), "mus"));
            assert!(Condition::NotContains.matches(Some(&value), "sports"));
        }

        #[test]
        fn test_equals_on_selection_uses_joined_form() {
            assert!(Condition::Equals.matches(Some(&selection(&["a", "b"])), "a,b"));
            assert!(Condition::Equals.matches(Some(&selection(&[])), ""));
        }

        #[test]
        fn test_missing_value_never_matches() {
            for condition in [
                Condition::Equals,
                Condition::NotEquals,
                Condition::Contains,
                Condition::NotContains,
            ] {
                assert!(!condition.matches(None, "x"));
                assert!(!condition.matches(Some(&FieldValue::Unset), "x"));
            }
        }
    }

    mod visibility {
        use super::*;

        fn when_yes() -> Field {
            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("yes".to_string());
            dependent(logic)
        }

        #[test]
        fn test_no_logic_is_visible() {
            let field = Field::new("plain", FieldType::TextField);
            assert!(is_visible(&field, &ResponseStore::default()));
        }

        #[test]
        fn test_no_visibility_value_is_visible() {
            let field = dependent(ConditionalLogic::new("a"));
            let store = store_with(FieldValue::Unset, &field);
            assert!(is_visible(&field, &store));
        }

        #[test]
        fn test_when_value_scenario() {
            let field = when_yes();
            assert!(is_visible(&field, &store_with(text("yes"), &field)));
            assert!(!is_visible(&field, &store_with(text("no"), &field)));
            assert!(!is_visible(&field, &store_with(FieldValue::Unset, &field)));
        }

        #[test]
        fn test_dangling_dependency_is_hidden() {
            let mut logic = ConditionalLogic::new("ghost");
            logic.visibility_value = Some("yes".to_string());
            logic.condition = Condition::NotEquals;
            let field = dependent(logic);
            let store = ResponseStore::seeded([&field]);
            assert!(!is_visible(&field, &store));
        }
    }

    mod requiredness {
        use super::*;

        #[test]
        fn test_required_when_value_scenario() {
            let mut logic = ConditionalLogic::new("a");
            logic.required_when_value = Some("yes".to_string());
            let field = dependent(logic);
            assert!(is_required(&field, &store_with(text("yes"), &field)));
            assert!(!is_required(&field, &store_with(text("no"), &field)));
            assert!(!is_required(&field, &store_with(FieldValue::Unset, &field)));
        }

        #[test]
        fn test_required_when_value_applies_even_when_hidden() {
            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("show".to_string());
            logic.required_when_value = Some("yes".to_string());
            let field = dependent(logic);
            let store = store_with(text("yes"), &field);
            assert!(!is_visible(&field, &store));
            assert!(is_required(&field, &store));
        }

        #[test]
        fn test_required_when_value_ignores_static_flag() {
            let mut logic = ConditionalLogic::new("a");
            logic.required_when_value = Some("yes".to_string());
            let field = dependent(logic).required();
            assert!(!is_required(&field, &store_with(text("no"), &field)));
        }

        #[test]
        fn test_required_when_visible_override() {
            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("yes".to_string());
            logic.required_when_visible = Some(false);
            let field = dependent(logic).required();
            assert!(!is_required(&field, &store_with(text("yes"), &field)));

            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("yes".to_string());
            logic.required_when_visible = Some(true);
            let field = dependent(logic);
            assert!(is_required(&field, &store_with(text("yes"), &field)));
            assert!(!is_required(&field, &store_with(text("no"), &field)));
        }

        #[test]
        fn test_static_required_only_while_visible() {
            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("yes".to_string());
            let field = dependent(logic).required();
            assert!(is_required(&field, &store_with(text("yes"), &field)));
            assert!(!is_required(&field, &store_with(text("no"), &field)));
        }

        proptest! {
            #[test]
            fn prop_required_when_value_shadows_required_when_visible(
                value in "[a-zA-Z]{0,6}",
                when_visible in any::<bool>(),
                statically_required in any::<bool>(),
            ) {
                let mut logic = ConditionalLogic::new("a");
                logic.required_when_value = Some("yes".to_string());
                logic.required_when_visible = Some(when_visible);
                let mut field = dependent(logic);
                field.is_required = statically_required;

                let store = store_with(text(&value), &field);
                let expected = value.to_lowercase() == "yes";
                prop_assert_eq!(is_required(&field, &store), expected);
            }
        }
    }

    mod evaluation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_evaluate_is_idempotent() {
            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("yes".to_string());
            let field = dependent(logic).required();
            let source = Field::new("a", FieldType::RadioButton);
            let store = store_with(text("yes"), &field);

            let first = evaluate([&source, &field], &store);
            let second = evaluate([&source, &field], &store);
            assert_eq!(first, second);
            assert!(first.is_visible("b"));
            assert!(first.is_required("b"));
            assert!(!first.is_required("a"));
        }

        #[test]
        fn test_changes_between_evaluations() {
            let mut logic = ConditionalLogic::new("a");
            logic.visibility_value = Some("yes".to_string());
            let field = dependent(logic).required();
            let source = Field::new("a", FieldType::RadioButton);

            let before = evaluate([&source, &field], &store_with(text("no"), &field));
            let after = evaluate([&source, &field], &store_with(text("yes"), &field));
            assert_eq!(before.visibility_changes(&after), vec!["b".to_string()]);
            assert_eq!(before.required_changes(&after), vec!["b".to_string()]);
            assert!(after.visibility_changes(&after).is_empty());
        }
    }
}

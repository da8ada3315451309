//! Dropdown selection controls.
//!
//! A [`Select`] wraps a `<select>` control and exposes its options as an
//! [`OptionSet`]: normalized key to display text, in the order the options
//! appear in the document. Tests select by key, by index, or uniformly at
//! random, and every failure mode reports what *would* have been valid.

use std::cell::OnceCell;

use indexmap::IndexMap;
use rand::Rng;

use crate::component::{Component, Selectable};
use crate::driver::DriverHandle;
use crate::error::{Result, SelectionError, UiError};

/// Normalized key to display text, in document discovery order.
pub type OptionSet = IndexMap<String, String>;

/// The three ways a selection target can be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectTarget {
    /// Uniform random choice over the whole option set.
    Random,
    /// Lookup by normalized key.
    Key(String),
    /// Zero-based index into the option set, in discovery order. Kept signed
    /// so out-of-range negatives report as such instead of failing earlier.
    Index(i64),
}

impl From<&str> for SelectTarget {
    fn from(key: &str) -> Self {
        SelectTarget::Key(key.to_string())
    }
}

impl From<String> for SelectTarget {
    fn from(key: String) -> Self {
        SelectTarget::Key(key)
    }
}

impl From<usize> for SelectTarget {
    fn from(index: usize) -> Self {
        SelectTarget::Index(index as i64)
    }
}

impl From<i64> for SelectTarget {
    fn from(index: i64) -> Self {
        SelectTarget::Index(index)
    }
}

impl SelectTarget {
    /// Maps a JSON value from a data-driven fixture onto a target: `null`
    /// means random, strings are keys, integers are indices. Anything else
    /// is rejected with the received type named.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(SelectTarget::Random),
            serde_json::Value::String(key) => Ok(SelectTarget::Key(key.clone())),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(SelectTarget::Index)
                .ok_or_else(|| invalid_type("non-integer number")),
            serde_json::Value::Bool(_) => Err(invalid_type("boolean")),
            serde_json::Value::Array(_) => Err(invalid_type("array")),
            serde_json::Value::Object(_) => Err(invalid_type("object")),
        }
    }
}

fn invalid_type(received: &str) -> UiError {
    SelectionError::InvalidValueType {
        received: received.to_string(),
    }
    .into()
}

/// Normalizes a raw option value into a snake_case key.
///
/// Lowercases, turns whitespace runs into single underscores, inserts an
/// underscore before each originally-uppercase letter, collapses repeats and
/// strips a leading underscore. Total and deterministic for any input.
pub fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut key = String::with_capacity(trimmed.len() + 4);
    for c in trimmed.chars() {
        if c == '_' || c.is_whitespace() {
            if !key.ends_with('_') {
                key.push('_');
            }
        } else if c.is_uppercase() {
            if !key.ends_with('_') {
                key.push('_');
            }
            key.extend(c.to_lowercase());
        } else {
            key.push(c);
        }
    }
    key.trim_start_matches('_').to_string()
}

/// A `<select>` dropdown control.
#[derive(Debug)]
pub struct Select {
    component: Component,
    options: OnceCell<OptionSet>,
}

impl Select {
    /// Select control identified by its `data-fieldname` attribute.
    pub fn by_fieldname(driver: DriverHandle, fieldname: &str) -> Result<Self> {
        let component =
            Component::new(driver, format!("select[data-fieldname='{fieldname}']"))?;
        Ok(Self::from_component(component))
    }

    /// Wraps an already-built component whose selector matches the control.
    pub fn from_component(component: Component) -> Self {
        Self {
            component,
            options: OnceCell::new(),
        }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// The option set, queried from the page on first use and cached for the
    /// lifetime of this instance. Options whose value or text is blank are
    /// dropped; a later duplicate key overwrites the earlier text but keeps
    /// its position. The cache is never invalidated, so a control whose
    /// options change after the first read needs a fresh `Select`.
    pub fn options(&self) -> Result<&OptionSet> {
        if let Some(options) = self.options.get() {
            return Ok(options);
        }

        let entries = self
            .component
            .driver()
            .child_entries(&self.component.selector(), "option")?;

        let mut set = OptionSet::new();
        for entry in entries {
            if entry.value.trim().is_empty() || entry.text.trim().is_empty() {
                continue;
            }
            set.insert(normalize_key(&entry.value), entry.text);
        }
        log::debug!(
            "discovered {} options for '{}'",
            set.len(),
            self.component.name()
        );

        Ok(self.options.get_or_init(|| set))
    }

    /// Raw value currently held by the control.
    pub fn selected_value(&self) -> Result<String> {
        self.component
            .driver()
            .read_value(&self.component.selector())
    }

    /// Picks an option uniformly at random and returns its key.
    pub fn select_random(&self) -> Result<String> {
        self.select(SelectTarget::Random)
    }

    /// Selects an option and returns the key it resolved to.
    ///
    /// Accepts anything convertible into a [`SelectTarget`]: a key string,
    /// a zero-based index, or [`SelectTarget::Random`].
    pub fn select(&self, target: impl Into<SelectTarget>) -> Result<String> {
        self.select_target(target.into())
    }

    fn select_target(&self, target: SelectTarget) -> Result<String> {
        self.component.ensure_enabled("select")?;

        let selector = self.component.selector();
        self.component.driver().click(&selector)?;

        let options = self.options()?;
        if options.is_empty() {
            return Err(SelectionError::NoOptions {
                locator: self.component.name(),
            }
            .into());
        }

        let key = match target {
            SelectTarget::Key(key) => {
                if !options.contains_key(&key) {
                    return Err(SelectionError::KeyNotFound {
                        key,
                        available: options.keys().cloned().collect(),
                    }
                    .into());
                }
                key
            }
            SelectTarget::Index(index) => usize::try_from(index)
                .ok()
                .and_then(|i| options.get_index(i))
                .map(|(key, _)| key.clone())
                .ok_or(SelectionError::IndexOutOfRange {
                    index,
                    count: options.len(),
                })?,
            SelectTarget::Random => {
                let i = rand::thread_rng().gen_range(0..options.len());
                options
                    .get_index(i)
                    .map(|(key, _)| key.clone())
                    .ok_or(SelectionError::IndexOutOfRange {
                        index: i as i64,
                        count: options.len(),
                    })?
            }
        };

        let text = options
            .get(&key)
            .cloned()
            .ok_or_else(|| SelectionError::OriginalValueNotFound { key: key.clone() })?;

        log::debug!(
            "selecting '{}' ({}) on '{}'",
            text,
            key,
            self.component.name()
        );
        self.component
            .driver()
            .click_child_with_text(&selector, "option", &text)?;
        Ok(key)
    }
}

impl Selectable for Select {
    fn options(&self) -> Result<&OptionSet> {
        Select::options(self)
    }

    fn select(&self, target: SelectTarget) -> Result<String> {
        Select::select_target(self, target)
    }

    fn selected_value(&self) -> Result<String> {
        Select::selected_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use std::sync::Arc;

    const STATUS: &str = "select[data-fieldname='status']";

    fn select_with_options(entries: &[(&str, &str)]) -> (MockDriver, Select) {
        let mock = MockDriver::new();
        let mut element = MockElement::new();
        for (value, text) in entries {
            element = element.with_option(*value, *text);
        }
        mock.add_element(STATUS, element);

        let handle: DriverHandle = Arc::new(mock.clone());
        let select = Select::by_fieldname(handle, "status").unwrap();
        (mock, select)
    }

    fn status_select() -> (MockDriver, Select) {
        select_with_options(&[
            ("Open", "Open"),
            ("In Progress", "In Progress"),
            ("Closed", "Closed"),
        ])
    }

    #[test]
    fn normalize_key_vectors() {
        assert_eq!(normalize_key("Option One"), "option_one");
        assert_eq!(normalize_key("alreadySnake"), "already_snake");
        assert_eq!(normalize_key("already_snake_case"), "already_snake_case");
        assert_eq!(normalize_key("My Test String"), "my_test_string");
    }

    #[test]
    fn normalize_key_handles_edges() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("   "), "");
        assert_eq!(normalize_key("  Padded Value  "), "padded_value");
        assert_eq!(normalize_key("double  space"), "double_space");
        assert_eq!(normalize_key("FOO"), "f_o_o");
        assert_eq!(normalize_key("Mixed_Case Value"), "mixed_case_value");
    }

    #[test]
    fn normalize_key_keeps_uppercase_without_a_lowercase_form() {
        // U+1D50D has no lowercase mapping, so it survives as-is.
        assert_eq!(normalize_key("\u{1d50d}"), "\u{1d50d}");
        assert_eq!(normalize_key("Ledger \u{1d50d}"), "ledger_\u{1d50d}");
    }

    #[test]
    fn options_are_normalized_in_document_order() {
        let (_, select) = status_select();
        let options = select.options().unwrap();

        let keys: Vec<&String> = options.keys().collect();
        assert_eq!(keys, ["open", "in_progress", "closed"]);
        assert_eq!(options["in_progress"], "In Progress");
    }

    #[test]
    fn blank_values_and_texts_are_skipped() {
        let (_, select) = select_with_options(&[
            ("", "Choose..."),
            ("Open", "Open"),
            ("Ghost", "   "),
            ("Closed", "Closed"),
        ]);
        let options = select.options().unwrap();

        let keys: Vec<&String> = options.keys().collect();
        assert_eq!(keys, ["open", "closed"]);
    }

    #[test]
    fn duplicate_keys_overwrite_text_but_keep_position() {
        let (_, select) = select_with_options(&[
            ("First Key", "One"),
            ("Other", "Two"),
            ("first_key", "Three"),
        ]);
        let options = select.options().unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options.get_index(0).unwrap().0, "first_key");
        assert_eq!(options["first_key"], "Three");
        assert_eq!(options.get_index(1).unwrap().0, "other");
    }

    #[test]
    fn options_are_cached_per_instance() {
        let (mock, select) = status_select();
        let before: Vec<String> = select.options().unwrap().keys().cloned().collect();

        // Swap the page content; the cached set must not notice.
        mock.add_element(STATUS, MockElement::new().with_option("Different", "Different"));
        let after: Vec<String> = select.options().unwrap().keys().cloned().collect();

        assert_eq!(before, after);
    }

    #[test]
    fn select_by_key_clicks_the_display_text() {
        let (mock, select) = status_select();

        let key = select.select("in_progress").unwrap();
        assert_eq!(key, "in_progress");
        assert_eq!(
            mock.selections(),
            vec![(STATUS.to_string(), "In Progress".to_string())]
        );
        assert_eq!(select.selected_value().unwrap(), "In Progress");
    }

    #[test]
    fn unknown_key_lists_available_keys() {
        let (_, select) = status_select();

        let err = select.select("missing").unwrap_err();
        match err {
            UiError::Selection(SelectionError::KeyNotFound { key, available }) => {
                assert_eq!(key, "missing");
                assert_eq!(available, ["open", "in_progress", "closed"]);
            }
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn select_by_index_follows_discovery_order() {
        let (mock, select) = status_select();

        assert_eq!(select.select(0usize).unwrap(), "open");
        assert_eq!(select.select(2usize).unwrap(), "closed");
        assert_eq!(
            mock.selections().last().unwrap().1,
            "Closed"
        );
    }

    #[test]
    fn out_of_range_index_cites_the_valid_range() {
        let (_, select) = status_select();

        let err = select.select(3usize).unwrap_err();
        match err {
            UiError::Selection(SelectionError::IndexOutOfRange { index, count }) => {
                assert_eq!(index, 3);
                assert_eq!(count, 3);
            }
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
        assert!(err_message_cites_range(&select, -1));
    }

    fn err_message_cites_range(select: &Select, index: i64) -> bool {
        let message = select.select(SelectTarget::Index(index)).unwrap_err().to_string();
        message.contains(&format!("index {index}")) && message.contains("0..=2")
    }

    #[test]
    fn random_selection_always_resolves_to_a_known_key() {
        let (_, select) = status_select();
        let mut seen = std::collections::HashSet::new();

        for _ in 0..64 {
            let key = select.select_random().unwrap();
            assert!(select.options().unwrap().contains_key(&key));
            seen.insert(key);
        }
        // Uniform over three options, 64 draws reach all of them.
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn empty_option_set_is_no_options() {
        let (_, select) = select_with_options(&[("", "Placeholder")]);

        let err = select.select_random().unwrap_err();
        assert!(matches!(
            err,
            UiError::Selection(SelectionError::NoOptions { .. })
        ));
    }

    #[test]
    fn disabled_select_refuses_without_touching_the_page() {
        let (mock, select) = status_select();
        select.component().set_enabled(false);

        let err = select.select("open").unwrap_err();
        assert!(matches!(err, UiError::ComponentDisabled { .. }));
        assert_eq!(mock.interaction_count(), 0);
    }

    #[test]
    fn from_json_maps_types_onto_targets() {
        use serde_json::json;

        assert_eq!(
            SelectTarget::from_json(&json!(null)).unwrap(),
            SelectTarget::Random
        );
        assert_eq!(
            SelectTarget::from_json(&json!("open")).unwrap(),
            SelectTarget::Key("open".to_string())
        );
        assert_eq!(
            SelectTarget::from_json(&json!(2)).unwrap(),
            SelectTarget::Index(2)
        );
        assert_eq!(
            SelectTarget::from_json(&json!(-1)).unwrap(),
            SelectTarget::Index(-1)
        );

        for (value, expected) in [
            (json!(1.5), "non-integer number"),
            (json!(true), "boolean"),
            (json!(["a"]), "array"),
            (json!({"k": "v"}), "object"),
        ] {
            let err = SelectTarget::from_json(&value).unwrap_err();
            match err {
                UiError::Selection(SelectionError::InvalidValueType { received }) => {
                    assert_eq!(received, expected);
                }
                other => panic!("expected InvalidValueType, got {other:?}"),
            }
        }
    }

    #[test]
    fn selected_value_reads_the_raw_control_value() {
        let (mock, select) = status_select();
        assert_eq!(select.selected_value().unwrap(), "");

        select.select("closed").unwrap();
        assert_eq!(select.selected_value().unwrap(), "Closed");
        assert_eq!(mock.value_of(STATUS).unwrap(), "Closed");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // Some uppercase letters (math alphanumerics, circled capitals) have no
        // lowercase form and pass through normalization unchanged.
        fn has_lowercase_form(c: char) -> bool {
            c.to_lowercase().ne(std::iter::once(c))
        }

        proptest! {
            #[test]
            fn normalization_is_idempotent(raw in "\\PC*") {
                let once = normalize_key(&raw);
                prop_assert_eq!(normalize_key(&once), once.clone());
            }

            #[test]
            fn normalized_keys_are_snake_case(raw in "\\PC*") {
                let key = normalize_key(&raw);
                prop_assert!(!key.chars().any(|c| c.is_whitespace()));
                prop_assert!(!key.chars().any(|c| c.is_uppercase() && has_lowercase_form(c)));
                prop_assert!(!key.starts_with('_'));
                prop_assert!(!key.contains("__"));
            }
        }
    }
}

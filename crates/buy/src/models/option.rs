//! Product options (e.g., "Size", "Color") and their selection state.

use serde::{Deserialize, Serialize};

use crate::error::BuyError;

/// A named axis of product configuration with its permitted values.
///
/// A freshly built option selects its first value, so a product's
/// selections are complete from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    name: String,
    values: Vec<String>,
    selected: Option<String>,
}

impl ProductOption {
    /// Create an option; duplicate values are dropped, keeping first-seen order.
    #[must_use]
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !unique.contains(&value) {
                unique.push(value);
            }
        }

        Self {
            name: name.into(),
            selected: unique.first().cloned(),
            values: unique,
        }
    }

    /// Option name (e.g., "Size").
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Possible values, in listing order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Currently selected value, if the option has any values.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether `value` is one of this option's values.
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Select a value.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::InvalidSelection` if `value` is not one of
    /// [`values`](Self::values); the previous selection is kept.
    pub fn select(&mut self, value: &str) -> Result<(), BuyError> {
        if !self.has_value(value) {
            return Err(BuyError::InvalidSelection {
                option: self.name.clone(),
                value: value.to_string(),
            });
        }
        self.selected = Some(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn size() -> ProductOption {
        ProductOption::new("Size", ["Small", "Medium", "Large", "Medium"])
    }

    #[test]
    fn test_new_dedupes_and_selects_first() {
        let option = size();
        assert_eq!(option.values(), ["Small", "Medium", "Large"]);
        assert_eq!(option.selected(), Some("Small"));
    }

    #[test]
    fn test_empty_option_has_no_selection() {
        let option = ProductOption::new("Title", Vec::<String>::new());
        assert_eq!(option.selected(), None);
    }

    #[test]
    fn test_select_every_valid_value() {
        let mut option = size();
        for value in option.values().to_vec() {
            option.select(&value).unwrap();
            assert_eq!(option.selected(), Some(value.as_str()));
        }
    }

    #[test]
    fn test_select_invalid_value_keeps_previous() {
        let mut option = size();
        option.select("Large").unwrap();

        let err = option.select("XXL").unwrap_err();
        assert!(matches!(
            err,
            BuyError::InvalidSelection { ref option, ref value } if option == "Size" && value == "XXL"
        ));
        assert_eq!(option.selected(), Some("Large"));
    }

    #[test]
    fn test_select_is_case_sensitive() {
        let mut option = size();
        assert!(option.select("large").is_err());
        assert_eq!(option.selected(), Some("Small"));
    }
}

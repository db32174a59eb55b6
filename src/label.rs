//! Free-text labels such as categories, goal names and creditor names.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::money::ValidationError;

/// A validated, non-empty label with surrounding whitespace removed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Create a label.
    ///
    /// # Errors
    ///
    /// This function will return a [ValidationError::EmptyLabel] if `label` is empty or only
    /// whitespace.
    pub fn new(label: &str) -> Result<Self, ValidationError> {
        let label = label.trim();

        if label.is_empty() {
            Err(ValidationError::EmptyLabel("label"))
        } else {
            Ok(Self(label.to_string()))
        }
    }

    /// Create a label without validation.
    ///
    /// The caller should ensure that the string is not empty. Used when reading rows that were
    /// validated on the way in.
    pub fn new_unchecked(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl Label {
    /// Check a label again, e.g. one built with [Label::new_unchecked], before it is stored.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError::EmptyLabel] if the label is empty or only whitespace.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Label::new(&self.0)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Label {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::new(s)
    }
}

impl TryFrom<String> for Label {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Label::new(&value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Label, ValidationError};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(Label::new(""), Err(ValidationError::EmptyLabel("label")));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(
            Label::new("\n\t \r"),
            Err(ValidationError::EmptyLabel("label"))
        );
    }

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(Label::new("  Rent ").unwrap().as_ref(), "Rent");
    }

    #[test]
    fn validate_rejects_unchecked_blank_label() {
        assert_eq!(
            Label::new_unchecked(" ").validate(),
            Err(ValidationError::EmptyLabel("label"))
        );
        assert_eq!(
            Label::new_unchecked(" Rent").validate(),
            Ok(Label::new_unchecked("Rent"))
        );
    }

    #[test]
    fn deserialize_validates() {
        let label: Result<Label, _> = serde_json::from_str("\"  \"");

        assert!(label.is_err());
    }
}

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

lazy_static! {
    /// Regex for validating file extensions kept from uploaded photo names
    /// Must be 1-10 ASCII alphanumeric characters, without the leading dot
    /// - Valid: "jpg", "JPEG", "heic", "webp"
    /// - Invalid: "", "tar.gz", "../x", "j p g"
    pub static ref FILE_EXTENSION_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]{1,10}$").unwrap();
}

/// Field-keyed validation messages, one per invalid field, plus an optional
/// form-level message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(default)]
    pub field_errors: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_error: Option<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors consisting of a single form-level message
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field_errors: BTreeMap::new(),
            form_error: Some(message.into()),
        }
    }

    /// Record a message for a field, keeping the first one reported
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.form_error.is_none()
    }

    /// Merge messages produced by a `validator` derive
    pub fn extend_from_validator(&mut self, errors: &validator::ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                self.add(field.to_string(), message);
            }
        }
    }

    /// Convert into a `Result`, failing when any message was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.extend_from_validator(&errors);
        field_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension_regex_valid() {
        assert!(FILE_EXTENSION_REGEX.is_match("jpg"));
        assert!(FILE_EXTENSION_REGEX.is_match("JPEG"));
        assert!(FILE_EXTENSION_REGEX.is_match("heic"));
        assert!(FILE_EXTENSION_REGEX.is_match("mp4"));
    }

    #[test]
    fn test_file_extension_regex_invalid() {
        assert!(!FILE_EXTENSION_REGEX.is_match("")); // empty
        assert!(!FILE_EXTENSION_REGEX.is_match("tar.gz")); // dot
        assert!(!FILE_EXTENSION_REGEX.is_match("../x")); // traversal
        assert!(!FILE_EXTENSION_REGEX.is_match("j p g")); // space
        assert!(!FILE_EXTENSION_REGEX.is_match("abcdefghijk")); // too long
    }

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is required");
        errors.add("name", "Name must be 100 characters or fewer");

        assert_eq!(errors.get("name"), Some("Name is required"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_field_errors_serialize_shape() {
        let mut errors = FieldErrors::new();
        errors.add("latitude", "Latitude must be between -90 and 90");

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "fieldErrors": { "latitude": "Latitude must be between -90 and 90" }
            })
        );

        let form = serde_json::to_value(FieldErrors::form("Pick a spot")).unwrap();
        assert_eq!(form["formError"], "Pick a spot");
    }
}

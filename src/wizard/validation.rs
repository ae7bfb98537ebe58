//! Field-keyed validation errors shared by both wizard steps.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Loose `local@domain.tld` check, the same shape browsers accept for email inputs
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Valid regex pattern"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Validation messages keyed by field name, in field-name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    /// Keep only the errors for fields the user has touched
    pub fn retain_fields(&self, keep: impl Fn(&str) -> bool) -> FieldErrors {
        FieldErrors {
            errors: self
                .errors
                .iter()
                .filter(|(field, _)| keep(field))
                .map(|(field, message)| (*field, message.clone()))
                .collect(),
        }
    }
}

/// Record `message` when `value` is blank
pub(crate) fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co.id"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_require_blank_values() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "fullName", "   ", "Full name is required");
        require(&mut errors, "email", "x@y.z", "Email is required");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("fullName"), Some("Full name is required"));
        assert!(!errors.contains("email"));
    }

    #[test]
    fn test_retain_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Email is required");
        errors.insert("role", "Role is required");
        let visible = errors.retain_fields(|f| f == "role");
        assert_eq!(visible.fields().collect::<Vec<_>>(), vec!["role"]);
    }
}

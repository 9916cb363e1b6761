//! Field-level input checks shared by the API handlers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Field name to messages, serialized as the `errors` member of a
/// `VALIDATION_ERROR` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

static GSTIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("GSTIN pattern")
});

/// Reduces a phone number to its 10 national digits.
///
/// Non-digits are dropped and a leading `91` country code is removed from
/// 12-digit numbers. Anything that does not end up as exactly 10 digits is
/// rejected.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = match digits.strip_prefix("91") {
        Some(rest) if digits.len() == 12 => rest.to_string(),
        _ => digits,
    };
    (national.len() == 10).then_some(national)
}

/// 15-character Indian GST identification number.
pub fn is_valid_gstin(value: &str) -> bool {
    GSTIN.is_match(value)
}

pub fn require_non_blank(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
    }
}

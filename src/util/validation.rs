//! Advisory checks for form input.
//!
//! Nothing here rejects a value: each check only reports what the form should warn about.

use crate::model::advisory::Advisory;
use crate::model::submission::TextField;

/// True when every character is an ASCII digit. The empty string counts as digits-only.
pub fn is_digits_only(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

pub fn check_text_field(field: TextField, value: &str) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if value.is_empty() {
        advisories.push(Advisory::required(field));
        return advisories;
    }

    if field.is_digits_only() && !is_digits_only(value) {
        advisories.extend(Advisory::invalid_format(field));
    }

    advisories
}

pub fn check_photo_selection(count: usize) -> Option<Advisory> {
    (count == 0).then(Advisory::no_photos)
}

use serde::{Deserialize, Serialize};

use crate::model::submission::{TextField, PHOTOS_FIELD};

/// How long the form shows an advisory before it fades out.
pub const ADVISORY_DISPLAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvisoryKind {
    RequiredField,
    InvalidFormat,
    NoPhotosSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryIcon {
    Warning,
    Error,
}

/// A non-blocking hint raised while the user fills in the form.
///
/// Advisories never stop a value from being stored and never stop a submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub field: String,
    pub icon: AdvisoryIcon,
    pub title: String,
    pub text: String,
    pub display_ms: u64,
}

impl Advisory {
    pub fn required(field: TextField) -> Self {
        Self {
            kind: AdvisoryKind::RequiredField,
            field: field.name().to_string(),
            icon: AdvisoryIcon::Warning,
            title: "Required Field".to_string(),
            text: format!("{} cannot be empty.", field.label()),
            display_ms: ADVISORY_DISPLAY_MS,
        }
    }

    /// Only digit-only fields have a format; `None` for free-text fields.
    pub fn invalid_format(field: TextField) -> Option<Self> {
        let example = field.digits_example()?;
        Some(Self {
            kind: AdvisoryKind::InvalidFormat,
            field: field.name().to_string(),
            icon: AdvisoryIcon::Error,
            title: format!("Invalid {}", field.label()),
            text: format!("Numbers only are allowed (e.g: {})", example),
            display_ms: ADVISORY_DISPLAY_MS,
        })
    }

    pub fn no_photos() -> Self {
        Self {
            kind: AdvisoryKind::NoPhotosSelected,
            field: PHOTOS_FIELD.to_string(),
            icon: AdvisoryIcon::Warning,
            title: "No Photos Selected".to_string(),
            text: "Please upload at least one photo of your car.".to_string(),
            display_ms: ADVISORY_DISPLAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_names_field() {
        let advisory = Advisory::required(TextField::CarModel);
        assert_eq!(advisory.field, "carModel");
        assert_eq!(advisory.text, "Car Model cannot be empty.");
        assert_eq!(advisory.icon, AdvisoryIcon::Warning);
    }

    #[test]
    fn test_invalid_format_examples() {
        let phone = Advisory::invalid_format(TextField::PhoneNumber).unwrap();
        assert_eq!(phone.title, "Invalid Phone Number");
        assert_eq!(phone.text, "Numbers only are allowed (e.g: 0818174090)");

        let year = Advisory::invalid_format(TextField::CarYear).unwrap();
        assert_eq!(year.title, "Invalid Car Year");
        assert!(year.text.contains("2013"));

        assert!(Advisory::invalid_format(TextField::FullName).is_none());
    }
}

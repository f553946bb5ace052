use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::model::advisory::Advisory;
use crate::util::validation;

/// Wire name of the multi-file photo input.
pub const PHOTOS_FIELD: &str = "carPhotos";

/// The four text inputs of the car form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextField {
    #[serde(rename = "fullName")]
    FullName,
    #[serde(rename = "phoneNumber")]
    PhoneNumber,
    #[serde(rename = "carModel")]
    CarModel,
    #[serde(rename = "carYear")]
    CarYear,
}

impl TextField {
    pub const ALL: [TextField; 4] = [
        TextField::FullName,
        TextField::PhoneNumber,
        TextField::CarModel,
        TextField::CarYear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextField::FullName => "fullName",
            TextField::PhoneNumber => "phoneNumber",
            TextField::CarModel => "carModel",
            TextField::CarYear => "carYear",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextField::FullName => "Full Name",
            TextField::PhoneNumber => "Phone Number",
            TextField::CarModel => "Car Model",
            TextField::CarYear => "Car Year",
        }
    }

    /// Example of a valid value for digit-only fields.
    pub fn digits_example(&self) -> Option<&'static str> {
        match self {
            TextField::PhoneNumber => Some("0818174090"),
            TextField::CarYear => Some("2013"),
            TextField::FullName | TextField::CarModel => None,
        }
    }

    pub fn is_digits_only(&self) -> bool {
        self.digits_example().is_some()
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown form field: {0}")]
pub struct UnknownFieldError(pub String);

impl FromStr for TextField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownFieldError(s.to_string()))
    }
}

/// One attached photo, kept in memory until it is uploaded.
#[derive(Clone)]
pub struct CarPhoto {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

impl CarPhoto {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

impl fmt::Debug for CarPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarPhoto")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Where a submission currently is in the upload-then-notify flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Idle,
    PreflightCheck,
    Uploading,
    Notifying,
    Succeeded,
    Failed,
}

impl PipelineStage {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            PipelineStage::PreflightCheck | PipelineStage::Uploading | PipelineStage::Notifying
        )
    }
}

/// In-memory record of one visitor's form entry.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub full_name: String,
    pub phone_number: String,
    pub car_model: String,
    pub car_year: String,
    pub car_photos: Vec<CarPhoto>,
    status: String,
    stage: PipelineStage,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn field(&self, field: TextField) -> &str {
        match field {
            TextField::FullName => &self.full_name,
            TextField::PhoneNumber => &self.phone_number,
            TextField::CarModel => &self.car_model,
            TextField::CarYear => &self.car_year,
        }
    }

    /// Stores `value` and returns the advisories it raises. The value is kept even when it is invalid.
    pub fn handle_input_change(&mut self, field: TextField, value: impl Into<String>) -> Vec<Advisory> {
        let value = value.into();
        let advisories = validation::check_text_field(field, &value);
        if !advisories.is_empty() {
            debug!(field = %field, count = advisories.len(), "Input raised advisories");
        }
        let slot = match field {
            TextField::FullName => &mut self.full_name,
            TextField::PhoneNumber => &mut self.phone_number,
            TextField::CarModel => &mut self.car_model,
            TextField::CarYear => &mut self.car_year,
        };
        *slot = value;
        advisories
    }

    /// Replaces the photo selection.
    pub fn handle_file_change(&mut self, photos: Vec<CarPhoto>) -> Vec<Advisory> {
        let advisories = validation::check_photo_selection(photos.len()).into_iter().collect();
        self.car_photos = photos;
        advisories
    }

    /// Clears every input. Status and stage are left alone.
    pub fn reset_inputs(&mut self) {
        self.full_name.clear();
        self.phone_number.clear();
        self.car_model.clear();
        self.car_year.clear();
        self.car_photos.clear();
    }

    pub(crate) fn enter_stage(&mut self, stage: PipelineStage) {
        debug!(from = ?self.stage, to = ?stage, "Submission stage change");
        self.stage = stage;
    }

    pub(crate) fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip() {
        for field in TextField::ALL {
            assert_eq!(field.name().parse::<TextField>().unwrap(), field);
        }
        assert_eq!(
            "carPhotos".parse::<TextField>(),
            Err(UnknownFieldError("carPhotos".to_string()))
        );
    }

    #[test]
    fn test_invalid_value_is_still_stored() {
        let mut submission = Submission::new();
        let advisories = submission.handle_input_change(TextField::PhoneNumber, "081-817");
        assert_eq!(advisories.len(), 1);
        assert_eq!(submission.phone_number, "081-817");
    }

    #[test]
    fn test_reset_keeps_status() {
        let mut submission = Submission::new();
        submission.handle_input_change(TextField::FullName, "Maria S.");
        submission.handle_file_change(vec![CarPhoto::new("a.jpg", "image/jpeg", vec![1u8, 2, 3])]);
        submission.set_status("Sending email...");

        submission.reset_inputs();

        assert!(submission.full_name.is_empty());
        assert!(submission.car_photos.is_empty());
        assert_eq!(submission.status(), "Sending email...");
    }

    #[test]
    fn test_in_flight_stages() {
        assert!(!PipelineStage::Idle.is_in_flight());
        assert!(PipelineStage::PreflightCheck.is_in_flight());
        assert!(PipelineStage::Uploading.is_in_flight());
        assert!(PipelineStage::Notifying.is_in_flight());
        assert!(!PipelineStage::Succeeded.is_in_flight());
        assert!(!PipelineStage::Failed.is_in_flight());
    }

    #[test]
    fn test_photo_debug_hides_content() {
        let photo = CarPhoto::new("front.jpg", "image/jpeg", vec![0u8; 4096]);
        let debug = format!("{:?}", photo);
        assert!(debug.contains("front.jpg"));
        assert!(debug.contains("4096"));
        assert_eq!(photo.size(), 4096);
    }
}

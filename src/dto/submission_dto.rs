use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::advisory::Advisory;
use crate::model::submission::{PipelineStage, Submission};
use crate::service::submission_service::{FailureKind, SubmissionReport};

/// Fields handed to the email template. Key names are what the template references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub name: String,
    pub title: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "carModel")]
    pub car_model: String,
    #[serde(rename = "carYear")]
    pub car_year: String,
    /// Newline-separated public photo URLs, in upload order
    #[serde(rename = "carPhotos")]
    pub car_photos: String,
    pub to_email: String,
}

impl TemplateParams {
    pub fn build(submission: &Submission, photo_urls: &[String], to_email: &str) -> Self {
        Self {
            name: submission.full_name.clone(),
            title: submission_title(&submission.car_model, &submission.car_year),
            phone_number: submission.phone_number.clone(),
            car_model: submission.car_model.clone(),
            car_year: submission.car_year.clone(),
            car_photos: photo_urls.join("\n"),
            to_email: to_email.to_string(),
        }
    }

    pub fn photo_urls(&self) -> impl Iterator<Item = &str> {
        self.car_photos.lines().filter(|line| !line.is_empty())
    }
}

pub fn submission_title(car_model: &str, car_year: &str) -> String {
    format!("Car Submission: {} ({})", car_model, car_year)
}

/// Body returned by `POST /submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponseDto {
    pub stage: PipelineStage,
    pub status: String,
    pub status_trail: Vec<String>,
    pub failure: Option<FailureKind>,
    pub advisories: Vec<Advisory>,
    pub photo_urls: Vec<String>,
}

impl SubmissionResponseDto {
    pub fn new(report: SubmissionReport, advisories: Vec<Advisory>) -> Self {
        Self {
            stage: report.stage,
            status: report.status,
            status_trail: report.status_trail,
            failure: report.failure,
            advisories,
            photo_urls: report.photo_urls,
        }
    }
}

/// One inline change, as sent by the form on every keystroke.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FieldChangeRequest {
    #[validate(length(min = 1, max = 32))]
    pub field: String,

    #[validate(length(max = 256))]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChangeResponse {
    pub field: String,
    pub value: String,
    pub advisories: Vec<Advisory>,
}

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::submission_dto::TemplateParams;
use crate::model::submission::{CarPhoto, PipelineStage, Submission};
use crate::util::notifier::Notifier;
use crate::util::storage::{storage_key, ObjectStorage, StorageError};

pub const STATUS_MISSING_PHOTOS: &str = "Please upload at least one image.";
pub const STATUS_UPLOADING: &str = "Uploading images...";
pub const STATUS_UPLOAD_FAILED: &str = "Failed to upload images.";
pub const STATUS_SENDING: &str = "Sending email...";
pub const STATUS_SUCCEEDED: &str = "Form submitted successfully!";
pub const STATUS_DISPATCH_FAILED: &str = "Oops! Something went wrong. Try again.";

/// Why a run ended in [`PipelineStage::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingPhotos,
    Upload,
    Dispatch,
}

/// Outcome of one submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub stage: PipelineStage,
    pub status: String,
    /// Every status set during the run, oldest first
    pub status_trail: Vec<String>,
    pub failure: Option<FailureKind>,
    /// Public URLs of the photos uploaded before the run ended
    pub photo_urls: Vec<String>,
}

impl SubmissionReport {
    pub fn succeeded(&self) -> bool {
        self.stage == PipelineStage::Succeeded
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("A submission is already in flight (stage: {0:?})")]
    InFlight(PipelineStage),
}

/// Uploads a submission's photos, then mails the result. Strictly sequential, no retries.
pub struct SubmissionPipeline {
    storage: Arc<dyn ObjectStorage>,
    notifier: Arc<dyn Notifier>,
    recipient_email: String,
}

/// Status changes for one run, mirrored into the record as they happen.
struct Run<'a> {
    submission: &'a mut Submission,
    trail: Vec<String>,
}

impl Run<'_> {
    fn enter(&mut self, stage: PipelineStage, status: Option<&str>) {
        self.submission.enter_stage(stage);
        if let Some(status) = status {
            info!(stage = ?stage, status, "Submission status");
            self.submission.set_status(status);
            self.trail.push(status.to_string());
        }
    }

    fn finish(self, failure: Option<FailureKind>, photo_urls: Vec<String>) -> SubmissionReport {
        SubmissionReport {
            stage: self.submission.stage(),
            status: self.submission.status().to_string(),
            status_trail: self.trail,
            failure,
            photo_urls,
        }
    }
}

impl SubmissionPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        notifier: Arc<dyn Notifier>,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            notifier,
            recipient_email: recipient_email.into(),
        }
    }

    /// Run the submission through preflight, upload and dispatch.
    ///
    /// Rejected with [`PipelineError::InFlight`] when the record is mid-run; the record is then
    /// left untouched. Every other outcome, including failures, comes back as a report whose
    /// status is also written to the record. Inputs are cleared only on success.
    #[instrument(skip(self, submission), fields(photos = submission.car_photos.len()))]
    pub async fn submit(&self, submission: &mut Submission) -> Result<SubmissionReport, PipelineError> {
        if submission.stage().is_in_flight() {
            warn!(stage = ?submission.stage(), "Submit rejected, previous run still in flight");
            return Err(PipelineError::InFlight(submission.stage()));
        }

        let mut run = Run { submission, trail: Vec::new() };

        run.enter(PipelineStage::PreflightCheck, None);
        if run.submission.car_photos.is_empty() {
            warn!("Submit without photos");
            run.enter(PipelineStage::Failed, Some(STATUS_MISSING_PHOTOS));
            return Ok(run.finish(Some(FailureKind::MissingPhotos), Vec::new()));
        }

        run.enter(PipelineStage::Uploading, Some(STATUS_UPLOADING));
        let photo_urls = match self.upload_photos(&run.submission.car_photos).await {
            Ok(urls) => urls,
            Err((uploaded, e)) => {
                // Objects already stored stay in the bucket
                error!(uploaded = uploaded.len(), error = %e, "Photo upload failed");
                run.enter(PipelineStage::Failed, Some(STATUS_UPLOAD_FAILED));
                return Ok(run.finish(Some(FailureKind::Upload), uploaded));
            }
        };

        run.enter(PipelineStage::Notifying, Some(STATUS_SENDING));
        let params = TemplateParams::build(run.submission, &photo_urls, &self.recipient_email);
        match self.notifier.dispatch(&params).await {
            Ok(()) => {
                run.submission.reset_inputs();
                run.enter(PipelineStage::Succeeded, Some(STATUS_SUCCEEDED));
                Ok(run.finish(None, photo_urls))
            }
            Err(e) => {
                error!(error = %e, "Notification dispatch failed");
                run.enter(PipelineStage::Failed, Some(STATUS_DISPATCH_FAILED));
                Ok(run.finish(Some(FailureKind::Dispatch), photo_urls))
            }
        }
    }

    /// Upload in selection order, stopping at the first failure.
    async fn upload_photos(&self, photos: &[CarPhoto]) -> Result<Vec<String>, (Vec<String>, StorageError)> {
        let mut urls = Vec::with_capacity(photos.len());
        for photo in photos {
            let key = storage_key(Utc::now().timestamp_millis(), &Uuid::new_v4(), &photo.filename);
            info!(key = %key, size = photo.size(), "Uploading photo");
            if let Err(e) = self
                .storage
                .upload(&key, photo.content.clone(), Some(&photo.content_type))
                .await
            {
                return Err((urls, e));
            }
            urls.push(self.storage.public_url(&key));
        }
        Ok(urls)
    }
}

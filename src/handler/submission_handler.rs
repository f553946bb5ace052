use axum::{extract::{Multipart, State}, http::StatusCode, response::IntoResponse, Json};
use bytes::BytesMut;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::dto::submission_dto::{FieldChangeRequest, FieldChangeResponse, SubmissionResponseDto};
use crate::model::advisory::Advisory;
use crate::model::submission::{CarPhoto, Submission, TextField, PHOTOS_FIELD};
use crate::service::submission_service::{FailureKind, SubmissionPipeline};
use crate::util::error::HandlerError;
use crate::util::validation;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `POST /submissions`: read the multipart form into a fresh record and run the pipeline.
pub async fn create_submission_handler(
    State(pipeline): State<Arc<SubmissionPipeline>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[create_submission_handler] Handler called");
    let mut submission = Submission::new();
    let mut advisories: Vec<Advisory> = Vec::new();
    let mut photos: Vec<CarPhoto> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("[create_submission_handler] Error getting next field: {}", e);
        HandlerError::bad_request(format!("Failed to get next field: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("[create_submission_handler] Processing field: {}", name);

        if name == PHOTOS_FIELD {
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            let mut buf = BytesMut::new();
            let mut stream = field;
            while let Some(chunk) = stream.chunk().await.map_err(|e| {
                error!("[create_submission_handler] Error reading file chunk: {}", e);
                HandlerError::bad_request(format!("Failed to read file chunk: {}", e))
            })? {
                buf.extend_from_slice(&chunk);
            }
            // Browsers send an empty part when the picker is left empty
            if filename.is_empty() && buf.is_empty() {
                continue;
            }
            info!("[create_submission_handler] Received photo: {} ({} bytes)", filename, buf.len());
            photos.push(CarPhoto::new(filename, content_type, buf.freeze()));
            continue;
        }

        let Ok(text_field) = name.parse::<TextField>() else {
            warn!("[create_submission_handler] Ignoring unknown field: {}", name);
            continue;
        };
        let value = field.text().await.map_err(|e| {
            error!("[create_submission_handler] Failed to read field {}: {}", name, e);
            HandlerError::bad_request(format!("Failed to read field {}: {}", name, e))
        })?;
        advisories.extend(submission.handle_input_change(text_field, value));
    }

    advisories.extend(submission.handle_file_change(photos));

    let report = pipeline.submit(&mut submission).await?;
    let status = match report.failure {
        None => StatusCode::OK,
        Some(FailureKind::MissingPhotos) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(FailureKind::Upload) | Some(FailureKind::Dispatch) => StatusCode::BAD_GATEWAY,
    };
    info!("[create_submission_handler] Finished with status '{}'", report.status);

    Ok((status, Json(SubmissionResponseDto::new(report, advisories))))
}

/// `POST /submissions/validate`: advisories for a single field change.
pub async fn validate_field_handler(
    Json(payload): Json<FieldChangeRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;

    let advisories = if payload.field == PHOTOS_FIELD {
        // The value carries the number of selected files
        let count = payload.value.trim().parse::<usize>().map_err(|_| {
            HandlerError::bad_request("carPhotos value must be the number of selected files")
        })?;
        validation::check_photo_selection(count).into_iter().collect()
    } else {
        let field = payload.field.parse::<TextField>()?;
        validation::check_text_field(field, &payload.value)
    };

    Ok(Json(FieldChangeResponse {
        field: payload.field,
        value: payload.value,
        advisories,
    }))
}

use axum::{response::{IntoResponse, Response}, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::model::submission::UnknownFieldError;
use crate::service::submission_service::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerErrorKind {
    Validation,
    BadRequest,
    Conflict,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::BadRequest => "BadRequest",
            HandlerErrorKind::Conflict => "Conflict",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HandlerError {
    pub error: HandlerErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, message: impl Into<String>) -> Self {
        Self { error, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Conflict => StatusCode::CONFLICT,
        };
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

impl From<UnknownFieldError> for HandlerError {
    fn from(err: UnknownFieldError) -> Self {
        HandlerError::bad_request(err.to_string())
    }
}

impl From<PipelineError> for HandlerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InFlight(_) => HandlerError::new(HandlerErrorKind::Conflict, err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for HandlerError {
    fn from(err: validator::ValidationErrors) -> Self {
        HandlerError::new(HandlerErrorKind::Validation, "Validation error").with_details(err.to_string())
    }
}

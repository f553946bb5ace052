use axum::{Router, extract::DefaultBodyLimit, routing::post};
use crate::handler::submission_handler::{create_submission_handler, validate_field_handler};
use crate::service::submission_service::SubmissionPipeline;
use std::sync::Arc;


pub fn submission_router(pipeline: Arc<SubmissionPipeline>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/submissions",
            post(create_submission_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/submissions/validate", post(validate_field_handler))
        .with_state(pipeline)
}

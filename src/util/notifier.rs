use async_trait::async_trait;

use crate::dto::submission_dto::TemplateParams;

/// Relays a finished submission to the business inbox.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// One dispatch attempt; callers do not retry.
    async fn dispatch(&self, params: &TemplateParams) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Notification rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Message error: {0}")]
    Message(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

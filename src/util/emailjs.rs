//! Client for the EmailJS REST send endpoint.
//!
//! EmailJS renders the configured template with [`TemplateParams`] and mails it from the
//! configured service. One POST per submission; failures are reported, never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config::EmailJsConfig;
use crate::dto::submission_dto::TemplateParams;
use crate::util::notifier::{Notifier, NotifyError};

/// Request body of `POST /api/v1.0/email/send`.
#[derive(Debug, Serialize)]
pub struct EmailJsRequest<'a> {
    pub service_id: &'a str,
    pub template_id: &'a str,
    pub user_id: &'a str,
    pub template_params: &'a TemplateParams,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<&'a str>,
}

pub struct EmailJsClient {
    client: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailJsClient {
    pub fn new(config: EmailJsConfig) -> Result<Self, NotifyError> {
        config
            .validate()
            .map_err(|e| NotifyError::Message(format!("Invalid EmailJS configuration: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn request<'a>(&'a self, params: &'a TemplateParams) -> EmailJsRequest<'a> {
        EmailJsRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: params,
            access_token: self.config.private_key.as_deref(),
        }
    }
}

#[async_trait]
impl Notifier for EmailJsClient {
    #[instrument(skip(self, params), fields(template = %self.config.template_id, to = %params.to_email))]
    async fn dispatch(&self, params: &TemplateParams) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.config.send_url())
            .json(&self.request(params))
            .send()
            .await
            .map_err(|e| {
                error!("EmailJS request failed: {}", e);
                NotifyError::from(e)
            })?;

        let status = response.status();
        // EmailJS answers with a short text body ("OK" or a reason)
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "EmailJS rejected the message");
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        info!(status = status.as_u16(), body = %body, "EmailJS accepted the message");
        Ok(())
    }
}

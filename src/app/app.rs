use axum::{Router, routing::get};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, EmailJsConfig, MinioConfig, NotifierBackend, SmtpConfig, SubmissionConfig};
use crate::router::submission_router::submission_router;
use crate::service::submission_service::SubmissionPipeline;
use crate::util::email::SmtpEmailService;
use crate::util::emailjs::EmailJsClient;
use crate::util::minio::MinioService;
use crate::util::notifier::Notifier;
use crate::util::storage::ObjectStorage;


pub struct App {
    config: AppConfig,
    router: Router,
    pub pipeline: Arc<SubmissionPipeline>,
}

impl App {
    /// Load configuration from the environment and connect the collaborators.
    pub async fn new() -> Result<Self, Box<dyn Error>> {
        let config = AppConfig::from_env();
        let submission_config = SubmissionConfig::from_env()?;

        let minio_config = MinioConfig::from_env()?;
        let storage: Arc<dyn ObjectStorage> = Arc::new(MinioService::new(minio_config).await?);

        let notifier: Arc<dyn Notifier> = match submission_config.notifier {
            NotifierBackend::EmailJs => Arc::new(EmailJsClient::new(EmailJsConfig::from_env()?)?),
            NotifierBackend::Smtp => Arc::new(SmtpEmailService::new(SmtpConfig::from_env()?)?),
        };
        info!("Using {:?} notifier", submission_config.notifier);

        let pipeline = Arc::new(SubmissionPipeline::new(
            storage,
            notifier,
            submission_config.recipient_email,
        ));

        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Build the app around an already wired pipeline.
    pub fn with_pipeline(config: AppConfig, pipeline: Arc<SubmissionPipeline>) -> Self {
        let router = Self::create_router(pipeline.clone(), config.max_upload_bytes);
        App { config, router, pipeline }
    }

    pub fn create_router(pipeline: Arc<SubmissionPipeline>, max_upload_bytes: usize) -> Router {
        Router::new()
            .merge(submission_router(pipeline, max_upload_bytes))
            .route("/health", get(|| async { "OK" }))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn start(self) -> Result<(), Box<dyn Error>> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

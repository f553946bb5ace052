#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use yango_backend::dto::submission_dto::TemplateParams;
use yango_backend::model::submission::{CarPhoto, Submission, TextField};
use yango_backend::service::submission_service::SubmissionPipeline;
use yango_backend::util::notifier::{Notifier, NotifyError};
use yango_backend::util::storage::{ObjectStorage, StorageError};

pub const RECIPIENT: &str = "leads@example.com";

/// Initialize tracing for tests
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// One collaborator call, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload { key: String, size: usize, content_type: Option<String> },
    Dispatch(TemplateParams),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct FakeStorage {
    log: CallLog,
    /// 1-based index of the upload that fails
    fail_on: Option<usize>,
    uploads: Mutex<usize>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, key: &str, content: Bytes, content_type: Option<&str>) -> Result<(), StorageError> {
        let attempt = {
            let mut uploads = self.uploads.lock().unwrap();
            *uploads += 1;
            *uploads
        };
        self.log.lock().unwrap().push(Call::Upload {
            key: key.to_string(),
            size: content.len(),
            content_type: content_type.map(str::to_string),
        });
        if self.fail_on == Some(attempt) {
            return Err(StorageError::Upload(format!("simulated failure on upload {}", attempt)));
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://storage.test/uploads/{}", key)
    }
}

pub struct FakeNotifier {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn dispatch(&self, params: &TemplateParams) -> Result<(), NotifyError> {
        self.log.lock().unwrap().push(Call::Dispatch(params.clone()));
        if self.fail {
            return Err(NotifyError::Rejected { status: 400, body: "The template ID is invalid".to_string() });
        }
        Ok(())
    }
}

/// Pipeline wired to in-memory collaborators sharing one call log.
pub fn pipeline(fail_upload_on: Option<usize>, fail_dispatch: bool) -> (SubmissionPipeline, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let storage = Arc::new(FakeStorage {
        log: log.clone(),
        fail_on: fail_upload_on,
        uploads: Mutex::new(0),
    });
    let notifier = Arc::new(FakeNotifier { log: log.clone(), fail: fail_dispatch });
    (SubmissionPipeline::new(storage, notifier, RECIPIENT), log)
}

pub fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}

pub fn photo(name: &str) -> CarPhoto {
    CarPhoto::new(name, "image/jpeg", format!("jpeg bytes of {}", name).into_bytes())
}

/// The example customer from the product brief.
pub fn maria(photos: Vec<CarPhoto>) -> Submission {
    let mut submission = Submission::new();
    submission.handle_input_change(TextField::FullName, "Maria S.");
    submission.handle_input_change(TextField::PhoneNumber, "0818174090");
    submission.handle_input_change(TextField::CarModel, "Toyota Corolla");
    submission.handle_input_change(TextField::CarYear, "2018");
    submission.handle_file_change(photos);
    submission
}

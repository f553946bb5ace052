mod common;

use common::{calls, init_tracing, maria, photo, pipeline, Call, RECIPIENT};
use yango_backend::model::submission::{PipelineStage, Submission};
use yango_backend::service::submission_service::{
    FailureKind, STATUS_DISPATCH_FAILED, STATUS_MISSING_PHOTOS, STATUS_SENDING, STATUS_SUCCEEDED,
    STATUS_UPLOADING, STATUS_UPLOAD_FAILED,
};

fn upload_keys(calls: &[Call]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Upload { key, .. } => Some(key.clone()),
            Call::Dispatch(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_maria_scenario_uploads_then_dispatches_and_clears() {
    init_tracing();
    let (pipeline, log) = pipeline(None, false);
    let mut submission = maria(vec![photo("corolla.jpg")]);

    let report = pipeline.submit(&mut submission).await.unwrap();

    let calls = calls(&log);
    assert_eq!(calls.len(), 2);
    let key = match &calls[0] {
        Call::Upload { key, size, content_type } => {
            assert_eq!(*size, "jpeg bytes of corolla.jpg".len());
            assert_eq!(content_type.as_deref(), Some("image/jpeg"));
            key.clone()
        }
        other => panic!("expected upload first, got {:?}", other),
    };
    let parts: Vec<&str> = key.splitn(3, '_').collect();
    assert!(parts[0].parse::<i64>().unwrap() > 0);
    assert_eq!(parts[1].len(), 32);
    assert_eq!(parts[2], "corolla.jpg");

    match &calls[1] {
        Call::Dispatch(params) => {
            assert_eq!(params.name, "Maria S.");
            assert_eq!(params.title, "Car Submission: Toyota Corolla (2018)");
            assert_eq!(params.phone_number, "0818174090");
            assert_eq!(params.car_model, "Toyota Corolla");
            assert_eq!(params.car_year, "2018");
            assert_eq!(params.car_photos, format!("https://storage.test/uploads/{}", key));
            assert_eq!(params.to_email, RECIPIENT);
        }
        other => panic!("expected dispatch second, got {:?}", other),
    }

    assert_eq!(report.stage, PipelineStage::Succeeded);
    assert_eq!(report.status, STATUS_SUCCEEDED);
    assert_eq!(report.status_trail, vec![STATUS_UPLOADING, STATUS_SENDING, STATUS_SUCCEEDED]);
    assert_eq!(report.failure, None);

    assert_eq!(submission.status(), STATUS_SUCCEEDED);
    assert_eq!(submission.stage(), PipelineStage::Succeeded);
    assert!(submission.full_name.is_empty());
    assert!(submission.phone_number.is_empty());
    assert!(submission.car_model.is_empty());
    assert!(submission.car_year.is_empty());
    assert!(submission.car_photos.is_empty());
}

#[tokio::test]
async fn test_zero_photos_makes_no_calls() {
    init_tracing();
    let (pipeline, log) = pipeline(None, false);
    let mut submission = maria(Vec::new());

    let report = pipeline.submit(&mut submission).await.unwrap();

    assert!(calls(&log).is_empty());
    assert_eq!(report.status, STATUS_MISSING_PHOTOS);
    assert_eq!(report.failure, Some(FailureKind::MissingPhotos));
    assert_eq!(report.status_trail, vec![STATUS_MISSING_PHOTOS]);
    assert_eq!(submission.status(), STATUS_MISSING_PHOTOS);
    assert_eq!(submission.full_name, "Maria S.");
}

#[tokio::test]
async fn test_all_uploads_happen_in_selection_order_before_dispatch() {
    init_tracing();
    let (pipeline, log) = pipeline(None, false);
    let names = ["front.jpg", "back.jpg", "interior.jpg", "dashboard.jpg"];
    let mut submission = maria(names.iter().map(|n| photo(n)).collect());

    let report = pipeline.submit(&mut submission).await.unwrap();
    assert!(report.succeeded());

    let calls = calls(&log);
    assert_eq!(calls.len(), names.len() + 1);
    assert!(matches!(calls.last(), Some(Call::Dispatch(_))));

    let keys = upload_keys(&calls);
    for (key, name) in keys.iter().zip(names) {
        assert!(key.ends_with(&format!("_{}", name)), "{} should end with {}", key, name);
    }

    let expected_urls: Vec<String> = keys
        .iter()
        .map(|key| format!("https://storage.test/uploads/{}", key))
        .collect();
    assert_eq!(report.photo_urls, expected_urls);
    match calls.last() {
        Some(Call::Dispatch(params)) => assert_eq!(params.car_photos, expected_urls.join("\n")),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_photos_with_the_same_name_get_distinct_keys() {
    init_tracing();
    let (pipeline, log) = pipeline(None, false);
    let mut submission = maria(vec![photo("image.jpg"), photo("image.jpg")]);

    let report = pipeline.submit(&mut submission).await.unwrap();

    assert!(report.succeeded());
    let keys = upload_keys(&calls(&log));
    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);
    assert!(keys.iter().all(|key| key.ends_with("_image.jpg")));
    assert_ne!(report.photo_urls[0], report.photo_urls[1]);
}

#[tokio::test]
async fn test_upload_failure_stops_remaining_uploads_and_dispatch() {
    init_tracing();
    for failing in 1..=3 {
        let (pipeline, log) = pipeline(Some(failing), false);
        let mut submission = maria(vec![photo("a.jpg"), photo("b.jpg"), photo("c.jpg")]);

        let report = pipeline.submit(&mut submission).await.unwrap();

        let calls = calls(&log);
        assert_eq!(calls.len(), failing, "uploads after #{} must not run", failing);
        assert!(calls.iter().all(|c| matches!(c, Call::Upload { .. })));
        assert_eq!(report.status, STATUS_UPLOAD_FAILED);
        assert_eq!(report.failure, Some(FailureKind::Upload));
        assert_eq!(report.status_trail, vec![STATUS_UPLOADING, STATUS_UPLOAD_FAILED]);
        assert_eq!(report.photo_urls.len(), failing - 1);

        // Nothing is reset on failure
        assert_eq!(submission.car_model, "Toyota Corolla");
        assert_eq!(submission.car_photos.len(), 3);
        assert_eq!(submission.stage(), PipelineStage::Failed);
    }
}

#[tokio::test]
async fn test_dispatch_failure_keeps_inputs() {
    init_tracing();
    let (pipeline, log) = pipeline(None, true);
    let mut submission = maria(vec![photo("a.jpg"), photo("b.jpg")]);

    let report = pipeline.submit(&mut submission).await.unwrap();

    assert_eq!(calls(&log).len(), 3);
    assert_eq!(report.status, STATUS_DISPATCH_FAILED);
    assert_eq!(report.failure, Some(FailureKind::Dispatch));
    assert_eq!(report.status_trail, vec![STATUS_UPLOADING, STATUS_SENDING, STATUS_DISPATCH_FAILED]);
    assert_eq!(report.photo_urls.len(), 2);

    assert_eq!(submission.status(), STATUS_DISPATCH_FAILED);
    assert_eq!(submission.full_name, "Maria S.");
    assert_eq!(submission.phone_number, "0818174090");
    assert_eq!(submission.car_model, "Toyota Corolla");
    assert_eq!(submission.car_year, "2018");
}

#[tokio::test]
async fn test_retry_after_dispatch_failure_dispatches_again() {
    init_tracing();
    let (failing, _) = pipeline(None, true);
    let mut submission = maria(vec![photo("a.jpg")]);
    failing.submit(&mut submission).await.unwrap();
    assert_eq!(submission.stage(), PipelineStage::Failed);

    let (working, log) = pipeline(None, false);
    let report = working.submit(&mut submission).await.unwrap();

    assert!(report.succeeded());
    assert_eq!(calls(&log).len(), 2);
}

#[tokio::test]
async fn test_advisories_do_not_block_submit() {
    init_tracing();
    let (pipeline, log) = pipeline(None, false);
    let mut submission = Submission::new();
    submission.handle_input_change(yango_backend::model::submission::TextField::PhoneNumber, "+62 818");
    submission.handle_file_change(vec![photo("a.jpg")]);

    let report = pipeline.submit(&mut submission).await.unwrap();

    assert!(report.succeeded());
    match calls(&log).last() {
        Some(Call::Dispatch(params)) => {
            assert_eq!(params.phone_number, "+62 818");
            assert_eq!(params.title, "Car Submission:  ()");
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
}

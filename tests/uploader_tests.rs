//! Compensating uploader tests
//!
//! Each scenario pins down which network calls are and are not issued; the
//! mock transport fails the test on any unexpected request.

mod common;

use std::sync::Arc;

use common::{response, MockTransport};
use mockall::predicate::{always, eq};
use opwatch::error::OpwatchError;
use opwatch::upload::{CompensatingUploader, UploadPayload, UploadTarget, UploaderOptions};
use url::Url;

fn target() -> UploadTarget {
    let packages = Url::parse("https://svc.example.net/packages").unwrap();
    UploadTarget::new(packages.clone(), packages)
}

fn create_response() -> Vec<u8> {
    br#"{"entityId": "abc", "preAuthUploadUri": "https://blob.example.net/abc?sig=x"}"#.to_vec()
}

fn payload() -> UploadPayload {
    UploadPayload::new("web.cspkg", b"package bytes".to_vec())
}

fn metadata() -> serde_json::Value {
    serde_json::json!({"name": "web-tier", "fileName": "web.cspkg"})
}

fn pre_auth_url() -> Url {
    Url::parse("https://blob.example.net/abc?sig=x").unwrap()
}

fn entity_url() -> Url {
    Url::parse("https://svc.example.net/packages/abc").unwrap()
}

fn uploader(transport: MockTransport, finalize: bool) -> CompensatingUploader {
    CompensatingUploader::new(Arc::new(transport), UploaderOptions { finalize })
}

#[tokio::test]
async fn test_empty_payload_rejected_before_any_network_call() {
    // No expectations: any request at all fails the test
    let transport = MockTransport::new();
    let uploader = uploader(transport, true);

    let result = uploader
        .create_and_upload(
            &target(),
            &metadata(),
            UploadPayload::new("web.cspkg", Vec::new()),
        )
        .await;

    assert!(matches!(result, Err(OpwatchError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_registration_failure_propagates_without_cleanup() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(500, b"registration broke")));

    let uploader = uploader(transport, true);
    let result = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await;

    // Nothing was created, so the error is not wrapped in upload context
    assert!(matches!(result, Err(OpwatchError::ServiceApiError(_))));
}

#[tokio::test]
async fn test_transfer_failure_issues_single_compensating_delete() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(200, &create_response())));
    transport
        .expect_put()
        .with(eq(pre_auth_url()), always())
        .times(1)
        .returning(|_, _| Err(OpwatchError::network("connection reset during transfer")));
    transport
        .expect_delete()
        .with(eq(entity_url()))
        .times(1)
        .returning(|_| Ok(response(200, b"")));

    let uploader = uploader(transport, true);
    let result = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await;

    match result {
        Err(OpwatchError::UploadFailed {
            entity_id,
            operation,
            details,
            cleanup_error,
        }) => {
            assert_eq!(entity_id, "abc");
            assert_eq!(operation, "web.cspkg");
            assert!(details.contains("connection reset during transfer"));
            assert!(cleanup_error.is_none());
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cleanup_failure_is_attached_but_never_replaces_primary() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(200, &create_response())));
    transport
        .expect_put()
        .times(1)
        .returning(|_, _| Ok(response(500, b"blob store unavailable")));
    transport
        .expect_delete()
        .times(1)
        .returning(|_| Ok(response(500, b"delete also broke")));

    let uploader = uploader(transport, true);
    let result = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await;

    match result {
        Err(OpwatchError::UploadFailed {
            details,
            cleanup_error,
            ..
        }) => {
            assert!(details.contains("blob store unavailable"));
            assert!(cleanup_error.unwrap().contains("delete also broke"));
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rollback_tolerates_entity_already_gone() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(200, &create_response())));
    transport
        .expect_put()
        .times(1)
        .returning(|_, _| Err(OpwatchError::network("reset")));
    transport
        .expect_delete()
        .times(1)
        .returning(|_| Ok(response(404, b"")));

    let uploader = uploader(transport, true);
    let result = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await;

    match result {
        Err(OpwatchError::UploadFailed { cleanup_error, .. }) => {
            assert!(cleanup_error.is_none());
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_successful_upload_finalizes_against_entity_url() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(200, &create_response())));
    transport
        .expect_put()
        .with(eq(pre_auth_url()), always())
        .times(1)
        .returning(|_, _| Ok(response(201, b"")));
    transport
        .expect_put()
        .with(eq(entity_url()), always())
        .times(1)
        .returning(|_, _| Ok(response(200, b"")));

    let uploader = uploader(transport, true);
    let receipt = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await
        .unwrap();

    assert_eq!(receipt.entity_id, "abc");
    assert_eq!(receipt.size, b"package bytes".len() as u64);
    assert!(receipt.finalized);
}

#[tokio::test]
async fn test_finalize_conflict_surfaces_as_conflict() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(200, &create_response())));
    transport
        .expect_put()
        .with(eq(pre_auth_url()), always())
        .times(1)
        .returning(|_, _| Ok(response(201, b"")));
    transport
        .expect_put()
        .with(eq(entity_url()), always())
        .times(1)
        .returning(|_, _| Ok(response(409, b"another package holds this slot")));

    let uploader = uploader(transport, true);
    let result = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await;

    assert!(matches!(result, Err(OpwatchError::Conflict(_))));
}

#[tokio::test]
async fn test_finalize_can_be_disabled() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(response(200, &create_response())));
    transport
        .expect_put()
        .with(eq(pre_auth_url()), always())
        .times(1)
        .returning(|_, _| Ok(response(201, b"")));

    let uploader = uploader(transport, false);
    let receipt = uploader
        .create_and_upload(&target(), &metadata(), payload())
        .await
        .unwrap();

    assert!(!receipt.finalized);
}

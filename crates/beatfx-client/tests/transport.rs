//! Integration tests for the effect service client against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use beatfx_client::{ClientConfig, EffectsClient, ErrorKind};
use beatfx_models::{JobId, ParameterSet, SourceFile};

/// Matches when the raw request body contains the given byte sequence.
struct BodyContains(&'static [u8]);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        request.body.windows(self.0.len()).any(|w| w == self.0)
    }
}

fn client_for(server: &MockServer) -> EffectsClient {
    EffectsClient::new(ClientConfig {
        base_url: server.uri(),
        probe_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(5),
        submit_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn sample_file() -> SourceFile {
    SourceFile::from_bytes("input.mp4", b"fake video bytes".to_vec())
}

#[tokio::test]
async fn test_probe_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.check_reachable().await.is_ok());
}

#[tokio::test]
async fn test_probe_non_2xx_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.check_reachable().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
    assert!(err.detail().contains("503"));
}

#[tokio::test]
async fn test_probe_connection_refused_is_unreachable() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    drop(server);

    let client = EffectsClient::new(ClientConfig {
        base_url,
        probe_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(1),
        submit_timeout: Duration::from_secs(1),
    })
    .unwrap();

    let err = client.check_reachable().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
}

#[tokio::test]
async fn test_probe_timeout_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = EffectsClient::new(ClientConfig {
        base_url: server.uri(),
        probe_timeout: Duration::from_millis(50),
        request_timeout: Duration::from_secs(5),
        submit_timeout: Duration::from_secs(5),
    })
    .unwrap();

    let err = client.check_reachable().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
}

#[tokio::test]
async fn test_submit_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(BodyContains(b"name=\"file\""))
        .and(BodyContains(b"filename=\"input.mp4\""))
        .and(BodyContains(b"fake video bytes"))
        .and(BodyContains(b"name=\"params\""))
        .and(BodyContains(b"\"min_size\":15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "process_id": "abc",
            "filename": "out.mp4",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = ParameterSet::default().with_frame_rate(30);
    let receipt = client
        .submit(&sample_file(), params.to_json().unwrap())
        .await
        .unwrap();

    assert_eq!(receipt.job_id, JobId::from("abc"));
    assert_eq!(receipt.output_filename.as_deref(), Some("out.mp4"));
}

#[tokio::test]
async fn test_submit_service_failure_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "no beats detected",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .submit(&sample_file(), ParameterSet::default().to_json().unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerRejected);
    assert!(err.detail().contains("no beats detected"));
}

#[tokio::test]
async fn test_submit_missing_process_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .submit(&sample_file(), ParameterSet::default().to_json().unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerRejected);
    assert!(err.detail().contains("process_id"));
}

#[tokio::test]
async fn test_submit_http_error_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("renderer crashed"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .submit(&sample_file(), ParameterSet::default().to_json().unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerRejected);
    assert!(err.detail().contains("500"));
    assert!(err.detail().contains("renderer crashed"));
}

#[tokio::test]
async fn test_fetch_artifact_returns_bytes_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"processed bytes".to_vec())
                .insert_header("content-type", "video/mp4"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let artifact = client.fetch_artifact(&JobId::from("abc")).await.unwrap();

    assert_eq!(artifact.bytes, b"processed bytes");
    assert_eq!(artifact.content_type.as_deref(), Some("video/mp4"));
}

#[tokio::test]
async fn test_fetch_artifact_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_artifact(&JobId::from("gone")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_remove_ok() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete/abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.remove(&JobId::from("abc")).await.is_ok());
}

#[tokio::test]
async fn test_remove_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.remove(&JobId::from("gone")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

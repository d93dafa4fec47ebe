#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use issuedesk_api::{ApiClient, Error, HistoryQuery, Session, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, Arc<Session>) {
    let server = MockServer::start().await;
    let session = Arc::new(Session::new());
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        Arc::clone(&session),
    )
    .unwrap();
    (server, client, session)
}

async fn logged_in() -> (MockServer, ApiClient, Arc<Session>) {
    let (server, client, session) = setup().await;
    session.begin(SecretString::from("tok-123".to_owned()));
    (server, client, session)
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_begins_session() {
    let (server, client, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "operator", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-abc"})))
        .mount(&server)
        .await;

    let secret = SecretString::from("pw".to_owned());
    client.login("operator", &secret).await.unwrap();

    assert!(session.is_active());
}

#[tokio::test]
async fn test_login_without_token_is_rejected() {
    let (server, client, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let secret = SecretString::from("pw".to_owned());
    let result = client.login("operator", &secret).await;

    assert!(
        matches!(result, Err(Error::UnexpectedShape(_))),
        "expected UnexpectedShape, got: {result:?}"
    );
    assert!(!session.is_active());
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": "operator"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let me = client.me().await.unwrap();
    assert_eq!(me["username"], "operator");
}

#[tokio::test]
async fn test_me_without_session() {
    let (_server, client, _session) = setup().await;
    assert!(matches!(client.me().await, Err(Error::NoSession)));
}

#[tokio::test]
async fn test_unauthorized_evicts_session() {
    let (server, client, session) = logged_in().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&server)
        .await;

    let result = client.list_employees().await;

    match result {
        Err(Error::Unauthorized { ref message }) => {
            assert_eq!(message.as_deref(), Some("Token expired"));
        }
        other => panic!("expected Unauthorized, got: {other:?}"),
    }
    assert!(!session.is_active());
    assert!(session.was_evicted());
}

#[tokio::test]
async fn test_network_failure_keeps_session() {
    let session = Arc::new(Session::with_token(SecretString::from("tok".to_owned())));
    // Port 9 (discard) on localhost: nothing listens, the connect fails.
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:9/api",
        Arc::clone(&session),
    )
    .unwrap();

    let err = client.list_employees().await.unwrap_err();

    assert!(err.is_network(), "expected network error, got: {err:?}");
    assert!(session.is_active());
    assert!(!session.was_evicted());
}

#[tokio::test]
async fn test_timeout_reports_configured_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let session = Arc::new(Session::with_token(SecretString::from("tok".to_owned())));
    let transport = TransportConfig::default().with_timeout(Duration::from_millis(300));
    let client = ApiClient::new(
        &format!("{}/api", server.uri()),
        &transport,
        Arc::clone(&session),
    )
    .unwrap();

    let err = client.list_employees().await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert_eq!(err.to_string(), "Request timed out after 0.3s");
    assert!(session.is_active());
}

// ── Server rejections ───────────────────────────────────────────────

#[tokio::test]
async fn test_server_message_is_verbatim() {
    let (server, client, session) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/issues/issue"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Видеорегистратор уже выдан"})),
        )
        .mount(&server)
        .await;

    let err = client.issue(&json!(1), &json!(2)).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some("Видеорегистратор уже выдан"));
    assert!(session.is_active());
}

#[tokio::test]
async fn test_server_error_without_body() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("DELETE"))
        .and(path("/api/issues/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.delete_issue("9").await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, message: None }));
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_error() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/video-recorders"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client.list_recorders().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

// ── Collections ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_employees_unwraps_envelope() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employees": [
                {"id": 1, "full_name": "Иванов Иван", "employee_number": "A001"},
                {"id": 2, "fullName": "Petrov Petr", "employeeNumber": "B002"}
            ]
        })))
        .mount(&server)
        .await;

    let employees = client.list_employees().await.unwrap();

    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0]["full_name"], "Иванов Иван");
    assert_eq!(employees[1]["fullName"], "Petrov Petr");
}

#[tokio::test]
async fn test_list_recorders_camel_envelope() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/video-recorders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "videoRecorders": [{"id": 10, "number": "VR-10", "status": "available"}]
        })))
        .mount(&server)
        .await;

    let recorders = client.list_recorders().await.unwrap();
    assert_eq!(recorders, vec![json!({"id": 10, "number": "VR-10", "status": "available"})]);
}

#[tokio::test]
async fn test_get_recorder_unwraps_single() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/video-recorders/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_recorder": {"id": 10, "number": "VR-10", "status": "issued"}
        })))
        .mount(&server)
        .await;

    let recorder = client.get_recorder("10").await.unwrap();
    assert_eq!(recorder["status"], "issued");
}

// ── Issuance ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_issue_sends_snake_case_ids() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/issues/issue"))
        .and(body_json(json!({"employee_id": 1, "video_recorder_id": 10})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 77})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.issue(&json!(1), &json!(10)).await.unwrap();
    assert_eq!(resp["id"], 77);
}

#[tokio::test]
async fn test_return_sends_snake_case_ids() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/issues/return"))
        .and(body_json(json!({"employee_id": "e-1", "video_recorder_id": "vr-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.return_recorder(&json!("e-1"), &json!("vr-1")).await.unwrap();
}

#[tokio::test]
async fn test_history_sends_filters() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/issues/history"))
        .and(query_param("employee_id", "1"))
        .and(query_param("dateFrom", "2024-01-01"))
        .and(query_param("dateTo", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{"id": 5, "employee_id": 1, "video_recorder_id": 10}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = HistoryQuery {
        employee_id: Some("1".into()),
        video_recorder_id: None,
        date_from: Some("2024-01-01".into()),
        date_to: Some("2024-01-31".into()),
    };
    let history = client.list_issue_history(&query).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_delete_with_empty_body() {
    let (server, client, _session) = logged_in().await;

    Mock::given(method("DELETE"))
        .and(path("/api/issues/5"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let resp = client.delete_issue("5").await.unwrap();
    assert!(resp.is_null());
}

use std::time::Duration;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jotter::backend::{ApiOutcome, BackendClient, BackendError, NoteCreate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), Duration::from_secs(1)).unwrap()
}

fn note_body(id: i64, title: &str, tags: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "content": "note text",
        "tags": tags,
        "owner_id": 1,
        "created_at": "2026-05-01T10:00:00Z",
        "updated_at": "2026-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_register_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(body_string_contains("\"username\":\"alice\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 1, "username": "alice"})),
        )
        .mount(&server)
        .await;

    let outcome = client(&server).register("alice", "Abcdef1!").await.unwrap();
    match outcome {
        ApiOutcome::Success(profile) => assert_eq!(profile.username, "alice"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_duplicate_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let outcome = client(&server).register("alice", "Abcdef1!").await.unwrap();
    assert_eq!(outcome, ApiOutcome::Rejected(400));
}

#[tokio::test]
async fn test_authenticate_uses_password_grant_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "jwt-1", "token_type": "bearer"})),
        )
        .mount(&server)
        .await;

    let outcome = client(&server)
        .authenticate("alice", "Abcdef1!")
        .await
        .unwrap();
    assert_eq!(outcome, ApiOutcome::Success("jwt-1".to_string()));
}

#[tokio::test]
async fn test_authenticate_bad_credentials_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let outcome = client(&server).authenticate("alice", "nope").await.unwrap();
    assert_eq!(outcome, ApiOutcome::Rejected(400));
}

#[tokio::test]
async fn test_create_note_carries_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes/"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(note_body(7, "groceries", "food")))
        .mount(&server)
        .await;

    let note = NoteCreate {
        title: "groceries".to_string(),
        content: "note text".to_string(),
        tags: "food".to_string(),
    };
    let outcome = client(&server).create_note(&note, "jwt-1").await.unwrap();
    match outcome {
        ApiOutcome::Success(saved) => {
            assert_eq!(saved.id, 7);
            assert_eq!(saved.title, "groceries");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_token_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let note = NoteCreate {
        title: "t".to_string(),
        content: "c".to_string(),
        tags: String::new(),
    };
    let outcome = client(&server).create_note(&note, "stale").await.unwrap();
    assert!(outcome.is_auth_failure());
}

#[tokio::test]
async fn test_list_notes_parses_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([note_body(1, "a", ""), note_body(2, "b", "x")])),
        )
        .mount(&server)
        .await;

    let outcome = client(&server).list_notes("jwt-1").await.unwrap();
    match outcome {
        ApiOutcome::Success(notes) => {
            assert_eq!(notes.len(), 2);
            assert_eq!(notes[1].tags, "x");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_notes_hits_tag_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/tags/work"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let outcome = client(&server)
        .search_notes_by_tag("work", "jwt-1")
        .await
        .unwrap();
    assert_eq!(outcome, ApiOutcome::Success(Vec::new()));
}

/// A response slower than the per-call timeout surfaces as a transport
/// failure, not a rejection
#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri(), Duration::from_millis(100)).unwrap();
    let result = client.list_notes("jwt-1").await;
    match result {
        Err(BackendError::Timeout(_)) => {}
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    // Nothing listens on this port
    let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
    let result = client.list_notes("jwt-1").await;
    assert!(result.is_err());
}

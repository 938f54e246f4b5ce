//! HTTP behavior tests for the reviews client
//!
//! Runs against a local wiremock server; no external network access needed.

use revpipe_ingest::reviews::{ReviewDraft, ReviewsClient, ReviewsError, SubmitOutcome};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReviewsClient {
    ReviewsClient::new(server.uri(), true, 5).expect("client should build")
}

fn sample_reviews() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1,
            "text": "Great burger! Crispy fries!",
            "sentiment": "Positive",
            "date": "2025-09-03T12:05:00Z"
        },
        {
            "id": 2,
            "text": "Service was slow and inattentive.",
            "sentiment": null,
            "date": "2025-09-03T12:06:00Z"
        }
    ])
}

#[tokio::test]
async fn test_fetch_all_parses_review_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_reviews()))
        .mount(&server)
        .await;

    let reviews = client_for(&server).fetch_all().await.unwrap();

    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].id, Some(1));
    assert_eq!(reviews[0].sentiment.as_deref(), Some("Positive"));
    assert_eq!(reviews[1].sentiment, None);
}

#[tokio::test]
async fn test_fetch_all_rejects_non_json_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>login page</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_all().await.unwrap_err();
    match err {
        ReviewsError::Protocol(message) => {
            assert!(message.contains("text/html"));
            assert!(message.contains("login page"));
        }
        other => panic!("expected Protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_all_surfaces_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_all().await.unwrap_err();
    match err {
        ReviewsError::HttpStatus { status, url } => {
            assert_eq!(status.as_u16(), 503);
            assert!(url.ends_with("/api/reviews"));
        }
        other => panic!("expected HttpStatus error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_all_unreachable_host_is_transport_error() {
    // Discard port: nothing listens here, the connection is refused
    let client = ReviewsClient::new("http://127.0.0.1:9", true, 2).unwrap();

    let err = client.fetch_all().await.unwrap_err();
    assert!(matches!(&err, ReviewsError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_submit_returns_parsed_json() {
    let server = MockServer::start().await;

    let draft = ReviewDraft {
        text: "Solid lunch spot".to_string(),
        sentiment: Some("Positive".to_string()),
        date: "2025-09-04T10:00:00Z".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/api/reviews"))
        .and(body_json(&draft))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 7,
            "text": "Solid lunch spot",
            "sentiment": "Positive",
            "date": "2025-09-04T10:00:00Z"
        })))
        .mount(&server)
        .await;

    match client_for(&server).submit(&draft).await.unwrap() {
        SubmitOutcome::Json(value) => assert_eq!(value["id"], 7),
        SubmitOutcome::Raw(body) => panic!("expected JSON outcome, got raw body {:?}", body),
    }
}

#[tokio::test]
async fn test_submit_tolerates_raw_echo_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("accepted")
                .insert_header("Content-Type", "text/plain"),
        )
        .mount(&server)
        .await;

    let draft = ReviewDraft {
        text: "ok".to_string(),
        sentiment: None,
        date: "2025-09-04T10:00:00Z".to_string(),
    };

    match client_for(&server).submit(&draft).await.unwrap() {
        SubmitOutcome::Raw(body) => assert_eq!(body, "accepted"),
        SubmitOutcome::Json(value) => panic!("expected raw outcome, got {:?}", value),
    }
}

// Integration tests for `SlideClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use podium_api::{Error, SlideClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SlideClient) {
    let server = MockServer::start().await;
    let client = SlideClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_talk_info() {
    let (server, client) = setup().await;

    let body = json!({
        "title": "Practical Async Rust",
        "date": "2026-08-23",
        "slideIds": ["cover", "intro", "channels", "qna"],
    });

    Mock::given(method("GET"))
        .and(path("/api/talk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let talk = client.talk_info().await.unwrap();

    assert_eq!(talk.title, "Practical Async Rust");
    assert_eq!(talk.date, "2026-08-23");
    assert_eq!(talk.slide_ids, vec!["cover", "intro", "channels", "qna"]);
}

#[tokio::test]
async fn test_get_slide() {
    let (server, client) = setup().await;

    let body = json!({
        "id": "channels",
        "title": "Channels, not locks",
        "body": "watch vs broadcast vs mpsc",
        "kind": "Standard",
        "style": ["dark"],
        "notes": "mention backpressure",
    });

    Mock::given(method("GET"))
        .and(path("/api/slides/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let slide = client.slide("channels").await.unwrap();

    assert_eq!(slide.id, "channels");
    assert_eq!(slide.title, "Channels, not locks");
    assert_eq!(slide.body, "watch vs broadcast vs mpsc");
    assert_eq!(slide.kind.as_deref(), Some("Standard"));
    assert_eq!(slide.style, vec!["dark"]);
    assert_eq!(slide.notes.as_deref(), Some("mention backpressure"));
}

#[tokio::test]
async fn test_slide_optional_fields_default() {
    let (server, client) = setup().await;

    // A minimal slide: only id and title.
    let body = json!({
        "id": "qna",
        "title": "Questions?",
    });

    Mock::given(method("GET"))
        .and(path("/api/slides/qna"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let slide = client.slide("qna").await.unwrap();

    assert_eq!(slide.id, "qna");
    assert_eq!(slide.body, "");
    assert!(slide.kind.is_none());
    assert!(slide.style.is_empty());
    assert!(slide.notes.is_none());
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_slide_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/slides/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.slide("missing").await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got {err}");
}

#[tokio::test]
async fn test_malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/talk"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.talk_info().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization, got {other}"),
    }
}

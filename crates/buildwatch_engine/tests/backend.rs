use buildwatch_engine::{EngineConfig, FailureKind, HttpSelectionBackend, SelectionBackend};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpSelectionBackend {
    HttpSelectionBackend::new(&EngineConfig::default().with_base_url(server.uri())).unwrap()
}

async fn load_from(body: Value) -> Vec<String> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    backend_for(&server).load().await.expect("load ok")
}

#[tokio::test]
async fn load_accepts_every_stored_layout() {
    assert_eq!(load_from(json!({ "selectedBuilds": ["a", "b"] })).await, vec!["a", "b"]);
    assert_eq!(
        load_from(json!({ "builds": { "selectedBuilds": ["c"] } })).await,
        vec!["c"]
    );
    assert_eq!(
        load_from(json!({ "config": { "builds": { "selectedBuilds": ["d"] } } })).await,
        vec!["d"]
    );
    assert_eq!(load_from(json!({ "selected_builds": ["e"] })).await, vec!["e"]);
    assert_eq!(load_from(json!(["f"])).await, vec!["f"]);
}

#[tokio::test]
async fn top_level_field_wins_over_nested_ones() {
    let ids = load_from(json!({
        "selectedBuilds": ["top"],
        "config": { "builds": { "selectedBuilds": ["nested"] } }
    }))
    .await;
    assert_eq!(ids, vec!["top"]);
}

#[tokio::test]
async fn document_without_selection_loads_empty() {
    assert!(load_from(json!({ "theme": "dark" })).await.is_empty());
}

#[tokio::test]
async fn load_failure_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend_for(&server).load().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn save_posts_the_full_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/builds/tree/selection"))
        .and(body_json(json!({ "selectedBuilds": ["a", "b"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .save(&["a".to_string(), "b".to_string()])
        .await
        .expect("save ok");
}

#[tokio::test]
async fn rejected_save_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/builds/tree/selection"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend_for(&server).save(&[]).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

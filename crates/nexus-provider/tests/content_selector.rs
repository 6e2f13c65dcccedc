//! Integration tests for the content selector resource and data sources.

use nexus_provider::{CallContext, NexusProvider, ProviderConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SELECTORS: &str = "/service/rest/v1/security/content-selectors";

fn provider(server: &MockServer) -> NexusProvider {
    let mut provider = NexusProvider::new();
    provider
        .configure(
            ProviderConfig::default()
                .with_url(server.uri())
                .with_credentials("admin", "admin123"),
        )
        .expect("provider configures");
    provider
}

fn raw_selector() -> Value {
    json!({
        "name": "raw-only",
        "description": "raw content",
        "expression": "format == \"raw\""
    })
}

#[tokio::test]
async fn test_create_reads_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SELECTORS))
        .and(body_json(raw_selector()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{SELECTORS}/raw-only")))
        .respond_with(ResponseTemplate::new(200).set_body_json(raw_selector()))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let response = resource.create(&CallContext::new(), &raw_selector()).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["name"], "raw-only");
    assert_eq!(state["expression"], "format == \"raw\"");
    assert!(state["last_updated"].is_string());
}

#[tokio::test]
async fn test_create_conflict_reports_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SELECTORS))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("[{\"id\":\"name\",\"message\":\"Name is already used\"}]"),
        )
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let response = resource.create(&CallContext::new(), &raw_selector()).await;

    assert!(response.state.is_none());
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert!(diagnostic.detail.starts_with("400 Bad Request\n"));
    assert!(diagnostic.detail.contains("Name is already used"));
}

#[tokio::test]
async fn test_invalid_name_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let plan = json!({"name": "_bad name", "description": "", "expression": "true"});
    let response = resource.create(&CallContext::new(), &plan).await;

    assert!(response.state.is_none());
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.summary, "Invalid attribute value: name");
}

#[tokio::test]
async fn test_read_missing_selector_warns() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{SELECTORS}/raw-only")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let response = resource.read(&CallContext::new(), &raw_selector()).await;

    assert!(response.state.is_none());
    assert!(!response.has_errors());
    assert!(response.diagnostics.has_warnings());
}

#[tokio::test]
async fn test_update_and_rename() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{SELECTORS}/raw-only")))
        .and(body_json(json!({
            "description": "raw and npm",
            "expression": "format == \"raw\" or format == \"npm\""
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let mut state = raw_selector();
    state["last_updated"] = json!("Monday, 01-Jan-24 00:00:00 UTC");
    let plan = json!({
        "name": "raw-only",
        "description": "raw and npm",
        "expression": "format == \"raw\" or format == \"npm\""
    });
    let response = resource.update(&CallContext::new(), &plan, &state).await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.state.unwrap();
    assert_eq!(new_state["description"], "raw and npm");
    assert_ne!(new_state["last_updated"], state["last_updated"]);

    let renamed = json!({"name": "other", "description": "x", "expression": "true"});
    let response = resource.update(&CallContext::new(), &renamed, &state).await;
    assert!(response.has_errors());
    assert_eq!(response.state, Some(state));
}

#[tokio::test]
async fn test_delete_tolerates_404() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{SELECTORS}/raw-only")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let response = resource.delete(&CallContext::new(), &raw_selector()).await;
    assert!(response.state.is_none());
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn test_import_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{SELECTORS}/raw-only")))
        .respond_with(ResponseTemplate::new(200).set_body_json(raw_selector()))
        .mount(&server)
        .await;

    let resource = provider(&server).content_selector_resource().unwrap();
    let response = resource.import(&CallContext::new(), "raw-only").await;
    let state = response.state.unwrap();
    assert_eq!(state["description"], "raw content");
    assert!(state["last_updated"].is_string());
}

#[tokio::test]
async fn test_data_sources() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SELECTORS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            raw_selector(),
            {"name": "npm", "description": "", "expression": "format == \"npm\""}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{SELECTORS}/raw-only")))
        .respond_with(ResponseTemplate::new(200).set_body_json(raw_selector()))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let ctx = CallContext::new();

    let list = provider.data_source("content_selectors").unwrap();
    let response = list.read(&ctx, &json!({})).await;
    let state = response.state.unwrap();
    let selectors = state["content_selectors"].as_array().unwrap();
    assert_eq!(selectors.len(), 2);
    assert_eq!(selectors[1]["name"], "npm");

    let one = provider.data_source("content_selector").unwrap();
    let response = one.read(&ctx, &json!({"name": "raw-only"})).await;
    assert_eq!(response.state, Some(raw_selector()));

    let response = one.read(&ctx, &json!({})).await;
    assert!(response.has_errors());
}

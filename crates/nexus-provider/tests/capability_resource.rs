//! Integration tests for the generic capability resource.
//!
//! Uses wiremock for the Nexus REST API. Covers create/read/update/delete/import,
//! validation before any request, 404 handling, webhook secret preservation,
//! `last_updated` monotonicity, the version gate and cancellation.

use std::time::Duration;

use chrono::Utc;
use nexus_provider::capability::{format_last_updated, parse_last_updated};
use nexus_provider::{CallContext, NexusProvider, ProviderConfig, Severity};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> NexusProvider {
    let mut provider = NexusProvider::new();
    provider
        .configure(
            ProviderConfig::default()
                .with_url(server.uri())
                .with_credentials("admin", "admin123")
                .with_server_version("3.84.0-01 (PRO)"),
        )
        .expect("provider configures");
    provider
}

async fn mount_nothing_else(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/service/rest/v1/capabilities"))
        .and(body_json(json!({
            "typeId": "baseurl",
            "enabled": true,
            "properties": {"url": "https://example.test/"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cap-1",
            "typeId": "baseurl",
            "enabled": true,
            "properties": {"url": "https://example.test/"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_base_url")
        .unwrap();
    let plan = json!({"enabled": true, "properties": {"url": "https://example.test/"}});
    let response = resource.create(&CallContext::new(), &plan).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.expect("state persisted");
    assert_eq!(state["id"], "cap-1");
    assert_eq!(state["properties"]["url"], "https://example.test/");
    assert_eq!(state["notes"], Value::Null);
    let stamp = state["last_updated"].as_str().expect("stamped");
    assert!(parse_last_updated(stamp).is_some(), "{stamp}");
}

#[tokio::test]
async fn test_invalid_url_fails_before_any_request() {
    let server = MockServer::start().await;
    mount_nothing_else(&server).await;

    let resource = provider(&server)
        .capability_resource("capability_base_url")
        .unwrap();
    let plan = json!({"enabled": true, "properties": {"url": "not-a-url"}});
    let response = resource.create(&CallContext::new(), &plan).await;

    assert!(response.state.is_none());
    assert!(response.has_errors());
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.summary, "Invalid attribute value: properties.url");
    assert!(diagnostic.detail.contains(r"^https?://\S+$"), "{}", diagnostic.detail);
}

#[tokio::test]
async fn test_validate_reports_without_network() {
    let server = MockServer::start().await;
    mount_nothing_else(&server).await;

    let resource = provider(&server)
        .capability_resource("capability_custom_s3_regions")
        .unwrap();
    let diagnostics = resource.validate(&json!({"enabled": true, "properties": {"regions": []}}));
    assert!(diagnostics.has_errors());
    let detail = &diagnostics.iter().next().unwrap().detail;
    assert!(detail.contains("at least 1 element"), "{detail}");

    let ok = resource.validate(&json!({"enabled": true, "properties": {"regions": ["eu-west-1"]}}));
    assert!(ok.is_empty());
}

#[tokio::test]
async fn test_empty_regions_rejected_on_create() {
    let server = MockServer::start().await;
    mount_nothing_else(&server).await;

    let resource = provider(&server)
        .capability_resource("capability_custom_s3_regions")
        .unwrap();
    let response = resource
        .create(
            &CallContext::new(),
            &json!({"enabled": true, "properties": {"regions": []}}),
        )
        .await;
    assert!(response.state.is_none());
    assert!(response.has_errors());
    assert!(response
        .diagnostics
        .iter()
        .any(|d| d.detail.contains("at least 1 element")));
}

#[tokio::test]
async fn test_read_missing_capability_removes_state_with_warning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_audit")
        .unwrap();
    let state = json!({"id": "cap-1", "enabled": true, "last_updated": null, "properties": {}});
    let response = resource.read(&CallContext::new(), &state).await;

    assert!(response.state.is_none());
    assert!(!response.has_errors());
    assert!(response.diagnostics.has_warnings());
}

#[tokio::test]
async fn test_read_server_error_keeps_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_audit")
        .unwrap();
    let state = json!({"id": "cap-1", "enabled": true, "properties": {}});
    let response = resource.read(&CallContext::new(), &state).await;

    assert_eq!(response.state.as_ref(), Some(&state));
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.severity, Severity::Error);
    assert!(diagnostic.detail.starts_with("500 Internal Server Error"), "{}", diagnostic.detail);
    assert!(diagnostic.detail.contains("boom"));
}

#[tokio::test]
async fn test_webhook_secret_survives_read() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cap-7",
            "typeId": "webhook.repository",
            "enabled": true,
            "properties": {
                "repository": "maven-releases",
                "names": "component,asset",
                "url": "https://hooks.example.test/nexus"
            }
        })))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_webhook_repository")
        .unwrap();
    let state = json!({
        "id": "cap-7",
        "enabled": true,
        "notes": null,
        "last_updated": "Monday, 01-Jan-24 00:00:00 UTC",
        "properties": {
            "repository": "maven-releases",
            "events": ["asset", "component"],
            "url": "https://hooks.example.test/nexus",
            "secret": "s3cr3t"
        }
    });
    let response = resource.read(&CallContext::new(), &state).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.state.unwrap();
    assert_eq!(new_state["properties"]["secret"], "s3cr3t");
    assert_eq!(new_state["properties"]["events"], json!(["asset", "component"]));
    // Reads never move the stamp.
    assert_eq!(new_state["last_updated"], state["last_updated"]);
}

#[tokio::test]
async fn test_webhook_placeholder_secret_is_ignored_on_import() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cap-8",
            "typeId": "webhook.global",
            "notes": "",
            "enabled": false,
            "properties": {
                "names": "audit",
                "url": "https://hooks.example.test/",
                "secret": "#~NXRM~PLACEHOLDER~PASSWORD~#"
            }
        })))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_webhook_global")
        .unwrap();
    let response = resource.import(&CallContext::new(), "cap-8").await;

    let state = response.state.expect("imported");
    assert_eq!(state["id"], "cap-8");
    assert_eq!(state["enabled"], false);
    assert_eq!(state["notes"], Value::Null);
    assert_eq!(state["properties"]["secret"], Value::Null);
    assert_eq!(state["properties"]["events"], json!(["audit"]));
    assert!(state["last_updated"].is_string());
}

#[tokio::test]
async fn test_import_type_mismatch_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cap-9", "typeId": "audit", "enabled": true, "properties": {}
        })))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_healthcheck")
        .unwrap();
    let response = resource.import(&CallContext::new(), "cap-9").await;
    assert!(response.state.is_none());
    assert!(response.has_errors());
}

#[tokio::test]
async fn test_update_carries_id_and_advances_stamp() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/service/rest/v1/capabilities/cap-3"))
        .and(body_json(json!({
            "id": "cap-3",
            "typeId": "rutauth",
            "notes": "sso",
            "enabled": true,
            "properties": {"httpHeader": "X-Remote-User"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_rut_auth")
        .unwrap();
    let future = Utc::now() + chrono::Duration::days(400);
    let prior_stamp = format_last_updated(future);
    let state = json!({
        "id": "cap-3",
        "enabled": true,
        "last_updated": prior_stamp,
        "properties": {"http_header": "X-User"}
    });
    let plan = json!({
        "notes": "sso",
        "enabled": true,
        "properties": {"http_header": "X-Remote-User"}
    });
    let response = resource.update(&CallContext::new(), &plan, &state).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.state.unwrap();
    assert_eq!(new_state["id"], "cap-3");
    assert_eq!(new_state["properties"]["http_header"], "X-Remote-User");
    let stamp = parse_last_updated(new_state["last_updated"].as_str().unwrap()).unwrap();
    assert!(stamp >= parse_last_updated(&prior_stamp).unwrap());
}

#[tokio::test]
async fn test_update_failure_keeps_prior_state() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/service/rest/v1/capabilities/cap-2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_default_role")
        .unwrap();
    let state = json!({"id": "cap-2", "enabled": true, "properties": {"role": "nx-anonymous"}});
    let plan = json!({"enabled": true, "properties": {"role": "nx-admin"}});
    let response = resource.update(&CallContext::new(), &plan, &state).await;

    assert_eq!(response.state, Some(state));
    assert!(response.has_errors());
}

#[tokio::test]
async fn test_delete_missing_capability_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/service/rest/v1/capabilities/cap-1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_audit")
        .unwrap();
    let state = json!({"id": "cap-1", "enabled": true, "properties": {}});
    let response = resource.delete(&CallContext::new(), &state).await;

    assert!(response.state.is_none());
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn test_settings_defaults_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/service/rest/v1/capabilities"))
        .and(body_json(json!({
            "typeId": "rapture.settings",
            "enabled": true,
            "properties": {
                "title": "Sonatype Nexus Repository",
                "debugAllowed": "true",
                "statusIntervalAuthenticated": "5",
                "statusIntervalAnonymous": "60",
                "sessionTimeout": "45",
                "requestTimeout": "60",
                "longRequestTimeout": "180"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cap-s", "typeId": "rapture.settings", "enabled": true, "properties": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_ui_settings")
        .unwrap();
    let plan = json!({"enabled": true, "properties": {"session_timeout": 45}});
    let response = resource.create(&CallContext::new(), &plan).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["properties"]["session_timeout"], 45);
    assert_eq!(state["properties"]["debug_allowed"], true);
}

#[tokio::test]
async fn test_old_server_rejected_before_capability_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/status/writable"))
        .respond_with(ResponseTemplate::new(200).insert_header("server", "Nexus/3.70.1-02 (OSS)"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/service/rest/v1/capabilities"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut provider = NexusProvider::new();
    provider
        .configure(
            ProviderConfig::default()
                .with_url(server.uri())
                .with_credentials("admin", "admin123"),
        )
        .unwrap();
    let resource = provider.capability_resource("capability_audit").unwrap();
    let response = resource
        .create(&CallContext::new(), &json!({"enabled": true}))
        .await;

    assert!(response.state.is_none());
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.summary, "Invalid attribute value: server_version");
    assert!(diagnostic.detail.contains("3.70.1-02"), "{}", diagnostic.detail);
}

#[tokio::test]
async fn test_cancelled_create_persists_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/service/rest/v1/capabilities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(10))
                .set_body_json(json!({
                    "id": "cap-1", "typeId": "audit", "enabled": true, "properties": {}
                })),
        )
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_audit")
        .unwrap();
    let ctx = CallContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let response = resource.create(&ctx, &json!({"enabled": true})).await;
    assert!(response.state.is_none());
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert!(diagnostic.summary.contains("cancelled"), "{}", diagnostic.summary);
}

#[tokio::test]
async fn test_unknown_property_is_programming_error() {
    let server = MockServer::start().await;
    mount_nothing_else(&server).await;

    let resource = provider(&server)
        .capability_resource("capability_default_role")
        .unwrap();
    let response = resource
        .create(
            &CallContext::new(),
            &json!({"enabled": true, "properties": {"role": "x", "colour": "blue"}}),
        )
        .await;
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert!(diagnostic.summary.starts_with("Unexpected provider error"), "{}", diagnostic.summary);
    assert!(diagnostic.detail.contains("properties.colour"));
}

#[tokio::test]
async fn test_read_partial_state_missing_capability_removes_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_base_url")
        .unwrap();
    let state = json!({"id": "cap-2", "enabled": true});
    let response = resource.read(&CallContext::new(), &state).await;

    assert!(response.state.is_none());
    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert!(response.diagnostics.has_warnings());
}

#[tokio::test]
async fn test_partial_state_reads_back_server_properties() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/capabilities/cap-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cap-4",
            "typeId": "webhook.repository",
            "enabled": true,
            "properties": {
                "repository": "npm-proxy",
                "names": "asset",
                "url": "https://hooks.example.test/"
            }
        })))
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_webhook_repository")
        .unwrap();
    let response = resource
        .read(&CallContext::new(), &json!({"id": "cap-4", "enabled": true}))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state["properties"]["repository"], "npm-proxy");
    assert_eq!(state["properties"]["events"], json!(["asset"]));
    assert_eq!(state["properties"]["secret"], Value::Null);
}

#[tokio::test]
async fn test_changing_webhook_repository_requires_replacement() {
    let server = MockServer::start().await;
    mount_nothing_else(&server).await;

    let resource = provider(&server)
        .capability_resource("capability_webhook_repository")
        .unwrap();
    let state = json!({
        "id": "cap-5",
        "enabled": true,
        "properties": {"repository": "a", "events": ["asset"], "url": "https://hooks.example.test/"}
    });
    let plan = json!({
        "enabled": true,
        "properties": {"repository": "b", "events": ["asset"], "url": "https://hooks.example.test/"}
    });
    let response = resource.update(&CallContext::new(), &plan, &state).await;

    assert_eq!(response.state, Some(state));
    assert!(response.has_errors());
    let diagnostic = response.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.summary, "Invalid attribute value: properties.repository");
    assert!(diagnostic.detail.contains("requires replacing"), "{}", diagnostic.detail);
}

#[tokio::test]
async fn test_changing_firewall_repository_requires_replacement() {
    let server = MockServer::start().await;
    mount_nothing_else(&server).await;

    let resource = provider(&server)
        .capability_resource("capability_firewall_audit_and_quarantine")
        .unwrap();
    let state = json!({
        "id": "cap-6",
        "enabled": true,
        "properties": {"repository": "npm-proxy", "quarantine": false}
    });
    let plan = json!({
        "enabled": true,
        "properties": {"repository": "maven-central", "quarantine": false}
    });
    let response = resource.update(&CallContext::new(), &plan, &state).await;

    assert_eq!(response.state, Some(state));
    assert!(response.has_errors());
}

#[tokio::test]
async fn test_webhook_update_keeps_planned_secret() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/service/rest/v1/capabilities/cap-7"))
        .and(body_json(json!({
            "id": "cap-7",
            "typeId": "webhook.repository",
            "enabled": true,
            "properties": {
                "repository": "maven-releases",
                "names": "asset,component",
                "url": "https://hooks.example.test/v2",
                "secret": "rotated"
            }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resource = provider(&server)
        .capability_resource("capability_webhook_repository")
        .unwrap();
    let state = json!({
        "id": "cap-7",
        "enabled": true,
        "last_updated": "Monday, 01-Jan-24 00:00:00 UTC",
        "properties": {
            "repository": "maven-releases",
            "events": ["asset", "component"],
            "url": "https://hooks.example.test/",
            "secret": "s3cr3t"
        }
    });
    let plan = json!({
        "enabled": true,
        "properties": {
            "repository": "maven-releases",
            "events": ["asset", "component"],
            "url": "https://hooks.example.test/v2",
            "secret": "rotated"
        }
    });
    let response = resource.update(&CallContext::new(), &plan, &state).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let new_state = response.state.unwrap();
    assert_eq!(new_state["properties"]["secret"], "rotated");
    assert_eq!(new_state["properties"]["url"], "https://hooks.example.test/v2");
}

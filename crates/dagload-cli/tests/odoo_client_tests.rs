//! JSON-RPC client tests against a mock Odoo server

use dagload_cli::odoo::OdooClient;
use dagload_cli::Config;
use dagload_common::LoadError;
use dagload_core::{MetadataProvider, RecordStore};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

fn rpc_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": { "name": "odoo.exceptions.UserError", "message": message }
        }
    }))
}

fn client(server: &MockServer) -> OdooClient {
    OdooClient::new(Config {
        url: server.uri(),
        ..Default::default()
    })
    .unwrap()
}

async fn mock_login(server: &MockServer, uid: Value) {
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(json!({
            "method": "call",
            "params": { "service": "common", "method": "login", "args": ["odoo", "admin", "admin"] }
        })))
        .respond_with(rpc_result(uid))
        .expect(1)
        .mount(server)
        .await;
}

fn execute_kw(model: &str, method_name: &str) -> Value {
    json!({
        "params": {
            "service": "object",
            "method": "execute_kw",
            "args": ["odoo", 2, "admin", model, method_name]
        }
    })
}

#[tokio::test]
async fn test_write_logs_in_once() {
    let server = MockServer::start().await;
    mock_login(&server, json!(2)).await;

    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(json!({
            "params": { "args": ["odoo", 2, "admin", "res.country", "load", [["id", "name"], [["fr", "France"]]]] }
        })))
        .respond_with(rpc_result(json!({ "ids": [75], "messages": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let fields = vec!["id".to_string(), "name".to_string()];
    let rows = vec![vec!["fr".to_string(), "France".to_string()]];

    for _ in 0..2 {
        let outcome = client.write("res.country", &fields, &rows).await.unwrap();
        assert_eq!(outcome.ids, [75]);
    }
}

#[tokio::test]
async fn test_rejected_load_has_no_ids() {
    let server = MockServer::start().await;
    mock_login(&server, json!(2)).await;

    Mock::given(method("POST"))
        .and(body_partial_json(execute_kw("res.partner", "load")))
        .respond_with(rpc_result(json!({
            "ids": false,
            "messages": [{
                "type": "error",
                "message": "No matching record found for external id 'be' in field 'Country'",
                "record": 0,
                "field": "country_id"
            }]
        })))
        .mount(&server)
        .await;

    let outcome = client(&server)
        .write("res.partner", &["id".into(), "country_id/id".into()], &[vec!["p1".into(), "be".into()]])
        .await
        .unwrap();
    assert!(outcome.ids.is_empty());
    assert_eq!(outcome.messages, ["No matching record found for external id 'be' in field 'Country'"]);
}

#[tokio::test]
async fn test_login_refused() {
    let server = MockServer::start().await;
    mock_login(&server, json!(false)).await;

    let err = client(&server)
        .write("res.country", &["id".into()], &[vec!["fr".into()]])
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Store(ref m) if m.contains("Authentication failed")));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    mock_login(&server, json!(2)).await;

    Mock::given(method("POST"))
        .and(body_partial_json(execute_kw("res.country", "load")))
        .respond_with(rpc_error("You are not allowed to create 'Country' records."))
        .mount(&server)
        .await;

    let err = client(&server)
        .write("res.country", &["id".into()], &[vec!["fr".into()]])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not allowed to create"));
}

#[tokio::test]
async fn test_resolve_model_metadata() {
    let server = MockServer::start().await;
    mock_login(&server, json!(2)).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "params": { "args": ["odoo", 2, "admin", "ir.model", "search_read", [[["model", "=", "product.category"]]]] }
        })))
        .respond_with(rpc_result(json!([{ "id": 40, "name": "Product Category" }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(execute_kw("product.category", "fields_get")))
        .respond_with(rpc_result(json!({
            "name": { "type": "char", "string": "Name" },
            "parent_id": { "type": "many2one", "relation": "product.category", "string": "Parent Category" },
            "child_id": { "type": "one2many", "relation": "product.category", "string": "Child Categories" },
            "removal_strategy_id": { "type": "many2one", "relation": "product.removal", "string": "Force Removal Strategy" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let meta = client.resolve("product.category").await.unwrap().unwrap();
    assert_eq!(meta.display_label.as_deref(), Some("Product Category"));
    assert_eq!(meta.parent_field.as_deref(), Some("parent_id"));
    assert_eq!(meta.relational_fields.len(), 3);
    assert_eq!(meta.referenced_model("removal_strategy_id"), Some("product.removal"));

    // Cached: the expectations above allow a single lookup
    assert!(client.is_known("product.category").await.unwrap());
}

#[tokio::test]
async fn test_parent_must_point_at_same_model() {
    let server = MockServer::start().await;
    mock_login(&server, json!(2)).await;

    Mock::given(method("POST"))
        .and(body_partial_json(execute_kw("ir.model", "search_read")))
        .respond_with(rpc_result(json!([{ "id": 12, "name": "Contact" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(execute_kw("res.partner", "fields_get")))
        .respond_with(rpc_result(json!({
            "parent_id": { "type": "many2one", "relation": "res.company", "string": "Related Company" }
        })))
        .mount(&server)
        .await;

    let meta = client(&server).resolve("res.partner").await.unwrap().unwrap();
    assert_eq!(meta.parent_field, None);
}

#[tokio::test]
async fn test_unknown_model() {
    let server = MockServer::start().await;
    mock_login(&server, json!(2)).await;

    Mock::given(method("POST"))
        .and(body_partial_json(execute_kw("ir.model", "search_read")))
        .respond_with(rpc_result(json!([])))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.resolve("res.nope").await.unwrap().is_none());
    assert!(!client.is_known("res.nope").await.unwrap());
}

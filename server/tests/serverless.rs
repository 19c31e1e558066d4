use recipe_core::{RecipeInput, RecipeStore};
use serde_json::{json, Value};
use server::serverless::{Adapter, Invocation, InvocationResult};
use server::AppContext;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn invocation(method: &str, path: &str, body: Option<Value>) -> Invocation {
    Invocation {
        method: method.to_string(),
        path: path.to_string(),
        query: None,
        headers: BTreeMap::new(),
        body: body.map(|b| b.to_string()),
    }
}

fn json_body(result: &InvocationResult) -> Value {
    serde_json::from_str(&result.body).unwrap()
}

#[tokio::test]
async fn first_invocation_connects_and_later_ones_reuse_the_store() {
    let dir = tempdir().unwrap();
    let adapter = Adapter::for_path(dir.path().join("recipes"));
    assert!(!adapter.context().store_handle().is_connected());

    let created = adapter
        .invoke(invocation("POST", "/api/recipes", Some(json!({"title": "Stew", "category": "main"}))))
        .await
        .unwrap();
    assert_eq!(created.status_code, 201);
    assert!(adapter.context().store_handle().is_connected());
    let id = json_body(&created)["id"].as_str().unwrap().to_string();

    let mut list = invocation("GET", "/api/recipes", None);
    list.query = Some("category=main".into());
    let listed = adapter.invoke(list).await.unwrap();
    assert_eq!(listed.status_code, 200);
    assert_eq!(json_body(&listed)[0]["id"], id.as_str());
    assert_eq!(listed.headers.get("content-type").map(String::as_str), Some("application/json"));
}

#[tokio::test]
async fn failed_connect_is_a_500_and_is_retried() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "occupied").unwrap();
    let adapter = Adapter::for_path(blocker.join("recipes"));

    let result = adapter.invoke(invocation("GET", "/api/recipes", None)).await.unwrap();
    assert_eq!(result.status_code, 500);
    assert_eq!(json_body(&result)["error"], "database connection failed");
    assert!(!adapter.context().store_handle().is_connected());

    std::fs::remove_file(&blocker).unwrap();
    let result = adapter.invoke(invocation("GET", "/api/recipes", None)).await.unwrap();
    assert_eq!(result.status_code, 200);
    assert_eq!(json_body(&result), json!([]));
}

#[tokio::test]
async fn malformed_lines_get_a_json_rejection() {
    let dir = tempdir().unwrap();
    let adapter = Adapter::for_path(dir.path().join("recipes"));
    let line = adapter.invoke_line("{\"method\": \"GET\"}").await;
    let result: InvocationResult = serde_json::from_str(&line).unwrap();
    assert_eq!(result.status_code, 400);
    assert_eq!(json_body(&result)["error"], "invalid invocation");
}

#[tokio::test]
async fn missing_recipe_through_adapter_is_404() {
    let dir = tempdir().unwrap();
    let adapter = Adapter::for_path(dir.path().join("recipes"));
    let line = adapter
        .invoke_line(r#"{"method":"DELETE","path":"/api/recipes/ffffffffffffffff"}"#)
        .await;
    let result: InvocationResult = serde_json::from_str(&line).unwrap();
    assert_eq!(result.status_code, 404);
}

#[tokio::test]
async fn invalid_header_in_event_is_rejected() {
    let dir = tempdir().unwrap();
    let adapter = Adapter::for_path(dir.path().join("recipes"));
    let line = adapter
        .invoke_line(r#"{"path":"/api/recipes","headers":{"bad header":"x"}}"#)
        .await;
    let result: InvocationResult = serde_json::from_str(&line).unwrap();
    assert_eq!(result.status_code, 400);
    assert_eq!(json_body(&result)["error"], "invalid invocation");
}

#[tokio::test]
async fn oversized_response_is_a_server_fault() {
    let store = RecipeStore::temporary().unwrap();
    store
        .insert(RecipeInput::titled("Cassoulet").with_instructions("Soak the beans overnight. ".repeat(20)))
        .unwrap();
    let adapter = Adapter::new(AppContext::with_store(store)).with_response_limit(64);

    let line = adapter.invoke_line(r#"{"path":"/api/recipes"}"#).await;
    let result: InvocationResult = serde_json::from_str(&line).unwrap();
    assert_eq!(result.status_code, 500);
    assert_eq!(json_body(&result)["error"], "invocation failed");

    let line = adapter.invoke_line(r#"{"path":"/api/recipes/ffffffffffffffff"}"#).await;
    let result: InvocationResult = serde_json::from_str(&line).unwrap();
    assert_eq!(result.status_code, 404);
}

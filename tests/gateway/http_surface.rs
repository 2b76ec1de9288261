use crate::gateway_harness::{GatewayTestServer, ScriptedModel};
use reqwest::{Method, StatusCode, header};
use serde_json::{Value, json};

#[tokio::test]
async fn health_is_ok_and_has_no_side_effects() {
    let model = ScriptedModel::replying(&[]);
    let server = GatewayTestServer::start(model.clone()).await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(model.calls(), 0);
    assert!(server.manager.history().is_empty());
}

#[tokio::test]
async fn missing_input_field_is_a_client_error() {
    let model = ScriptedModel::replying(&["unused reply"]);
    let server = GatewayTestServer::start(model.clone()).await;

    let response = reqwest::Client::new()
        .post(server.url("/predict"))
        .json(&json!({"message": "I want to die"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("input"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn non_json_body_is_a_client_error() {
    let model = ScriptedModel::replying(&[]);
    let server = GatewayTestServer::start(model.clone()).await;
    let client = reqwest::Client::new();

    let garbage = client
        .post(server.url("/predict"))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);

    let no_content_type = client
        .post(server.url("/predict"))
        .body(r#"{"input": "hi"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(no_content_type.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let model = ScriptedModel::replying(&[]);
    let server = GatewayTestServer::start(model.clone()).await;

    let huge = "x".repeat(psychpal::gateway::MAX_BODY_SIZE + 1);
    let response = reqwest::Client::new()
        .post(server.url("/predict"))
        .json(&json!({"input": huge}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn cors_preflight_allows_dev_origin_with_credentials() {
    let server = GatewayTestServer::start(ScriptedModel::replying(&[])).await;

    let response = reqwest::Client::new()
        .request(Method::OPTIONS, server.url("/predict"))
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .contains("POST")
    );
}

#[tokio::test]
async fn cors_ignores_unknown_origin() {
    let server = GatewayTestServer::start(ScriptedModel::replying(&[])).await;

    let response = reqwest::Client::new()
        .get(server.url("/health"))
        .header(header::ORIGIN, "http://evil.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let server = GatewayTestServer::start(ScriptedModel::replying(&[])).await;
    let response = reqwest::get(server.url("/v1/chat/completions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

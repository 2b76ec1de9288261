//! Full stack against a mock llama.cpp server: load_model → manager → HTTP.

use crate::gateway_harness::GatewayTestServer;
use psychpal::config::ModelConfig;
use psychpal::inference::load_model;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn predict_round_trips_through_llama_server_api() {
    let runtime = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&runtime)
        .await;
    Mock::given(method("POST"))
        .and(path("/completion"))
        .and(body_partial_json(json!({
            "n_predict": 250,
            "stop": ["\nUser:", "[Role]"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": " Response: Loneliness is hard. When do you feel it most?",
        })))
        .expect(1)
        .mount(&runtime)
        .await;

    let model = load_model(&ModelConfig {
        server_url: Some(runtime.uri()),
        ..ModelConfig::default()
    })
    .await
    .expect("attached runtime should load");
    let server = GatewayTestServer::start(Arc::new(model)).await;

    let response = reqwest::Client::new()
        .post(server.url("/predict"))
        .json(&json!({"input": "I feel lonely"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["response"],
        "Loneliness is hard. When do you feel it most?"
    );

    let requests = runtime.received_requests().await.unwrap();
    let completion = requests
        .iter()
        .find(|r| r.url.path() == "/completion")
        .expect("completion request should be sent");
    let sent: Value = serde_json::from_slice(&completion.body).unwrap();
    assert!(
        sent["prompt"]
            .as_str()
            .unwrap()
            .ends_with("User: I feel lonely\nPsychPal:")
    );
    runtime.verify().await;
}

#[tokio::test]
async fn runtime_error_surfaces_as_server_error() {
    let runtime = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&runtime)
        .await;
    Mock::given(method("POST"))
        .and(path("/completion"))
        .respond_with(ResponseTemplate::new(500).set_body_string("out of memory"))
        .mount(&runtime)
        .await;

    let model = load_model(&ModelConfig {
        server_url: Some(runtime.uri()),
        ..ModelConfig::default()
    })
    .await
    .unwrap();
    let server = GatewayTestServer::start(Arc::new(model)).await;

    let response = reqwest::Client::new()
        .post(server.url("/predict"))
        .json(&json!({"input": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.manager.history().is_empty());
}

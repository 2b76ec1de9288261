use crate::gateway_harness::{GatewayTestServer, ScriptedModel};
use psychpal::conversation::{FALLBACK_REPLY, MAX_LOG_TURNS};
use psychpal::error::InferenceError;
use psychpal::safety::CRISIS_RESPONSE;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

async fn predict(server: &GatewayTestServer, input: &str) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(server.url("/predict"))
        .json(&json!({"input": input}))
        .send()
        .await
        .expect("predict request should complete");
    let status = response.status();
    let body = response.json().await.expect("predict response should be json");
    (status, body)
}

#[tokio::test]
async fn conversation_accumulates_and_caps_history() {
    let model = ScriptedModel::replying(&[
        "PsychPal: That sounds stressful. What's been hardest?",
        "Response: Deadlines pile up fast. Could a short walk help?",
        "It makes sense to feel that way. Who do you talk to?",
        "PsychPal: Friends can help. What would you tell one of them?",
    ]);
    let server = GatewayTestServer::start(model.clone()).await;

    let inputs = ["work is a lot", "deadlines", "I feel tired", "maybe my sister"];
    let mut lengths = Vec::new();
    for input in inputs {
        let (status, body) = predict(&server, input).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().is_some());
        lengths.push(server.manager.history().len());
    }
    assert_eq!(lengths, [2, 4, 6, MAX_LOG_TURNS]);

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 4);
    let last = prompts.last().unwrap();
    assert!(last.contains(
        "[History]\nUser: I feel tired\nPsychPal: It makes sense to feel that way. Who do you talk to?\nUser: maybe my sister\n\nUser: maybe my sister\nPsychPal:"
    ));
}

#[tokio::test]
async fn crisis_message_short_circuits_and_resets() {
    let model = ScriptedModel::replying(&["I'm glad you told me. What happened?"]);
    let server = GatewayTestServer::start(model.clone()).await;

    let (status, _) = predict(&server, "I had a bad week").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(server.manager.history().len(), 2);

    let (status, body) = predict(&server, "  I keep having DEATH THOUGHTS ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": CRISIS_RESPONSE}));
    assert!(server.manager.history().is_empty());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn too_short_generation_returns_fallback() {
    let model = ScriptedModel::replying(&["PsychPal: ..."]);
    let server = GatewayTestServer::start(model).await;

    let (status, body) = predict(&server, "hmm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], FALLBACK_REPLY);
}

#[tokio::test]
async fn failed_generation_is_a_server_error() {
    let model = ScriptedModel::new(vec![Err(InferenceError::Api("503: loading".into()))]);
    let server = GatewayTestServer::start(model).await;

    let (status, body) = predict(&server, "hello").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "inference failed");
    assert_ne!(body.get("response"), Some(&json!(FALLBACK_REPLY)));
    assert!(server.manager.history().is_empty());
}

#[tokio::test]
async fn empty_input_is_not_rejected() {
    let model = ScriptedModel::replying(&["Take your time. What's on your mind?"]);
    let server = GatewayTestServer::start(model.clone()).await;

    let (status, body) = predict(&server, "   ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Take your time. What's on your mind?");
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn concurrent_requests_each_commit_one_exchange() {
    let model = ScriptedModel::replying(&[
        "First reply is here.",
        "Second reply is here.",
        "Third reply is here.",
    ]);
    let server = Arc::new(GatewayTestServer::start(model).await);

    let mut tasks = Vec::new();
    for input in ["a", "b", "c"] {
        let server = Arc::clone(&server);
        tasks.push(tokio::spawn(async move { predict(&server, input).await }));
    }
    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(server.manager.history().len(), 6);
}

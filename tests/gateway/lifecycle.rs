use crate::gateway_harness::{GatewayTestServer, ScriptedModel};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;

#[tokio::test]
async fn shutdown_route_responds_then_stops_server() {
    let mut server = GatewayTestServer::start(ScriptedModel::replying(&[])).await;

    let response = reqwest::get(server.url("/shutdown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "shutting down"}));

    let finished = tokio::time::timeout(Duration::from_secs(5), &mut server.handle)
        .await
        .expect("gateway should stop after /shutdown")
        .expect("gateway task should not panic");
    assert!(finished.is_ok());

    let after = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
        .get(server.url("/health"))
        .send()
        .await;
    assert!(after.is_err());
}

#[tokio::test]
async fn external_signal_stops_server() {
    let mut server = GatewayTestServer::start(ScriptedModel::replying(&[])).await;

    server.shutdown.trigger();
    let finished = tokio::time::timeout(Duration::from_secs(5), &mut server.handle)
        .await
        .expect("gateway should stop once signalled")
        .expect("gateway task should not panic");
    assert!(finished.is_ok());
}

//! Outbound JSON push tests against a real loopback server.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};

use httpkit::{push_json_to_remote, read_json, write_json, JsonConfig, JsonEnvelope, JsonError, PushError};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Ping {
    action: String,
}

async fn receive(request: Request) -> Result<Response, JsonError> {
    let payload: Ping = read_json(request.into_body(), &JsonConfig::default()).await?;

    write_json(
        StatusCode::OK,
        &JsonEnvelope {
            error: false,
            message: "received".to_string(),
            data: Some(serde_json::json!({ "action": payload.action })),
        },
        None,
    )
}

async fn spawn_remote() -> String {
    let router = Router::new().route("/receive", post(receive));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}/receive", addr)
}

#[tokio::test]
async fn pushes_payload_and_returns_remote_response() {
    let url = spawn_remote().await;

    let response = push_json_to_remote(
        &url,
        &Ping {
            action: "ping".to_string(),
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let envelope: JsonEnvelope = response.json().await.unwrap();
    assert!(!envelope.error);
    assert_eq!(envelope.data, Some(serde_json::json!({ "action": "ping" })));
}

#[tokio::test]
async fn reuses_a_caller_supplied_client() {
    let url = spawn_remote().await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = push_json_to_remote(
            &url,
            &Ping {
                action: "again".to_string(),
            },
            Some(&client),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }
}

#[tokio::test]
async fn connection_failures_are_network_errors() {
    // the discard port, nothing listens there
    let err = push_json_to_remote(
        "http://127.0.0.1:9/receive",
        &Ping {
            action: "ping".to_string(),
        },
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PushError::Network(_)));
}

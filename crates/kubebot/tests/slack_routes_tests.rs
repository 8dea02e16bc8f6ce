//! Integration tests for the Slack HTTP surface.
//!
//! These tests drive the axum router directly and verify that every accepted
//! request is acknowledged with `200` and produces exactly one reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use kubebot::server::{build_router, AppState};
use kubebot::slack::sign_request;
use kubebot::{
    ClusterQuery, CommandRouter, Config, ContextRegistry, KubeContext, KubebotError,
    NodeDescriptor, PodDescriptor, Reply, ReplySink, ReplyTarget, SlackError,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

const SECRET: &str = "test-signing-secret";

// =============================================================================
// Fakes
// =============================================================================

struct StaticRegistry;

#[async_trait]
impl ContextRegistry for StaticRegistry {
    async fn list_contexts(&self) -> kubebot::Result<Vec<KubeContext>> {
        Ok(vec![KubeContext {
            name: "mycontext".to_string(),
            cluster: "mycluster".to_string(),
            user: "admin".to_string(),
            namespace: None,
        }])
    }
}

struct StaticQuery;

#[async_trait]
impl ClusterQuery for StaticQuery {
    async fn list_nodes(&self, context: &str) -> kubebot::Result<Vec<NodeDescriptor>> {
        if context != "mycontext" {
            return Err(KubebotError::ContextNotFound(context.to_string()));
        }
        Ok((0..5)
            .map(|i| NodeDescriptor {
                name: format!("node-{i}"),
                internal_ip: None,
                age_days: Some(i),
                kubelet_version: None,
            })
            .collect())
    }

    async fn list_pods(&self, _namespace: &str, context: &str) -> kubebot::Result<Vec<PodDescriptor>> {
        Err(KubebotError::ApiUnavailable {
            context: context.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Forwards every reply to a channel the test reads from.
struct ChannelSink(mpsc::UnboundedSender<(ReplyTarget, Reply)>);

#[async_trait]
impl ReplySink for ChannelSink {
    async fn send(&self, target: &ReplyTarget, reply: &Reply) -> Result<(), SlackError> {
        let _ = self.0.send((target.clone(), reply.clone()));
        Ok(())
    }
}

fn test_config(signing_secret: Option<&str>) -> Config {
    Config {
        port: 0,
        bot_token: Some("xoxb-test".to_string()),
        signing_secret: signing_secret.map(String::from),
        slack_api_base_url: "http://127.0.0.1:1".to_string(),
        max_timestamp_age_secs: 300,
        kubeconfig_path: None,
        query_timeout: Duration::from_secs(1),
    }
}

fn app(signing_secret: Option<&str>) -> (axum::Router, mpsc::UnboundedReceiver<(ReplyTarget, Reply)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = CommandRouter::new(
        Arc::new(StaticRegistry),
        Arc::new(StaticQuery),
        Arc::new(ChannelSink(tx)),
    );
    let state = AppState {
        config: test_config(signing_secret),
        router: Arc::new(router),
    };
    (build_router(state), rx)
}

fn form(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn slash_body(command: &str, text: &str) -> String {
    form(&[
        ("command", command),
        ("text", text),
        ("user_id", "U123"),
        ("channel_id", "C456"),
        ("response_url", "https://hooks.slack.com/commands/1"),
    ])
}

fn signed_request(uri: &str, body: String, timestamp: i64) -> Request<Body> {
    let timestamp = timestamp.to_string();
    let signature = sign_request(body.as_bytes(), &timestamp, SECRET).unwrap();
    Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .header("x-slack-request-timestamp", timestamp)
        .header("x-slack-signature", signature)
        .body(Body::from(body))
        .unwrap()
}

fn unsigned_request(uri: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn next_reply(rx: &mut mpsc::UnboundedReceiver<(ReplyTarget, Reply)>) -> (ReplyTarget, Reply) {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("reply not sent in time")
        .expect("reply channel closed")
}

async fn assert_no_more_replies(rx: &mut mpsc::UnboundedReceiver<(ReplyTarget, Reply)>) {
    let extra = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(!matches!(extra, Ok(Some(_))), "more than one reply was sent");
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_signed_node_count() {
    let (app, mut rx) = app(Some(SECRET));
    let now = chrono::Utc::now().timestamp();

    let response = app
        .oneshot(signed_request(
            "/slack/commands",
            slash_body("/node", "count mycontext"),
            now,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (target, reply) = next_reply(&mut rx).await;
    assert_eq!(target.channel_id, "C456");
    assert!(reply.text.contains("Node Count: 5"));
    assert_no_more_replies(&mut rx).await;
}

#[tokio::test]
async fn test_bad_signature_is_rejected_without_reply() {
    let (app, mut rx) = app(Some(SECRET));
    let now = chrono::Utc::now().timestamp();

    let mut request = signed_request("/slack/commands", slash_body("/node", "count mycontext"), now);
    request
        .headers_mut()
        .insert("x-slack-signature", "v0=00ff".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_no_more_replies(&mut rx).await;
}

#[tokio::test]
async fn test_stale_timestamp_is_rejected() {
    let (app, _rx) = app(Some(SECRET));
    let stale = chrono::Utc::now().timestamp() - 3_600;

    let response = app
        .oneshot(signed_request(
            "/slack/commands",
            slash_body("/node", "count mycontext"),
            stale,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_extreme_timestamp_is_rejected() {
    for timestamp in [i64::MIN, i64::MAX] {
        let (app, mut rx) = app(Some(SECRET));
        let response = app
            .oneshot(signed_request(
                "/slack/commands",
                slash_body("/node", "count mycontext"),
                timestamp,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_no_more_replies(&mut rx).await;
    }
}

#[tokio::test]
async fn test_missing_signature_headers() {
    let (app, _rx) = app(Some(SECRET));
    let response = app
        .oneshot(unsigned_request("/slack/commands", slash_body("/kubebot", "")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_arity_mismatch_gets_usage_reply() {
    let (app, mut rx) = app(None);

    let response = app
        .oneshot(unsigned_request("/slack/commands", slash_body("/node", "badarg")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, reply) = next_reply(&mut rx).await;
    assert!(reply.text.contains("`/node count contextname`"));
    assert_no_more_replies(&mut rx).await;
}

#[tokio::test]
async fn test_query_failure_gets_error_reply() {
    let (app, mut rx) = app(None);

    let response = app
        .oneshot(unsigned_request("/slack/commands", slash_body("/podlist", "ns1 mycontext")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, reply) = next_reply(&mut rx).await;
    assert_eq!(reply.text, "Sorry, <@U123>! could not reach context `mycontext`.");
    assert!(!reply.text.contains("connection refused"));
}

#[tokio::test]
async fn test_malformed_form_is_bad_request() {
    let (app, _rx) = app(None);
    let response = app
        .oneshot(unsigned_request("/slack/commands", form(&[("text", "count x")])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_menu_then_context_list_action() {
    let (app, mut rx) = app(None);

    let response = app
        .clone()
        .oneshot(unsigned_request("/slack/commands", slash_body("/kubebot", "")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, menu_reply) = next_reply(&mut rx).await;
    let menu = menu_reply.menu.expect("menu attached");
    let clusters = menu
        .options
        .iter()
        .find(|o| o.label == "Clusters")
        .expect("clusters option");

    let payload = serde_json::json!({
        "type": "interactive_message",
        "callback_id": menu.callback_id,
        "actions": [{ "name": "option", "type": "button", "value": clusters.value }],
        "user": { "id": "U123" },
        "channel": { "id": "C456" }
    });
    let response = app
        .oneshot(unsigned_request(
            "/slack/actions",
            form(&[("payload", &payload.to_string())]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, reply) = next_reply(&mut rx).await;
    assert_eq!(reply.text, "Sure, <@U123>! Listing context \n`mycontext`\n");
    assert_no_more_replies(&mut rx).await;
}

#[tokio::test]
async fn test_health_and_ready() {
    let (app, _rx) = app(None);

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "ready");
}

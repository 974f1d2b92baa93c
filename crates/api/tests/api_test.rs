use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use hax_api::{create_app, AppState};
use hax_core::{Fid, MessageId};
use hax_dispatcher::{command_queue, CommandConsumer, Dispatcher, DispatcherHandle};
use hax_testing_utils::{
    sns_status, MockCoordinationClient, MockEventPublisher, MockRuntime, RuntimeCall,
};

const FID: &str = "0x6f00000000000001:0x1";

struct TestServer {
    app: Router,
    runtime: Arc<MockRuntime>,
    publisher: Arc<MockEventPublisher>,
    handle: DispatcherHandle,
}

fn dispatcher_for(
    consumer: CommandConsumer,
    runtime: Arc<MockRuntime>,
    publisher: Arc<MockEventPublisher>,
) -> Dispatcher {
    Dispatcher::new(
        consumer,
        runtime,
        Arc::new(MockCoordinationClient::new()),
        publisher,
    )
    .with_poll_interval(Duration::from_millis(10))
}

fn start_server() -> TestServer {
    let (producer, consumer) = command_queue();
    let runtime = Arc::new(MockRuntime::new());
    let publisher = Arc::new(MockEventPublisher::new());

    let dispatcher = dispatcher_for(consumer, runtime.clone(), publisher.clone());
    let state = AppState {
        producer,
        stats: dispatcher.stats(),
        dispatcher: dispatcher.stop_handle(),
        reply_timeout: Duration::from_secs(5),
    };
    let handle = dispatcher.spawn().unwrap();

    TestServer {
        app: create_app(state),
        runtime,
        publisher,
        handle,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn shutdown(handle: DispatcherHandle) {
    tokio::task::spawn_blocking(move || handle.stop_and_join())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_health_reports_dispatcher_state() {
    let server = start_server();

    let (status, body) = send(&server.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dispatcher"], "running");

    shutdown(server.handle).await;
}

#[tokio::test]
async fn test_sns_control_is_accepted_and_dispatched() {
    let server = start_server();

    let (status, body) = send(
        &server.app,
        post_json("/api/v1/sns/repair/pause", json!({ "fid": FID })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["operation"], "repair");
    assert_eq!(body["data"]["action"], "pause");

    shutdown(server.handle).await;

    let fid: Fid = FID.parse().unwrap();
    assert_eq!(server.runtime.calls(), vec![RuntimeCall::PauseRepair(fid)]);
}

#[tokio::test]
async fn test_sns_status_waits_for_reply() {
    let server = start_server();
    let fid: Fid = FID.parse().unwrap();
    server.runtime.set_status(vec![sns_status(fid, 60)]);

    let (status, body) = send(
        &server.app,
        get(&format!("/api/v1/sns/rebalance/status?fid={FID}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["fid"], FID);
    assert_eq!(body["data"][0]["progress"], 60);

    shutdown(server.handle).await;
    assert_eq!(
        server.runtime.calls(),
        vec![RuntimeCall::GetRebalanceStatus(fid)]
    );
}

#[tokio::test]
async fn test_broadcast_returns_message_ids() {
    let server = start_server();
    server.runtime.set_broadcast_ids(vec![
        MessageId { halink_ctx: 1, tag: 10 },
        MessageId { halink_ctx: 1, tag: 11 },
    ]);

    let (status, body) = send(
        &server.app,
        post_json(
            "/api/v1/ha/states",
            json!([
                { "fid": "0x72:0x1", "status": "online" },
                { "fid": "0x72:0x2", "status": "failed" }
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][1]["tag"], 11);

    shutdown(server.handle).await;
}

#[tokio::test]
async fn test_stob_ioq_error_is_published() {
    let server = start_server();

    let report = json!({
        "fid": "0x7200000000000001:0x2",
        "conf_sdev": "0x6400000000000001:0x4",
        "stob_id": "0x200000000000000:0x10004",
        "fd": 17,
        "opcode": 2,
        "rc": -5,
        "offset": 4096,
        "size": 8192,
        "bshift": 12
    });
    let (status, _) = send(&server.app, post_json("/api/v1/stob-ioq", report)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    shutdown(server.handle).await;

    let published = server.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "stob-ioq");
}

#[tokio::test]
async fn test_unknown_operation_is_bad_request() {
    let server = start_server();

    let (status, body) = send(
        &server.app,
        post_json("/api/v1/sns/rebuild/start", json!({ "fid": FID })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "BAD_REQUEST");

    shutdown(server.handle).await;
    assert!(server.runtime.calls().is_empty());
}

#[tokio::test]
async fn test_stopped_dispatcher_returns_service_unavailable() {
    let server = start_server();
    let app = server.app.clone();
    shutdown(server.handle).await;

    let (status, body) = send(
        &app,
        post_json("/api/v1/sns/repair/start", json!({ "fid": FID })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "DISPATCHER_STOPPED");

    let (_, stats) = send(&app, get("/api/v1/dispatcher/stats")).await;
    assert_eq!(stats["data"]["state"], "stopped");
}

#[tokio::test]
async fn test_reply_timeout_when_consumer_is_not_running() {
    let (producer, consumer) = command_queue();
    let dispatcher = dispatcher_for(
        consumer,
        Arc::new(MockRuntime::new()),
        Arc::new(MockEventPublisher::new()),
    );
    let app = create_app(AppState {
        producer,
        stats: dispatcher.stats(),
        dispatcher: dispatcher.stop_handle(),
        reply_timeout: Duration::from_millis(50),
    });

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/sns/repair/status?fid={FID}")),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["type"], "REPLY_TIMEOUT");

    drop(dispatcher);
}

#[tokio::test]
async fn test_dispatcher_stats_count_handled_commands() {
    let server = start_server();

    for action in ["start", "stop"] {
        let (status, _) = send(
            &server.app,
            post_json(
                &format!("/api/v1/sns/rebalance/{action}"),
                json!({ "fid": FID }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let stats = server.handle.stats();
    let waited = tokio::task::spawn_blocking(move || {
        hax_testing_utils::wait_for(|| stats.snapshot().handled == 2, Duration::from_secs(5))
    })
    .await
    .unwrap();
    assert!(waited);

    let (status, body) = send(&server.app, get("/api/v1/dispatcher/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["handled"], 2);
    assert_eq!(body["data"]["state"], "running");
    assert_eq!(body["data"]["pending"], 0);

    shutdown(server.handle).await;
}

#[tokio::test]
async fn test_generic_command_route_forwards_known_and_unknown_kinds() {
    let server = start_server();
    let stats = server.handle.stats();

    let (status, body) = send(
        &server.app,
        post_json("/api/v1/commands/sns_repair_resume", json!({ "fid": FID })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["kind"], "sns_repair_resume");

    let (status, _) = send(
        &server.app,
        post_json("/api/v1/commands/drive_reset", json!({ "sdev": "0x6400000000000001:0x4" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    shutdown(server.handle).await;

    let fid: Fid = FID.parse().unwrap();
    assert_eq!(server.runtime.calls(), vec![RuntimeCall::ResumeRepair(fid)]);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.unsupported, 1);
    assert_eq!(snapshot.handled, 1);
}

#[tokio::test]
async fn test_generic_command_route_rejects_status_kinds_and_bad_payloads() {
    let server = start_server();

    let (status, body) = send(
        &server.app,
        post_json("/api/v1/commands/sns_rebalance_status", json!({ "fid": FID })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "BAD_REQUEST");

    let (status, _) = send(
        &server.app,
        post_json("/api/v1/commands/process_event", json!({ "fid": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    shutdown(server.handle).await;
    assert!(server.runtime.calls().is_empty());
}

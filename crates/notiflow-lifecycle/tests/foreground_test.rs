//! Integration tests for the foreground path: server events over the
//! real-time channel to displayed notifications and presses.

mod helpers;

use serde_json::json;

use helpers::{TestApp, wait_until};
use notiflow_core::types::NavigationTarget;
use notiflow_realtime::ConnectionState;
use notiflow_realtime::message::Frame;

#[tokio::test]
async fn test_connect_joins_user_rooms() {
    let app = TestApp::new();
    let _peer = app.connect().await;

    let rooms: Vec<_> = app.dispatcher.connections.joined_rooms().into_iter().collect();
    assert_eq!(rooms, vec!["notification_u1", "order_u1", "u1"]);

    app.dispatcher.shutdown().await;
    assert_eq!(app.dispatcher.connections.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_status_change_is_displayed() {
    let app = TestApp::new();
    let peer = app.connect().await;

    peer.push(Frame::new(
        "order_status_changed",
        json!({"status": "delivered", "orderId": "ORD-1"}),
    ));
    wait_until(|| app.platform.shown().len() == 1).await;

    let shown = &app.platform.shown()[0];
    assert!(shown.title.contains("đã giao hàng"));
    assert!(shown.body.contains("ORD-1"));
    assert_eq!(shown.data.get("orderId").map(String::as_str), Some("ORD-1"));
    assert_eq!(shown.data.get("userId").map(String::as_str), Some("u1"));
    assert_eq!(
        shown.data.get("targetScreen").map(String::as_str),
        Some("OrderTracking")
    );

    app.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_unknown_events_are_dropped() {
    let app = TestApp::new();
    let peer = app.connect().await;

    peer.push(Frame::new("typing", json!({"id": "x"})));
    peer.push(Frame::new("notification", json!({"id": "n-1", "title": "Hello"})));
    wait_until(|| !app.platform.shown().is_empty()).await;

    let shown = app.platform.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].id, "n-1");

    app.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_events_keep_arrival_order() {
    let app = TestApp::new();
    let peer = app.connect().await;

    for i in 0..5 {
        peer.push(Frame::new("new_notification", json!({"id": format!("n-{i}")})));
    }
    wait_until(|| app.platform.shown().len() == 5).await;

    let ids: Vec<_> = app.platform.shown().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["n-0", "n-1", "n-2", "n-3", "n-4"]);

    app.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_press_routes_to_order_tracking() {
    let app = TestApp::new();
    let peer = app.connect().await;
    app.dispatcher.mark_navigation_ready();

    peer.push(Frame::new(
        "notification",
        json!({"id": "n-1", "title": "Đơn hàng", "data": {"orderId": "ORD-7"}}),
    ));
    wait_until(|| app.platform.shown().len() == 1).await;

    assert!(app.press(0));
    wait_until(|| app.navigator.seen().len() == 1).await;
    assert_eq!(
        app.navigator.seen()[0],
        NavigationTarget::OrderTracking {
            order_id: "ORD-7".into()
        }
    );

    app.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_rooms_rejoined_after_reconnect() {
    let app = TestApp::new();
    let peer = app.connect().await;
    drop(peer);

    let mut second = tokio::time::timeout(std::time::Duration::from_secs(2), app.server.accept())
        .await
        .expect("reconnect in time")
        .expect("server open");
    let mut joined = Vec::new();
    for _ in 0..3 {
        let frame = second.next_emitted().await.expect("join frame");
        joined.push(frame.data.as_str().unwrap_or_default().to_string());
    }
    joined.sort();
    assert_eq!(joined, vec!["notification_u1", "order_u1", "u1"]);

    app.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_without_user_no_rooms_are_joined() {
    let app = TestApp::with_user(None);
    assert!(app.dispatcher.connect());
    let _peer = app.server.accept().await.expect("peer");
    wait_until(|| app.dispatcher.connections.state().is_connected()).await;
    assert!(app.dispatcher.connections.joined_rooms().is_empty());

    app.dispatcher.shutdown().await;
}

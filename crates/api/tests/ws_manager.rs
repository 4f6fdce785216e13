//! Unit tests for `WsManager`.
//!
//! These exercise the connection manager directly, without any HTTP
//! upgrade: add/remove bookkeeping, per-user delivery, and shutdown.

use adpilot_api::ws::WsManager;
use axum::extract::ws::Message;

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_connections() {
    let manager = WsManager::new();

    let _rx1 = manager.add("conn-1".to_string(), 1).await;
    let _rx2 = manager.add("conn-2".to_string(), 2).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
    assert_eq!(manager.user_count().await, 1);
}

// ---------------------------------------------------------------------------
// Per-user delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_user_reaches_every_tab_of_that_user_only() {
    let manager = WsManager::new();

    let mut tab_a = manager.add("conn-a".to_string(), 7).await;
    let mut tab_b = manager.add("conn-b".to_string(), 7).await;
    let mut other = manager.add("conn-c".to_string(), 8).await;

    let sent = manager
        .send_to_user(7, Message::Text("campaign updated".into()))
        .await;
    assert_eq!(sent, 2);

    for rx in [&mut tab_a, &mut tab_b] {
        let msg = rx.recv().await.expect("message for user 7");
        assert!(matches!(&msg, Message::Text(t) if *t == "campaign updated"));
    }
    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn send_to_user_skips_closed_channels() {
    let manager = WsManager::new();

    let closed = manager.add("conn-1".to_string(), 7).await;
    let mut open = manager.add("conn-2".to_string(), 7).await;
    drop(closed);

    let sent = manager.send_to_user(7, Message::Text("still here".into())).await;
    assert_eq!(sent, 1);
    let msg = open.recv().await.expect("open channel receives");
    assert!(matches!(&msg, Message::Text(t) if *t == "still here"));
}

#[tokio::test]
async fn send_to_unknown_user_is_noop() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1).await;
    assert_eq!(manager.send_to_user(99, Message::Text("x".into())).await, 0);
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), 1).await;
    let mut rx2 = manager.add("conn-2".to_string(), 2).await;

    manager.shutdown_all().await;
    assert_eq!(manager.connection_count().await, 0);

    for rx in [&mut rx1, &mut rx2] {
        let msg = rx.recv().await.expect("Close frame");
        assert!(matches!(msg, Message::Close(None)), "Expected Close(None), got: {msg:?}");
        assert!(rx.recv().await.is_none(), "Channel should be closed after shutdown");
    }
}

#[tokio::test]
async fn ping_all_pings_live_and_prunes_dead() {
    let manager = WsManager::new();
    let mut live = manager.add("conn-1".to_string(), 1).await;
    let dead = manager.add("conn-2".to_string(), 2).await;
    drop(dead);

    assert_eq!(manager.ping_all().await, 1);
    assert_eq!(manager.connection_count().await, 1);
    assert_eq!(manager.user_count().await, 1);

    let msg = live.recv().await.expect("Ping frame");
    assert!(matches!(msg, Message::Ping(_)));
}

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let mut old = manager.add("conn-1".to_string(), 1).await;
    let mut new = manager.add("conn-1".to_string(), 2).await;
    assert_eq!(manager.connection_count().await, 1);
    assert!(old.recv().await.is_none(), "replaced channel is closed");

    assert_eq!(manager.send_to_user(1, Message::Text("x".into())).await, 0);
    assert_eq!(manager.send_to_user(2, Message::Text("y".into())).await, 1);
    let msg = new.recv().await.expect("message for user 2");
    assert!(matches!(&msg, Message::Text(t) if *t == "y"));
}

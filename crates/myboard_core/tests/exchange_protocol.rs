use myboard_core::config::BUDGET_FALLBACK_KEY;
use myboard_core::db::open_db_in_memory;
use myboard_core::{
    BudgetBridge, ChannelPort, InboundDisposition, KvRepository, PushRoute, SqliteKvRepository,
    StateSource, ThemeMode,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

fn attached(repo: SqliteKvRepository<'_>) -> (BudgetBridge<SqliteKvRepository<'_>>, tokio::sync::mpsc::UnboundedReceiver<Value>) {
    let mut bridge = BudgetBridge::new(repo);
    let (port, rx) = ChannelPort::new();
    bridge.attach(Box::new(port));
    (bridge, rx)
}

#[tokio::test(start_paused = true)]
async fn response_before_timeout_wins() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);
    repo.put_value(BUDGET_FALLBACK_KEY, r#"{"stale":true}"#).unwrap();
    let (bridge, mut rx) = attached(repo);

    let sub_context = async {
        let request = rx.recv().await.unwrap();
        assert_eq!(request["type"], json!("requestBudget"));
        sleep(Duration::from_millis(100)).await;
        bridge.dispatch_inbound(&json!({
            "type": "budgetDataResponse",
            "payload": { "income": 1200 },
            "requestId": request["requestId"].clone(),
        }))
    };

    let (state, disposition) = tokio::join!(bridge.request_remote_state(), sub_context);

    assert!(matches!(disposition, InboundDisposition::Resolved(_)));
    assert_eq!(state.source, StateSource::Channel);
    assert_eq!(state.payload, Some(json!({ "income": 1200 })));
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn silence_falls_back_and_late_response_is_discarded() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);
    repo.put_value(BUDGET_FALLBACK_KEY, r#"{"income":900}"#).unwrap();
    let (bridge, mut rx) = attached(repo);

    let started = tokio::time::Instant::now();
    let state = bridge.request_remote_state().await;

    assert!(started.elapsed() >= Duration::from_millis(800));
    assert_eq!(state.source, StateSource::FallbackKey);
    assert_eq!(state.payload, Some(json!({ "income": 900 })));
    assert_eq!(bridge.pending_requests(), 0);

    let request = rx.recv().await.unwrap();
    let late = bridge.dispatch_inbound(&json!({
        "type": "budgetDataResponse",
        "payload": { "income": 1 },
        "requestId": request["requestId"].clone(),
    }));
    assert_eq!(late, InboundDisposition::Unclaimed);
    assert_eq!(state.payload, Some(json!({ "income": 900 })));
}

#[tokio::test(start_paused = true)]
async fn late_response_cannot_settle_a_newer_request() {
    let conn = open_db_in_memory().unwrap();
    let (bridge, mut rx) = attached(SqliteKvRepository::new(&conn));

    let first = bridge.request_remote_state().await;
    assert_eq!(first.source, StateSource::FallbackKey);
    let stale_request = rx.recv().await.unwrap();

    let sub_context = async {
        let fresh_request = rx.recv().await.unwrap();
        let stale = bridge.dispatch_inbound(&json!({
            "type": "budgetDataResponse",
            "payload": "old",
            "requestId": stale_request["requestId"].clone(),
        }));
        let fresh = bridge.dispatch_inbound(&json!({
            "type": "budgetDataResponse",
            "payload": "new",
            "requestId": fresh_request["requestId"].clone(),
        }));
        (stale, fresh)
    };

    let (second, (stale, fresh)) = tokio::join!(bridge.request_remote_state(), sub_context);

    assert_eq!(stale, InboundDisposition::Unclaimed);
    assert!(matches!(fresh, InboundDisposition::Resolved(_)));
    assert_eq!(second.payload, Some(json!("new")));
}

#[tokio::test(start_paused = true)]
async fn duplicate_response_is_unclaimed() {
    let conn = open_db_in_memory().unwrap();
    let (bridge, mut rx) = attached(SqliteKvRepository::new(&conn));

    let sub_context = async {
        rx.recv().await.unwrap();
        let response = json!({ "type": "budgetDataResponse", "payload": [1, 2] });
        (bridge.dispatch_inbound(&response), bridge.dispatch_inbound(&response))
    };

    let (state, (first, second)) = tokio::join!(bridge.request_remote_state(), sub_context);

    assert!(matches!(first, InboundDisposition::Resolved(_)));
    assert_eq!(second, InboundDisposition::Unclaimed);
    assert_eq!(state.payload, Some(json!([1, 2])));
}

#[tokio::test(start_paused = true)]
async fn detached_bridge_reads_fallback_without_waiting() {
    let conn = open_db_in_memory().unwrap();
    let bridge = BudgetBridge::new(SqliteKvRepository::new(&conn));

    let started = tokio::time::Instant::now();
    let state = bridge.request_remote_state().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(state.source, StateSource::FallbackKey);
    assert_eq!(state.payload, None);
}

#[tokio::test(start_paused = true)]
async fn malformed_fallback_value_reads_as_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);
    repo.put_value(BUDGET_FALLBACK_KEY, "{ broken").unwrap();
    let bridge = BudgetBridge::new(repo);

    assert_eq!(bridge.request_remote_state().await.payload, None);
}

#[test]
fn push_without_sub_context_writes_fallback_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);
    let bridge = BudgetBridge::new(repo);

    let route = bridge.push_remote_state(&json!({ "income": 5 })).unwrap();

    assert_eq!(route, PushRoute::FallbackKey);
    let stored: Value =
        serde_json::from_str(&repo.get_value(BUDGET_FALLBACK_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, json!({ "income": 5 }));
}

#[test]
fn push_with_sub_context_posts_import_message_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);
    let (bridge, mut rx) = attached(repo);

    let route = bridge.push_remote_state(&json!({ "income": 5 })).unwrap();

    assert_eq!(route, PushRoute::Channel);
    assert_eq!(
        rx.try_recv().unwrap(),
        json!({ "type": "importBudget", "payload": { "income": 5 } })
    );
    assert_eq!(repo.get_value(BUDGET_FALLBACK_KEY).unwrap(), None);
    assert_eq!(
        bridge.dispatch_inbound(&json!({ "type": "importBudgetAck" })),
        InboundDisposition::Acknowledged
    );
}

#[test]
fn push_falls_back_when_sub_context_went_away() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);
    let (bridge, rx) = attached(repo);
    drop(rx);

    assert!(!bridge.is_attached());
    assert_eq!(
        bridge.push_remote_state(&json!(null)).unwrap(),
        PushRoute::FallbackKey
    );
}

#[test]
fn theme_change_is_fire_and_forget() {
    let conn = open_db_in_memory().unwrap();
    let (bridge, mut rx) = attached(SqliteKvRepository::new(&conn));

    assert!(bridge.notify_theme_change(ThemeMode::Light));
    assert_eq!(
        rx.try_recv().unwrap(),
        json!({ "type": "setTheme", "payload": "light" })
    );

    let detached = BudgetBridge::new(SqliteKvRepository::new(&conn));
    assert!(!detached.notify_theme_change(ThemeMode::Dark));
}

#[test]
fn unrelated_messages_are_ignored() {
    let conn = open_db_in_memory().unwrap();
    let bridge = BudgetBridge::new(SqliteKvRepository::new(&conn));

    assert_eq!(bridge.dispatch_inbound(&json!(null)), InboundDisposition::Ignored);
    assert_eq!(
        bridge.dispatch_inbound(&json!({ "type": "resize", "payload": 3 })),
        InboundDisposition::Ignored
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_request_does_not_swallow_next_response() {
    let conn = open_db_in_memory().unwrap();
    let (bridge, mut rx) = attached(SqliteKvRepository::new(&conn));

    let cancelled =
        tokio::time::timeout(Duration::from_millis(10), bridge.request_remote_state()).await;
    assert!(cancelled.is_err());
    assert_eq!(bridge.pending_requests(), 0);
    rx.recv().await.unwrap();

    let sub_context = async {
        rx.recv().await.unwrap();
        bridge.dispatch_inbound(&json!({ "type": "budgetDataResponse", "payload": "live" }))
    };
    let (state, disposition) = tokio::join!(bridge.request_remote_state(), sub_context);

    assert!(matches!(disposition, InboundDisposition::Resolved(_)));
    assert_eq!(state.source, StateSource::Channel);
    assert_eq!(state.payload, Some(json!("live")));
}

//! Hot sharing: one router for all subscribers, stopped after a grace period.

use std::sync::Arc;
use std::time::Duration;

use contact_book::storage::traits::ContactStore;
use contact_book::{ContactError, ContactEvent, ContactSession, SessionConfig, SortType};
use tokio::time::sleep;

use super::support::{contact, expect_snapshot, ids, seed, session_over, settle, RecordingStore};

#[tokio::test(start_paused = true)]
async fn subscribers_share_one_router() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());

    let mut a = session.subscribe().unwrap();
    let mut b = session.subscribe().unwrap();
    let mut c = session.subscribe().unwrap();
    expect_snapshot(&mut a, |s| s.contacts.len() == 3).await;

    assert_eq!(session.router_starts(), 1);
    assert_eq!(store.live_subscriptions(), 1);

    store.upsert(&contact("c4", "Dan", "Dow", "555-0400")).await.unwrap();

    let from_b = expect_snapshot(&mut b, |s| s.contacts.len() == 4).await;
    let from_c = expect_snapshot(&mut c, |s| s.contacts.len() == 4).await;
    assert!(Arc::ptr_eq(&from_b, &from_c), "same snapshot for everyone");
}

#[tokio::test(start_paused = true)]
async fn late_subscriber_sees_only_the_latest_snapshot() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut first = session.subscribe().unwrap();
    expect_snapshot(&mut first, |s| s.contacts.len() == 3).await;

    session
        .on_event(ContactEvent::ChangeSort(SortType::LastName))
        .await
        .unwrap();
    session.on_event(ContactEvent::ShowEntryForm).await.unwrap();
    settle().await;

    let mut late = session.subscribe().unwrap();
    let snapshot = late.current();
    assert_eq!(snapshot.sort, SortType::LastName);
    assert_eq!(ids(&snapshot), ["c1", "c3", "c2"]);
    assert!(snapshot.is_adding_contact());
    assert_eq!(session.router_starts(), 1);
}

#[tokio::test(start_paused = true)]
async fn router_survives_gap_shorter_than_grace_period() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    drop(stream);
    sleep(Duration::from_secs(4)).await;
    assert!(session.is_live());
    assert_eq!(store.live_subscriptions(), 1);

    let mut again = session.subscribe().unwrap();
    assert_eq!(session.router_starts(), 1);

    // Past the first deadline the router is still there.
    sleep(Duration::from_secs(2)).await;
    assert!(session.is_live());
    assert_eq!(store.live_subscriptions(), 1);
    assert_eq!(again.current().contacts.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn reconnect_during_grace_period_restarts_the_countdown() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    drop(stream);
    sleep(Duration::from_secs(1)).await;
    let again = session.subscribe().unwrap();
    sleep(Duration::from_secs(3)).await;
    drop(again);

    // The countdown from the first drop would have ended here.
    sleep(Duration::from_millis(1500)).await;
    assert!(session.is_live());
    assert_eq!(store.live_subscriptions(), 1);

    sleep(Duration::from_secs(4)).await;
    assert!(!session.is_live());
    assert_eq!(store.live_subscriptions(), 0);
    assert_eq!(session.router_starts(), 1);
}

#[test]
fn subscribe_outside_a_runtime_is_an_error() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());

    let err = session.subscribe().err().expect("no runtime to start on");

    assert!(matches!(err, ContactError::Runtime(_)));
    assert!(!session.is_live());
    assert_eq!(session.router_starts(), 0);
    assert_eq!(store.live_subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn router_stops_after_grace_period_and_restarts_on_demand() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    drop(stream);
    sleep(Duration::from_secs(6)).await;
    assert!(!session.is_live());
    assert_eq!(store.live_subscriptions(), 0);

    // Written while nobody was observing.
    store.upsert(&contact("c4", "Dan", "Dow", "555-0400")).await.unwrap();
    assert_eq!(session.snapshot().contacts.len(), 3, "no router, no refresh");

    let mut stream = session.subscribe().unwrap();
    assert_eq!(session.router_starts(), 2);
    let snapshot = expect_snapshot(&mut stream, |s| s.contacts.len() == 4).await;
    assert_eq!(ids(&snapshot), ["c2", "c3", "c1", "c4"]);
    assert_eq!(store.live_subscriptions(), 1);
}

#[tokio::test(start_paused = true)]
async fn grace_period_comes_from_config() {
    let store = RecordingStore::new(seed());
    let config = SessionConfig::from_json(r#"{"stop_timeout_ms": 100}"#).unwrap();
    let session = ContactSession::new(store.clone(), config);
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    drop(stream);
    sleep(Duration::from_millis(50)).await;
    assert!(session.is_live());
    sleep(Duration::from_millis(100)).await;
    assert!(!session.is_live());
}

#[tokio::test(start_paused = true)]
async fn commands_while_idle_still_update_the_snapshot() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());

    session
        .on_event(ContactEvent::ChangeSort(SortType::PhoneNumber))
        .await
        .unwrap();
    session
        .on_event(ContactEvent::SetLastName("Lovelace".into()))
        .await
        .unwrap();
    assert!(!session.is_live());
    assert_eq!(session.snapshot().draft.last_name, "Lovelace");

    let mut stream = session.subscribe().unwrap();
    let snapshot = expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;
    assert_eq!(store.opened(), [SortType::PhoneNumber]);
    assert_eq!(ids(&snapshot), ["c3", "c1", "c2"]);
    assert_eq!(snapshot.draft.last_name, "Lovelace");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_stops_the_router() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    drop(session);
    settle().await;

    assert_eq!(store.live_subscriptions(), 0);
    assert!(stream.next().await.is_none(), "stream ends with the session");
}

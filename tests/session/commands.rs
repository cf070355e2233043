//! Command handler behaviour: draft edits, save validation, delete.

use contact_book::error::{ContactError, StorageError};
use contact_book::session::DraftEntry;
use contact_book::storage::traits::ContactBackend;
use contact_book::{ContactEvent, ContactId, SortType};

use super::support::{contact, expect_snapshot, ids, seed, session_over, settle, RecordingStore};

async fn fill_draft(
    session: &contact_book::ContactSession,
    first: &str,
    last: &str,
    phone: &str,
) {
    session.on_event(ContactEvent::ShowEntryForm).await.unwrap();
    session
        .on_event(ContactEvent::SetFirstName(first.into()))
        .await
        .unwrap();
    session
        .on_event(ContactEvent::SetLastName(last.into()))
        .await
        .unwrap();
    session
        .on_event(ContactEvent::SetPhoneNumber(phone.into()))
        .await
        .unwrap();
}

// ============================================================================
// Draft edits
// ============================================================================

#[tokio::test]
async fn field_setters_only_touch_their_own_field() {
    let store = RecordingStore::new(Vec::new());
    let session = session_over(store.clone());

    session
        .on_event(ContactEvent::SetFirstName("A".into()))
        .await
        .unwrap();
    session
        .on_event(ContactEvent::SetLastName("B".into()))
        .await
        .unwrap();
    session
        .on_event(ContactEvent::SetPhoneNumber("C".into()))
        .await
        .unwrap();

    assert_eq!(
        session.snapshot().draft,
        DraftEntry {
            first_name: "A".into(),
            last_name: "B".into(),
            phone_number: "C".into(),
            is_visible: false,
        }
    );
    assert_eq!(store.upserts(), 0);
}

#[tokio::test]
async fn show_sets_visibility_without_touching_fields() {
    let session = session_over(RecordingStore::new(Vec::new()));
    session
        .on_event(ContactEvent::SetFirstName("Ada".into()))
        .await
        .unwrap();

    session.on_event(ContactEvent::ShowEntryForm).await.unwrap();

    let snapshot = session.snapshot();
    assert!(snapshot.is_adding_contact());
    assert_eq!(snapshot.draft.first_name, "Ada");
}

#[tokio::test]
async fn hide_dismisses_and_clears_the_draft() {
    let session = session_over(RecordingStore::new(Vec::new()));
    fill_draft(&session, "Ada", "Lovelace", "555").await;

    session.on_event(ContactEvent::HideEntryForm).await.unwrap();

    assert_eq!(session.snapshot().draft, DraftEntry::default());
}

// ============================================================================
// SaveContact
// ============================================================================

#[tokio::test]
async fn save_with_blank_field_writes_nothing_and_keeps_draft() {
    let store = RecordingStore::new(Vec::new());
    let session = session_over(store.clone());
    fill_draft(&session, "", "Doe", "555").await;
    let before = session.snapshot();

    session
        .on_event(ContactEvent::SaveContact)
        .await
        .expect("validation failure is silent");

    assert_eq!(store.upserts(), 0);
    assert_eq!(store.inner().count().unwrap(), 0);
    assert_eq!(session.snapshot().draft, before.draft);
    assert!(session.snapshot().is_adding_contact(), "form stays open");
}

#[tokio::test]
async fn save_with_whitespace_only_field_is_rejected() {
    let store = RecordingStore::new(Vec::new());
    let session = session_over(store.clone());
    fill_draft(&session, "Ada", "Lovelace", "   ").await;

    session.on_event(ContactEvent::SaveContact).await.unwrap();

    assert_eq!(store.upserts(), 0);
    assert_eq!(session.snapshot().draft.phone_number, "   ");
}

#[tokio::test]
async fn save_complete_draft_upserts_once_then_resets() {
    let store = RecordingStore::new(Vec::new());
    let session = session_over(store.clone());
    fill_draft(&session, "Ada", "Lovelace", "555-0100").await;

    session.on_event(ContactEvent::SaveContact).await.unwrap();

    assert_eq!(store.upserts(), 1);
    let stored = store.inner().list(SortType::FirstName).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].first_name, "Ada");
    assert_eq!(stored[0].last_name, "Lovelace");
    assert_eq!(stored[0].phone_number, "555-0100");

    let draft = &session.snapshot().draft;
    assert_eq!(draft, &DraftEntry::default());
    assert!(!draft.is_visible);
}

#[tokio::test]
async fn each_save_gets_a_fresh_identity() {
    let store = RecordingStore::new(Vec::new());
    let session = session_over(store.clone());

    for _ in 0..2 {
        fill_draft(&session, "Ada", "Lovelace", "555-0100").await;
        session.on_event(ContactEvent::SaveContact).await.unwrap();
    }

    let stored = store.inner().list(SortType::FirstName).unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
}

#[tokio::test]
async fn failed_save_propagates_and_keeps_draft_for_retry() {
    let store = RecordingStore::new(Vec::new());
    let session = session_over(store.clone());
    fill_draft(&session, "Ada", "Lovelace", "555-0100").await;
    store.fail_writes(true);

    let err = session
        .on_event(ContactEvent::SaveContact)
        .await
        .unwrap_err();

    assert!(matches!(err, ContactError::Storage(StorageError::Backend(_))));
    let draft = &session.snapshot().draft;
    assert_eq!(draft.first_name, "Ada");
    assert!(draft.is_visible);

    store.fail_writes(false);
    session.on_event(ContactEvent::SaveContact).await.unwrap();
    assert_eq!(store.inner().count().unwrap(), 1);
    assert_eq!(session.snapshot().draft, DraftEntry::default());
}

#[tokio::test(start_paused = true)]
async fn saved_contact_reaches_snapshot_through_live_query() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    fill_draft(&session, "Aaron", "Zed", "555-9999").await;
    session.on_event(ContactEvent::SaveContact).await.unwrap();

    let snapshot = expect_snapshot(&mut stream, |s| s.contacts.len() == 4).await;
    assert_eq!(snapshot.contacts[0].first_name, "Aaron");
    assert!(!snapshot.is_adding_contact());
}

// ============================================================================
// DeleteContact
// ============================================================================

#[tokio::test(start_paused = true)]
async fn delete_removes_contact_via_live_query() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    session
        .on_event(ContactEvent::DeleteContact(ContactId::from("c2")))
        .await
        .unwrap();

    let snapshot = expect_snapshot(&mut stream, |s| s.contacts.len() == 2).await;
    assert_eq!(ids(&snapshot), ["c3", "c1"]);
    assert_eq!(store.deletes(), 1);
}

#[tokio::test(start_paused = true)]
async fn delete_of_unknown_id_is_a_noop() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    let mut stream = session.subscribe().unwrap();
    let before = expect_snapshot(&mut stream, |s| s.contacts.len() == 3).await;

    session
        .on_event(ContactEvent::DeleteContact(ContactId::from("ghost")))
        .await
        .expect("deleting a missing contact is not an error");
    settle().await;

    assert_eq!(store.inner().count().unwrap(), 3);
    assert_eq!(session.snapshot().contacts, before.contacts);
}

#[tokio::test]
async fn failed_delete_propagates_and_leaves_contact() {
    let store = RecordingStore::new(seed());
    let session = session_over(store.clone());
    store.fail_writes(true);

    let result = session
        .on_event(ContactEvent::DeleteContact(ContactId::from("c1")))
        .await;

    assert!(result.is_err());
    assert!(store
        .inner()
        .backend()
        .get_raw(&ContactId::from("c1"))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn delete_does_not_touch_snapshot_optimistically() {
    let store = RecordingStore::new(vec![contact("c1", "Ada", "L", "1")]);
    let session = session_over(store.clone());
    let before = session.snapshot();

    session
        .on_event(ContactEvent::DeleteContact(ContactId::from("c1")))
        .await
        .unwrap();

    // No router is running, so nothing re-emits and the list is untouched.
    assert_eq!(session.snapshot(), before);
    assert_eq!(store.inner().count().unwrap(), 0);
}

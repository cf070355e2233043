//! Session layer — the state owner behind one contacts screen.
//!
//! # Overview
//!
//! [`ContactSession`] owns the sort selector and the draft entry, applies
//! [`ContactEvent`]s one at a time, and publishes an immutable [`Snapshot`]
//! to any number of [`SnapshotStream`]s. The record list inside the snapshot
//! comes from a query router task that keeps one live query open for the
//! selected criterion while at least one stream exists (plus a grace period
//! after the last one is dropped).
//!
//! # Modules
//!
//! - [`command`] — [`ContactEvent`] enum.
//! - [`draft`] — [`DraftEntry`] buffer.
//! - [`sort`] — [`SortSelector`].
//! - [`merger`] — [`Snapshot`], pure [`merge`] and [`StateMerger`].
//! - [`router`] — the switch-latest query router task.

pub mod command;
pub mod draft;
pub mod merger;
pub(crate) mod router;
pub mod sort;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as TokioMutex};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::storage::traits::ContactStore;
use crate::types::SortType;

pub use command::ContactEvent;
pub use draft::DraftEntry;
pub use merger::{merge, RecordSet, Snapshot, StateMerger};
pub use sort::SortSelector;

use router::{QueryRouter, RouterLifecycle};

/// State only the command handler may touch.
struct CommandState {
    sort: SortSelector,
    draft: DraftEntry,
}

// ============================================================================
// ContactSession
// ============================================================================

/// One UI session's view state. Construct once per screen and share by `Arc`.
pub struct ContactSession {
    store: Arc<dyn ContactStore>,
    commands: TokioMutex<CommandState>,
    /// Template receiver cloned into each router task.
    sort_rx: watch::Receiver<SortType>,
    merger: Arc<StateMerger>,
    lifecycle: Arc<Mutex<RouterLifecycle>>,
    config: SessionConfig,
}

impl ContactSession {
    pub fn new(store: Arc<dyn ContactStore>, config: SessionConfig) -> Self {
        let sort = SortSelector::default();
        let sort_rx = sort.subscribe();
        let merger = Arc::new(StateMerger::new(sort.current()));
        Self {
            store,
            commands: TokioMutex::new(CommandState {
                sort,
                draft: DraftEntry::default(),
            }),
            sort_rx,
            merger,
            lifecycle: Arc::new(Mutex::new(RouterLifecycle::default())),
            config,
        }
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.merger.snapshot()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Attach a consumer. The first stream (or the first after the router
    /// stopped) starts the router on the current tokio runtime; a stream
    /// attached while the router is winding down cancels the wind-down.
    ///
    /// Fails when a router has to be started and there is no tokio runtime.
    pub fn subscribe(&self) -> Result<SnapshotStream> {
        let mut lifecycle = self.lifecycle.lock();
        let rx = self.merger.subscribe();
        if lifecycle.is_running() {
            lifecycle.notify_attached();
        } else {
            QueryRouter {
                store: Arc::clone(&self.store),
                sort_rx: self.sort_rx.clone(),
                merger: Arc::clone(&self.merger),
                lifecycle: Arc::clone(&self.lifecycle),
                stop_timeout: self.config.stop_timeout(),
            }
            .start(&mut lifecycle)?;
        }
        Ok(SnapshotStream { rx })
    }

    /// Whether a router task currently holds a live query.
    pub fn is_live(&self) -> bool {
        self.lifecycle.lock().is_running()
    }

    /// How many times a router has been started for this session.
    pub fn router_starts(&self) -> u64 {
        self.lifecycle.lock().starts()
    }

    /// Apply one user intent.
    ///
    /// Events are applied strictly one after another. Store failures from
    /// `SaveContact` and `DeleteContact` are returned to the caller; a failed
    /// save leaves the draft as it was so it can be retried.
    pub async fn on_event(&self, event: ContactEvent) -> Result<()> {
        let mut cmd = self.commands.lock().await;

        match event {
            ContactEvent::SaveContact => {
                let Some(contact) = cmd.draft.to_contact() else {
                    tracing::debug!("save ignored: draft has blank fields");
                    return Ok(());
                };
                self.store.upsert(&contact).await?;
                tracing::debug!(id = %contact.id, "contact saved");
                cmd.draft.reset();
            }
            ContactEvent::SetFirstName(value) => cmd.draft.set_first_name(value),
            ContactEvent::SetLastName(value) => cmd.draft.set_last_name(value),
            ContactEvent::SetPhoneNumber(value) => cmd.draft.set_phone_number(value),
            ContactEvent::ShowEntryForm => cmd.draft.set_visible(true),
            ContactEvent::HideEntryForm => cmd.draft.reset(),
            ContactEvent::ChangeSort(sort) => {
                // Merger first: the snapshot switches criterion immediately
                // and drops results still in flight for the old one.
                self.merger.set_sort(sort);
                cmd.sort.set_criterion(sort);
                return Ok(());
            }
            ContactEvent::DeleteContact(id) => {
                let deleted = self.store.delete(&id).await?;
                tracing::debug!(%id, deleted, "contact delete issued");
                return Ok(());
            }
        }

        self.merger.set_draft(cmd.draft.clone());
        Ok(())
    }
}

// ============================================================================
// SnapshotStream
// ============================================================================

/// A consumer's view of the session. Only the latest snapshot is retained;
/// dropping every stream lets the router wind down.
pub struct SnapshotStream {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    /// The latest snapshot, marking it seen.
    pub fn current(&mut self) -> Arc<Snapshot> {
        Arc::clone(&self.rx.borrow_and_update())
    }

    /// Wait for a snapshot newer than the last one seen. `None` once the
    /// session is gone.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// Wait until a snapshot satisfies `predicate` (checking the current one
    /// first). `None` if the session is dropped before that happens.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Option<Arc<Snapshot>> {
        let snapshot = self.rx.wait_for(|s| predicate(s)).await.ok()?;
        Some(Arc::clone(&snapshot))
    }
}

//! Query router — keeps exactly one live query open, for the selected
//! criterion, and forwards its emissions to the merger.
//!
//! Runs as a tokio task. A criterion change drops the current `LiveQuery`
//! (detaching it from the store and discarding anything it had queued)
//! before the next one is opened, and the `biased` select checks for a
//! criterion change before reading an emission. Together with the merger's
//! stale-result check this gives latest-criterion-wins.
//!
//! When the last snapshot receiver goes away the router keeps its query for
//! `stop_timeout`; if nobody has re-subscribed by then it exits. A subscriber
//! arriving inside that window cancels the countdown, and the next time the
//! receiver count drops to zero it starts again from the full timeout.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::time::{sleep_until, Instant};

use crate::error::Result;
use crate::reactive::live_query::{LiveQuery, QueryEmission};
use crate::storage::traits::ContactStore;
use crate::types::SortType;

use super::merger::StateMerger;

/// Shared between the session and its router task. Starting and stopping
/// both happen under this lock together with the receiver-count check, so a
/// subscriber arriving while the router winds down always gets a router.
#[derive(Debug, Default)]
pub(crate) struct RouterLifecycle {
    running: bool,
    starts: u64,
    /// Wakes the running router when a subscriber attaches. Replaced on
    /// every start so a leftover permit never reaches a later run.
    reattached: Arc<Notify>,
}

impl RouterLifecycle {
    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn starts(&self) -> u64 {
        self.starts
    }

    /// Tell the running router a subscriber attached, cancelling any
    /// pending stop. The permit is kept if the router is not waiting yet.
    pub(crate) fn notify_attached(&self) {
        self.reattached.notify_one();
    }
}

pub(crate) struct QueryRouter {
    pub(crate) store: Arc<dyn ContactStore>,
    pub(crate) sort_rx: watch::Receiver<SortType>,
    pub(crate) merger: Arc<StateMerger>,
    pub(crate) lifecycle: Arc<Mutex<RouterLifecycle>>,
    pub(crate) stop_timeout: Duration,
}

impl QueryRouter {
    /// Mark the router running and spawn it on the current runtime.
    ///
    /// Call with the lifecycle lock held and no router running. Fails
    /// without touching `lifecycle` when there is no tokio runtime.
    pub(crate) fn start(self, lifecycle: &mut RouterLifecycle) -> Result<()> {
        let handle = Handle::try_current()?;
        let reattached = Arc::new(Notify::new());
        lifecycle.reattached = Arc::clone(&reattached);
        lifecycle.running = true;
        lifecycle.starts += 1;
        tracing::info!(start = lifecycle.starts, "query router started");
        handle.spawn(self.run(reattached));
        Ok(())
    }

    async fn run(self, reattached: Arc<Notify>) {
        let QueryRouter {
            store,
            mut sort_rx,
            merger,
            lifecycle,
            stop_timeout,
        } = self;

        let mut sort = *sort_rx.borrow_and_update();
        let mut live = Some(store.observe_ordered(sort));
        let mut idle_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;

                changed = sort_rx.changed() => {
                    if changed.is_err() {
                        // The session and its selector are gone.
                        lifecycle.lock().running = false;
                        break;
                    }
                    sort = *sort_rx.borrow_and_update();
                    drop(live.take());
                    live = Some(store.observe_ordered(sort));
                    tracing::debug!(?sort, "query router switched");
                }

                emission = next_emission(&mut live) => {
                    match emission {
                        Some(Ok(rows)) => {
                            merger.accept_records(sort, rows);
                        }
                        Some(Err(e)) => {
                            tracing::warn!(?sort, error = %e, "live query failed; waiting for next criterion change");
                            live = None;
                        }
                        None => {
                            tracing::warn!(?sort, "live query ended; waiting for next criterion change");
                            live = None;
                        }
                    }
                }

                () = merger.closed(), if idle_deadline.is_none() => {
                    tracing::debug!(?stop_timeout, "no snapshot subscribers; grace period started");
                    idle_deadline = Some(Instant::now() + stop_timeout);
                }

                () = reattached.notified(), if idle_deadline.is_some() => {
                    tracing::debug!("subscriber attached; grace period cancelled");
                    idle_deadline = None;
                }

                () = sleep_until_deadline(idle_deadline) => {
                    idle_deadline = None;
                    let mut lc = lifecycle.lock();
                    if merger.receiver_count() == 0 {
                        lc.running = false;
                        break;
                    }
                }
            }
        }

        drop(live);
        tracing::info!("query router stopped");
    }
}

/// Next emission of `live`, or never while no query is open.
async fn next_emission(live: &mut Option<LiveQuery>) -> Option<QueryEmission> {
    match live {
        Some(query) => query.next().await,
        None => pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

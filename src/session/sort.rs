//! Sort selector — the active ordering criterion, observable by the router.

use tokio::sync::watch;

use crate::types::SortType;

pub struct SortSelector {
    tx: watch::Sender<SortType>,
}

impl SortSelector {
    pub fn new(initial: SortType) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> SortType {
        *self.tx.borrow()
    }

    /// Replace the active criterion.
    ///
    /// Observers are notified even when `sort` equals the current value, so
    /// re-selecting a criterion reopens its live query.
    pub fn set_criterion(&self, sort: SortType) {
        self.tx.send_replace(sort);
    }

    pub fn subscribe(&self) -> watch::Receiver<SortType> {
        self.tx.subscribe()
    }
}

impl Default for SortSelector {
    fn default() -> Self {
        Self::new(SortType::default())
    }
}

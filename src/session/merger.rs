//! State merger — combines the active criterion, the latest query result and
//! the draft entry into one immutable [`Snapshot`].
//!
//! Every input change recomputes the whole snapshot under a single lock and
//! publishes it with `send_replace`, so a reader sees either the previous
//! snapshot or the new one, never a mix.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use crate::types::{Contact, SortType};

use super::draft::DraftEntry;

/// The state exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Contacts ordered by `sort`.
    pub contacts: Arc<[Contact]>,
    pub sort: SortType,
    pub draft: DraftEntry,
}

impl Snapshot {
    pub fn is_adding_contact(&self) -> bool {
        self.draft.is_visible
    }
}

/// A query result tagged with the criterion it was ordered by.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub sort: SortType,
    pub contacts: Arc<[Contact]>,
}

impl RecordSet {
    pub fn empty(sort: SortType) -> Self {
        Self {
            sort,
            contacts: Arc::from(Vec::new()),
        }
    }
}

/// Pure merge of the three inputs.
///
/// When `records` was ordered by a criterion other than `sort` (the new
/// query has not emitted yet) the rows are re-ordered in memory, so the
/// snapshot's list always follows the selected criterion.
pub fn merge(sort: SortType, records: &RecordSet, draft: &DraftEntry) -> Snapshot {
    let contacts = if records.sort == sort {
        Arc::clone(&records.contacts)
    } else {
        let mut rows = records.contacts.to_vec();
        sort.sort(&mut rows);
        rows.into()
    };
    Snapshot {
        contacts,
        sort,
        draft: draft.clone(),
    }
}

struct MergeInputs {
    sort: SortType,
    records: RecordSet,
    draft: DraftEntry,
}

pub struct StateMerger {
    inputs: Mutex<MergeInputs>,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl StateMerger {
    pub fn new(sort: SortType) -> Self {
        let records = RecordSet::empty(sort);
        let draft = DraftEntry::default();
        let (tx, _) = watch::channel(Arc::new(merge(sort, &records, &draft)));
        Self {
            inputs: Mutex::new(MergeInputs {
                sort,
                records,
                draft,
            }),
            tx,
        }
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Resolves once no snapshot receiver remains.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }

    pub fn set_sort(&self, sort: SortType) {
        let mut inputs = self.inputs.lock();
        inputs.sort = sort;
        self.publish(&inputs);
    }

    pub fn set_draft(&self, draft: DraftEntry) {
        let mut inputs = self.inputs.lock();
        inputs.draft = draft;
        self.publish(&inputs);
    }

    /// Take a query result ordered by `sort`.
    ///
    /// Results for a criterion that is no longer selected are dropped and
    /// `false` is returned.
    pub fn accept_records(&self, sort: SortType, contacts: Vec<Contact>) -> bool {
        let mut inputs = self.inputs.lock();
        if inputs.sort != sort {
            tracing::debug!(?sort, current = ?inputs.sort, "dropping stale query result");
            return false;
        }
        inputs.records = RecordSet {
            sort,
            contacts: contacts.into(),
        };
        self.publish(&inputs);
        true
    }

    fn publish(&self, inputs: &MergeInputs) {
        let snapshot = merge(inputs.sort, &inputs.records, &inputs.draft);
        self.tx.send_replace(Arc::new(snapshot));
    }
}

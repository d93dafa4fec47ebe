// ── Snapshot store ──
//
// Holds the latest snapshot behind a `watch` channel. Readers get a cheap
// `Arc` clone; a refresh swaps in a whole new snapshot so nobody ever
// sees a half-applied update.

mod snapshot;

use std::sync::Arc;

use tokio::sync::watch;

pub use snapshot::Snapshot;

pub(crate) struct DataStore {
    current: watch::Sender<Option<Arc<Snapshot>>>,
}

impl DataStore {
    pub(crate) fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// The latest snapshot, if one has been fetched and not invalidated.
    pub(crate) fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.borrow().clone()
    }

    pub(crate) fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Drop the cached snapshot so the next reader must refetch.
    pub(crate) fn invalidate(&self) {
        self.current.send_replace(None);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.current.subscribe()
    }
}

//! Snapshot store for the currently loaded dataset.
//!
//! The store owns at most one immutable [`Snapshot`]. Loads are keyed by a
//! generation counter: [`RecordStore::begin_load`] issues a [`LoadTicket`]
//! and [`RecordStore::commit`] installs the result only if no newer load has
//! been requested since. A superseded load still runs to completion; its
//! result is discarded at commit time.
//!
//! Readers take an `Arc<Snapshot>` and never hold the lock while filtering
//! or aggregating, so a replacement never mixes two datasets under them.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::classify::{Classified, UnclassifiedRecord};
use crate::models::ArchiveRecord;

/// Immutable, fully classified contents of one dataset load.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub dataset: String,
    pub reference_date: NaiveDate,
    /// Load generation that produced this snapshot.
    pub generation: u64,
    /// Records in source order.
    pub records: Vec<ArchiveRecord>,
    pub unclassified: Vec<UnclassifiedRecord>,
}

impl Snapshot {
    pub fn new(
        dataset: impl Into<String>,
        reference_date: NaiveDate,
        generation: u64,
        classified: Classified,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            reference_date,
            generation,
            records: classified.records,
            unclassified: classified.unclassified,
        }
    }
}

/// Proof that a load was requested; consumed by [`RecordStore::commit`].
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holder of the current snapshot with last-requested-wins replacement.
#[derive(Debug, Default)]
pub struct RecordStore {
    requested: AtomicU64,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new load and supersede any load still in flight.
    pub fn begin_load(&self) -> LoadTicket {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "load requested");
        LoadTicket { generation }
    }

    /// Install the result of a load.
    ///
    /// Returns `false` (and drops the result) if a newer load was requested
    /// after `ticket` was issued.
    pub fn commit(
        &self,
        ticket: LoadTicket,
        dataset: impl Into<String>,
        reference_date: NaiveDate,
        classified: Classified,
    ) -> bool {
        let mut current = self.write();

        let latest = self.requested.load(Ordering::SeqCst);
        let installed = current.as_ref().map(|s| s.generation).unwrap_or(0);
        if ticket.generation != latest || ticket.generation <= installed {
            debug!(
                generation = ticket.generation,
                latest, "discarding superseded load"
            );
            return false;
        }

        let snapshot = Snapshot::new(dataset, reference_date, ticket.generation, classified);
        info!(
            dataset = %snapshot.dataset,
            generation = snapshot.generation,
            records = snapshot.records.len(),
            unclassified = snapshot.unclassified.len(),
            "snapshot installed"
        );
        *current = Some(Arc::new(snapshot));
        true
    }

    /// The current snapshot, if any load has completed.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.read().clone()
    }

    /// Latest requested load generation (0 before any load).
    pub fn generation(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<Snapshot>>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<Snapshot>>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

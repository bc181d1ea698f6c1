//! In-process arrival scheduler.
//!
//! Restock creation enqueues the restock id with a due time; the arrival worker
//! drains due entries and applies the arrival. The queue is not persisted: after
//! a restart, pending restocks are picked up by the overdue sweep instead.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use stockroom_core::{Clock, RestockId};

#[derive(Debug)]
pub struct ArrivalScheduler {
    clock: Arc<dyn Clock>,
    queue: Mutex<BTreeSet<(DateTime<Utc>, RestockId)>>,
}

impl ArrivalScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Mutex::new(BTreeSet::new()),
        }
    }

    /// Enqueue `restock_id` to fire at `due_at`.
    pub fn schedule(&self, restock_id: RestockId, due_at: DateTime<Utc>) {
        self.lock().insert((due_at, restock_id));
    }

    /// Remove and return every entry due at the clock's current time, oldest first.
    pub fn take_due(&self) -> Vec<RestockId> {
        let now = self.clock.now();
        let mut queue = self.lock();
        let mut due = Vec::new();
        while let Some(&(at, id)) = queue.first() {
            if at > now {
                break;
            }
            queue.pop_first();
            due.push(id);
        }
        due
    }

    /// Number of entries still waiting.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<(DateTime<Utc>, RestockId)>> {
        // The set stays consistent even if a holder panicked.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

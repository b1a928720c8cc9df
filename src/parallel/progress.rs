use std::sync::{Mutex, MutexGuard, PoisonError};

/// Human-readable status of one worker, shown while its current item is in flight.
///
/// Only the worker that owns the slot writes to it; the printer reads it concurrently.
#[derive(Debug, Default)]
pub struct ProgressSlot {
    text: Mutex<String>,
}

impl ProgressSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the status text
    pub fn set(&self, text: impl Into<String>) {
        *self.lock() = text.into();
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the current status text
    pub fn get(&self) -> String {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A writer that panicked mid-update can only leave a stale string behind
    fn lock(&self) -> MutexGuard<'_, String> {
        self.text.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One progress slot per worker, indexed by worker id.
#[derive(Debug, Default)]
pub struct ProgressTable {
    slots: Vec<ProgressSlot>,
}

impl ProgressTable {
    pub fn new(workers: usize) -> Self {
        Self {
            slots: (0..workers).map(|_| ProgressSlot::new()).collect(),
        }
    }

    pub fn slot(&self, worker_id: usize) -> Option<&ProgressSlot> {
        self.slots.get(worker_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgressSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Status text of every busy worker, in worker order
    pub fn active(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(ProgressSlot::get)
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// True when no worker is reporting progress
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(ProgressSlot::is_empty)
    }
}

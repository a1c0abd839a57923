//! Single-slot rendezvous for blocking callers
//!
//! Bridges the asynchronous image pipeline to callers that must stay
//! synchronous: the producing task delivers exactly one value, the consuming
//! thread parks on a condition variable until it arrives. One instance
//! serves one request; concurrent requests each get their own cell.

use std::sync::{Condvar, Mutex};

pub(crate) struct Synchronizer<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Synchronizer<T> {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None), ready: Condvar::new() }
    }

    /// Deliver the value and wake the waiting thread. The pipeline delivers
    /// exactly once; should a second delivery ever happen, the first value
    /// is kept.
    pub fn deliver(&self, value: T) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(value);
        }
        self.ready.notify_all();
    }

    /// Block until a value is delivered, then take it.
    pub fn wait(&self) -> T {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            slot = self.ready.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
    }
}

//! Background snapshot writer.
//!
//! The engine mutates memory first and then hands the serialized state
//! here. `submit` only swaps a pending slot and wakes the worker; the
//! SQLite write happens on the worker thread. Pending snapshots coalesce:
//! if several arrive while a write is in flight, only the newest is
//! written. Failed writes are logged and dropped.

use crate::{
    error::{GameError, GameResult},
    store::GameStore,
    types::Timestamp,
};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

/// Upper bound on how long `flush` waits for the worker.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

struct Pending {
    generation: u64,
    json:       String,
    at:         Timestamp,
}

#[derive(Default)]
struct Slot {
    pending:   Option<Pending>,
    /// Generation of the newest submission.
    submitted: u64,
    /// Newest generation the worker has finished with (written or failed).
    settled:   u64,
    failures:  u64,
    shutdown:  bool,
}

#[derive(Default)]
struct Shared {
    slot:    Mutex<Slot>,
    wake:    Condvar,
    settled: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct SnapshotWriter {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    /// Move `store` onto a worker thread that writes snapshots under `key`.
    pub fn spawn(store: GameStore, key: &str) -> GameResult<Self> {
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let key = key.to_string();
        let worker = std::thread::Builder::new()
            .name("snapshot-writer".into())
            .spawn(move || run_worker(store, &key, &worker_shared))
            .map_err(|e| GameError::Other(anyhow::anyhow!("cannot spawn snapshot writer: {e}")))?;
        Ok(Self { shared, worker: Some(worker) })
    }

    /// Queue `json` for writing. Never waits on I/O.
    pub fn submit(&self, json: String, at: Timestamp) {
        let mut slot = self.shared.lock();
        slot.submitted += 1;
        if slot.pending.is_some() {
            log::debug!("persist: superseding unwritten snapshot");
        }
        slot.pending = Some(Pending { generation: slot.submitted, json, at });
        self.shared.wake.notify_one();
    }

    /// Block until everything submitted so far has been attempted.
    pub fn flush(&self) -> GameResult<()> {
        let slot = self.shared.lock();
        let target = slot.submitted;
        let (slot, timeout) = self
            .shared
            .settled
            .wait_timeout_while(slot, FLUSH_TIMEOUT, |s| s.settled < target && !s.shutdown)
            .unwrap_or_else(|e| e.into_inner());
        if slot.settled < target {
            if timeout.timed_out() {
                log::warn!("persist: flush timed out with {} snapshot(s) unsettled", target - slot.settled);
            }
            return Err(GameError::WriterClosed);
        }
        Ok(())
    }

    /// Number of writes that failed since startup.
    pub fn failures(&self) -> u64 {
        self.shared.lock().failures
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("persist: snapshot writer panicked");
            }
        }
    }
}

fn run_worker(store: GameStore, key: &str, shared: &Shared) {
    loop {
        let next = {
            let mut slot = shared.lock();
            while slot.pending.is_none() && !slot.shutdown {
                slot = shared.wake.wait(slot).unwrap_or_else(|e| e.into_inner());
            }
            match slot.pending.take() {
                Some(p) => p,
                None => break, // shutdown with nothing left to write
            }
        };

        let result = store.put(key, &next.json, next.at);

        let mut slot = shared.lock();
        if let Err(e) = result {
            slot.failures += 1;
            log::error!("persist: failed to save snapshot {}: {e}", next.generation);
        } else {
            log::debug!("persist: saved snapshot {} ({} bytes)", next.generation, next.json.len());
        }
        slot.settled = next.generation;
        shared.settled.notify_all();
    }
    // Wake any flush still waiting on a stopped worker.
    shared.settled.notify_all();
}

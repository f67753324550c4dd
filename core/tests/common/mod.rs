//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use island_core::{
    clock::ManualClock,
    config::GameConfig,
    state::GameState,
    types::Timestamp,
};
use std::path::PathBuf;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Monday 2026-03-02 10:00 UTC.
pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

pub fn config() -> GameConfig {
    GameConfig::builtin().expect("builtin config")
}

pub fn clock_at(now: Timestamp) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(now))
}

/// Fresh first-launch state at `t0()`.
pub fn fresh_state() -> GameState {
    GameState::initial(&config(), t0())
}

/// Fresh state with the starter building removed and `diamonds` set.
pub fn empty_island(diamonds: u64) -> GameState {
    let mut state = fresh_state();
    state.buildings.clear();
    state.diamonds = diamonds;
    state
}

/// Unique save file under the system temp dir, removed (with its WAL
/// side files) on drop. Declare it before the engine using it.
pub struct TempDb {
    path: PathBuf,
}

impl TempDb {
    pub fn path(&self) -> &str {
        self.path.to_str().expect("temp dir path is UTF-8")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn temp_db(name: &str) -> TempDb {
    let path = std::env::temp_dir().join(format!("island-{name}-{}.db", uuid::Uuid::new_v4()));
    TempDb { path }
}

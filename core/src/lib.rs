//! Island Focus game-state engine.
//!
//! `GameEngine` owns the one `GameState`: diamonds, experience, the
//! building grid, the focus ledger and task progress. It loads and
//! reconciles on open and persists every mutation in the background.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod focus;
pub mod grid;
pub mod handle;
pub mod leveling;
pub mod persist;
pub mod reconcile;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod store;
pub mod tasks;
pub mod types;

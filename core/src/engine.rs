//! The game-state engine, the single owner of `GameState`.
//!
//! RULES:
//!   - Every mutating operation takes `&mut self`; it validates, mutates
//!     memory, then dispatches persistence. Nothing interleaves.
//!   - Expected refusals (can't afford, occupied, unknown id) return
//!     `false` / `None`. Nothing here returns an error for gameplay.
//!   - Persistence is best effort. A failed write is logged and the
//!     in-memory state stays authoritative.
//!   - Reconciliation runs exactly once, inside `open`, before the engine
//!     is handed to anyone.

use crate::{
    clock::Clock,
    config::GameConfig,
    error::GameResult,
    focus::{FocusDraft, FocusOutcome},
    grid::GridRefusal,
    persist::SnapshotWriter,
    reconcile::{reconcile, Reconciliation},
    snapshot,
    state::{BuildingType, FocusSession, GameState},
    store::{GameStore, GAME_STATE_KEY},
    types::{Amount, EntityId, Timestamp},
};
use std::sync::Arc;

pub struct GameEngine {
    config:         GameConfig,
    clock:          Arc<dyn Clock>,
    state:          GameState,
    writer:         Option<SnapshotWriter>,
    reconciliation: Reconciliation,
}

impl GameEngine {
    /// Load the saved game (or start a new one), reconcile task resets and
    /// write the result back. A `None` store runs the game unsaved.
    pub fn open(store: Option<GameStore>, config: GameConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let mut state = match &store {
            Some(store) => load_state(store, &config, now),
            None => {
                log::warn!("engine: no store available, running session-only (progress will not be saved)");
                GameState::initial(&config, now)
            }
        };

        let reconciliation = reconcile(&mut state, &config, clock.as_ref());

        let writer = store.and_then(|store| match SnapshotWriter::spawn(store, GAME_STATE_KEY) {
            Ok(w) => Some(w),
            Err(e) => {
                log::error!("engine: {e}; running session-only");
                None
            }
        });

        let engine = Self { config, clock, state, writer, reconciliation };
        engine.persist();
        log::info!(
            "engine: ready (level {}, {} diamonds, {} buildings)",
            engine.state.level,
            engine.state.diamonds,
            engine.state.buildings.len()
        );
        engine
    }

    /// Open the save database at `path`; degrade to session-only if it
    /// cannot be opened.
    pub fn open_path(path: &str, config: GameConfig, clock: Arc<dyn Clock>) -> Self {
        let store = match GameStore::open(path) {
            Ok(store) => Some(store),
            Err(e) => {
                log::error!("engine: cannot open save database {path}: {e}");
                None
            }
        };
        Self::open(store, config, clock)
    }

    // ── Read access ────────────────────────────────────────────

    pub fn state(&self) -> &GameState { &self.state }
    pub fn snapshot(&self) -> GameState { self.state.clone() }
    pub fn config(&self) -> &GameConfig { &self.config }
    pub fn now(&self) -> Timestamp { self.clock.now() }
    pub fn clock(&self) -> &dyn Clock { self.clock.as_ref() }

    /// Which task partitions were refreshed when this engine opened.
    pub fn reconciliation(&self) -> Reconciliation { self.reconciliation }

    /// False when running session-only.
    pub fn is_persistent(&self) -> bool { self.writer.is_some() }

    /// Snapshot writes that failed since open.
    pub fn write_failures(&self) -> u64 {
        self.writer.as_ref().map_or(0, SnapshotWriter::failures)
    }

    /// Preview of `collect_building_income` without collecting.
    pub fn pending_income(&self) -> Amount {
        self.state.pending_income(&self.config, self.clock.now())
    }

    // ── Currency & experience ──────────────────────────────────

    pub fn add_diamonds(&mut self, amount: Amount) {
        self.state.add_diamonds(amount);
        self.persist();
    }

    pub fn spend_diamonds(&mut self, amount: Amount) -> bool {
        let spent = self.state.spend_diamonds(amount);
        if spent {
            self.persist();
        }
        spent
    }

    pub fn add_exp(&mut self, amount: Amount) {
        let levels = self.state.add_exp(amount);
        if levels > 0 {
            log::info!("engine: reached level {} (+{levels})", self.state.level);
        }
        self.persist();
    }

    // ── Buildings ──────────────────────────────────────────────

    pub fn place_building(&mut self, building_type: BuildingType, x: u32, y: u32) -> bool {
        self.try_place_building(building_type, x, y).is_ok()
    }

    /// Like `place_building`, but says why a placement was refused.
    pub fn try_place_building(
        &mut self,
        building_type: BuildingType,
        x: u32,
        y: u32,
    ) -> Result<EntityId, GridRefusal> {
        let now = self.clock.now();
        let result = self.state.place_building(&self.config, building_type, x, y, now);
        match &result {
            Ok(id) => {
                log::debug!("engine: placed {} at ({x}, {y}) id={id}", building_type.as_str());
                self.persist();
            }
            Err(why) => log::debug!("engine: refused {} at ({x}, {y}): {why:?}", building_type.as_str()),
        }
        result
    }

    pub fn upgrade_building(&mut self, id: &str) -> bool {
        self.try_upgrade_building(id).is_ok()
    }

    /// Returns the new level.
    pub fn try_upgrade_building(&mut self, id: &str) -> Result<u32, GridRefusal> {
        let result = self.state.upgrade_building(&self.config, id);
        match &result {
            Ok(level) => {
                log::debug!("engine: upgraded {id} to level {level}");
                self.persist();
            }
            Err(why) => log::debug!("engine: refused upgrade of {id}: {why:?}"),
        }
        result
    }

    /// Returns the refund, or `None` if no such building exists.
    pub fn remove_building(&mut self, id: &str) -> Option<Amount> {
        let refund = self.state.remove_building(&self.config, id)?;
        log::debug!("engine: removed {id}, refunded {refund}");
        self.persist();
        Some(refund)
    }

    pub fn collect_building_income(&mut self) -> Amount {
        let income = self.state.collect_building_income(&self.config, self.clock.now());
        if income > 0 {
            log::debug!("engine: collected {income} diamonds of idle income");
            self.persist();
        }
        income
    }

    // ── Focus ──────────────────────────────────────────────────

    /// Record a session without crediting it. Callers using this must
    /// credit diamonds and exp themselves; prefer
    /// `complete_focus_with_rewards`.
    pub fn complete_focus(&mut self, draft: FocusDraft) -> Option<FocusSession> {
        let session = self.state.complete_focus(&self.config, draft)?;
        self.persist();
        Some(session)
    }

    pub fn complete_focus_with_rewards(&mut self, outcome: FocusOutcome) -> Option<FocusSession> {
        let session = self.state.complete_focus_with_rewards(&self.config, outcome)?;
        log::debug!(
            "engine: focus {} min, +{} diamonds, +{} exp",
            session.actual_duration,
            session.diamonds_earned,
            session.exp_earned
        );
        self.persist();
        Some(session)
    }

    // ── Tasks ──────────────────────────────────────────────────

    pub fn claim_task(&mut self, task_id: &str) -> bool {
        match self.state.claim_task(task_id) {
            Some(reward) => {
                log::debug!(
                    "engine: claimed {task_id} for {} diamonds and {} exp",
                    reward.diamonds,
                    reward.exp
                );
                self.persist();
                true
            }
            None => false,
        }
    }

    pub fn update_task_progress(&mut self, task_id: &str, increment: Amount) {
        if self.state.update_task_progress(task_id, increment) {
            self.persist();
        }
    }

    // ── Profile ────────────────────────────────────────────────

    /// Trimmed; blank names are refused.
    pub fn set_nickname(&mut self, name: &str) -> bool {
        let changed = self.state.set_nickname(name);
        if changed {
            self.persist();
        }
        changed
    }

    // ── Persistence ────────────────────────────────────────────

    /// Wait until every snapshot dispatched so far has been written.
    pub fn flush(&self) -> GameResult<()> {
        match &self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        let Some(writer) = &self.writer else { return };
        match snapshot::encode(&self.state) {
            Ok(json) => writer.submit(json, self.clock.now()),
            Err(e) => log::error!("engine: cannot serialize game state: {e}"),
        }
    }
}

/// Saved state, or a fresh one when nothing usable is stored. An
/// unreadable document is copied aside so it is not lost on the next save.
fn load_state(store: &GameStore, config: &GameConfig, now: Timestamp) -> GameState {
    let raw = match store.get(GAME_STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::info!("engine: no saved game, starting fresh");
            return GameState::initial(config, now);
        }
        Err(e) => {
            log::error!("engine: failed to read saved game: {e}");
            return GameState::initial(config, now);
        }
    };

    match snapshot::decode(&raw) {
        Ok(state) => state,
        Err(e) => {
            log::warn!("engine: saved game is unreadable ({e}), starting fresh");
            let backup_key = unreadable_backup_key(GAME_STATE_KEY);
            if let Err(e) = store.put(&backup_key, &raw, now) {
                log::error!("engine: failed to back up unreadable save: {e}");
            }
            GameState::initial(config, now)
        }
    }
}

pub fn unreadable_backup_key(key: &str) -> String {
    format!("{key}.unreadable")
}

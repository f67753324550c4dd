//! Load-time task reset reconciliation.
//!
//! Runs once per cold start, before the state is handed to anyone:
//!   1. new calendar day since `last_task_reset`    -> fresh daily tasks
//!   2. 7×24h or more since `last_weekly_reset`     -> fresh weekly tasks
//! The two checks are independent and may both fire.

use crate::{
    clock::Clock,
    config::GameConfig,
    state::{GameState, TaskKind},
};
use chrono::Duration;

pub const WEEKLY_RESET_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub daily_reset:  bool,
    pub weekly_reset: bool,
}

impl Reconciliation {
    pub fn changed(&self) -> bool {
        self.daily_reset || self.weekly_reset
    }
}

pub fn reconcile(state: &mut GameState, config: &GameConfig, clock: &dyn Clock) -> Reconciliation {
    let now = clock.now();
    let mut report = Reconciliation::default();

    if clock.local_date(state.last_task_reset) != clock.local_date(now) {
        state.reset_tasks(config, TaskKind::Daily);
        state.last_task_reset = now;
        report.daily_reset = true;
    }

    if now - state.last_weekly_reset >= Duration::days(WEEKLY_RESET_DAYS) {
        state.reset_tasks(config, TaskKind::Weekly);
        state.last_weekly_reset = now;
        report.weekly_reset = true;
    }

    if report.changed() {
        log::info!(
            "reconcile: daily_reset={} weekly_reset={}",
            report.daily_reset,
            report.weekly_reset
        );
    }
    report
}

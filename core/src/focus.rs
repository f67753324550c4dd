//! Focus sessions: the reward formula, the history ledger and the timer
//! state machine a presentation layer drives.
//!
//! Rewards:
//!   minutes  = floor(elapsed_seconds / 60)          (< 1 minute is discarded)
//!   diamonds = minutes + floor(minutes / 25) * 10   (block size/bonus from config)
//!   exp      = minutes

use crate::{
    config::{FocusRules, GameConfig, TaskTrigger},
    state::{FocusSession, FocusStatus, GameState},
    types::{new_entity_id, Amount, Timestamp},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusReward {
    pub minutes:  Amount,
    pub diamonds: Amount,
    pub exp:      Amount,
}

impl FocusReward {
    pub fn from_elapsed(rules: &FocusRules, elapsed_seconds: u64) -> Self {
        let minutes = elapsed_seconds / 60;
        let blocks = minutes / rules.bonus_block_minutes.max(1);
        Self {
            minutes,
            diamonds: minutes.saturating_add(blocks.saturating_mul(rules.bonus_per_block)),
            exp: minutes,
        }
    }

    pub fn counts(&self) -> bool {
        self.minutes >= 1
    }
}

/// A finished session as the caller describes it; the engine assigns the id.
/// Rewards in the draft are recorded, not credited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusDraft {
    pub start_time:       Timestamp,
    pub end_time:         Timestamp,
    pub planned_duration: Amount,
    pub actual_duration:  Amount,
    pub diamonds_earned:  Amount,
    pub exp_earned:       Amount,
    pub status:           FocusStatus,
}

/// Raw result of a timer run, before rewards are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusOutcome {
    pub start_time:      Timestamp,
    pub end_time:        Timestamp,
    pub planned_minutes: Amount,
    pub elapsed_seconds: u64,
    pub status:          FocusStatus,
}

impl GameState {
    /// Record a session in history, add its minutes to the focus total and
    /// advance focus-minute tasks, whatever its status. Sessions under a
    /// minute are dropped. Does not credit rewards.
    pub fn complete_focus(&mut self, config: &GameConfig, draft: FocusDraft) -> Option<FocusSession> {
        self.record_session(config, draft, true)
    }

    fn record_session(
        &mut self,
        config: &GameConfig,
        draft: FocusDraft,
        count_progress: bool,
    ) -> Option<FocusSession> {
        if draft.actual_duration < 1 {
            log::debug!("focus: discarding session under one minute");
            return None;
        }
        let session = FocusSession {
            id: new_entity_id(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            planned_duration: draft.planned_duration,
            actual_duration: draft.actual_duration,
            diamonds_earned: draft.diamonds_earned,
            exp_earned: draft.exp_earned,
            status: draft.status,
        };
        self.focus_history.insert(0, session.clone());

        if count_progress {
            self.total_focus_minutes = self.total_focus_minutes.saturating_add(session.actual_duration);
            self.advance_tasks(config, TaskTrigger::FocusMinutes, session.actual_duration);
        }
        Some(session)
    }

    /// Compute rewards from the elapsed time and apply diamonds, exp,
    /// history and task progress together. An aborted run is logged with
    /// zero rewards and adds no minutes or task progress.
    pub fn complete_focus_with_rewards(
        &mut self,
        config: &GameConfig,
        outcome: FocusOutcome,
    ) -> Option<FocusSession> {
        let reward = FocusReward::from_elapsed(&config.rules.focus, outcome.elapsed_seconds);
        if !reward.counts() {
            log::debug!("focus: {}s elapsed, nothing to record", outcome.elapsed_seconds);
            return None;
        }
        let (diamonds, exp) = match outcome.status {
            FocusStatus::Completed => (reward.diamonds, reward.exp),
            FocusStatus::Aborted   => (0, 0),
        };

        self.add_diamonds(diamonds);
        let levels = self.add_exp(exp);
        if levels > 0 {
            log::info!("focus: reached level {} (+{levels})", self.level);
        }
        self.record_session(
            config,
            FocusDraft {
                start_time: outcome.start_time,
                end_time: outcome.end_time,
                planned_duration: outcome.planned_minutes,
                actual_duration: reward.minutes,
                diamonds_earned: diamonds,
                exp_earned: exp,
                status: outcome.status,
            },
            outcome.status == FocusStatus::Completed,
        )
    }
}

// ── Timer state machine ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Finished,
    Abandoned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot {action} a timer that is {from:?}")]
    InvalidTransition { from: TimerPhase, action: &'static str },
}

/// `idle -> running -> (paused <-> running) -> finished | abandoned`.
///
/// A countdown (planned > 0) finishes itself when `tick` reaches the
/// planned length; count-up mode (planned = 0) runs until `finish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    phase:           TimerPhase,
    planned_minutes: Amount,
    elapsed_seconds: u64,
    started_at:      Option<Timestamp>,
}

impl Default for FocusTimer {
    fn default() -> Self { Self::new() }
}

impl FocusTimer {
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            planned_minutes: 0,
            elapsed_seconds: 0,
            started_at: None,
        }
    }

    pub fn phase(&self) -> TimerPhase { self.phase }
    pub fn elapsed_seconds(&self) -> u64 { self.elapsed_seconds }
    pub fn planned_minutes(&self) -> Amount { self.planned_minutes }

    pub fn is_count_up(&self) -> bool {
        self.planned_minutes == 0
    }

    fn planned_seconds(&self) -> u64 {
        self.planned_minutes.saturating_mul(60)
    }

    /// Seconds left on a countdown; always 0 in count-up mode.
    pub fn remaining_seconds(&self) -> u64 {
        if self.is_count_up() {
            return 0;
        }
        self.planned_seconds().saturating_sub(self.elapsed_seconds)
    }

    /// Ring fill in [0, 1]. Count-up mode fills over one hour.
    pub fn progress(&self) -> f64 {
        let total = if self.is_count_up() { 3600 } else { self.planned_seconds() };
        (self.elapsed_seconds as f64 / total as f64).min(1.0)
    }

    fn reject(&self, action: &'static str) -> TimerError {
        TimerError::InvalidTransition { from: self.phase, action }
    }

    pub fn start(&mut self, planned_minutes: Amount, now: Timestamp) -> Result<(), TimerError> {
        if matches!(self.phase, TimerPhase::Running | TimerPhase::Paused) {
            return Err(self.reject("start"));
        }
        self.phase = TimerPhase::Running;
        self.planned_minutes = planned_minutes;
        self.elapsed_seconds = 0;
        self.started_at = Some(now);
        Ok(())
    }

    /// Add running time. Returns the outcome when a countdown completes.
    pub fn tick(&mut self, seconds: u64, now: Timestamp) -> Result<Option<FocusOutcome>, TimerError> {
        if self.phase != TimerPhase::Running {
            return Err(self.reject("tick"));
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(seconds);
        if !self.is_count_up() && self.elapsed_seconds >= self.planned_seconds() {
            self.elapsed_seconds = self.planned_seconds();
            return self.finish(now).map(Some);
        }
        Ok(None)
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if self.phase != TimerPhase::Running {
            return Err(self.reject("pause"));
        }
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.phase != TimerPhase::Paused {
            return Err(self.reject("resume"));
        }
        self.phase = TimerPhase::Running;
        Ok(())
    }

    /// End the run and keep what was earned so far.
    pub fn finish(&mut self, now: Timestamp) -> Result<FocusOutcome, TimerError> {
        if !matches!(self.phase, TimerPhase::Running | TimerPhase::Paused) {
            return Err(self.reject("finish"));
        }
        self.phase = TimerPhase::Finished;
        Ok(FocusOutcome {
            start_time: self.started_at.unwrap_or(now),
            end_time: now,
            planned_minutes: self.planned_minutes,
            elapsed_seconds: self.elapsed_seconds,
            status: FocusStatus::Completed,
        })
    }

    /// Give up; nothing is recorded.
    pub fn abandon(&mut self) -> Result<(), TimerError> {
        if !matches!(self.phase, TimerPhase::Running | TimerPhase::Paused) {
            return Err(self.reject("abandon"));
        }
        self.phase = TimerPhase::Abandoned;
        Ok(())
    }
}

//! Focus session rewards, ledger and timer state machine.

mod common;

use chrono::Duration;
use common::{config, fresh_state, init_logging, t0};
use island_core::{
    focus::{FocusDraft, FocusOutcome, FocusReward, FocusTimer, TimerError, TimerPhase},
    state::{FocusStatus, TaskStatus},
};

fn outcome(elapsed_seconds: u64, status: FocusStatus) -> FocusOutcome {
    FocusOutcome {
        start_time: t0(),
        end_time: t0() + Duration::seconds(elapsed_seconds as i64),
        planned_minutes: 45,
        elapsed_seconds,
        status,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reward formula
// ─────────────────────────────────────────────────────────────────────────────

/// 47 minutes: 47 + floor(47/25)*10 = 57 diamonds, 47 exp.
#[test]
fn forty_seven_minutes_earns_fifty_seven_diamonds() {
    let config = config();
    let r = FocusReward::from_elapsed(&config.rules.focus, 47 * 60 + 59);
    assert_eq!(r, FocusReward { minutes: 47, diamonds: 57, exp: 47 });
}

#[test]
fn bonus_applies_per_complete_block() {
    let rules = &config().rules.focus;
    assert_eq!(FocusReward::from_elapsed(rules, 24 * 60).diamonds, 24);
    assert_eq!(FocusReward::from_elapsed(rules, 25 * 60).diamonds, 35);
    assert_eq!(FocusReward::from_elapsed(rules, 50 * 60).diamonds, 70);
    assert_eq!(FocusReward::from_elapsed(rules, 60 * 60).diamonds, 80);
}

#[test]
fn under_one_minute_does_not_count() {
    let config = config();
    let mut state = fresh_state();
    let before = state.clone();

    assert!(!FocusReward::from_elapsed(&config.rules.focus, 59).counts());
    assert!(state.complete_focus_with_rewards(&config, outcome(59, FocusStatus::Completed)).is_none());
    assert_eq!(state, before, "discarded session must leave no trace");
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn complete_focus_records_without_crediting() {
    init_logging();
    let config = config();
    let mut state = fresh_state();

    let session = state
        .complete_focus(
            &config,
            FocusDraft {
                start_time: t0(),
                end_time: t0() + Duration::minutes(20),
                planned_duration: 25,
                actual_duration: 20,
                diamonds_earned: 20,
                exp_earned: 20,
                status: FocusStatus::Completed,
            },
        )
        .expect("session recorded");

    assert_eq!(state.diamonds, 100, "complete_focus must not credit");
    assert_eq!(state.exp, 0);
    assert_eq!(state.total_focus_minutes, 20);
    assert_eq!(state.focus_history[0].id, session.id);
    assert!(!session.id.is_empty());
    assert_eq!(state.task("daily_focus_30").unwrap().progress, 20);
    assert_eq!(state.task("weekly_focus_300").unwrap().progress, 20);
}

/// History is newest first, ids are unique and focus tasks cap at target.
#[test]
fn sessions_prepend_and_focus_tasks_cap() {
    let config = config();
    let mut state = fresh_state();

    let first = state
        .complete_focus_with_rewards(&config, outcome(25 * 60, FocusStatus::Completed))
        .unwrap();
    let second = state
        .complete_focus_with_rewards(&config, outcome(10 * 60, FocusStatus::Completed))
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(state.focus_history.len(), 2);
    assert_eq!(state.focus_history[0].id, second.id);
    assert_eq!(state.total_focus_minutes, 35);

    let daily = state.task("daily_focus_30").unwrap();
    assert_eq!(daily.progress, 30);
    assert_eq!(daily.status, TaskStatus::Completed);
    let weekly = state.task("weekly_focus_300").unwrap();
    assert_eq!(weekly.progress, 35);
    assert_eq!(weekly.status, TaskStatus::Active);
}

/// The combined operation matches calling add_diamonds + add_exp +
/// complete_focus by hand.
#[test]
fn rewarded_completion_matches_manual_three_calls() {
    let config = config();
    let mut combined = fresh_state();
    let mut manual = fresh_state();

    let session = combined
        .complete_focus_with_rewards(&config, outcome(47 * 60, FocusStatus::Completed))
        .unwrap();
    assert_eq!(session.diamonds_earned, 57);
    assert_eq!(session.exp_earned, 47);

    manual.add_diamonds(57);
    manual.add_exp(47);
    manual.complete_focus(
        &config,
        FocusDraft {
            start_time: session.start_time,
            end_time: session.end_time,
            planned_duration: session.planned_duration,
            actual_duration: 47,
            diamonds_earned: 57,
            exp_earned: 47,
            status: FocusStatus::Completed,
        },
    );

    assert_eq!(combined.diamonds, manual.diamonds);
    assert_eq!((combined.level, combined.exp), (manual.level, manual.exp));
    assert_eq!(combined.total_focus_minutes, manual.total_focus_minutes);
    assert_eq!(combined.tasks, manual.tasks);
    assert_eq!(combined.diamonds, 157);
}

#[test]
fn aborted_session_is_logged_without_rewards() {
    let config = config();
    let mut state = fresh_state();

    let session = state
        .complete_focus_with_rewards(&config, outcome(12 * 60, FocusStatus::Aborted))
        .unwrap();

    assert_eq!(session.status, FocusStatus::Aborted);
    assert_eq!(session.actual_duration, 12);
    assert_eq!(session.diamonds_earned, 0);
    assert_eq!(state.diamonds, 100);
    assert_eq!(state.total_focus_minutes, 0);
    assert_eq!(state.task("daily_focus_30").unwrap().progress, 0);
    assert_eq!(state.focus_history.len(), 1);
}

/// The record-only path counts an aborted draft like any other session.
#[test]
fn recorded_aborted_draft_still_counts_minutes() {
    let config = config();
    let mut state = fresh_state();

    let session = state
        .complete_focus(
            &config,
            FocusDraft {
                start_time: t0(),
                end_time: t0() + Duration::minutes(12),
                planned_duration: 25,
                actual_duration: 12,
                diamonds_earned: 0,
                exp_earned: 0,
                status: FocusStatus::Aborted,
            },
        )
        .unwrap();

    assert_eq!(session.status, FocusStatus::Aborted);
    assert_eq!(state.diamonds, 100);
    assert_eq!(state.total_focus_minutes, 12);
    assert_eq!(state.task("daily_focus_30").unwrap().progress, 12);
    assert_eq!(state.task("weekly_focus_300").unwrap().progress, 12);
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn countdown_finishes_itself_at_planned_length() {
    let mut timer = FocusTimer::new();
    timer.start(25, t0()).unwrap();

    assert_eq!(timer.tick(24 * 60, t0()).unwrap(), None);
    assert_eq!(timer.remaining_seconds(), 60);

    let end = t0() + Duration::minutes(25);
    let done = timer.tick(120, end).unwrap().expect("countdown should finish");

    assert_eq!(timer.phase(), TimerPhase::Finished);
    assert_eq!(done.elapsed_seconds, 25 * 60);
    assert_eq!(done.start_time, t0());
    assert_eq!(done.end_time, end);
    assert_eq!(done.status, FocusStatus::Completed);
}

#[test]
fn pause_and_resume_keep_elapsed_time() {
    let mut timer = FocusTimer::new();
    timer.start(0, t0()).unwrap();
    assert!(timer.is_count_up());

    timer.tick(600, t0()).unwrap();
    timer.pause().unwrap();
    assert_eq!(
        timer.tick(5, t0()),
        Err(TimerError::InvalidTransition { from: TimerPhase::Paused, action: "tick" })
    );
    timer.resume().unwrap();
    timer.tick(1200, t0()).unwrap();

    assert_eq!(timer.elapsed_seconds(), 1800);
    assert!((timer.progress() - 0.5).abs() < 1e-9);

    let done = timer.finish(t0() + Duration::minutes(30)).unwrap();
    assert_eq!(done.planned_minutes, 0);
    assert_eq!(done.elapsed_seconds, 1800);
}

#[test]
fn illegal_transitions_are_rejected() {
    let mut timer = FocusTimer::new();
    assert!(timer.pause().is_err());
    assert!(timer.resume().is_err());
    assert!(timer.finish(t0()).is_err());

    timer.start(45, t0()).unwrap();
    assert!(timer.start(45, t0()).is_err());
    assert!(timer.resume().is_err());

    timer.abandon().unwrap();
    assert_eq!(timer.phase(), TimerPhase::Abandoned);
    assert!(timer.finish(t0()).is_err());

    // A new run can begin after abandoning.
    timer.start(25, t0()).unwrap();
    assert_eq!(timer.elapsed_seconds(), 0);
}

//! Engine-level operations driven by a manual clock.

mod common;

use chrono::Duration;
use common::{clock_at, config, init_logging, t0};
use island_core::{
    engine::GameEngine,
    focus::FocusTimer,
    grid::GridRefusal,
    state::{BuildingType, FocusStatus, TaskStatus},
};

fn session_only() -> (GameEngine, std::sync::Arc<island_core::clock::ManualClock>) {
    let clock = clock_at(t0());
    (GameEngine::open(None, config(), clock.clone()), clock)
}

#[test]
fn first_launch_state() {
    init_logging();
    let (engine, _) = session_only();
    let state = engine.state();

    assert_eq!(state.nickname, "岛主");
    assert_eq!((state.level, state.exp, state.diamonds), (1, 0, 100));
    assert_eq!(state.buildings.len(), 1);
    assert_eq!((state.buildings[0].x, state.buildings[0].y), (2, 2));
    assert_eq!(state.created_at, t0());
    assert!(!engine.reconciliation().changed());
}

#[test]
fn refusals_report_their_reason() {
    let (mut engine, _) = session_only();

    assert_eq!(engine.try_place_building(BuildingType::Road, 2, 2), Err(GridRefusal::Occupied));
    assert_eq!(engine.try_place_building(BuildingType::Road, 9, 0), Err(GridRefusal::OutOfBounds));
    assert!(!engine.place_building(BuildingType::Lighthouse, 0, 0));
    assert!(!engine.upgrade_building("missing"));
    assert_eq!(engine.remove_building("missing"), None);
    assert_eq!(engine.state().diamonds, 100);
}

/// Income follows the injected clock, not the wall clock.
#[test]
fn idle_income_follows_the_clock() {
    let (mut engine, clock) = session_only();

    clock.advance(Duration::minutes(59));
    assert_eq!(engine.pending_income(), 0);
    assert_eq!(engine.collect_building_income(), 0);

    clock.set(t0() + Duration::minutes(3 * 60));
    assert_eq!(engine.pending_income(), 9);
    assert_eq!(engine.collect_building_income(), 9);
    assert_eq!(engine.state().diamonds, 109);
}

/// A countdown overrunning its plan stops at the planned length.
#[test]
fn timer_outcome_feeds_rewarded_completion() {
    let (mut engine, _) = session_only();
    let mut timer = FocusTimer::new();
    timer.start(45, t0()).unwrap();

    let outcome = timer
        .tick(47 * 60, t0() + Duration::minutes(47))
        .unwrap()
        .expect("countdown ends at its planned length");
    let session = engine.complete_focus_with_rewards(outcome).unwrap();

    assert_eq!(session.status, FocusStatus::Completed);
    assert_eq!(session.actual_duration, 45);
    assert_eq!(session.diamonds_earned, 55); // 45 + 1 bonus block
    assert_eq!(engine.state().diamonds, 155);
    assert_eq!(engine.state().total_focus_minutes, 45);
    assert_eq!(engine.state().focus_history.len(), 1);
}

#[test]
fn claim_and_nickname() {
    let (mut engine, _) = session_only();

    assert!(engine.claim_task("daily_login"));
    assert!(!engine.claim_task("daily_login"));
    assert_eq!(engine.state().task("daily_login").unwrap().status, TaskStatus::Claimed);
    assert_eq!(engine.state().diamonds, 110);

    assert!(engine.set_nickname("  Captain  "));
    assert_eq!(engine.state().nickname, "Captain");
    assert!(!engine.set_nickname("   "));
    assert_eq!(engine.state().nickname, "Captain");
}

#[test]
fn exp_grants_level_up_through_engine() {
    let (mut engine, _) = session_only();

    engine.add_exp(250);

    assert_eq!(engine.state().level, 3); // 250 - 100 - 150
    assert_eq!(engine.state().exp, 0);
}

/// Stats built from the engine's clock follow the injected time source.
#[test]
fn stats_use_the_engine_clock() {
    use island_core::{
        clock::Clock,
        focus::FocusOutcome,
        stats::{FocusStats, StatsPeriod},
    };
    let (mut engine, clock) = session_only();
    let outcome = FocusOutcome {
        start_time: t0(),
        end_time: t0() + Duration::minutes(30),
        planned_minutes: 30,
        elapsed_seconds: 30 * 60,
        status: FocusStatus::Completed,
    };
    engine.complete_focus_with_rewards(outcome).unwrap();

    let today = FocusStats::for_period(&engine.state().focus_history, StatsPeriod::Day, engine.clock());
    assert_eq!(today.total_minutes, 30);
    assert_eq!(engine.clock().now(), t0());

    clock.advance(Duration::days(1));
    let next_day = FocusStats::for_period(&engine.state().focus_history, StatsPeriod::Day, engine.clock());
    assert_eq!(next_day.sessions, 0);
}

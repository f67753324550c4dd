//! Shared engine handle: background load and exclusive access.

mod common;

use chrono::FixedOffset;
use common::{clock_at, config, init_logging, t0};
use island_core::{
    clock::{Clock, ManualClock},
    engine::GameEngine,
    handle::GameHandle,
    state::BuildingType,
    store::GameStore,
    types::Timestamp,
};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Clock whose `now()` blocks until `release` is called, holding a
/// background load in progress.
struct GatedClock {
    inner:  ManualClock,
    open:   Mutex<bool>,
    opened: Condvar,
}

impl GatedClock {
    fn new() -> Self {
        Self { inner: ManualClock::new(t0()), open: Mutex::new(false), opened: Condvar::new() }
    }

    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl Clock for GatedClock {
    fn now(&self) -> Timestamp {
        let open = self.open.lock().unwrap();
        drop(self.opened.wait_while(open, |open| !*open).unwrap());
        self.inner.now()
    }

    fn local_offset(&self) -> FixedOffset {
        self.inner.local_offset()
    }
}

/// Until load and reconciliation finish the handle refuses operations.
#[test]
fn handle_is_loading_until_load_finishes() {
    init_logging();
    let clock = Arc::new(GatedClock::new());
    let handle = GameHandle::load(Some(GameStore::in_memory().unwrap()), config(), clock.clone());

    assert!(handle.is_loading());
    assert_eq!(handle.with_engine(|engine| engine.state().diamonds), None);
    assert!(handle.snapshot().is_none());
    assert!(!handle.wait_ready(Duration::from_millis(50)));

    clock.release();

    assert!(handle.wait_ready(Duration::from_secs(10)));
    assert!(!handle.is_loading());
    assert_eq!(handle.with_engine(|engine| engine.state().diamonds), Some(100));
}

#[test]
fn background_load_becomes_ready() {
    init_logging();
    let store = GameStore::in_memory().unwrap();
    let handle = GameHandle::load(Some(store), config(), clock_at(t0()));

    assert!(handle.wait_ready(Duration::from_secs(10)), "load should finish");
    assert!(!handle.is_loading());

    let diamonds = handle.with_engine(|engine| {
        engine.add_diamonds(25);
        engine.state().diamonds
    });
    assert_eq!(diamonds, Some(125));
}

/// Clones share one engine; changes through one are seen by the other.
#[test]
fn clones_share_the_same_engine() {
    let engine = GameEngine::open(None, config(), clock_at(t0()));
    let handle = GameHandle::ready(engine);
    let other = handle.clone();

    let placed = other.with_engine(|engine| engine.place_building(BuildingType::Tree, 0, 0));
    assert_eq!(placed, Some(true));

    let state = handle.snapshot().unwrap();
    assert_eq!(state.buildings.len(), 2);
    assert_eq!(state.diamonds, 70);
}

#[test]
fn operations_from_many_threads_are_serialized() {
    let handle = GameHandle::ready(GameEngine::open(None, config(), clock_at(t0())));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    handle.with_engine(|engine| engine.add_diamonds(1));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(handle.snapshot().unwrap().diamonds, 100 + 8 * 50);
}

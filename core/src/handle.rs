//! Shared, explicitly passed handle to the engine.
//!
//! The presentation layer receives a `GameHandle` from whoever builds the
//! app; there is no global. One coarse mutex guards the whole engine, so
//! each operation is a critical section. Until the background load and
//! reconciliation finish the handle reports `is_loading()` and refuses
//! operations.

use crate::{
    clock::Clock,
    config::GameConfig,
    engine::GameEngine,
    state::GameState,
    store::GameStore,
};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

type LoadJob = Mutex<Option<(Option<GameStore>, GameConfig, Arc<dyn Clock>)>>;

#[derive(Default)]
struct Inner {
    engine: Mutex<Option<GameEngine>>,
    ready:  Condvar,
}

#[derive(Clone)]
pub struct GameHandle {
    inner: Arc<Inner>,
}

impl GameHandle {
    /// Wrap an engine that is already open.
    pub fn ready(engine: GameEngine) -> Self {
        let inner = Inner { engine: Mutex::new(Some(engine)), ready: Condvar::new() };
        Self { inner: Arc::new(inner) }
    }

    /// Start loading on a background thread and return immediately.
    pub fn load(store: Option<GameStore>, config: GameConfig, clock: Arc<dyn Clock>) -> Self {
        let handle = Self { inner: Arc::new(Inner::default()) };
        let job = Arc::new(Mutex::new(Some((store, config, clock))));

        let loader = handle.clone();
        let loader_job = Arc::clone(&job);
        let spawned = std::thread::Builder::new()
            .name("game-loader".into())
            .spawn(move || loader.run_load(&loader_job));
        if let Err(e) = spawned {
            log::warn!("handle: cannot spawn loader thread ({e}), loading inline");
            handle.run_load(&job);
        }
        handle
    }

    fn run_load(&self, job: &LoadJob) {
        let taken = job.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some((store, config, clock)) = taken {
            self.install(GameEngine::open(store, config, clock));
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<GameEngine>> {
        self.inner.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn install(&self, engine: GameEngine) {
        *self.lock() = Some(engine);
        self.inner.ready.notify_all();
    }

    /// True until the initial load and reconciliation have completed.
    pub fn is_loading(&self) -> bool {
        self.lock().is_none()
    }

    /// Block until ready or `timeout` passes. Returns whether it is ready.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .inner
            .ready
            .wait_timeout_while(guard, timeout, |engine| engine.is_none())
            .unwrap_or_else(|e| e.into_inner());
        guard.is_some()
    }

    /// Run `f` with exclusive access. `None` while still loading.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut GameEngine) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    /// Owned copy of the current state, once loaded.
    pub fn snapshot(&self) -> Option<GameState> {
        self.with_engine(|engine| engine.snapshot())
    }
}

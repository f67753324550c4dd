//! island-runner: headless driver for the island engine.
//!
//! Usage:
//!   island-runner --db island.db
//!   island-runner --db island.db --data-dir ./data --ipc-mode
//!
//! In IPC mode each stdin line is one JSON command; the resulting state is
//! written back as one JSON line.

use anyhow::Result;
use chrono::Duration;
use island_core::{
    clock::{Clock, SystemClock},
    config::GameConfig,
    engine::GameEngine,
    focus::FocusOutcome,
    handle::GameHandle,
    state::{BuildingType, FocusStatus, GameState},
    stats::{building_summary, daily_minutes, BuildingSummary, FocusStats, ProfileSummary, StatsPeriod},
    store::GameStore,
    types::Amount,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const LOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    PlaceBuilding {
        building_type: BuildingType,
        x: u32,
        y: u32,
    },
    UpgradeBuilding {
        id: String,
    },
    RemoveBuilding {
        id: String,
    },
    CollectIncome,
    /// A session that just ended after `minutes`.
    Focus {
        minutes: Amount,
        #[serde(default)]
        planned_minutes: Amount,
        #[serde(default)]
        aborted: bool,
    },
    ClaimTask {
        task_id: String,
    },
    SetNickname {
        name: String,
    },
    Stats {
        period: StatsPeriod,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    /// Whether the last command took effect.
    ok:             bool,
    pending_income: Amount,
    persistent:     bool,
    profile:        ProfileSummary,
    buildings:      Vec<BuildingSummary>,
    stats:          FocusStats,
    state:          GameState,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = parse_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = parse_arg(&args, "--data-dir");

    let config = match data_dir {
        Some(dir) => GameConfig::load(dir)?,
        None => GameConfig::builtin()?,
    };

    if !ipc_mode {
        println!("Island Focus: island-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {}", data_dir.unwrap_or("(builtin)"));
        println!();
    }

    let store = match GameStore::open(db) {
        Ok(store) => Some(store),
        Err(e) => {
            log::error!("runner: cannot open {db}: {e}; progress will not be saved");
            None
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let handle = GameHandle::load(store, config, clock);
    if !handle.wait_ready(LOAD_TIMEOUT) {
        anyhow::bail!("game did not finish loading within {LOAD_TIMEOUT:?}");
    }

    if ipc_mode {
        run_ipc_loop(&handle)?;
    } else if let Some(summary) = handle.with_engine(|engine| print_summary(engine)) {
        summary?;
    }

    handle
        .with_engine(|engine| engine.flush())
        .transpose()?;
    Ok(())
}

fn run_ipc_loop(handle: &GameHandle) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = input.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = handle.with_engine(|engine| {
            let (ok, period) = handle_command(engine, cmd);
            build_ui_state(engine, ok, period)
        });
        match reply {
            Some(state) => writeln!(stdout, "{}", serde_json::to_string(&state)?)?,
            None => writeln!(stdout, "{}", serde_json::json!({ "error": "loading" }))?,
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Apply one command. Returns whether it took effect and the stats period
/// to report.
fn handle_command(engine: &mut GameEngine, cmd: IpcCommand) -> (bool, StatsPeriod) {
    let mut period = StatsPeriod::Day;
    let ok = match cmd {
        IpcCommand::GetState | IpcCommand::Quit => true,
        IpcCommand::PlaceBuilding { building_type, x, y } => {
            engine.place_building(building_type, x, y)
        }
        IpcCommand::UpgradeBuilding { id } => engine.upgrade_building(&id),
        IpcCommand::RemoveBuilding { id } => engine.remove_building(&id).is_some(),
        IpcCommand::CollectIncome => engine.collect_building_income() > 0,
        IpcCommand::Focus { minutes, planned_minutes, aborted } => {
            let end_time = engine.now();
            let span = i64::try_from(minutes)
                .ok()
                .and_then(Duration::try_minutes)
                .unwrap_or_else(Duration::zero);
            let start_time = end_time.checked_sub_signed(span).unwrap_or(end_time);
            let outcome = FocusOutcome {
                start_time,
                end_time,
                planned_minutes,
                elapsed_seconds: minutes.saturating_mul(60),
                status: if aborted { FocusStatus::Aborted } else { FocusStatus::Completed },
            };
            engine.complete_focus_with_rewards(outcome).is_some()
        }
        IpcCommand::ClaimTask { task_id } => engine.claim_task(&task_id),
        IpcCommand::SetNickname { name } => engine.set_nickname(&name),
        IpcCommand::Stats { period: requested } => {
            period = requested;
            true
        }
    };
    if !ok {
        log::warn!("runner: command had no effect");
    }
    (ok, period)
}

fn build_ui_state(engine: &GameEngine, ok: bool, period: StatsPeriod) -> UiState {
    let state = engine.snapshot();
    UiState {
        ok,
        pending_income: engine.pending_income(),
        persistent: engine.is_persistent(),
        profile: ProfileSummary::of(&state, engine.now()),
        buildings: building_summary(&state.buildings),
        stats: FocusStats::for_period(&state.focus_history, period, engine.clock()),
        state,
    }
}

fn print_summary(engine: &GameEngine) -> Result<()> {
    let state = engine.state();
    let clock = engine.clock();
    let profile = ProfileSummary::of(state, engine.now());
    let period = StatsPeriod::Week;
    let week = FocusStats::for_period(&state.focus_history, period, clock);
    let grid = engine.config().rules.grid_size;

    println!("=== ISLAND SUMMARY ===");
    println!("  nickname:       {}", profile.nickname);
    println!("  level:          {} ({}/{} exp)", profile.level, profile.exp, profile.exp_needed);
    println!("  diamonds:       {}", state.diamonds);
    println!("  pending income: {}", engine.pending_income());
    println!("  focus minutes:  {}", profile.total_focus_minutes);
    println!("  days on island: {}", profile.days_since_creation);
    println!("  saved:          {} ({} failed writes)", engine.is_persistent(), engine.write_failures());

    println!();
    println!("=== BUILDINGS ({}/{} cells) ===", state.buildings.len(), grid * grid);
    let rows = building_summary(&state.buildings);
    if rows.is_empty() {
        println!("  (Nothing built yet)");
    }
    for row in rows {
        println!("  {:<10} x{} (max level {})", row.building_type.as_str(), row.count, row.max_level);
    }

    println!();
    println!("=== LAST {} DAYS ===", period.days());
    println!(
        "  {} sessions | {} min | {} diamonds | avg {} min",
        week.sessions, week.total_minutes, week.total_diamonds, week.avg_minutes
    );
    let today = clock.today();
    for (date, minutes) in daily_minutes(&state.focus_history, period.days(), clock) {
        let marker = if date == today { " <- today" } else { "" };
        println!("  {date} {minutes:>4} min{marker}");
    }

    println!();
    println!("=== TASKS ===");
    for t in &state.tasks {
        println!("  {:<18} {:>4}/{:<4} {:?}", t.id, t.progress, t.target, t.status);
    }
    Ok(())
}

fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

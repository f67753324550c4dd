//! The `GameState` aggregate and its entities.
//!
//! Field names serialize in camelCase so the persisted document keeps the
//! layout the app has always written.

use crate::{
    config::GameConfig,
    leveling::{apply_exp, LevelProgress},
    tasks::instantiate_templates,
    types::{new_entity_id, Amount, EntityId, Timestamp},
};
use serde::{Deserialize, Serialize};

/// Version written into every snapshot. Bump together with a migration
/// step in `snapshot.rs`.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    House,
    Windmill,
    Lighthouse,
    Tree,
    Road,
}

impl BuildingType {
    pub const ALL: [BuildingType; 5] = [
        BuildingType::House,
        BuildingType::Windmill,
        BuildingType::Lighthouse,
        BuildingType::Tree,
        BuildingType::Road,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingType::House      => "house",
            BuildingType::Windmill   => "windmill",
            BuildingType::Lighthouse => "lighthouse",
            BuildingType::Tree       => "tree",
            BuildingType::Road       => "road",
        }
    }
}

impl std::str::FromStr for BuildingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown building type '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub placed_at: Timestamp,
    pub last_collected_at: Timestamp,
}

impl Building {
    pub fn new(building_type: BuildingType, x: u32, y: u32, now: Timestamp) -> Self {
        Self {
            id: new_entity_id(),
            building_type,
            level: 1,
            x,
            y,
            placed_at: now,
            last_collected_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusStatus {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: EntityId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Minutes; 0 means open-ended count-up.
    pub planned_duration: Amount,
    pub actual_duration: Amount,
    pub diamonds_earned: Amount,
    pub exp_earned: Amount,
    pub status: FocusStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    Completed,
    Claimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub progress: Amount,
    pub target: Amount,
    pub reward_diamonds: Amount,
    pub reward_exp: Amount,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub schema_version: u32,
    pub nickname: String,
    pub diamonds: Amount,
    pub level: u32,
    pub exp: Amount,
    pub total_focus_minutes: Amount,
    pub buildings: Vec<Building>,
    /// Newest first.
    pub focus_history: Vec<FocusSession>,
    pub tasks: Vec<DailyTask>,
    pub last_task_reset: Timestamp,
    pub last_weekly_reset: Timestamp,
    pub created_at: Timestamp,
}

impl GameState {
    /// Fresh state for a first launch: starting balance, the starter
    /// building in its fixed cell and the full task catalog.
    pub fn initial(config: &GameConfig, now: Timestamp) -> Self {
        let initial = &config.rules.initial;
        let mut tasks = instantiate_templates(&config.tasks, TaskKind::Daily);
        tasks.extend(instantiate_templates(&config.tasks, TaskKind::Weekly));
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            nickname: initial.nickname.clone(),
            diamonds: initial.diamonds,
            level: 1,
            exp: 0,
            total_focus_minutes: 0,
            buildings: vec![Building::new(
                initial.starter_building,
                initial.starter_x,
                initial.starter_y,
                now,
            )],
            focus_history: Vec::new(),
            tasks,
            last_task_reset: now,
            last_weekly_reset: now,
            created_at: now,
        }
    }

    // ── Currency ───────────────────────────────────────────────

    pub fn add_diamonds(&mut self, amount: Amount) {
        self.diamonds = self.diamonds.saturating_add(amount);
    }

    /// Debit only when the whole amount is covered. Never partial.
    pub fn spend_diamonds(&mut self, amount: Amount) -> bool {
        match self.diamonds.checked_sub(amount) {
            Some(rest) => {
                self.diamonds = rest;
                true
            }
            None => false,
        }
    }

    // ── Experience ─────────────────────────────────────────────

    /// Returns the number of levels gained.
    pub fn add_exp(&mut self, amount: Amount) -> u32 {
        let LevelProgress { level, exp, levels_gained } = apply_exp(self.level, self.exp, amount);
        self.level = level;
        self.exp = exp;
        levels_gained
    }

    // ── Lookups ────────────────────────────────────────────────

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn building_at(&self, x: u32, y: u32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.x == x && b.y == y)
    }

    pub fn task(&self, id: &str) -> Option<&DailyTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn set_nickname(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.nickname = trimmed.to_string();
        true
    }
}

//! Static catalog data: buildings, task templates and game rules.
//!
//! The catalogs live as JSON under `data/` so balance changes never touch
//! engine control flow. `GameConfig::load` reads them from disk;
//! `GameConfig::builtin` uses the copies compiled into the crate.

use crate::{
    state::{BuildingType, TaskKind},
    types::Amount,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSpec {
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    /// Display name.
    pub name: String,
    /// Placement cost; removal refunds half of it.
    pub cost: Amount,
    pub upgrade_cost_per_level: Amount,
    /// Diamonds per level per full income period.
    pub hourly_production: Amount,
}

#[derive(Debug, Clone, Deserialize)]
struct BuildingCatalogFile {
    buildings: Vec<BuildingSpec>,
}

/// What advances a task automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTrigger {
    /// Satisfied by launching the app; usually instantiated pre-completed.
    AppOpen,
    /// Advanced by the minutes of each recorded focus session.
    FocusMinutes,
    /// Advanced by one per successful placement.
    BuildingPlaced,
    /// Only `update_task_progress` moves it.
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub trigger: TaskTrigger,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub target: Amount,
    pub reward_diamonds: Amount,
    pub reward_exp: Amount,
    #[serde(default)]
    pub initially_completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TaskTemplatesFile {
    templates: Vec<TaskTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialStateConfig {
    pub nickname: String,
    pub diamonds: Amount,
    pub starter_building: BuildingType,
    pub starter_x: u32,
    pub starter_y: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusPreset {
    pub label: String,
    /// 0 = free (count-up) mode.
    pub minutes: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusRules {
    pub bonus_block_minutes: Amount,
    pub bonus_per_block: Amount,
    pub presets: Vec<FocusPreset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRules {
    /// Side length of the square island grid.
    pub grid_size: u32,
    pub income_period_minutes: i64,
    /// `None` leaves upgrades unbounded.
    #[serde(default)]
    pub max_building_level: Option<u32>,
    pub initial: InitialStateConfig,
    pub focus: FocusRules,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rules:     GameRules,
    pub buildings: BTreeMap<BuildingType, BuildingSpec>,
    pub tasks:     Vec<TaskTemplate>,
}

const BUILTIN_BUILDINGS: &str = include_str!("../../data/buildings/building_catalog.json");
const BUILTIN_TASKS: &str = include_str!("../../data/tasks/task_templates.json");
const BUILTIN_RULES: &str = include_str!("../../data/game/game_rules.json");

impl GameConfig {
    /// Load from the data/ directory.
    /// In tests, use GameConfig::builtin().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let building_path = format!("{data_dir}/buildings/building_catalog.json");
        let building_content = std::fs::read_to_string(&building_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {building_path}: {e}"))?;

        let task_path = format!("{data_dir}/tasks/task_templates.json");
        let task_content = std::fs::read_to_string(&task_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {task_path}: {e}"))?;

        let rules_path = format!("{data_dir}/game/game_rules.json");
        let rules_content = std::fs::read_to_string(&rules_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {rules_path}: {e}"))?;

        let config = Self::from_json(&building_content, &task_content, &rules_content)?;
        log::info!(
            "config: loaded {} building types and {} task templates from {data_dir}",
            config.buildings.len(),
            config.tasks.len()
        );
        Ok(config)
    }

    /// Catalogs compiled into the crate.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(BUILTIN_BUILDINGS, BUILTIN_TASKS, BUILTIN_RULES)
    }

    pub fn from_json(buildings: &str, tasks: &str, rules: &str) -> anyhow::Result<Self> {
        let building_file: BuildingCatalogFile = serde_json::from_str(buildings)
            .map_err(|e| anyhow::anyhow!("Invalid building catalog: {e}"))?;
        let task_file: TaskTemplatesFile = serde_json::from_str(tasks)
            .map_err(|e| anyhow::anyhow!("Invalid task templates: {e}"))?;
        let rules: GameRules = serde_json::from_str(rules)
            .map_err(|e| anyhow::anyhow!("Invalid game rules: {e}"))?;

        let config = Self {
            rules,
            buildings: building_file
                .buildings
                .into_iter()
                .map(|b| (b.building_type, b))
                .collect(),
            tasks: task_file.templates,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for ty in BuildingType::ALL {
            if !self.buildings.contains_key(&ty) {
                anyhow::bail!("building catalog is missing '{}'", ty.as_str());
            }
        }

        let mut seen = HashSet::new();
        for t in &self.tasks {
            if t.target == 0 {
                anyhow::bail!("task template '{}' has a zero target", t.id);
            }
            if !seen.insert(t.id.as_str()) {
                anyhow::bail!("duplicate task template id '{}'", t.id);
            }
        }

        let rules = &self.rules;
        if rules.grid_size == 0 {
            anyhow::bail!("grid_size must be > 0");
        }
        if self.income_period().is_none() {
            anyhow::bail!(
                "income_period_minutes must be > 0 and fit in a duration (got {})",
                rules.income_period_minutes
            );
        }
        if !self.in_grid(rules.initial.starter_x, rules.initial.starter_y) {
            anyhow::bail!(
                "starter building at ({}, {}) lies outside a {}x{} grid",
                rules.initial.starter_x,
                rules.initial.starter_y,
                rules.grid_size,
                rules.grid_size
            );
        }
        if rules.focus.bonus_block_minutes == 0 {
            anyhow::bail!("focus bonus_block_minutes must be > 0");
        }
        if rules.max_building_level == Some(0) {
            anyhow::bail!("max_building_level must be >= 1 when set");
        }
        Ok(())
    }

    pub fn building(&self, ty: BuildingType) -> Option<&BuildingSpec> {
        self.buildings.get(&ty)
    }

    /// Length of one income period. `None` when the configured minutes are
    /// not positive or overflow `Duration`.
    pub fn income_period(&self) -> Option<Duration> {
        Duration::try_minutes(self.rules.income_period_minutes).filter(|p| *p > Duration::zero())
    }

    pub fn in_grid(&self, x: u32, y: u32) -> bool {
        x < self.rules.grid_size && y < self.rules.grid_size
    }

    pub fn templates(&self, kind: TaskKind) -> impl Iterator<Item = &TaskTemplate> {
        self.tasks.iter().filter(move |t| t.kind == kind)
    }

    /// Ids of the templates driven by `trigger`.
    pub fn task_ids_for(&self, trigger: TaskTrigger) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|t| t.trigger == trigger)
            .map(|t| t.id.as_str())
            .collect()
    }
}

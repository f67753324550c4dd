//! Daily and weekly tasks.
//!
//! Each task walks `active -> completed -> claimed` and never goes back.
//! Progress is clamped to `[0, target]`; hitting the target completes it.

use crate::{
    config::{GameConfig, TaskTemplate, TaskTrigger},
    state::{DailyTask, GameState, TaskKind, TaskStatus},
    types::Amount,
};

/// Fresh task instances for one partition, in catalog order.
pub fn instantiate_templates(templates: &[TaskTemplate], kind: TaskKind) -> Vec<DailyTask> {
    templates
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| {
            let (progress, status) = if t.initially_completed {
                (t.target, TaskStatus::Completed)
            } else {
                (0, TaskStatus::Active)
            };
            DailyTask {
                id: t.id.clone(),
                name: t.name.clone(),
                description: t.description.clone(),
                progress,
                target: t.target,
                reward_diamonds: t.reward_diamonds,
                reward_exp: t.reward_exp,
                status,
                kind: t.kind,
                icon: t.icon.clone(),
            }
        })
        .collect()
}

impl DailyTask {
    /// Returns true if the task changed.
    fn advance(&mut self, increment: Amount) -> bool {
        if self.status != TaskStatus::Active || increment == 0 {
            return false;
        }
        self.progress = self.progress.saturating_add(increment).min(self.target);
        if self.progress >= self.target {
            self.status = TaskStatus::Completed;
        }
        true
    }
}

/// What a successful claim paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReward {
    pub diamonds:      Amount,
    pub exp:           Amount,
    pub levels_gained: u32,
}

impl GameState {
    /// Advance one active task. Completed, claimed and unknown tasks are
    /// left alone. Returns true if anything changed.
    pub fn update_task_progress(&mut self, task_id: &str, increment: Amount) -> bool {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .is_some_and(|t| t.advance(increment))
    }

    /// Advance every active task whose template listens for `trigger`.
    pub fn advance_tasks(&mut self, config: &GameConfig, trigger: TaskTrigger, increment: Amount) {
        for id in config.task_ids_for(trigger) {
            if self.update_task_progress(id, increment) {
                log::debug!("tasks: {id} advanced by {increment} ({trigger:?})");
            }
        }
    }

    /// Pay out a completed task and mark it claimed. Anything other than
    /// `completed` is a no-op.
    pub fn claim_task(&mut self, task_id: &str) -> Option<ClaimReward> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id && t.status == TaskStatus::Completed)?;
        task.status = TaskStatus::Claimed;
        let (diamonds, exp) = (task.reward_diamonds, task.reward_exp);

        self.add_diamonds(diamonds);
        let levels_gained = self.add_exp(exp);
        Some(ClaimReward { diamonds, exp, levels_gained })
    }

    /// Replace one partition with fresh template instances; the other
    /// partition keeps its progress.
    pub fn reset_tasks(&mut self, config: &GameConfig, kind: TaskKind) {
        let fresh = instantiate_templates(&config.tasks, kind);
        let (mut daily, mut weekly): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.kind == TaskKind::Daily);
        match kind {
            TaskKind::Daily  => daily = fresh,
            TaskKind::Weekly => weekly = fresh,
        }
        daily.extend(weekly);
        self.tasks = daily;
    }
}

//! Read-only summaries for the stats and profile screens.

use crate::{
    clock::Clock,
    leveling::exp_for_level,
    state::{Building, BuildingType, FocusSession, GameState},
    types::{Amount, Timestamp},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsPeriod {
    /// Same calendar day as now.
    Day,
    /// Last 7×24h.
    Week,
    /// Last 30×24h.
    Month,
}

impl StatsPeriod {
    fn includes(self, clock: &dyn Clock, start: Timestamp, now: Timestamp) -> bool {
        match self {
            StatsPeriod::Day   => clock.local_date(start) == clock.local_date(now),
            StatsPeriod::Week  => start >= now - Duration::days(7),
            StatsPeriod::Month => start >= now - Duration::days(30),
        }
    }

    pub fn days(self) -> u32 {
        match self {
            StatsPeriod::Day   => 1,
            StatsPeriod::Week  => 7,
            StatsPeriod::Month => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    pub sessions:       usize,
    pub total_minutes:  Amount,
    pub total_diamonds: Amount,
    /// Rounded to the nearest minute; 0 with no sessions.
    pub avg_minutes:    Amount,
}

impl FocusStats {
    pub fn for_period(history: &[FocusSession], period: StatsPeriod, clock: &dyn Clock) -> Self {
        let now = clock.now();
        let mut stats = history
            .iter()
            .filter(|s| period.includes(clock, s.start_time, now))
            .fold(FocusStats::default(), |mut acc, s| {
                acc.sessions += 1;
                acc.total_minutes += s.actual_duration;
                acc.total_diamonds += s.diamonds_earned;
                acc
            });
        if stats.sessions > 0 {
            let n = stats.sessions as Amount;
            stats.avg_minutes = (stats.total_minutes + n / 2) / n;
        }
        stats
    }
}

/// Focus minutes per calendar day for the last `days` days, oldest first.
pub fn daily_minutes(history: &[FocusSession], days: u32, clock: &dyn Clock) -> Vec<(NaiveDate, Amount)> {
    let now = clock.now();
    (0..days)
        .rev()
        .map(|back| {
            let date = clock.local_date(now - Duration::days(i64::from(back)));
            let minutes = history
                .iter()
                .filter(|s| clock.local_date(s.start_time) == date)
                .map(|s| s.actual_duration)
                .sum();
            (date, minutes)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub building_type: BuildingType,
    pub count:         usize,
    pub max_level:     u32,
}

/// One row per building type present on the island, in catalog order.
pub fn building_summary(buildings: &[Building]) -> Vec<BuildingSummary> {
    BuildingType::ALL
        .into_iter()
        .filter_map(|ty| {
            let of_type = buildings.iter().filter(|b| b.building_type == ty);
            let count = of_type.clone().count();
            let max_level = of_type.map(|b| b.level).max()?;
            Some(BuildingSummary { building_type: ty, count, max_level })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub nickname:            String,
    pub level:               u32,
    pub exp:                 Amount,
    pub exp_needed:          Amount,
    /// exp / exp_needed, in [0, 1).
    pub progress:            f64,
    pub days_since_creation: i64,
    pub total_focus_minutes: Amount,
}

impl ProfileSummary {
    pub fn of(state: &GameState, now: Timestamp) -> Self {
        let exp_needed = exp_for_level(state.level);
        let progress = if exp_needed > 0 { state.exp as f64 / exp_needed as f64 } else { 0.0 };
        Self {
            nickname: state.nickname.clone(),
            level: state.level,
            exp: state.exp,
            exp_needed,
            progress,
            days_since_creation: (now - state.created_at).num_days(),
            total_focus_minutes: state.total_focus_minutes,
        }
    }
}

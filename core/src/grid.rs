//! The island grid: placement, upgrades, removal and idle income.
//!
//! Every operation checks affordability and occupancy before touching
//! anything, so a refused action leaves `diamonds` and `buildings` as
//! they were.

use crate::{
    config::{GameConfig, TaskTrigger},
    state::{Building, BuildingType, GameState},
    types::{Amount, EntityId, Timestamp},
};

/// Outcome of a refused grid action, for callers that want to explain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridRefusal {
    OutOfBounds,
    Occupied,
    InsufficientDiamonds,
    NotFound,
    MaxLevel,
}

impl GameState {
    pub fn place_building(
        &mut self,
        config: &GameConfig,
        building_type: BuildingType,
        x: u32,
        y: u32,
        now: Timestamp,
    ) -> Result<EntityId, GridRefusal> {
        if !config.in_grid(x, y) {
            return Err(GridRefusal::OutOfBounds);
        }
        let cost = config
            .building(building_type)
            .map(|spec| spec.cost)
            .ok_or(GridRefusal::NotFound)?;
        if self.diamonds < cost {
            return Err(GridRefusal::InsufficientDiamonds);
        }
        if self.building_at(x, y).is_some() {
            return Err(GridRefusal::Occupied);
        }

        self.diamonds -= cost;
        let building = Building::new(building_type, x, y, now);
        let id = building.id.clone();
        self.buildings.push(building);
        self.advance_tasks(config, TaskTrigger::BuildingPlaced, 1);
        Ok(id)
    }

    /// Cost to take `building` from its current level to the next.
    /// `None` when the multiplication would overflow.
    pub fn upgrade_cost(config: &GameConfig, building: &Building) -> Option<Amount> {
        config
            .building(building.building_type)?
            .upgrade_cost_per_level
            .checked_mul(Amount::from(building.level))
    }

    /// Returns the new level.
    pub fn upgrade_building(&mut self, config: &GameConfig, id: &str) -> Result<u32, GridRefusal> {
        let building = self.building(id).ok_or(GridRefusal::NotFound)?;
        if let Some(max) = config.rules.max_building_level {
            if building.level >= max {
                return Err(GridRefusal::MaxLevel);
            }
        }
        let cost = Self::upgrade_cost(config, building).ok_or(GridRefusal::MaxLevel)?;
        if self.diamonds < cost {
            return Err(GridRefusal::InsufficientDiamonds);
        }

        self.diamonds -= cost;
        let building = self
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(GridRefusal::NotFound)?;
        building.level = building.level.saturating_add(1);
        Ok(building.level)
    }

    /// Half the base placement cost, rounded down. Upgrade spend is lost.
    pub fn removal_refund(config: &GameConfig, building_type: BuildingType) -> Amount {
        config.building(building_type).map_or(0, |spec| spec.cost / 2)
    }

    /// Returns the refund, or `None` when no such building exists.
    pub fn remove_building(&mut self, config: &GameConfig, id: &str) -> Option<Amount> {
        let index = self.buildings.iter().position(|b| b.id == id)?;
        let building = self.buildings.remove(index);
        let refund = Self::removal_refund(config, building.building_type);
        self.add_diamonds(refund);
        Some(refund)
    }

    /// Income a single building has accrued by `now`, in whole periods.
    fn accrued_income(config: &GameConfig, building: &Building, now: Timestamp) -> Amount {
        let Some(period) = config.income_period() else { return 0 };
        let elapsed = now - building.last_collected_at;
        if elapsed < period {
            return 0;
        }
        let periods = (elapsed.num_seconds() / period.num_seconds()).max(0) as Amount;
        let rate = config
            .building(building.building_type)
            .map_or(0, |spec| spec.hourly_production);
        rate.saturating_mul(Amount::from(building.level))
            .saturating_mul(periods)
    }

    /// What `collect_building_income` would pay right now.
    pub fn pending_income(&self, config: &GameConfig, now: Timestamp) -> Amount {
        self.buildings
            .iter()
            .map(|b| Self::accrued_income(config, b, now))
            .fold(0, Amount::saturating_add)
    }

    /// Pay out every building with at least one full period accrued and
    /// restart its accrual at `now`; the partial period is dropped.
    /// Buildings under one period keep their timestamp.
    pub fn collect_building_income(&mut self, config: &GameConfig, now: Timestamp) -> Amount {
        let Some(period) = config.income_period() else { return 0 };
        let mut total: Amount = 0;
        for building in &mut self.buildings {
            if now - building.last_collected_at < period {
                continue;
            }
            total = total.saturating_add(Self::accrued_income(config, building, now));
            building.last_collected_at = now;
        }
        self.add_diamonds(total);
        total
    }
}

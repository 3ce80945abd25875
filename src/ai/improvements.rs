//! Per-turn lookup of the best terrain improvement proposed for each tile.

use std::collections::HashMap;

use bevy::prelude::*;
use hexx::Hex;

use crate::ai::snapshot::AiSnapshot;
use crate::game::NationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Improvement {
    Plow,
    Road,
    ClearForest,
}

/// A settlement's proposal to improve one of its tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImprovementPlan {
    pub tile: Hex,
    pub settlement: Entity,
    pub improvement: Improvement,
    pub value: i32,
    pub pioneer: Option<Entity>,
}

impl TileImprovementPlan {
    pub fn new(settlement: Entity, tile: Hex, improvement: Improvement, value: i32) -> Self {
        Self {
            tile,
            settlement,
            improvement,
            value,
            pioneer: None,
        }
    }
}

/// The "tip map": one plan per tile, the most valuable one.
#[derive(Debug, Default)]
pub struct ImprovementMap {
    plans: Vec<TileImprovementPlan>,
}

impl ImprovementMap {
    /// Recollects plans from every settlement of `nation`.
    ///
    /// Plans already worked by a pioneer (`claimed`) and plans that are no longer
    /// worth anything or lie off land are left out.
    pub fn rebuild(
        &mut self,
        snapshot: &AiSnapshot,
        nation: NationId,
        claimed: &HashMap<Hex, Entity>,
    ) {
        self.plans.clear();
        for settlement in snapshot.settlements_of(nation) {
            for plan in &settlement.improvement_plans {
                if plan.value <= 0 || !snapshot.map.is_land(plan.tile) {
                    continue;
                }
                if plan.pioneer.is_some() || claimed.contains_key(&plan.tile) {
                    continue;
                }
                match self.plans.iter_mut().find(|p| p.tile == plan.tile) {
                    Some(existing) if existing.value >= plan.value => {}
                    Some(existing) => *existing = plan.clone(),
                    None => self.plans.push(plan.clone()),
                }
            }
        }
    }

    pub fn best_plan_for_tile(&self, tile: Hex) -> Option<&TileImprovementPlan> {
        self.plans.iter().find(|plan| plan.tile == tile)
    }

    /// Highest-value plan among the settlement's tiles. Earlier plans win ties.
    pub fn best_plan_for_settlement(&self, settlement: Entity) -> Option<&TileImprovementPlan> {
        self.plans
            .iter()
            .filter(|plan| plan.settlement == settlement)
            .fold(None, |best: Option<&TileImprovementPlan>, plan| match best {
                Some(current) if current.value >= plan.value => Some(current),
                _ => Some(plan),
            })
    }

    /// Takes a plan out of the map once a pioneer is sent to it.
    pub fn claim(&mut self, tile: Hex, pioneer: Entity) -> Option<TileImprovementPlan> {
        let index = self.plans.iter().position(|plan| plan.tile == tile)?;
        let mut plan = self.plans.remove(index);
        plan.pioneer = Some(pioneer);
        Some(plan)
    }

    pub fn plans(&self) -> &[TileImprovementPlan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn clear(&mut self) {
        self.plans.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SnapshotBuilder;

    #[test]
    fn keeps_the_most_valuable_plan_per_tile() {
        let mut builder = SnapshotBuilder::new(NationId(1));
        let target = Hex::new(1, 0);
        let colony = builder.colony(NationId(1), Hex::ZERO, true);
        builder.improvement(colony, target, Improvement::Road, 10);
        builder.improvement(colony, target, Improvement::Plow, 40);
        builder.improvement(colony, Hex::new(0, 1), Improvement::ClearForest, 25);
        let snapshot = builder.build();

        let mut map = ImprovementMap::default();
        map.rebuild(&snapshot, NationId(1), &HashMap::new());

        assert_eq!(map.len(), 2);
        let best = map.best_plan_for_tile(target).unwrap();
        assert_eq!(best.improvement, Improvement::Plow);
        assert_eq!(map.best_plan_for_settlement(colony).unwrap().value, 40);
    }

    #[test]
    fn skips_tiles_already_worked_by_pioneers() {
        let mut builder = SnapshotBuilder::new(NationId(1));
        let colony = builder.colony(NationId(1), Hex::ZERO, true);
        builder.improvement(colony, Hex::new(1, 0), Improvement::Plow, 40);
        builder.improvement(colony, Hex::new(0, 1), Improvement::Road, 0);
        let snapshot = builder.build();

        let claimed = HashMap::from([(Hex::new(1, 0), Entity::from_bits(99))]);
        let mut map = ImprovementMap::default();
        map.rebuild(&snapshot, NationId(1), &claimed);

        assert!(map.is_empty());
    }

    #[test]
    fn claiming_removes_the_plan() {
        let mut builder = SnapshotBuilder::new(NationId(1));
        let colony = builder.colony(NationId(1), Hex::ZERO, true);
        builder.improvement(colony, Hex::new(1, 0), Improvement::Plow, 40);
        let snapshot = builder.build();

        let mut map = ImprovementMap::default();
        map.rebuild(&snapshot, NationId(1), &HashMap::new());
        let pioneer = Entity::from_bits(7);
        let plan = map.claim(Hex::new(1, 0), pioneer).unwrap();

        assert_eq!(plan.pioneer, Some(pioneer));
        assert!(map.best_plan_for_tile(Hex::new(1, 0)).is_none());
    }
}

//! Per-turn driver of one faction's AI.
//!
//! Refreshes intelligence, rebuilds the turn caches and settles stances, then
//! alternates planning and mission execution for a bounded number of passes.
//! Each pass also brings gifts to displeased natives and presses tribute on
//! weak ones. The caches are cleared when the turn ends, whatever happened
//! during it.

use std::collections::HashSet;

use bevy::prelude::*;
use hexx::Hex;

use crate::ai::config::AiConfig;
use crate::ai::error::AiError;
use crate::ai::improvements::{ImprovementMap, TileImprovementPlan};
use crate::ai::mission::{Mission, MissionKind};
use crate::ai::oracle::{ActionRequests, MissionExecution, Pathfinding, StrengthAppraisal};
use crate::ai::planner::MissionPlanner;
use crate::ai::player::AiPlayer;
use crate::ai::relations::{self, Gift, StanceChange, TributeDemand};
use crate::ai::snapshot::AiSnapshot;
use crate::ai::transport::{CargoAssignment, TransportCoordinator, TransportableId};
use crate::ai::wishes::{Wish, WishId, WishRegistry, WishType};
use crate::game::{Location, NationId, NationKind, UnitType};

/// Everything the engine consults or drives during a turn.
pub struct Collaborators<'c> {
    pub pathfinder: &'c dyn Pathfinding,
    pub strength: &'c dyn StrengthAppraisal,
    pub executor: &'c mut dyn MissionExecution,
    pub requests: &'c mut dyn ActionRequests,
}

/// State rebuilt at the start of each turn and thrown away at its end.
#[derive(Debug, Default)]
pub struct TurnCaches {
    pub wishes: WishRegistry,
    pub transport: TransportCoordinator,
    pub improvements: ImprovementMap,
    /// Colonies and native settlements that already exchanged a gift.
    pub gifted: HashSet<Entity>,
    /// Units and native settlements already involved in a tribute demand.
    pub pressed: HashSet<Entity>,
}

impl TurnCaches {
    pub fn clear(&mut self) {
        self.wishes.clear();
        self.transport.clear();
        self.improvements.clear();
        self.gifted.clear();
        self.pressed.clear();
    }
}

#[derive(Debug, Default)]
pub struct TurnReport {
    pub nation: Option<NationId>,
    pub passes: usize,
    pub assigned: Vec<(Entity, MissionKind)>,
    pub cargo: Vec<CargoAssignment>,
    pub executed: usize,
    pub disposed: Vec<Entity>,
    pub joined: usize,
    pub left: usize,
    pub stance_changes: Vec<StanceChange>,
    pub gifts: Vec<Gift>,
    pub tributes: Vec<TributeDemand>,
}

pub struct TurnOrchestrator<'a> {
    snapshot: &'a AiSnapshot,
    config: &'a AiConfig,
    caches: TurnCaches,
}

impl<'a> TurnOrchestrator<'a> {
    pub fn new(snapshot: &'a AiSnapshot, config: &'a AiConfig) -> Self {
        Self {
            snapshot,
            config,
            caches: TurnCaches::default(),
        }
    }

    pub fn caches(&self) -> &TurnCaches {
        &self.caches
    }

    /// Plans and executes one turn for `player`.
    pub fn plan_and_act(
        &mut self,
        player: &mut AiPlayer,
        collaborators: &mut Collaborators,
    ) -> Result<TurnReport, AiError> {
        let result = self.run_turn(player, collaborators);
        self.end_turn();
        result
    }

    fn run_turn(
        &mut self,
        player: &mut AiPlayer,
        collaborators: &mut Collaborators,
    ) -> Result<TurnReport, AiError> {
        let mut report = self.begin_turn(player, collaborators.strength)?;
        self.determine_stances(player, collaborators.requests, &mut report);
        let planner = MissionPlanner::new(self.snapshot, self.config, collaborators.pathfinder);
        let mut spent = HashSet::new();

        for _ in 0..self.config.max_planning_passes {
            let plan = planner.plan_turn(player, &mut self.caches, collaborators.requests);
            report.assigned.extend(plan.assigned);
            report.cargo.extend(plan.cargo);
            self.bring_gifts(player.nation, collaborators.requests, &mut report);
            self.demand_tribute(player, collaborators.requests, &mut report);

            let acting: Vec<Entity> = player
                .units()
                .filter(|unit| unit.mission.is_some() && !spent.contains(&unit.entity))
                .map(|unit| unit.entity)
                .collect();
            if acting.is_empty() {
                break;
            }
            report.passes += 1;
            self.do_missions(player, acting, collaborators.executor, &mut spent, &mut report);
        }

        player.note_turn_planned();
        info!(
            "{} turn {}: {} missions assigned, {} cargo assignments, {} passes",
            player.nation,
            self.snapshot.turn,
            report.assigned.len(),
            report.cargo.len(),
            report.passes
        );
        Ok(report)
    }

    /// Checks the controller, syncs the roster and rebuilds the turn caches.
    pub fn begin_turn(
        &mut self,
        player: &mut AiPlayer,
        strength: &dyn StrengthAppraisal,
    ) -> Result<TurnReport, AiError> {
        let snapshot = self.snapshot;
        let own = player.nation;
        let nation = snapshot.nation(own).ok_or(AiError::UnknownFaction(own))?;
        if nation.entity != player.controller_of {
            error!(
                "{} AI controller registered on {:?}, game has {:?}",
                own, player.controller_of, nation.entity
            );
            return Err(AiError::IntegrityViolation {
                nation: own,
                expected: player.controller_of,
                found: nation.entity,
            });
        }

        let (joined, left) = player.sync_roster(snapshot);
        if player.turns_planned() == 0 {
            info!("{} gives initial missions to {} units", own, joined);
        }

        let rivals: Vec<(NationId, NationKind)> = snapshot
            .nations
            .values()
            .filter(|nation| nation.id != own)
            .map(|nation| (nation.id, nation.kind))
            .collect();
        player.intelligence_mut().refresh(own, &rivals, strength);

        if snapshot.settlements_of(own).next().is_some() {
            self.caches
                .improvements
                .rebuild(snapshot, own, &player.pioneer_targets());
            self.caches
                .wishes
                .rebuild(snapshot, own, &player.bound_wishes());
        }
        self.caches
            .transport
            .rebuild(player, snapshot, &self.caches.wishes);

        Ok(TurnReport {
            nation: Some(own),
            joined,
            left,
            ..default()
        })
    }

    pub fn end_turn(&mut self) {
        self.caches.clear();
    }

    /// Follows tension into new stances. Planning still sees the old ones
    /// until the game applies the requests.
    fn determine_stances(
        &self,
        player: &mut AiPlayer,
        requests: &mut dyn ActionRequests,
        report: &mut TurnReport,
    ) {
        let own = player.nation;
        let changes = relations::determine_stances(
            self.snapshot,
            own,
            self.config.peace_probability,
            player.rng_mut(),
        );
        for change in changes {
            match requests.change_stance(own, change.towards, change.to) {
                Ok(()) => {
                    info!(
                        "{} goes from {:?} to {:?} with {}",
                        own, change.from, change.to, change.towards
                    );
                    report.stance_changes.push(change);
                }
                Err(err) => warn!("{} stance towards {} unchanged: {}", own, change.towards, err),
            }
        }
    }

    fn bring_gifts(
        &mut self,
        own: NationId,
        requests: &mut dyn ActionRequests,
        report: &mut TurnReport,
    ) {
        let snapshot = self.snapshot;
        let gifts =
            relations::gifts_due(snapshot, own, self.config.gift_range, &mut self.caches.gifted);
        for gift in gifts {
            let (Some(colony), Some(settlement)) = (
                snapshot.settlement(gift.colony),
                snapshot.settlement(gift.settlement),
            ) else {
                continue;
            };
            match requests.deliver_gift(colony, settlement, gift.goods, gift.amount) {
                Ok(()) => {
                    debug!(
                        "{} gives {} {} from {} to {}",
                        own, gift.amount, gift.goods, colony.name, settlement.name
                    );
                    report.gifts.push(gift);
                }
                Err(err) => warn!("{} gift from {} failed: {}", own, colony.name, err),
            }
        }
    }

    fn demand_tribute(
        &mut self,
        player: &AiPlayer,
        requests: &mut dyn ActionRequests,
        report: &mut TurnReport,
    ) {
        let snapshot = self.snapshot;
        let demands = relations::tribute_demands(
            snapshot,
            player.nation,
            player.intelligence(),
            &mut self.caches.pressed,
        );
        for demand in demands {
            let (Some(unit), Some(settlement)) = (
                snapshot.unit(demand.unit),
                snapshot.settlement(demand.settlement),
            ) else {
                continue;
            };
            match requests.demand_tribute(unit, settlement) {
                Ok(()) => {
                    debug!(
                        "{} {:?} demands tribute from {}",
                        player.nation, unit.entity, settlement.name
                    );
                    report.tributes.push(demand);
                }
                Err(err) => warn!(
                    "{} tribute from {} refused: {}",
                    player.nation, settlement.name, err
                ),
            }
        }
    }

    /// Runs one execution step for each acting unit.
    fn do_missions(
        &self,
        player: &mut AiPlayer,
        acting: Vec<Entity>,
        executor: &mut dyn MissionExecution,
        spent: &mut HashSet<Entity>,
        report: &mut TurnReport,
    ) {
        for entity in acting {
            let Some(ai) = player.unit_mut(entity) else {
                continue;
            };
            if ai.mission.is_none() {
                continue;
            }
            let old_target = ai.mission.as_ref().and_then(Mission::target);
            let outcome = executor.advance(ai, self.snapshot);
            let new_target = ai.mission.as_ref().and_then(Mission::target);
            let carrier = ai.transport;

            let step = match outcome {
                Ok(step) => step,
                Err(err) => {
                    warn!("{} {:?}: {}", player.nation, entity, err);
                    spent.insert(entity);
                    continue;
                }
            };
            report.executed += 1;
            if step.disposed {
                debug!("{} {:?} disposed during its mission", player.nation, entity);
                player.remove_unit(entity);
                report.disposed.push(entity);
                spent.insert(entity);
                continue;
            }
            if old_target != new_target
                && let Some(carrier) = carrier
            {
                self.retarget_passenger(player, entity, carrier, new_target);
            }
            if !step.moves_left {
                spent.insert(entity);
            }
        }
    }

    /// Keeps a carrier's manifest in line with a passenger's new target.
    fn retarget_passenger(
        &self,
        player: &mut AiPlayer,
        entity: Entity,
        carrier: Entity,
        target: Option<Location>,
    ) {
        let id = TransportableId::Unit(entity);
        let view = player.view(id, self.snapshot);
        let aboard = view.is_some_and(|view| view.aboard == Some(carrier));
        let destination = if aboard {
            target
        } else {
            view.and_then(|view| view.destination)
        };
        let requeued = destination.is_some_and(|destination| {
            player
                .transport_mission_mut(carrier)
                .is_some_and(|mission| mission.requeue(id, destination))
        });
        if !requeued {
            if let Some(mission) = player.transport_mission_mut(carrier) {
                mission.remove(id);
            }
            player.set_transport(id, None);
        }
    }

    /// Outstanding wishes of one type at a location.
    pub fn wishes_at(&self, location: Location, wish_type: WishType) -> Vec<&Wish> {
        self.caches.wishes.wishes_at(location, wish_type)
    }

    pub fn best_plan_for_tile(&self, tile: Hex) -> Option<&TileImprovementPlan> {
        self.caches.improvements.best_plan_for_tile(tile)
    }

    pub fn best_plan_for_settlement(&self, settlement: Entity) -> Option<&TileImprovementPlan> {
        self.caches.improvements.best_plan_for_settlement(settlement)
    }

    /// Takes a waiting object out of the transport supply.
    pub fn claim_transportable(&mut self, id: TransportableId) -> bool {
        self.caches.transport.claim(id)
    }

    /// Retires a delivered wish. Repeated calls are harmless.
    pub fn complete_wish(&mut self, wish: WishId) -> bool {
        self.caches.transport.retire_demand(wish);
        self.caches.wishes.complete(wish)
    }

    /// Binds a worker wish to a unit on its way to fulfil it.
    pub fn consume_worker_wish(&mut self, unit: Entity, wish: WishId) -> bool {
        self.caches.transport.retire_demand(wish);
        self.caches
            .wishes
            .consume(TransportableId::Unit(unit), wish)
            .is_some()
    }

    /// Binds a goods wish to a parcel and routes the parcel to it.
    pub fn consume_goods_wish(&mut self, player: &mut AiPlayer, parcel: Entity, wish: WishId) -> bool {
        let Some(bound) = self
            .caches
            .wishes
            .consume(TransportableId::Goods(parcel), wish)
        else {
            return false;
        };
        self.caches.transport.retire_demand(wish);
        if let Some(goods) = player.goods_mut(parcel) {
            goods.destination = Some(bound.destination());
            goods.wish = Some(wish);
        }
        true
    }

    /// Asks for `count` recruits in Europe. Returns how many were granted.
    pub fn recruit_in_europe(
        &self,
        nation: NationId,
        count: usize,
        requests: &mut dyn ActionRequests,
    ) -> usize {
        let mut recruited = 0;
        for _ in 0..count {
            match requests.recruit(nation) {
                Ok(()) => recruited += 1,
                Err(err) => {
                    warn!("{} recruitment had no effect: {}", nation, err);
                    break;
                }
            }
        }
        recruited
    }

    /// Asks for one unit of `unit_type` to be trained in Europe.
    pub fn train_in_europe(
        &self,
        nation: NationId,
        unit_type: UnitType,
        requests: &mut dyn ActionRequests,
    ) -> usize {
        match requests.train(nation, unit_type) {
            Ok(()) => 1,
            Err(err) => {
                warn!("{} training {:?} had no effect: {}", nation, unit_type, err);
                0
            }
        }
    }
}

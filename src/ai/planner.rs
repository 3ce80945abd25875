//! Mission assignment for every unit of a faction.
//!
//! Quota missions come first (builders, then scouts, then pioneers). Whatever
//! is left goes through a fixed fallback ladder, and units nothing applies to
//! are parked in a port or left idle. Transport allocation closes the pass.

use std::collections::HashSet;
use std::f64::consts::E;

use bevy::prelude::*;
use hexx::Hex;

use crate::ai::config::AiConfig;
use crate::ai::improvements::ImprovementMap;
use crate::ai::mission::{HostileTarget, Mission, MissionKind};
use crate::ai::oracle::{ActionRequests, CostPolicy, Pathfinding};
use crate::ai::orchestrator::TurnCaches;
use crate::ai::player::AiPlayer;
use crate::ai::snapshot::{AiSnapshot, UnitSnapshot};
use crate::ai::transport::{Cargo, CargoAssignment, TransportMission, TransportableId};
use crate::constants::{
    DEFEND_BASE_SCORE, DEFENDER_PENALTY, FORTIFIED_PENALTY, HOSTILE_SETTLEMENT_VALUE,
    HOSTILE_UNIT_VALUE, MISSION_SITE_VALUE, OVER_GARRISON_PENALTY, PREY_VALUE, RUMOUR_VALUE,
    UNSCOUTED_SETTLEMENT_VALUE, UNSUITABLE_SCORE,
};
use crate::game::{Location, NationId, SettlementKind, Stance, UnitPlacement, UnitRole, UnitType};

/// How many more units of each quota kind the faction wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quotas {
    pub builders: i32,
    pub pioneers: i32,
    pub scouts: i32,
}

/// Quotas computed from the faction's situation, ignoring existing missions.
pub fn quotas_needed(snapshot: &AiSnapshot, nation: NationId, improvements: &ImprovementMap) -> Quotas {
    let can_found = snapshot
        .nation(nation)
        .is_some_and(|nation| nation.can_found_settlements);
    let colonies: Vec<_> = snapshot.settlements_of(nation).collect();
    let ports = colonies.iter().filter(|s| s.connected_port).count();
    // People inside each colony or waiting on its tile, plus those in Europe.
    let colonists: usize = colonies
        .iter()
        .map(|colony| {
            snapshot
                .units_of(nation)
                .filter(|unit| unit.is_person())
                .filter(|unit| {
                    unit.working_in() == Some(colony.entity)
                        || unit.placement == UnitPlacement::OnTile(colony.tile)
                })
                .count()
        })
        .sum();
    let in_europe = snapshot
        .units_of(nation)
        .filter(|unit| unit.is_person() && unit.is_in_europe())
        .count();
    let workers = colonists + in_europe;

    let builders = if !can_found {
        0
    } else if colonies.is_empty() || ports == 0 {
        2
    } else if ports <= 1 && workers >= 3 {
        1
    } else if workers as f64 / colonies.len() as f64 > E {
        1
    } else {
        0
    };

    Quotas {
        builders,
        pioneers: i32::try_from(improvements.len().div_ceil(2)).unwrap_or(i32::MAX),
        scouts: if snapshot.age <= 1 { 3 } else { 1 },
    }
}

/// Founding suitability: plain colonists first, worst first, and those already
/// standing on land.
pub fn builder_score(unit: &UnitSnapshot) -> i32 {
    if !unit.is_person() || unit.location.is_none() {
        return UNSUITABLE_SCORE;
    }
    let base = if !unit.has_default_role() {
        0
    } else if unit.skill() > 0 {
        100
    } else {
        500 + 100 * unit.skill()
    };
    base + if unit.is_on_tile() { 50 } else { 0 }
}

pub fn scout_score(unit: &UnitSnapshot) -> i32 {
    if !unit.is_person() || unit.location.is_none() {
        return UNSUITABLE_SCORE;
    }
    if unit.role == UnitRole::Scout {
        900 + if unit.is_on_tile() { 100 } else { 0 }
    } else if unit.unit_type.expert_role() == Some(UnitRole::Scout) {
        600
    } else if !unit.has_default_role() {
        100
    } else if unit.skill() <= 0 {
        200
    } else {
        0
    }
}

pub fn pioneer_score(unit: &UnitSnapshot) -> i32 {
    if !unit.is_person() {
        return UNSUITABLE_SCORE;
    }
    if unit.role == UnitRole::Pioneer {
        900 + if unit.is_on_tile() { 100 } else { 0 }
    } else if unit.unit_type.expert_role() == Some(UnitRole::Pioneer) {
        600
    } else if !unit.has_default_role() {
        100
    } else if unit.skill() > 0 {
        200
    } else {
        200 + 50 * unit.skill()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quota {
    /// Join the faction's only settlement attempt.
    Bootstrap(Hex),
    Builder,
    Scout,
    Pioneer,
}

impl Quota {
    fn score(self, unit: &UnitSnapshot) -> i32 {
        match self {
            Quota::Bootstrap(_) | Quota::Builder => builder_score(unit),
            Quota::Scout => scout_score(unit),
            Quota::Pioneer => pioneer_score(unit),
        }
    }
}

/// Targets already taken by some unit this turn.
#[derive(Debug, Default)]
struct Claims {
    sites: HashSet<Hex>,
    scouting: HashSet<Hex>,
    missions: HashSet<Entity>,
    prey: HashSet<Entity>,
}

impl Claims {
    fn record(&mut self, mission: &Mission) {
        match mission {
            Mission::BuildColony { target } => {
                self.sites.insert(*target);
            }
            Mission::Scout { target } => {
                self.scouting.insert(*target);
            }
            Mission::Missionary { settlement, .. } => {
                self.missions.insert(*settlement);
            }
            Mission::Privateer { prey, .. } => {
                self.prey.insert(*prey);
            }
            _ => {}
        }
    }
}

struct PlanContext<'r> {
    caches: &'r mut TurnCaches,
    requests: &'r mut dyn ActionRequests,
    claims: Claims,
}

/// Outcome of one planning pass.
#[derive(Debug, Default)]
pub struct PlanReport {
    pub assigned: Vec<(Entity, MissionKind)>,
    pub cargo: Vec<CargoAssignment>,
    /// Units left without a mission.
    pub unassigned: Vec<Entity>,
    /// Quota left unfilled.
    pub quotas: Quotas,
}

pub struct MissionPlanner<'a> {
    snapshot: &'a AiSnapshot,
    config: &'a AiConfig,
    pathfinder: &'a dyn Pathfinding,
}

impl<'a> MissionPlanner<'a> {
    pub fn new(snapshot: &'a AiSnapshot, config: &'a AiConfig, pathfinder: &'a dyn Pathfinding) -> Self {
        Self {
            snapshot,
            config,
            pathfinder,
        }
    }

    /// Gives every unit that needs one a mission, then allocates transport.
    pub fn plan_turn(
        &self,
        player: &mut AiPlayer,
        caches: &mut TurnCaches,
        requests: &mut dyn ActionRequests,
    ) -> PlanReport {
        let snapshot = self.snapshot;
        let nation = player.nation;
        let mut report = PlanReport::default();
        let mut ctx = PlanContext {
            caches,
            requests,
            claims: Claims::default(),
        };
        let mut quotas = quotas_needed(snapshot, nation, &ctx.caches.improvements);

        let mut needs_mission = Vec::new();
        let mut naval = Vec::new();
        let mut carriers = Vec::new();
        let mut build_target = None;

        for entity in player.unit_ids() {
            let Some(unit) = snapshot.unit(entity) else {
                continue;
            };
            let Some(ai) = player.unit_mut(entity) else {
                continue;
            };
            if ai.mission.as_ref().is_some_and(|m| !m.is_valid(unit, snapshot)) {
                debug!("{} {:?} drops an invalid mission", nation, entity);
                ai.mission = None;
            }
            let current = ai.mission.as_ref().map(|mission| {
                ctx.claims.record(mission);
                (
                    mission.kind(),
                    mission.is_one_shot(),
                    mission.target(),
                    mission
                        .transport()
                        .map_or(0, TransportMission::destination_capacity),
                )
            });

            if unit.damaged {
                if current.is_none_or(|(kind, ..)| kind != MissionKind::IdleAtSettlement) {
                    let mission = self.idle_mission(unit);
                    self.assign(player, &mut ctx, entity, mission, &mut report);
                }
                continue;
            }
            if let Some(settlement) = unit.working_in()
                && snapshot.workers_in(settlement) <= 1
            {
                if current.is_none_or(|(kind, ..)| kind != MissionKind::WorkInsideColony)
                    && let Some(colony) = snapshot.settlement(settlement)
                {
                    warn!("{} {:?} must keep {} alive", nation, entity, colony.name);
                    let mission = Mission::WorkInsideColony {
                        settlement,
                        target: colony.tile,
                    };
                    self.assign(player, &mut ctx, entity, mission, &mut report);
                }
                continue;
            }
            if let Some((kind, false, target, spare)) = current {
                match kind {
                    MissionKind::BuildColony => {
                        quotas.builders -= 1;
                        build_target = target.and_then(Location::tile);
                    }
                    MissionKind::Pioneering => quotas.pioneers -= 1,
                    MissionKind::Scouting => quotas.scouts -= 1,
                    MissionKind::Transport if spare > 0 => carriers.push(entity),
                    _ => {}
                }
                continue;
            }
            if unit.is_naval() {
                naval.push(entity);
            } else if unit.location.is_some() {
                needs_mission.push(entity);
            }
        }

        if snapshot.settlements_of(nation).next().is_none()
            && let Some(target) = build_target
        {
            let mut unlimited = i32::MAX;
            self.fill_quota(
                Quota::Bootstrap(target),
                &mut unlimited,
                &mut needs_mission,
                player,
                &mut ctx,
                &mut report,
            );
        }
        for (quota, remaining) in [
            (Quota::Builder, &mut quotas.builders),
            (Quota::Scout, &mut quotas.scouts),
            (Quota::Pioneer, &mut quotas.pioneers),
        ] {
            self.fill_quota(quota, remaining, &mut needs_mission, player, &mut ctx, &mut report);
        }

        needs_mission.retain(|&entity| {
            let Some(unit) = snapshot.unit(entity) else {
                return false;
            };
            match self.simple_mission(unit, player, &mut ctx) {
                Some(mission) => {
                    self.assign(player, &mut ctx, entity, mission, &mut report);
                    false
                }
                None => true,
            }
        });

        naval.retain(|&entity| {
            let Some(unit) = snapshot.unit(entity) else {
                return false;
            };
            let Some(mission) = self.simple_mission(unit, player, &mut ctx) else {
                return true;
            };
            let spare = mission
                .transport()
                .map(TransportMission::destination_capacity);
            self.assign(player, &mut ctx, entity, mission, &mut report);
            if let Some(spare) = spare {
                if spare > 0 {
                    carriers.push(entity);
                }
                self.adopt_cargo(unit, player, &mut ctx);
            }
            false
        });
        needs_mission.retain(|&entity| {
            !snapshot
                .unit(entity)
                .zip(player.unit(entity))
                .is_some_and(|(unit, ai)| ai.has_valid_mission(unit, snapshot))
        });

        let ports = snapshot.ports_of(nation);
        let mut next_port = 0;
        for entity in needs_mission.into_iter().chain(naval) {
            let Some(unit) = snapshot.unit(entity) else {
                continue;
            };
            let current = player.unit(entity).and_then(|ai| ai.mission.as_ref());
            if current.is_some_and(|m| m.is_valid(unit, snapshot) && !m.is_one_shot()) {
                continue;
            }
            if unit.is_in_europe() && unit.is_person() && !ports.is_empty() {
                let port = ports[next_port % ports.len()];
                next_port += 1;
                let mission = Mission::WorkInsideColony {
                    settlement: port.entity,
                    target: port.tile,
                };
                self.assign(player, &mut ctx, entity, mission, &mut report);
            } else if current.is_some_and(|m| m.kind() == MissionKind::IdleAtSettlement) {
                report.unassigned.push(entity);
            } else {
                let mission = self.idle_mission(unit);
                self.assign(player, &mut ctx, entity, mission, &mut report);
                report.unassigned.push(entity);
            }
        }

        report.cargo = ctx.caches.transport.allocate(
            carriers,
            player,
            snapshot,
            self.pathfinder,
            self.config,
        );
        report.quotas = quotas;
        debug!(
            "{} planned: {} new missions, {} cargo assignments, quotas left {:?}",
            nation,
            report.assigned.len(),
            report.cargo.len(),
            quotas
        );
        report
    }

    fn fill_quota(
        &self,
        quota: Quota,
        remaining: &mut i32,
        needs_mission: &mut Vec<Entity>,
        player: &mut AiPlayer,
        ctx: &mut PlanContext,
        report: &mut PlanReport,
    ) {
        if *remaining <= 0 {
            return;
        }
        let snapshot = self.snapshot;
        needs_mission.sort_by_key(|entity| {
            std::cmp::Reverse(snapshot.unit(*entity).map_or(UNSUITABLE_SCORE, |u| quota.score(u)))
        });

        let mut done = Vec::new();
        for &entity in needs_mission.iter() {
            let Some(unit) = snapshot.unit(entity) else {
                continue;
            };
            if quota.score(unit) <= UNSUITABLE_SCORE {
                break;
            }
            let mission = match quota {
                Quota::Bootstrap(target) => self.build_colony_mission(unit, Some(target), ctx),
                Quota::Builder => self.build_colony_mission(unit, None, ctx),
                Quota::Scout => self.scout_mission(unit, ctx),
                Quota::Pioneer => self.pioneer_mission(unit, ctx),
            };
            let Some(mission) = mission else {
                continue;
            };
            self.assign(player, ctx, entity, mission, report);
            done.push(entity);
            *remaining -= 1;
            if *remaining <= 0 {
                break;
            }
        }
        needs_mission.retain(|entity| !done.contains(entity));
    }

    fn assign(
        &self,
        player: &mut AiPlayer,
        ctx: &mut PlanContext,
        entity: Entity,
        mission: Mission,
        report: &mut PlanReport,
    ) {
        let kind = mission.kind();
        ctx.claims.record(&mission);
        if let Mission::Pioneer { target } = mission {
            ctx.caches.improvements.claim(target, entity);
        }
        let nation = player.nation;
        let Some(ai) = player.unit_mut(entity) else {
            return;
        };
        debug!("{} {:?} -> {}", nation, entity, kind.label());
        ai.mission = Some(mission);
        if let Some(unit) = self.snapshot.unit(entity) {
            let view = ai.transport_view(unit, self.snapshot);
            if view.requests_transport() {
                ctx.caches.transport.offer(view.id, view.priority);
            }
        }
        report.assigned.push((entity, kind));
    }

    /// First applicable mission of the fallback ladder.
    pub fn simple_mission_for(
        &self,
        unit: &UnitSnapshot,
        player: &AiPlayer,
        caches: &mut TurnCaches,
        requests: &mut dyn ActionRequests,
    ) -> Option<Mission> {
        let mut ctx = PlanContext {
            caches,
            requests,
            claims: Claims::default(),
        };
        self.simple_mission(unit, player, &mut ctx)
    }

    fn simple_mission(
        &self,
        unit: &UnitSnapshot,
        player: &AiPlayer,
        ctx: &mut PlanContext,
    ) -> Option<Mission> {
        let config = self.config;
        if unit.is_naval() {
            return self
                .privateer_mission(unit, ctx)
                .or_else(|| self.transport_mission(unit, player))
                .or_else(|| self.seek_and_destroy_mission(unit, config.seek_and_destroy_range))
                .or_else(|| self.wander_hostile_mission(unit));
        }
        if unit.is_carrier() {
            return self.transport_mission(unit, player);
        }
        self.cash_in_mission(unit)
            .or_else(|| self.work_inside_mission(unit))
            .or_else(|| self.defend_settlement_mission(unit, CostPolicy::Strict))
            .or_else(|| {
                (unit.is_person() && unit.skill() > 0)
                    .then(|| self.wish_realization_mission(unit, ctx))
                    .flatten()
            })
            .or_else(|| self.seek_and_destroy_mission(unit, config.seek_and_destroy_range))
            .or_else(|| self.missionary_mission(unit, ctx))
            .or_else(|| self.wish_realization_mission(unit, ctx))
            .or_else(|| self.defend_settlement_mission(unit, CostPolicy::Relaxed))
            .or_else(|| {
                self.seek_and_destroy_mission(unit, config.seek_and_destroy_extended_range)
            })
            .or_else(|| self.wander_hostile_mission(unit))
    }

    fn turns_to(&self, unit: &UnitSnapshot, to: Location, policy: CostPolicy) -> Option<u32> {
        let from = unit.location?;
        self.pathfinder.turns_to_reach(unit, from, to, policy)
    }

    /// Highest value per turn of travel among `candidates`.
    ///
    /// Targets beyond `range` only count when `deep` is set and nothing lies
    /// within range.
    fn best_target<T: Copy>(
        &self,
        unit: &UnitSnapshot,
        candidates: impl IntoIterator<Item = (T, Location, u32)>,
        range: u32,
        deep: bool,
    ) -> Option<T> {
        let mut in_range: Option<(T, f64)> = None;
        let mut anywhere: Option<(T, f64)> = None;
        for (target, location, value) in candidates {
            let Some(turns) = self.turns_to(unit, location, CostPolicy::Strict) else {
                continue;
            };
            let score = f64::from(value) / f64::from(turns + 1);
            if turns <= range && in_range.is_none_or(|(_, best)| best < score) {
                in_range = Some((target, score));
            }
            if deep && anywhere.is_none_or(|(_, best)| best < score) {
                anywhere = Some((target, score));
            }
        }
        in_range.or(anywhere).map(|(target, _)| target)
    }

    /// Asks for the role a mission needs. True when the unit already has it.
    fn prepare(&self, unit: &UnitSnapshot, role: UnitRole, ctx: &mut PlanContext) -> bool {
        if unit.role == role {
            return true;
        }
        match ctx.requests.equip(unit, role) {
            Ok(()) => true,
            Err(err) => {
                debug!("{:?} cannot become {:?}: {}", unit.entity, role, err);
                false
            }
        }
    }

    fn build_colony_mission(
        &self,
        unit: &UnitSnapshot,
        target: Option<Hex>,
        ctx: &PlanContext,
    ) -> Option<Mission> {
        let snapshot = self.snapshot;
        let can_found = snapshot
            .nation(unit.owner)
            .is_some_and(|nation| nation.can_found_settlements);
        if !unit.is_person() || !can_found {
            return None;
        }
        if let Some(target) = target {
            let mission = Mission::BuildColony { target };
            return mission.is_valid(unit, snapshot).then_some(mission);
        }
        let sites = snapshot.map.tiles().filter(|(hex, tile)| {
            tile.is_land()
                && tile.colony_value > 0
                && tile.settlement.is_none()
                && tile.owner.is_none_or(|owner| owner == unit.owner)
                && !ctx.claims.sites.contains(hex)
        });
        let target = self.best_target(
            unit,
            sites.map(|(hex, tile)| (hex, Location::Tile(hex), tile.colony_value)),
            self.config.building_range,
            unit.is_in_europe(),
        )?;
        Some(Mission::BuildColony { target })
    }

    fn scout_mission(&self, unit: &UnitSnapshot, ctx: &mut PlanContext) -> Option<Mission> {
        if !unit.is_person() || unit.role.is_armed() {
            return None;
        }
        let snapshot = self.snapshot;
        let rumours = snapshot
            .map
            .tiles()
            .filter(|(_, tile)| tile.lost_city_rumour)
            .map(|(hex, _)| (hex, RUMOUR_VALUE));
        let unscouted = snapshot
            .settlements
            .values()
            .filter(|s| s.owner != unit.owner && !s.scouted_by.contains(&unit.owner))
            .map(|s| (s.tile, UNSCOUTED_SETTLEMENT_VALUE));
        let candidates: Vec<(Hex, Location, u32)> = rumours
            .chain(unscouted)
            .filter(|(hex, _)| !ctx.claims.scouting.contains(hex))
            .map(|(hex, value)| (hex, Location::Tile(hex), value))
            .collect();
        let target = self.best_target(unit, candidates, self.config.scouting_range, true)?;
        self.prepare(unit, UnitRole::Scout, ctx)
            .then_some(Mission::Scout { target })
    }

    fn pioneer_mission(&self, unit: &UnitSnapshot, ctx: &mut PlanContext) -> Option<Mission> {
        if !unit.is_person() || unit.role.is_armed() {
            return None;
        }
        let candidates: Vec<(Hex, Location, u32)> = ctx
            .caches
            .improvements
            .plans()
            .iter()
            .map(|plan| {
                let value = u32::try_from(plan.value).unwrap_or(0);
                (plan.tile, Location::Tile(plan.tile), value)
            })
            .collect();
        let target = self.best_target(unit, candidates, self.config.pioneering_range, true)?;
        self.prepare(unit, UnitRole::Pioneer, ctx)
            .then_some(Mission::Pioneer { target })
    }

    fn missionary_mission(&self, unit: &UnitSnapshot, ctx: &mut PlanContext) -> Option<Mission> {
        if !unit.is_person() || !matches!(unit.role, UnitRole::Default | UnitRole::Missionary) {
            return None;
        }
        let candidates: Vec<((Entity, Hex), Location, u32)> = self
            .snapshot
            .settlements
            .values()
            .filter(|s| {
                s.kind == SettlementKind::NativeCamp
                    && s.missionary.is_none()
                    && !ctx.claims.missions.contains(&s.entity)
            })
            .map(|s| ((s.entity, s.tile), s.location(), MISSION_SITE_VALUE))
            .collect();
        let (settlement, target) =
            self.best_target(unit, candidates, self.config.missionary_range, true)?;
        self.prepare(unit, UnitRole::Missionary, ctx)
            .then_some(Mission::Missionary { settlement, target })
    }

    fn cash_in_mission(&self, unit: &UnitSnapshot) -> Option<Mission> {
        if !unit.is_treasure_train() {
            return None;
        }
        let ports = self
            .snapshot
            .ports_of(unit.owner)
            .into_iter()
            .map(|port| (port.location(), port.location(), 1));
        let target = self.best_target(unit, ports, self.config.cash_in_range, false)?;
        Some(Mission::CashInTreasureTrain { target })
    }

    fn work_inside_mission(&self, unit: &UnitSnapshot) -> Option<Mission> {
        let settlement = self.snapshot.settlement(unit.working_in()?)?;
        (settlement.owner == unit.owner).then_some(Mission::WorkInsideColony {
            settlement: settlement.entity,
            target: settlement.tile,
        })
    }

    /// Sends a defender to the worst-defended settlement.
    ///
    /// A badly defended settlement the unit is already in wins outright.
    fn defend_settlement_mission(&self, unit: &UnitSnapshot, policy: CostPolicy) -> Option<Mission> {
        if !unit.is_defender() {
            return None;
        }
        let mut worst: Option<(Entity, Hex, f64)> = None;
        for settlement in self.snapshot.settlements_of(unit.owner) {
            if !settlement.badly_defended {
                continue;
            }
            if unit.tile() == Some(settlement.tile) {
                worst = Some((settlement.entity, settlement.tile, 0.0));
                break;
            }
            let base = self.adjust_mission_score(
                unit,
                settlement.location(),
                MissionKind::DefendSettlement,
                DEFEND_BASE_SCORE,
            );
            if base <= 0 {
                continue;
            }
            let Some(turns) = self.turns_to(unit, settlement.location(), policy) else {
                continue;
            };
            let value = settlement.defence_ratio * 100.0 / f64::from(turns.max(1));
            if worst.is_none_or(|(.., current)| value < current) {
                worst = Some((settlement.entity, settlement.tile, value));
            }
        }
        worst.map(|(settlement, target, _)| Mission::DefendSettlement { settlement, target })
    }

    /// Penalises defend targets that are already well garrisoned.
    pub fn adjust_mission_score(
        &self,
        unit: &UnitSnapshot,
        path_end: Location,
        kind: MissionKind,
        value: i32,
    ) -> i32 {
        if value <= 0 || kind != MissionKind::DefendSettlement {
            return value;
        }
        let Some(settlement) = path_end.tile().and_then(|t| self.snapshot.settlement_at(t)) else {
            return value;
        };
        let defenders = self
            .snapshot
            .units_at(settlement.tile)
            .filter(|u| u.owner == settlement.owner && u.entity != unit.entity && u.is_defender())
            .count();
        let defenders = i32::try_from(defenders).unwrap_or(i32::MAX);
        let level = i32::try_from(settlement.stockade_level).unwrap_or(i32::MAX);
        let mut value = value - DEFENDER_PENALTY * defenders;
        if level > 0 {
            value -= if defenders > level + 1 {
                OVER_GARRISON_PENALTY * level
            } else {
                FORTIFIED_PENALTY * level
            };
        }
        value
    }

    fn wish_realization_mission(&self, unit: &UnitSnapshot, ctx: &mut PlanContext) -> Option<Mission> {
        if !unit.is_person() {
            return None;
        }
        let wish = ctx
            .caches
            .wishes
            .best_worker_wish(unit, unit.unit_type, self.pathfinder)?;
        let (id, target) = (wish.id, wish.destination);
        ctx.caches
            .wishes
            .consume(TransportableId::Unit(unit.entity), id)?;
        ctx.caches.transport.retire_demand(id);
        Some(Mission::WishRealization { wish: id, target })
    }

    fn seek_and_destroy_mission(&self, unit: &UnitSnapshot, range: u32) -> Option<Mission> {
        if !unit.is_offensive() {
            return None;
        }
        let snapshot = self.snapshot;
        let units = snapshot
            .units
            .values()
            .filter(|enemy| {
                snapshot.at_war(unit.owner, enemy.owner) && enemy.is_naval() == unit.is_naval()
            })
            .filter_map(|enemy| {
                let tile = enemy.tile()?;
                Some(((HostileTarget::Unit(enemy.entity), tile), Location::Tile(tile), HOSTILE_UNIT_VALUE))
            });
        let settlements = snapshot
            .settlements
            .values()
            .filter(|s| !unit.is_naval() && snapshot.at_war(unit.owner, s.owner))
            .map(|s| {
                (
                    (HostileTarget::Settlement(s.entity), s.tile),
                    s.location(),
                    HOSTILE_SETTLEMENT_VALUE,
                )
            });
        let (target, location) = self.best_target(unit, units.chain(settlements), range, false)?;
        Some(Mission::SeekAndDestroy { target, location })
    }

    fn wander_hostile_mission(&self, unit: &UnitSnapshot) -> Option<Mission> {
        unit.is_offensive().then(|| Mission::WanderHostile {
            around: unit.tile(),
        })
    }

    fn privateer_mission(&self, unit: &UnitSnapshot, ctx: &PlanContext) -> Option<Mission> {
        if unit.unit_type != UnitType::Privateer {
            return None;
        }
        let snapshot = self.snapshot;
        let prey = snapshot
            .units
            .values()
            .filter(|other| {
                other.owner != unit.owner
                    && other.is_naval()
                    && other.is_carrier()
                    && snapshot.stance(unit.owner, other.owner) != Stance::Alliance
                    && !ctx.claims.prey.contains(&other.entity)
            })
            .filter_map(|other| {
                let tile = other.tile()?;
                Some(((other.entity, tile), Location::Tile(tile), PREY_VALUE))
            });
        let (prey, location) = self.best_target(unit, prey, self.config.privateer_range, false)?;
        Some(Mission::Privateer { prey, location })
    }

    /// A fresh transport mission that keeps the passengers already aboard.
    fn transport_mission(&self, carrier: &UnitSnapshot, player: &AiPlayer) -> Option<Mission> {
        if !carrier.is_carrier() || carrier.damaged {
            return None;
        }
        let snapshot = self.snapshot;
        let mut transport = TransportMission::new(carrier.capacity());
        for passenger in snapshot.passengers_of(carrier.entity) {
            let Some(ai) = player.unit(passenger.entity) else {
                continue;
            };
            if !ai.has_valid_mission(passenger, snapshot) {
                continue;
            }
            let Some(destination) = ai.mission.as_ref().and_then(Mission::target) else {
                continue;
            };
            transport.queue(Cargo {
                transportable: TransportableId::Unit(passenger.entity),
                destination,
                turns: 0,
                space: passenger.space_taken(),
            });
        }
        Some(Mission::Transport(transport))
    }

    /// Marks a new carrier's manifest as claimed and finds wishes for goods
    /// sitting where the carrier is.
    fn adopt_cargo(&self, carrier: &UnitSnapshot, player: &mut AiPlayer, ctx: &mut PlanContext) {
        let adopted: Vec<TransportableId> = player
            .transport_mission(carrier.entity)
            .map(|mission| mission.manifest().iter().map(|c| c.transportable).collect())
            .unwrap_or_default();
        for id in adopted {
            player.set_transport(id, Some(carrier.entity));
            ctx.caches.transport.claim(id);
        }

        let Some(here) = carrier.location else {
            return;
        };
        for parcel in player.goods_ids() {
            let Some(goods) = self.snapshot.parcel(parcel) else {
                continue;
            };
            let unrouted = player
                .goods(parcel)
                .is_some_and(|ai| ai.destination.is_none() && ai.wish.is_none());
            if goods.location != Some(here) || goods.destination.is_some() || !unrouted {
                continue;
            }
            let Some(wish) =
                ctx.caches
                    .wishes
                    .best_goods_wish(carrier, goods.goods_type, self.pathfinder)
            else {
                continue;
            };
            let (id, destination) = (wish.id, wish.destination);
            if ctx
                .caches
                .wishes
                .consume(TransportableId::Goods(parcel), id)
                .is_none()
            {
                continue;
            }
            ctx.caches.transport.retire_demand(id);
            if let Some(ai) = player.goods_mut(parcel) {
                ai.destination = Some(destination);
                ai.wish = Some(id);
                ai.transport_priority += 1;
                ctx.caches
                    .transport
                    .offer(TransportableId::Goods(parcel), ai.transport_priority);
            }
        }
    }

    /// Wait at the nearest own settlement, or where the unit stands.
    fn idle_mission(&self, unit: &UnitSnapshot) -> Mission {
        let nearest = self
            .snapshot
            .settlements_of(unit.owner)
            .filter_map(|s| {
                self.turns_to(unit, s.location(), CostPolicy::Relaxed)
                    .map(|turns| (turns, s.location()))
            })
            .min_by_key(|(turns, _)| *turns)
            .map(|(_, location)| location);
        Mission::IdleAtSettlement {
            target: nearest.or(unit.location),
        }
    }
}

//! Testing utilities for the colonial AI
//!
//! Planning runs against an [`AiSnapshot`], so most tests never need an ECS
//! world: they describe a situation with [`SnapshotBuilder`] and drive the
//! planner with scripted collaborators instead of the game.

use std::collections::{BTreeMap, HashMap, HashSet};

use bevy::prelude::*;
use hexx::Hex;

use crate::ai::error::{ExecutionError, IntelligenceError, RequestError};
use crate::ai::improvements::{Improvement, TileImprovementPlan};
use crate::ai::mission::Mission;
use crate::ai::oracle::{
    ActionRequests, CostPolicy, ExecutionReport, MarketPricing, MissionExecution, NationSummary,
    Pathfinding, StrengthAppraisal,
};
use crate::ai::player::{AiPlayer, AiUnit};
use crate::ai::snapshot::{
    AiSnapshot, NationSnapshot, ParcelSnapshot, SettlementSnapshot, UnitSnapshot,
};
use crate::ai::wishes::{GoodsWish, Wish, WishId, WorkerWish};
use crate::game::{
    GameMap, GoodsType, Location, MapTile, NationId, NationKind, NationalAdvantage, SettlementKind,
    Stance, UnitPlacement, UnitRole, UnitType,
};

/// Land tiles around the origin belong to this landmass.
pub const HOME_LANDMASS: u32 = 1;

/// Radius of the home island centred on the origin.
pub const HOME_RADIUS: u32 = 4;

/// Describes a game state for the planner.
///
/// The map starts as an island of radius [`HOME_RADIUS`] around the origin,
/// ringed by two bands of ocean, the outer one high seas. Entities are handed
/// out in creation order.
#[derive(Clone)]
pub struct SnapshotBuilder {
    snapshot: AiSnapshot,
    next_entity: u64,
    next_serial: u32,
    next_landmass: u32,
}

impl SnapshotBuilder {
    pub fn new(own: NationId) -> Self {
        let mut map = GameMap::default();
        for hex in Hex::ZERO.range(HOME_RADIUS) {
            map.insert(hex, MapTile::land(HOME_LANDMASS));
        }
        for hex in Hex::ZERO.ring(HOME_RADIUS + 1) {
            map.insert(hex, MapTile::ocean());
        }
        for hex in Hex::ZERO.ring(HOME_RADIUS + 2) {
            map.insert(
                hex,
                MapTile {
                    high_seas: true,
                    ..MapTile::ocean()
                },
            );
        }

        let mut builder = Self {
            snapshot: AiSnapshot {
                turn: 1,
                age: 1,
                map,
                ..default()
            },
            next_entity: 1,
            next_serial: 0,
            next_landmass: HOME_LANDMASS + 1,
        };
        builder.add_nation(own, NationKind::European);
        builder
    }

    fn entity(&mut self) -> Entity {
        let entity = Entity::from_bits(self.next_entity);
        self.next_entity += 1;
        entity
    }

    fn add_nation(&mut self, id: NationId, kind: NationKind) -> Entity {
        let entity = self.entity();
        self.snapshot.nations.insert(
            id,
            NationSnapshot {
                entity,
                id,
                name: format!("Nation {}", id.0),
                kind,
                gold: 0,
                can_found_settlements: kind == NationKind::European,
                always_offered_peace: false,
                advantage: NationalAdvantage::None,
                stances: BTreeMap::new(),
                tension: BTreeMap::new(),
                peace_since: BTreeMap::new(),
            },
        );
        entity
    }

    /// Adds another European faction.
    pub fn rival(&mut self, id: NationId) -> Entity {
        self.add_nation(id, NationKind::European)
    }

    pub fn native(&mut self, id: NationId) -> Entity {
        self.add_nation(id, NationKind::Native)
    }

    pub fn royal(&mut self, id: NationId) -> Entity {
        self.add_nation(id, NationKind::Royal)
    }

    /// Sets the stance both ways.
    pub fn stance(&mut self, a: NationId, b: NationId, stance: Stance) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&a) {
            nation.stances.insert(b, stance);
        }
        if let Some(nation) = self.snapshot.nations.get_mut(&b) {
            nation.stances.insert(a, stance);
        }
        self
    }

    pub fn always_offered_peace(&mut self, id: NationId) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&id) {
            nation.always_offered_peace = true;
        }
        self
    }

    pub fn cannot_found(&mut self, id: NationId) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&id) {
            nation.can_found_settlements = false;
        }
        self
    }

    /// Ill will `from` feels towards `towards`.
    pub fn tension(&mut self, from: NationId, towards: NationId, tension: u32) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&from) {
            nation.tension.insert(towards, tension);
        }
        self
    }

    pub fn peace_since(&mut self, a: NationId, b: NationId, turn: u32) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&a) {
            nation.peace_since.insert(b, turn);
        }
        if let Some(nation) = self.snapshot.nations.get_mut(&b) {
            nation.peace_since.insert(a, turn);
        }
        self
    }

    pub fn advantage(&mut self, id: NationId, advantage: NationalAdvantage) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&id) {
            nation.advantage = advantage;
        }
        self
    }

    pub fn gold(&mut self, id: NationId, gold: i64) -> &mut Self {
        if let Some(nation) = self.snapshot.nations.get_mut(&id) {
            nation.gold = gold;
        }
        self
    }

    pub fn turn(&mut self, turn: u32) -> &mut Self {
        self.snapshot.turn = turn;
        self
    }

    pub fn age(&mut self, age: u8) -> &mut Self {
        self.snapshot.age = age;
        self
    }

    /// A second landmass away from the home island.
    pub fn island(&mut self, center: Hex, radius: u32) -> &mut Self {
        let landmass = self.next_landmass;
        self.next_landmass += 1;
        for hex in center.range(radius) {
            self.snapshot.map.insert(hex, MapTile::land(landmass));
        }
        for hex in center.ring(radius + 1) {
            self.snapshot.map.insert(hex, MapTile::ocean());
        }
        self
    }

    pub fn rumour(&mut self, hex: Hex) -> &mut Self {
        if let Some(tile) = self.snapshot.map.tile_mut(hex) {
            tile.lost_city_rumour = true;
        }
        self
    }

    /// Marks a land tile as a settlement site worth `value`.
    pub fn site(&mut self, hex: Hex, value: u32) -> &mut Self {
        if let Some(tile) = self.snapshot.map.tile_mut(hex) {
            tile.colony_value = value;
        }
        self
    }

    fn settlement(&mut self, owner: NationId, hex: Hex, kind: SettlementKind, port: bool) -> Entity {
        let entity = self.entity();
        if let Some(tile) = self.snapshot.map.tile_mut(hex) {
            tile.settlement = Some(entity);
            tile.owner = Some(owner);
        }
        let name = format!("Settlement {}", self.snapshot.settlements.len() + 1);
        self.snapshot.settlements.insert(
            entity,
            SettlementSnapshot {
                entity,
                owner,
                name,
                tile: hex,
                kind,
                connected_port: port,
                stockade_level: 0,
                defence_ratio: 1.0,
                badly_defended: false,
                goods: BTreeMap::new(),
                owned_tiles: 0,
                missionary: None,
                scouted_by: Vec::new(),
                wishes: Vec::new(),
                improvement_plans: Vec::new(),
            },
        );
        entity
    }

    pub fn colony(&mut self, owner: NationId, hex: Hex, port: bool) -> Entity {
        self.settlement(owner, hex, SettlementKind::Colony, port)
    }

    pub fn native_camp(&mut self, owner: NationId, hex: Hex) -> Entity {
        self.settlement(owner, hex, SettlementKind::NativeCamp, false)
    }

    fn settlement_mut(&mut self, settlement: Entity) -> Option<&mut SettlementSnapshot> {
        self.snapshot.settlements.get_mut(&settlement)
    }

    pub fn badly_defended(&mut self, settlement: Entity, defence_ratio: f64) -> &mut Self {
        if let Some(settlement) = self.settlement_mut(settlement) {
            settlement.badly_defended = true;
            settlement.defence_ratio = defence_ratio;
        }
        self
    }

    pub fn stockade(&mut self, settlement: Entity, level: u32) -> &mut Self {
        if let Some(settlement) = self.settlement_mut(settlement) {
            settlement.stockade_level = level;
        }
        self
    }

    pub fn owned_tiles(&mut self, settlement: Entity, tiles: u32) -> &mut Self {
        if let Some(settlement) = self.settlement_mut(settlement) {
            settlement.owned_tiles = tiles;
        }
        self
    }

    pub fn scouted_by(&mut self, settlement: Entity, nation: NationId) -> &mut Self {
        if let Some(settlement) = self.settlement_mut(settlement) {
            settlement.scouted_by.push(nation);
        }
        self
    }

    pub fn stock(&mut self, settlement: Entity, goods: GoodsType, amount: u32) -> &mut Self {
        if let Some(settlement) = self.settlement_mut(settlement) {
            *settlement.goods.entry(goods).or_default() += amount;
        }
        self
    }

    pub fn improvement(
        &mut self,
        settlement: Entity,
        tile: Hex,
        improvement: Improvement,
        value: i32,
    ) -> &mut Self {
        if let Some(colony) = self.settlement_mut(settlement) {
            colony
                .improvement_plans
                .push(TileImprovementPlan::new(settlement, tile, improvement, value));
        }
        self
    }

    fn wish_id(&mut self, settlement: Entity) -> WishId {
        self.next_serial += 1;
        WishId {
            settlement,
            serial: self.next_serial,
        }
    }

    pub fn worker_wish(&mut self, settlement: Entity, unit_type: UnitType, value: i32) -> WishId {
        let id = self.wish_id(settlement);
        if let Some(colony) = self.settlement_mut(settlement) {
            let destination = colony.location();
            colony.wishes.push(Wish::Worker(WorkerWish {
                id,
                destination,
                value,
                unit_type,
                transportable: None,
            }));
        }
        id
    }

    pub fn goods_wish(
        &mut self,
        settlement: Entity,
        goods_type: GoodsType,
        amount: u32,
        value: i32,
    ) -> WishId {
        let id = self.wish_id(settlement);
        if let Some(colony) = self.settlement_mut(settlement) {
            let destination = colony.location();
            colony.wishes.push(Wish::Goods(GoodsWish {
                id,
                destination,
                value,
                goods_type,
                amount,
                transportable: None,
            }));
        }
        id
    }

    fn place(
        &mut self,
        owner: NationId,
        unit_type: UnitType,
        placement: UnitPlacement,
        location: Option<Location>,
    ) -> Entity {
        let entity = self.entity();
        self.snapshot.units.insert(
            entity,
            UnitSnapshot {
                entity,
                owner,
                unit_type,
                role: UnitRole::Default,
                placement,
                location,
                damaged: false,
                treasure: 0,
            },
        );
        entity
    }

    /// A unit standing on a tile or waiting in Europe.
    pub fn unit(&mut self, owner: NationId, unit_type: UnitType, location: Location) -> Entity {
        let placement = match location {
            Location::Tile(hex) => UnitPlacement::OnTile(hex),
            Location::Europe => UnitPlacement::InEurope,
        };
        self.place(owner, unit_type, placement, Some(location))
    }

    pub fn armed_unit(&mut self, owner: NationId, unit_type: UnitType, location: Location) -> Entity {
        let entity = self.unit(owner, unit_type, location);
        self.role(entity, UnitRole::Soldier);
        entity
    }

    pub fn role(&mut self, unit: Entity, role: UnitRole) -> &mut Self {
        if let Some(unit) = self.snapshot.units.get_mut(&unit) {
            unit.role = role;
        }
        self
    }

    /// A unit working inside a settlement.
    pub fn worker(&mut self, owner: NationId, unit_type: UnitType, settlement: Entity) -> Entity {
        let location = self.snapshot.settlements.get(&settlement).map(|s| s.location());
        self.place(
            owner,
            unit_type,
            UnitPlacement::InSettlement(settlement),
            location,
        )
    }

    /// A unit carried by `carrier`, sharing its location.
    pub fn passenger(&mut self, owner: NationId, unit_type: UnitType, carrier: Entity) -> Entity {
        let location = self.snapshot.units.get(&carrier).and_then(|c| c.location);
        self.place(owner, unit_type, UnitPlacement::Aboard(carrier), location)
    }

    pub fn at_sea(&mut self, owner: NationId, unit_type: UnitType) -> Entity {
        self.place(owner, unit_type, UnitPlacement::AtSea, None)
    }

    pub fn treasure(&mut self, owner: NationId, hex: Hex, amount: u32) -> Entity {
        let entity = self.unit(owner, UnitType::TreasureTrain, Location::Tile(hex));
        if let Some(unit) = self.snapshot.units.get_mut(&entity) {
            unit.treasure = amount;
        }
        entity
    }

    pub fn damage(&mut self, unit: Entity) -> &mut Self {
        if let Some(unit) = self.snapshot.units.get_mut(&unit) {
            unit.damaged = true;
        }
        self
    }

    pub fn parcel(
        &mut self,
        owner: NationId,
        goods_type: GoodsType,
        amount: u32,
        location: Location,
    ) -> Entity {
        let entity = self.entity();
        let settlement = location
            .tile()
            .and_then(|hex| self.snapshot.settlement_at(hex))
            .map(|s| s.entity);
        self.snapshot.parcels.insert(
            entity,
            ParcelSnapshot {
                entity,
                owner,
                settlement,
                goods_type,
                amount,
                location: Some(location),
                destination: None,
                aboard: None,
            },
        );
        entity
    }

    /// Gives a parcel a delivery point of its own.
    pub fn parcel_destination(&mut self, parcel: Entity, destination: Location) -> &mut Self {
        if let Some(parcel) = self.snapshot.parcels.get_mut(&parcel) {
            parcel.destination = Some(destination);
        }
        self
    }

    pub fn build(self) -> AiSnapshot {
        self.snapshot
    }
}

/// Controller registered on the faction's entity in `snapshot`.
pub fn ai_player(snapshot: &AiSnapshot, nation: NationId) -> AiPlayer {
    let entity = snapshot
        .nation(nation)
        .map_or(Entity::PLACEHOLDER, |n| n.entity);
    AiPlayer::new(nation, entity)
}

/// Reachability read from a script. Unscripted trips are impossible.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPathfinder {
    routes: HashMap<(Entity, Location), u32>,
    relaxed: HashMap<(Entity, Location), u32>,
}

impl ScriptedPathfinder {
    /// `unit` reaches `to` in `turns` under either policy.
    pub fn route(mut self, unit: Entity, to: Location, turns: u32) -> Self {
        self.routes.insert((unit, to), turns);
        self
    }

    /// `unit` reaches `to` only when foreign settlements are ignored.
    pub fn relaxed_route(mut self, unit: Entity, to: Location, turns: u32) -> Self {
        self.relaxed.insert((unit, to), turns);
        self
    }
}

impl Pathfinding for ScriptedPathfinder {
    fn turns_to_reach(
        &self,
        unit: &UnitSnapshot,
        from: Location,
        to: Location,
        policy: CostPolicy,
    ) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let key = (unit.entity, to);
        match policy {
            CostPolicy::Strict => self.routes.get(&key).copied(),
            CostPolicy::Relaxed => self
                .routes
                .get(&key)
                .or_else(|| self.relaxed.get(&key))
                .copied(),
        }
    }
}

/// Strength reports given up front. Unlisted factions are unavailable.
#[derive(Debug, Default, Clone)]
pub struct FixedStrength {
    reports: BTreeMap<NationId, NationSummary>,
}

impl FixedStrength {
    pub fn with(mut self, nation: NationId, strength: f64, naval_strength: f64) -> Self {
        self.reports.insert(
            nation,
            NationSummary {
                strength,
                naval_strength,
            },
        );
        self
    }
}

impl StrengthAppraisal for FixedStrength {
    fn appraise(&self, nation: NationId) -> Result<NationSummary, IntelligenceError> {
        self.reports
            .get(&nation)
            .copied()
            .ok_or(IntelligenceError::Unavailable(nation))
    }
}

/// Same price per unit for every kind of goods.
#[derive(Debug, Clone, Copy)]
pub struct FlatMarket {
    sale: i64,
    bid: i64,
}

impl FlatMarket {
    pub fn new(sale: i64, bid: i64) -> Self {
        Self { sale, bid }
    }
}

impl MarketPricing for FlatMarket {
    fn sale_price(&self, _goods: GoodsType, amount: u32) -> i64 {
        self.sale * i64::from(amount)
    }

    fn bid_price(&self, _goods: GoodsType, amount: u32) -> i64 {
        self.bid * i64::from(amount)
    }

    fn unit_price(&self, unit_type: UnitType) -> i64 {
        unit_type.base_price()
    }
}

/// Records every step and replies as scripted.
///
/// Units without a script spend all their moves on the first step.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub steps: Vec<Entity>,
    outcomes: HashMap<Entity, ExecutionReport>,
    failing: HashSet<Entity>,
    retargets: HashMap<Entity, Mission>,
}

impl RecordingExecutor {
    pub fn outcome(mut self, unit: Entity, report: ExecutionReport) -> Self {
        self.outcomes.insert(unit, report);
        self
    }

    pub fn failing(mut self, unit: Entity) -> Self {
        self.failing.insert(unit);
        self
    }

    /// Replaces the unit's mission during its first step.
    pub fn retarget(mut self, unit: Entity, mission: Mission) -> Self {
        self.retargets.insert(unit, mission);
        self
    }

    pub fn steps_of(&self, unit: Entity) -> usize {
        self.steps.iter().filter(|step| **step == unit).count()
    }
}

impl MissionExecution for RecordingExecutor {
    fn advance(
        &mut self,
        unit: &mut AiUnit,
        _snapshot: &AiSnapshot,
    ) -> Result<ExecutionReport, ExecutionError> {
        self.steps.push(unit.entity);
        if self.failing.contains(&unit.entity) {
            return Err(ExecutionError::StepFailed {
                unit: unit.entity,
                reason: "scripted failure".to_string(),
            });
        }
        if let Some(mission) = self.retargets.remove(&unit.entity) {
            unit.mission = Some(mission);
        }
        Ok(self.outcomes.get(&unit.entity).copied().unwrap_or_default())
    }
}

/// Grants requests until told otherwise and remembers them.
#[derive(Debug)]
pub struct RecordingRequests {
    pub equipped: Vec<(Entity, UnitRole)>,
    pub recruited: usize,
    pub trained: Vec<UnitType>,
    pub emigrations: usize,
    pub stance_changes: Vec<(NationId, NationId, Stance)>,
    /// (colony, settlement, goods, amount)
    pub gifts: Vec<(Entity, Entity, GoodsType, u32)>,
    pub tributes: Vec<(Entity, Entity)>,
    refuse_equipment: bool,
    recruit_budget: usize,
}

impl Default for RecordingRequests {
    fn default() -> Self {
        Self {
            equipped: Vec::new(),
            recruited: 0,
            trained: Vec::new(),
            emigrations: 0,
            stance_changes: Vec::new(),
            gifts: Vec::new(),
            tributes: Vec::new(),
            refuse_equipment: false,
            recruit_budget: usize::MAX,
        }
    }
}

impl RecordingRequests {
    pub fn refusing_equipment() -> Self {
        Self {
            refuse_equipment: true,
            ..default()
        }
    }

    /// Only `budget` new units are granted, recruited or trained.
    pub fn with_recruits(budget: usize) -> Self {
        Self {
            recruit_budget: budget,
            ..default()
        }
    }

    fn granted(&self) -> usize {
        self.recruited + self.trained.len()
    }
}

impl ActionRequests for RecordingRequests {
    fn equip(&mut self, unit: &UnitSnapshot, role: UnitRole) -> Result<(), RequestError> {
        if self.refuse_equipment {
            return Err(RequestError::Refused(format!("no equipment for {:?}", role)));
        }
        self.equipped.push((unit.entity, role));
        Ok(())
    }

    fn recruit(&mut self, _nation: NationId) -> Result<(), RequestError> {
        if self.granted() >= self.recruit_budget {
            return Err(RequestError::NoEffect);
        }
        self.recruited += 1;
        Ok(())
    }

    fn train(&mut self, _nation: NationId, unit_type: UnitType) -> Result<(), RequestError> {
        if self.granted() >= self.recruit_budget {
            return Err(RequestError::NoEffect);
        }
        self.trained.push(unit_type);
        Ok(())
    }

    fn request_emigration(&mut self, _nation: NationId) -> Result<(), RequestError> {
        self.emigrations += 1;
        Ok(())
    }

    fn change_stance(
        &mut self,
        nation: NationId,
        towards: NationId,
        stance: Stance,
    ) -> Result<(), RequestError> {
        self.stance_changes.push((nation, towards, stance));
        Ok(())
    }

    fn deliver_gift(
        &mut self,
        colony: &SettlementSnapshot,
        settlement: &SettlementSnapshot,
        goods: GoodsType,
        amount: u32,
    ) -> Result<(), RequestError> {
        self.gifts.push((colony.entity, settlement.entity, goods, amount));
        Ok(())
    }

    fn demand_tribute(
        &mut self,
        unit: &UnitSnapshot,
        settlement: &SettlementSnapshot,
    ) -> Result<(), RequestError> {
        self.tributes.push((unit.entity, settlement.entity));
        Ok(())
    }
}

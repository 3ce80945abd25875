//! Game state snapshot for AI decision-making.
//!
//! The roster is captured once per enemy turn so every faction plans against the
//! same consistent view.

use std::collections::BTreeMap;

use bevy::prelude::*;
use hexx::Hex;

use crate::ai::colony::AiColony;
use crate::ai::improvements::TileImprovementPlan;
use crate::ai::wishes::Wish;
use crate::game::{
    GameMap, GoodsParcel, GoodsType, Location, Nation, NationId, NationKind, NationalAdvantage,
    Settlement, SettlementKind, Stance, Unit, UnitPlacement, UnitRole, UnitType,
};
use crate::turn_system::TurnSystem;

/// Complete game state snapshot built once per turn.
#[derive(Resource, Default, Debug, Clone)]
pub struct AiSnapshot {
    pub turn: u32,
    pub age: u8,
    pub map: GameMap,
    pub nations: BTreeMap<NationId, NationSnapshot>,
    pub units: BTreeMap<Entity, UnitSnapshot>,
    pub settlements: BTreeMap<Entity, SettlementSnapshot>,
    pub parcels: BTreeMap<Entity, ParcelSnapshot>,
}

#[derive(Debug, Clone)]
pub struct NationSnapshot {
    pub entity: Entity,
    pub id: NationId,
    pub name: String,
    pub kind: NationKind,
    pub gold: i64,
    pub can_found_settlements: bool,
    pub always_offered_peace: bool,
    pub advantage: NationalAdvantage,
    pub stances: BTreeMap<NationId, Stance>,
    pub tension: BTreeMap<NationId, u32>,
    pub peace_since: BTreeMap<NationId, u32>,
}

impl NationSnapshot {
    pub fn stance_towards(&self, other: NationId) -> Stance {
        self.stances
            .get(&other)
            .copied()
            .unwrap_or(Stance::Uncontacted)
    }

    pub fn tension_towards(&self, other: NationId) -> Option<u32> {
        self.tension.get(&other).copied()
    }

    pub fn is_at_war(&self) -> bool {
        self.stances.values().any(|stance| *stance == Stance::War)
    }
}

#[derive(Debug, Clone)]
pub struct UnitSnapshot {
    pub entity: Entity,
    pub owner: NationId,
    pub unit_type: UnitType,
    pub role: UnitRole,
    pub placement: UnitPlacement,
    /// Resolved location. `None` while at sea.
    pub location: Option<Location>,
    pub damaged: bool,
    pub treasure: u32,
}

impl UnitSnapshot {
    pub fn tile(&self) -> Option<Hex> {
        self.location.and_then(Location::tile)
    }

    pub fn is_naval(&self) -> bool {
        self.unit_type.is_naval()
    }

    pub fn is_person(&self) -> bool {
        self.unit_type.is_person()
    }

    pub fn is_carrier(&self) -> bool {
        self.unit_type.is_carrier()
    }

    pub fn capacity(&self) -> u32 {
        self.unit_type.capacity()
    }

    pub fn space_taken(&self) -> u32 {
        self.unit_type.space_taken()
    }

    pub fn skill(&self) -> i32 {
        self.unit_type.skill()
    }

    pub fn has_default_role(&self) -> bool {
        self.role == UnitRole::Default
    }

    pub fn aboard(&self) -> Option<Entity> {
        match self.placement {
            UnitPlacement::Aboard(carrier) => Some(carrier),
            _ => None,
        }
    }

    pub fn working_in(&self) -> Option<Entity> {
        match self.placement {
            UnitPlacement::InSettlement(settlement) => Some(settlement),
            _ => None,
        }
    }

    pub fn is_on_tile(&self) -> bool {
        matches!(self.placement, UnitPlacement::OnTile(_))
    }

    pub fn is_in_europe(&self) -> bool {
        self.placement == UnitPlacement::InEurope
    }

    pub fn is_at_sea(&self) -> bool {
        self.placement == UnitPlacement::AtSea
    }

    pub fn is_treasure_train(&self) -> bool {
        self.unit_type == UnitType::TreasureTrain && self.treasure > 0
    }

    /// Able to attack: armed land units, artillery and warships.
    pub fn is_offensive(&self) -> bool {
        self.unit_type.offence(self.role) > 0.0
    }

    /// Able to garrison a settlement.
    pub fn is_defender(&self) -> bool {
        !self.is_naval() && (self.role.is_armed() || self.unit_type == UnitType::Artillery)
    }

    pub fn moves_per_turn(&self) -> u32 {
        let base = self.unit_type.base_moves();
        if self.role.mounted() { base + 3 } else { base }
    }
}

#[derive(Debug, Clone)]
pub struct SettlementSnapshot {
    pub entity: Entity,
    pub owner: NationId,
    pub name: String,
    pub tile: Hex,
    pub kind: SettlementKind,
    pub connected_port: bool,
    pub stockade_level: u32,
    pub defence_ratio: f64,
    pub badly_defended: bool,
    pub goods: BTreeMap<GoodsType, u32>,
    pub owned_tiles: u32,
    pub missionary: Option<NationId>,
    pub scouted_by: Vec<NationId>,
    pub wishes: Vec<Wish>,
    pub improvement_plans: Vec<TileImprovementPlan>,
}

impl SettlementSnapshot {
    pub fn location(&self) -> Location {
        Location::Tile(self.tile)
    }

    pub fn goods_amount(&self, goods: GoodsType) -> u32 {
        self.goods.get(&goods).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct ParcelSnapshot {
    pub entity: Entity,
    pub owner: NationId,
    pub settlement: Option<Entity>,
    pub goods_type: GoodsType,
    pub amount: u32,
    pub location: Option<Location>,
    pub destination: Option<Location>,
    pub aboard: Option<Entity>,
}

impl AiSnapshot {
    pub fn nation(&self, id: NationId) -> Option<&NationSnapshot> {
        self.nations.get(&id)
    }

    pub fn unit(&self, entity: Entity) -> Option<&UnitSnapshot> {
        self.units.get(&entity)
    }

    pub fn settlement(&self, entity: Entity) -> Option<&SettlementSnapshot> {
        self.settlements.get(&entity)
    }

    pub fn parcel(&self, entity: Entity) -> Option<&ParcelSnapshot> {
        self.parcels.get(&entity)
    }

    pub fn units_of(&self, nation: NationId) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.values().filter(move |unit| unit.owner == nation)
    }

    pub fn settlements_of(&self, nation: NationId) -> impl Iterator<Item = &SettlementSnapshot> {
        self.settlements
            .values()
            .filter(move |settlement| settlement.owner == nation)
    }

    pub fn parcels_of(&self, nation: NationId) -> impl Iterator<Item = &ParcelSnapshot> {
        self.parcels.values().filter(move |parcel| parcel.owner == nation)
    }

    /// Settlements of a nation reachable from the high seas.
    pub fn ports_of(&self, nation: NationId) -> Vec<&SettlementSnapshot> {
        self.settlements_of(nation)
            .filter(|settlement| settlement.connected_port)
            .collect()
    }

    pub fn settlement_at(&self, tile: Hex) -> Option<&SettlementSnapshot> {
        self.settlements.values().find(|settlement| settlement.tile == tile)
    }

    pub fn units_at(&self, tile: Hex) -> impl Iterator<Item = &UnitSnapshot> {
        self.units
            .values()
            .filter(move |unit| unit.tile() == Some(tile))
    }

    /// Units working inside a settlement.
    pub fn workers_in(&self, settlement: Entity) -> usize {
        self.units
            .values()
            .filter(|unit| unit.working_in() == Some(settlement))
            .count()
    }

    pub fn passengers_of(&self, carrier: Entity) -> impl Iterator<Item = &UnitSnapshot> {
        self.units
            .values()
            .filter(move |unit| unit.aboard() == Some(carrier))
    }

    pub fn landmass_of(&self, location: Location) -> Option<u32> {
        self.map.landmass_of(location)
    }

    pub fn stance(&self, from: NationId, towards: NationId) -> Stance {
        self.nation(from)
            .map(|nation| nation.stance_towards(towards))
            .unwrap_or(Stance::Uncontacted)
    }

    pub fn at_war(&self, a: NationId, b: NationId) -> bool {
        self.stance(a, b) == Stance::War
    }
}

/// Captures the roster into [`AiSnapshot`].
pub fn build_ai_snapshot(
    mut snapshot: ResMut<AiSnapshot>,
    turn: Res<TurnSystem>,
    map: Res<GameMap>,
    nations: Query<(Entity, &Nation)>,
    units: Query<(Entity, &Unit)>,
    settlements: Query<(Entity, &Settlement, Option<&AiColony>)>,
    parcels: Query<(Entity, &GoodsParcel)>,
) {
    snapshot.turn = turn.current_turn;
    snapshot.age = turn.age();
    snapshot.map = (*map).clone();

    snapshot.nations = nations
        .iter()
        .map(|(entity, nation)| {
            (
                nation.id,
                NationSnapshot {
                    entity,
                    id: nation.id,
                    name: nation.name.clone(),
                    kind: nation.kind,
                    gold: nation.gold,
                    can_found_settlements: nation.can_found_settlements,
                    always_offered_peace: nation.always_offered_peace,
                    advantage: nation.advantage,
                    stances: nation.stances.clone(),
                    tension: nation.tension.clone(),
                    peace_since: nation.peace_since.clone(),
                },
            )
        })
        .collect();

    snapshot.settlements = settlements
        .iter()
        .map(|(entity, settlement, colony)| {
            let (wishes, improvement_plans) = colony
                .map(|colony| (colony.wishes.clone(), colony.improvement_plans.clone()))
                .unwrap_or_default();
            (
                entity,
                SettlementSnapshot {
                    entity,
                    owner: settlement.owner,
                    name: settlement.name.clone(),
                    tile: settlement.tile,
                    kind: settlement.kind,
                    connected_port: settlement.connected_port,
                    stockade_level: settlement.stockade_level,
                    defence_ratio: settlement.defence_ratio,
                    badly_defended: settlement.badly_defended,
                    goods: settlement.goods.clone(),
                    owned_tiles: settlement.owned_tiles,
                    missionary: settlement.missionary,
                    scouted_by: settlement.scouted_by.clone(),
                    wishes,
                    improvement_plans,
                },
            )
        })
        .collect();

    // Carriers first so passengers can resolve their location.
    let mut resolved: BTreeMap<Entity, UnitSnapshot> = BTreeMap::new();
    for (entity, unit) in units.iter() {
        let location = match unit.placement {
            UnitPlacement::OnTile(hex) => Some(Location::Tile(hex)),
            UnitPlacement::InSettlement(settlement) => snapshot
                .settlements
                .get(&settlement)
                .map(|settlement| Location::Tile(settlement.tile)),
            UnitPlacement::InEurope => Some(Location::Europe),
            UnitPlacement::Aboard(_) | UnitPlacement::AtSea => None,
        };
        resolved.insert(
            entity,
            UnitSnapshot {
                entity,
                owner: unit.owner,
                unit_type: unit.unit_type,
                role: unit.role,
                placement: unit.placement,
                location,
                damaged: unit.damaged,
                treasure: unit.treasure,
            },
        );
    }
    let carrier_locations: Vec<(Entity, Option<Location>)> = resolved
        .values()
        .filter_map(|unit| {
            unit.aboard()
                .map(|carrier| (unit.entity, resolved.get(&carrier).and_then(|c| c.location)))
        })
        .collect();
    for (entity, location) in carrier_locations {
        if let Some(unit) = resolved.get_mut(&entity) {
            unit.location = location;
        }
    }
    snapshot.units = resolved;

    let parcel_snapshots: BTreeMap<Entity, ParcelSnapshot> = parcels
        .iter()
        .map(|(entity, parcel)| {
            let location = match parcel.aboard {
                Some(carrier) => snapshot.units.get(&carrier).and_then(|c| c.location),
                None => parcel.location,
            };
            (
                entity,
                ParcelSnapshot {
                    entity,
                    owner: parcel.owner,
                    settlement: parcel.settlement,
                    goods_type: parcel.goods_type,
                    amount: parcel.amount,
                    location,
                    destination: parcel.destination,
                    aboard: parcel.aboard,
                },
            )
        })
        .collect();
    snapshot.parcels = parcel_snapshots;

    debug!(
        "AI snapshot for turn {}: {} nations, {} units, {} settlements",
        snapshot.turn,
        snapshot.nations.len(),
        snapshot.units.len(),
        snapshot.settlements.len()
    );
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::game::MapTile;

    #[test]
    fn passengers_take_their_carrier_location() {
        let mut world = World::new();
        world.init_resource::<TurnSystem>();
        world.init_resource::<AiSnapshot>();
        let mut map = GameMap::default();
        map.insert(Hex::new(1, 1), MapTile::ocean());
        world.insert_resource(map);

        world.spawn(Nation::european(NationId(1), "Dutch"));
        let ship = world
            .spawn(Unit::new(
                NationId(1),
                UnitType::Caravel,
                UnitPlacement::OnTile(Hex::new(1, 1)),
            ))
            .id();
        let colonist = world
            .spawn(Unit::new(
                NationId(1),
                UnitType::FreeColonist,
                UnitPlacement::Aboard(ship),
            ))
            .id();

        let _ = world.run_system_once(build_ai_snapshot);

        let snapshot = world.resource::<AiSnapshot>();
        let passenger = snapshot.unit(colonist).unwrap();
        assert_eq!(passenger.location, Some(Location::Tile(Hex::new(1, 1))));
        assert_eq!(passenger.aboard(), Some(ship));
        assert_eq!(snapshot.passengers_of(ship).count(), 1);
        assert!(snapshot.nation(NationId(1)).is_some());
    }

    #[test]
    fn workers_resolve_to_their_settlement_tile() {
        let mut world = World::new();
        world.init_resource::<TurnSystem>();
        world.init_resource::<AiSnapshot>();
        world.init_resource::<GameMap>();

        let colony = world
            .spawn(Settlement::colony(NationId(1), "Fort Orange", Hex::new(3, 2)))
            .id();
        let worker = world
            .spawn(Unit::new(
                NationId(1),
                UnitType::ExpertFarmer,
                UnitPlacement::InSettlement(colony),
            ))
            .id();

        let _ = world.run_system_once(build_ai_snapshot);

        let snapshot = world.resource::<AiSnapshot>();
        assert_eq!(snapshot.unit(worker).unwrap().tile(), Some(Hex::new(3, 2)));
        assert_eq!(snapshot.workers_in(colony), 1);
        assert_eq!(snapshot.settlements_of(NationId(1)).count(), 1);
    }
}

//! The per-faction AI controller and the objects it controls.

use std::collections::{BTreeMap, HashMap, HashSet};

use bevy::prelude::*;
use hexx::Hex;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ai::intelligence::NationIntelligence;
use crate::ai::mission::Mission;
use crate::ai::snapshot::{AiSnapshot, UnitSnapshot};
use crate::ai::transport::{Transportable, TransportableId, TransportableView, TransportMission};
use crate::ai::wishes::WishId;
use crate::constants::{AI_RNG_SEED, GOODS_PER_HOLD};
use crate::game::{GameMap, Location, NationId};

/// A unit under AI control.
#[derive(Debug, Clone, PartialEq)]
pub struct AiUnit {
    pub entity: Entity,
    pub mission: Option<Mission>,
    pub transport: Option<Entity>,
    pub transport_priority: u32,
}

impl AiUnit {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            mission: None,
            transport: None,
            transport_priority: 0,
        }
    }

    pub fn has_valid_mission(&self, unit: &UnitSnapshot, snapshot: &AiSnapshot) -> bool {
        self.mission
            .as_ref()
            .is_some_and(|mission| mission.is_valid(unit, snapshot))
    }

    /// Where a carrier should drop this unit, if it needs one.
    pub fn transport_destination(&self, unit: &UnitSnapshot, map: &GameMap) -> Option<Location> {
        let target = self.mission.as_ref()?.target()?;
        needs_carrier(unit, target, map).then_some(target)
    }

    pub fn transport_view(&self, unit: &UnitSnapshot, snapshot: &AiSnapshot) -> TransportableView {
        TransportableView {
            id: TransportableId::Unit(self.entity),
            source: unit.location,
            destination: self.transport_destination(unit, &snapshot.map),
            transport: self.transport,
            aboard: unit.aboard(),
            priority: self.transport_priority,
            space: unit.space_taken(),
        }
    }
}

/// Land units need a ship to cross water or to leave and reach Europe.
pub fn needs_carrier(unit: &UnitSnapshot, target: Location, map: &GameMap) -> bool {
    if unit.is_naval() {
        return false;
    }
    match (unit.location, target) {
        (None, _) | (Some(Location::Europe), Location::Europe) => false,
        (Some(Location::Europe), Location::Tile(_)) | (Some(Location::Tile(_)), Location::Europe) => {
            true
        }
        (Some(Location::Tile(from)), Location::Tile(to)) => map.landmass(from) != map.landmass(to),
    }
}

/// A goods parcel the AI routes.
#[derive(Debug, Clone, PartialEq)]
pub struct AiGoods {
    pub parcel: Entity,
    /// Delivery point chosen by the AI. Falls back to the parcel's own.
    pub destination: Option<Location>,
    pub wish: Option<WishId>,
    pub transport: Option<Entity>,
    pub transport_priority: u32,
}

impl AiGoods {
    pub fn new(parcel: Entity) -> Self {
        Self {
            parcel,
            destination: None,
            wish: None,
            transport: None,
            transport_priority: 0,
        }
    }
}

impl Transportable for AiUnit {
    fn transportable_id(&self) -> TransportableId {
        TransportableId::Unit(self.entity)
    }

    fn transport(&self) -> Option<Entity> {
        self.transport
    }

    fn set_transport(&mut self, carrier: Option<Entity>) {
        self.transport = carrier;
    }

    fn transport_priority(&self) -> u32 {
        self.transport_priority
    }

    fn increase_transport_priority(&mut self) {
        self.transport_priority += 1;
    }

    fn view(&self, snapshot: &AiSnapshot) -> Option<TransportableView> {
        snapshot
            .unit(self.entity)
            .map(|unit| self.transport_view(unit, snapshot))
    }
}

impl Transportable for AiGoods {
    fn transportable_id(&self) -> TransportableId {
        TransportableId::Goods(self.parcel)
    }

    fn transport(&self) -> Option<Entity> {
        self.transport
    }

    fn set_transport(&mut self, carrier: Option<Entity>) {
        self.transport = carrier;
    }

    fn transport_priority(&self) -> u32 {
        self.transport_priority
    }

    fn increase_transport_priority(&mut self) {
        self.transport_priority += 1;
    }

    fn view(&self, snapshot: &AiSnapshot) -> Option<TransportableView> {
        let parcel = snapshot.parcel(self.parcel)?;
        Some(TransportableView {
            id: TransportableId::Goods(self.parcel),
            source: parcel.location,
            destination: self.destination.or(parcel.destination),
            transport: self.transport,
            aboard: parcel.aboard,
            priority: self.transport_priority,
            space: parcel.amount.div_ceil(GOODS_PER_HOLD).max(1),
        })
    }
}

/// AI controller attached to a faction's entity.
#[derive(Component, Debug)]
pub struct AiPlayer {
    pub nation: NationId,
    /// Entity of the faction this controller was registered for.
    pub controller_of: Entity,
    units: BTreeMap<Entity, AiUnit>,
    goods: BTreeMap<Entity, AiGoods>,
    intelligence: NationIntelligence,
    rng: StdRng,
    turns_planned: u32,
}

impl AiPlayer {
    pub fn new(nation: NationId, controller_of: Entity) -> Self {
        Self {
            nation,
            controller_of,
            units: BTreeMap::new(),
            goods: BTreeMap::new(),
            intelligence: NationIntelligence::default(),
            rng: StdRng::seed_from_u64(AI_RNG_SEED ^ u64::from(nation.0)),
            turns_planned: 0,
        }
    }

    /// Brings the roster in line with the units and parcels the faction owns.
    ///
    /// Returns how many units joined and left.
    pub fn sync_roster(&mut self, snapshot: &AiSnapshot) -> (usize, usize) {
        let nation = self.nation;
        let owned: HashSet<Entity> = snapshot.units_of(nation).map(|unit| unit.entity).collect();

        let lost: Vec<Entity> = self
            .units
            .keys()
            .filter(|entity| !owned.contains(entity))
            .copied()
            .collect();
        for entity in &lost {
            self.remove_unit(*entity);
        }
        let mut joined = 0;
        for entity in owned {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.units.entry(entity) {
                slot.insert(AiUnit::new(entity));
                joined += 1;
            }
        }

        let parcels: HashSet<Entity> = snapshot
            .parcels_of(nation)
            .map(|parcel| parcel.entity)
            .collect();
        let gone: Vec<Entity> = self
            .goods
            .keys()
            .filter(|parcel| !parcels.contains(parcel))
            .copied()
            .collect();
        for parcel in gone {
            self.remove_goods(parcel);
        }
        for parcel in parcels {
            self.goods.entry(parcel).or_insert_with(|| AiGoods::new(parcel));
        }

        (joined, lost.len())
    }

    pub fn units(&self) -> impl Iterator<Item = &AiUnit> {
        self.units.values()
    }

    pub fn unit_ids(&self) -> Vec<Entity> {
        self.units.keys().copied().collect()
    }

    pub fn unit(&self, entity: Entity) -> Option<&AiUnit> {
        self.units.get(&entity)
    }

    pub fn unit_mut(&mut self, entity: Entity) -> Option<&mut AiUnit> {
        self.units.get_mut(&entity)
    }

    pub fn insert_unit(&mut self, unit: AiUnit) {
        self.units.insert(unit.entity, unit);
    }

    /// Forgets a unit, dropping it from any carrier manifest.
    pub fn remove_unit(&mut self, entity: Entity) -> Option<AiUnit> {
        self.unload_everywhere(TransportableId::Unit(entity));
        self.units.remove(&entity)
    }

    pub fn goods_ids(&self) -> Vec<Entity> {
        self.goods.keys().copied().collect()
    }

    pub fn goods(&self, parcel: Entity) -> Option<&AiGoods> {
        self.goods.get(&parcel)
    }

    pub fn goods_mut(&mut self, parcel: Entity) -> Option<&mut AiGoods> {
        self.goods.get_mut(&parcel)
    }

    pub fn insert_goods(&mut self, goods: AiGoods) {
        self.goods.insert(goods.parcel, goods);
    }

    pub fn remove_goods(&mut self, parcel: Entity) -> Option<AiGoods> {
        self.unload_everywhere(TransportableId::Goods(parcel));
        self.goods.remove(&parcel)
    }

    fn unload_everywhere(&mut self, id: TransportableId) {
        for unit in self.units.values_mut() {
            if let Some(transport) = unit.mission.as_mut().and_then(Mission::transport_mut) {
                transport.remove(id);
            }
        }
    }

    pub fn transportable(&self, id: TransportableId) -> Option<&dyn Transportable> {
        match id {
            TransportableId::Unit(entity) => self.units.get(&entity).map(|u| u as &dyn Transportable),
            TransportableId::Goods(parcel) => {
                self.goods.get(&parcel).map(|g| g as &dyn Transportable)
            }
        }
    }

    pub fn transportable_mut(&mut self, id: TransportableId) -> Option<&mut dyn Transportable> {
        match id {
            TransportableId::Unit(entity) => self
                .units
                .get_mut(&entity)
                .map(|u| u as &mut dyn Transportable),
            TransportableId::Goods(parcel) => self
                .goods
                .get_mut(&parcel)
                .map(|g| g as &mut dyn Transportable),
        }
    }

    pub fn view(&self, id: TransportableId, snapshot: &AiSnapshot) -> Option<TransportableView> {
        self.transportable(id)?.view(snapshot)
    }

    pub fn transport_of(&self, id: TransportableId) -> Option<Entity> {
        self.transportable(id)?.transport()
    }

    pub fn set_transport(&mut self, id: TransportableId, carrier: Option<Entity>) {
        if let Some(transportable) = self.transportable_mut(id) {
            transportable.set_transport(carrier);
        }
    }

    pub fn transport_mission(&self, carrier: Entity) -> Option<&TransportMission> {
        self.units.get(&carrier)?.mission.as_ref()?.transport()
    }

    pub fn transport_mission_mut(&mut self, carrier: Entity) -> Option<&mut TransportMission> {
        self.units.get_mut(&carrier)?.mission.as_mut()?.transport_mut()
    }

    /// Wishes some unit or parcel is already working on.
    pub fn bound_wishes(&self) -> HashSet<WishId> {
        let by_units = self.units.values().filter_map(|unit| match unit.mission {
            Some(Mission::WishRealization { wish, .. }) => Some(wish),
            _ => None,
        });
        let by_goods = self.goods.values().filter_map(|goods| goods.wish);
        by_units.chain(by_goods).collect()
    }

    /// Tiles pioneers are already heading for.
    pub fn pioneer_targets(&self) -> HashMap<Hex, Entity> {
        self.units
            .values()
            .filter_map(|unit| match unit.mission {
                Some(Mission::Pioneer { target }) => Some((target, unit.entity)),
                _ => None,
            })
            .collect()
    }

    pub fn intelligence(&self) -> &NationIntelligence {
        &self.intelligence
    }

    pub fn intelligence_mut(&mut self) -> &mut NationIntelligence {
        &mut self.intelligence
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Intelligence and randomness together, for evaluating proposals.
    pub fn intelligence_and_rng(&mut self) -> (&NationIntelligence, &mut StdRng) {
        (&self.intelligence, &mut self.rng)
    }

    pub fn turns_planned(&self) -> u32 {
        self.turns_planned
    }

    pub(crate) fn note_turn_planned(&mut self) {
        self.turns_planned += 1;
    }
}

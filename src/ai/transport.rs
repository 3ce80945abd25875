//! Matching of units and goods that need carrying against carriers with room.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::ai::config::AiConfig;
use crate::ai::error::CargoError;
use crate::ai::oracle::{CostPolicy, Pathfinding};
use crate::ai::player::AiPlayer;
use crate::ai::snapshot::{AiSnapshot, UnitSnapshot};
use crate::ai::wishes::{WishId, WishRegistry};
use crate::game::Location;

/// Something a carrier can move: one of our units or a goods parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportableId {
    Unit(Entity),
    Goods(Entity),
}

impl TransportableId {
    pub fn entity(self) -> Entity {
        match self {
            TransportableId::Unit(entity) | TransportableId::Goods(entity) => entity,
        }
    }
}

/// Transport-relevant facts about a transportable, resolved against a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportableView {
    pub id: TransportableId,
    pub source: Option<Location>,
    pub destination: Option<Location>,
    pub transport: Option<Entity>,
    pub aboard: Option<Entity>,
    pub priority: u32,
    pub space: u32,
}

impl TransportableView {
    /// Waiting for a carrier: knows where it is and where it goes, and nobody has it.
    pub fn requests_transport(&self) -> bool {
        self.transport.is_none()
            && self.destination.is_some()
            && self.source.is_some()
            && self.aboard.is_none()
    }
}

pub trait Transportable {
    fn transportable_id(&self) -> TransportableId;
    /// Carrier whose transport mission is responsible for this object.
    fn transport(&self) -> Option<Entity>;
    fn set_transport(&mut self, carrier: Option<Entity>);
    fn transport_priority(&self) -> u32;
    fn increase_transport_priority(&mut self);
    fn view(&self, snapshot: &AiSnapshot) -> Option<TransportableView>;
}

/// One entry of a carrier's manifest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cargo {
    pub transportable: TransportableId,
    pub destination: Location,
    /// Turns for the carrier to reach the pickup.
    pub turns: u32,
    pub space: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportMission {
    capacity: u32,
    manifest: Vec<Cargo>,
}

impl TransportMission {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            manifest: Vec::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn manifest(&self) -> &[Cargo] {
        &self.manifest
    }

    pub fn used_space(&self) -> u32 {
        self.manifest.iter().map(|cargo| cargo.space).sum()
    }

    /// Space left once everything queued is aboard. May go negative.
    pub fn destination_capacity(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.used_space())
    }

    pub fn space_available(&self, space: u32) -> bool {
        self.destination_capacity() >= i64::from(space)
    }

    pub fn is_carrying(&self, id: TransportableId) -> bool {
        self.manifest.iter().any(|cargo| cargo.transportable == id)
    }

    /// Next delivery point.
    pub fn target(&self) -> Option<Location> {
        self.manifest.first().map(|cargo| cargo.destination)
    }

    /// Proposes carrying `view` with `carrier`.
    pub fn make_cargo(
        &self,
        view: &TransportableView,
        carrier: &UnitSnapshot,
        pathfinder: &dyn Pathfinding,
    ) -> Result<Cargo, CargoError> {
        let source = view.source.ok_or(CargoError::MissingSource)?;
        let destination = view.destination.ok_or(CargoError::MissingDestination)?;
        let turns = if view.aboard == Some(carrier.entity) {
            0
        } else {
            let from = carrier.location.ok_or(CargoError::NoPathToSource)?;
            pathfinder
                .turns_to_reach(carrier, from, source, CostPolicy::Strict)
                .ok_or(CargoError::NoPathToSource)?
        };
        pathfinder
            .turns_to_reach(carrier, source, destination, CostPolicy::Strict)
            .ok_or(CargoError::NoPathToDestination)?;
        Ok(Cargo {
            transportable: view.id,
            destination,
            turns,
            space: view.space,
        })
    }

    /// Adds cargo to the manifest. Fails when already carried or out of room.
    pub fn queue(&mut self, cargo: Cargo) -> bool {
        if self.is_carrying(cargo.transportable) || !self.space_available(cargo.space) {
            return false;
        }
        self.manifest.push(cargo);
        true
    }

    pub fn requeue(&mut self, id: TransportableId, destination: Location) -> bool {
        match self.manifest.iter_mut().find(|cargo| cargo.transportable == id) {
            Some(cargo) => {
                cargo.destination = destination;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: TransportableId) -> bool {
        let before = self.manifest.len();
        self.manifest.retain(|cargo| cargo.transportable != id);
        self.manifest.len() != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyEntry {
    pub id: TransportableId,
    pub priority: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoAssignment {
    pub carrier: Entity,
    pub transportable: TransportableId,
    pub turns: u32,
}

/// Per-turn transport supply and demand.
#[derive(Debug, Default)]
pub struct TransportCoordinator {
    supply: Vec<SupplyEntry>,
    demand: HashMap<Location, Vec<WishId>>,
    naval_carriers_needed: i32,
    wagons_needed: HashMap<u32, i32>,
}

impl TransportCoordinator {
    /// Sorts the faction's units and parcels into in-transit, supply and demand.
    pub fn rebuild(&mut self, player: &mut AiPlayer, snapshot: &AiSnapshot, wishes: &WishRegistry) {
        self.clear();
        let nation = player.nation;

        for port in snapshot.ports_of(nation) {
            if let Some(landmass) = snapshot.map.landmass(port.tile) {
                self.wagons_needed.insert(landmass, 0);
            }
        }

        for entity in player.unit_ids() {
            let Some(unit) = snapshot.unit(entity) else {
                continue;
            };
            let mission_usable = player
                .unit(entity)
                .and_then(|ai| ai.mission.as_ref())
                .is_none_or(|mission| mission.is_valid(unit, snapshot));
            if !mission_usable {
                continue;
            }
            if unit.is_naval() && unit.is_carrier() {
                self.naval_carriers_needed -= 1;
            } else if unit.is_carrier() {
                if let Some(landmass) = unit.tile().and_then(|t| snapshot.map.landmass(t)) {
                    self.change_wagons_needed(landmass, -1);
                }
            } else if self.collect_supply(player, snapshot, TransportableId::Unit(entity)) {
                self.naval_carriers_needed += 1;
            }
        }

        for parcel in player.goods_ids() {
            let id = TransportableId::Goods(parcel);
            if !self.collect_supply(player, snapshot, id) {
                continue;
            }
            let crosses_water = player.view(id, snapshot).is_some_and(|view| {
                let from = view.source.and_then(|l| snapshot.landmass_of(l));
                let to = view.destination.and_then(|l| snapshot.landmass_of(l));
                from != to
            });
            if crosses_water {
                self.naval_carriers_needed += 1;
            }
        }

        for settlement in snapshot.settlements_of(nation) {
            if settlement.connected_port {
                continue;
            }
            if let Some(landmass) = snapshot.map.landmass(settlement.tile) {
                self.change_wagons_needed(landmass, 1);
            }
        }

        for (destination, wishes) in wishes.destinations() {
            self.demand
                .insert(*destination, wishes.iter().map(|wish| wish.id()).collect());
        }

        debug!(
            "{} transport: {} waiting, {} naval carriers needed",
            nation,
            self.supply.len(),
            self.naval_carriers_needed
        );
    }

    /// Verifies the claimed carrier, then adds the transportable to supply if it
    /// is waiting. Returns whether it joined the supply.
    fn collect_supply(
        &mut self,
        player: &mut AiPlayer,
        snapshot: &AiSnapshot,
        id: TransportableId,
    ) -> bool {
        self.check_transport(player, id);
        let Some(view) = player.view(id, snapshot) else {
            return false;
        };
        if !view.requests_transport() {
            return false;
        }
        let Some(transportable) = player.transportable_mut(id) else {
            return false;
        };
        transportable.increase_transport_priority();
        self.supply.push(SupplyEntry {
            id,
            priority: transportable.transport_priority(),
        });
        true
    }

    /// Clears a transport reference the carrier no longer acknowledges.
    fn check_transport(&self, player: &mut AiPlayer, id: TransportableId) {
        let Some(carrier) = player.transport_of(id) else {
            return;
        };
        let acknowledged = player
            .transport_mission(carrier)
            .is_some_and(|mission| mission.is_carrying(id));
        if !acknowledged {
            debug!("{:?} dropped by carrier {:?}", id, carrier);
            player.set_transport(id, None);
        }
    }

    fn change_wagons_needed(&mut self, landmass: u32, delta: i32) {
        if let Some(needed) = self.wagons_needed.get_mut(&landmass) {
            *needed += delta;
        }
    }

    /// Adds a transportable that started waiting during planning.
    pub fn offer(&mut self, id: TransportableId, priority: u32) {
        if !self.supply.iter().any(|entry| entry.id == id) {
            self.supply.push(SupplyEntry { id, priority });
        }
    }

    pub fn supply(&self) -> &[SupplyEntry] {
        &self.supply
    }

    /// The most pressing tenth of the supply, never fewer than the floor.
    pub fn urgent_transportables(&self, config: &AiConfig) -> Vec<SupplyEntry> {
        let mut urgent = self.supply.clone();
        urgent.sort_by(|a, b| b.priority.cmp(&a.priority));
        let share = urgent.len().div_ceil(config.urgent_fraction_divisor.max(1));
        urgent.truncate(share.max(config.urgent_floor));
        urgent
    }

    /// Removes a transportable from the supply once a carrier takes it.
    pub fn claim(&mut self, id: TransportableId) -> bool {
        match self.supply.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.supply.remove(index);
                true
            }
            None => false,
        }
    }

    /// Greedy assignment of urgent transportables to `carriers`.
    ///
    /// A carrier that can pick up immediately wins, ranked by its remaining room.
    /// Otherwise priority per turn of travel decides.
    pub fn allocate(
        &mut self,
        mut carriers: Vec<Entity>,
        player: &mut AiPlayer,
        snapshot: &AiSnapshot,
        pathfinder: &dyn Pathfinding,
        config: &AiConfig,
    ) -> Vec<CargoAssignment> {
        let mut assignments = Vec::new();

        for entry in self.urgent_transportables(config) {
            if carriers.is_empty() {
                break;
            }
            let Some(view) = player.view(entry.id, snapshot) else {
                continue;
            };

            let mut best: Option<(usize, Cargo)> = None;
            let mut best_value = f64::MIN;
            let mut immediate = false;
            let mut infeasible = false;
            for (index, &carrier) in carriers.iter().enumerate() {
                let (Some(mission), Some(carrier_unit)) =
                    (player.transport_mission(carrier), snapshot.unit(carrier))
                else {
                    continue;
                };
                if !mission.space_available(view.space) {
                    continue;
                }
                let cargo = match mission.make_cargo(&view, carrier_unit, pathfinder) {
                    Ok(cargo) => cargo,
                    Err(err) => {
                        debug!("Dropping {:?} from transport this turn: {}", entry.id, err);
                        infeasible = true;
                        break;
                    }
                };
                let value = if cargo.turns == 0 {
                    if !immediate {
                        immediate = true;
                        best_value = f64::MIN;
                    }
                    mission.destination_capacity() as f64
                } else if immediate {
                    -1.0
                } else {
                    f64::from(entry.priority) / f64::from(cargo.turns)
                };
                if best_value < value {
                    best_value = value;
                    best = Some((index, cargo));
                }
            }
            if infeasible {
                continue;
            }

            let Some((index, cargo)) = best else {
                continue;
            };
            let carrier = carriers[index];
            let Some(mission) = player.transport_mission_mut(carrier) else {
                carriers.remove(index);
                continue;
            };
            if mission.queue(cargo) {
                let full = mission.destination_capacity() <= 0;
                self.claim(entry.id);
                player.set_transport(entry.id, Some(carrier));
                debug!(
                    "Carrier {:?} takes {:?} ({} turns to pickup)",
                    carrier, entry.id, cargo.turns
                );
                assignments.push(CargoAssignment {
                    carrier,
                    transportable: entry.id,
                    turns: cargo.turns,
                });
                if full {
                    carriers.remove(index);
                }
            } else {
                carriers.remove(index);
            }
        }

        assignments
    }

    /// Drops a retired wish from the demand index.
    pub fn retire_demand(&mut self, wish: WishId) {
        for wishes in self.demand.values_mut() {
            wishes.retain(|id| *id != wish);
        }
        self.demand.retain(|_, wishes| !wishes.is_empty());
    }

    pub fn demand_at(&self, location: Location) -> &[WishId] {
        self.demand.get(&location).map_or(&[], Vec::as_slice)
    }

    pub fn naval_carriers_needed(&self) -> i32 {
        self.naval_carriers_needed
    }

    pub fn wagons_needed(&self, landmass: u32) -> i32 {
        self.wagons_needed.get(&landmass).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.supply.clear();
        self.demand.clear();
        self.naval_carriers_needed = 0;
        self.wagons_needed.clear();
    }
}

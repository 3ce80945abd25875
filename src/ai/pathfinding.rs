//! Hex-grid reachability used by the planner when the game supplies no better oracle.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use hexx::Hex;

use crate::ai::oracle::{CostPolicy, Pathfinding};
use crate::ai::snapshot::UnitSnapshot;
use crate::constants::EUROPE_SAILING_TURNS;
use crate::game::{GameMap, Location};

/// A* over the map tiles.
///
/// Land units stay on their landmass, ships stay on water and may end on a
/// coastal tile. Land units coming from or going to Europe are assumed ferried
/// to or from the nearest coast.
pub struct HexPathfinder<'a> {
    map: &'a GameMap,
}

impl<'a> HexPathfinder<'a> {
    pub fn new(map: &'a GameMap) -> Self {
        Self { map }
    }

    pub fn find_path(
        &self,
        unit: &UnitSnapshot,
        start: Hex,
        goal: Hex,
        policy: CostPolicy,
    ) -> Option<Vec<Hex>> {
        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Hex, Hex> = HashMap::new();
        let mut cost_so_far: HashMap<Hex, u32> = HashMap::new();

        open_set.push(Reverse((start.unsigned_distance_to(goal), 0u32, start.x, start.y)));
        cost_so_far.insert(start, 0);

        while let Some(Reverse((_, cost, x, y))) = open_set.pop() {
            let current = Hex::new(x, y);
            if current == goal {
                return Some(Self::reconstruct_path(&came_from, current));
            }
            if cost_so_far.get(&current).is_some_and(|&best| best < cost) {
                continue;
            }

            for neighbour in self.map.neighbours(current) {
                if !self.passable(unit, start, neighbour, goal, policy) {
                    continue;
                }
                let tentative = cost + 1;
                if cost_so_far
                    .get(&neighbour)
                    .is_some_and(|&existing| tentative >= existing)
                {
                    continue;
                }
                cost_so_far.insert(neighbour, tentative);
                came_from.insert(neighbour, current);
                let estimate = tentative + neighbour.unsigned_distance_to(goal);
                open_set.push(Reverse((estimate, tentative, neighbour.x, neighbour.y)));
            }
        }

        None
    }

    fn passable(
        &self,
        unit: &UnitSnapshot,
        start: Hex,
        hex: Hex,
        goal: Hex,
        policy: CostPolicy,
    ) -> bool {
        let Some(tile) = self.map.tile(hex) else {
            return false;
        };
        if unit.is_naval() {
            return !tile.is_land() || (hex == goal && self.map.is_coastal(hex));
        }
        if !tile.is_land() || tile.landmass != self.map.landmass(start) {
            return false;
        }
        match policy {
            CostPolicy::Relaxed => true,
            CostPolicy::Strict => {
                hex == goal
                    || tile.settlement.is_none()
                    || tile.owner.is_none_or(|owner| owner == unit.owner)
            }
        }
    }

    fn reconstruct_path(came_from: &HashMap<Hex, Hex>, mut current: Hex) -> Vec<Hex> {
        let mut path = vec![current];
        while let Some(&parent) = came_from.get(&current) {
            current = parent;
            path.push(current);
        }
        path.reverse();
        path
    }

    /// Steps from `hex` to the nearest coastal tile of its landmass.
    fn steps_to_coast(&self, hex: Hex) -> Option<u32> {
        let landmass = self.map.landmass(hex)?;
        let mut seen = HashSet::from([hex]);
        let mut queue = VecDeque::from([(hex, 0u32)]);
        while let Some((current, steps)) = queue.pop_front() {
            if self.map.is_coastal(current) {
                return Some(steps);
            }
            for neighbour in self.map.neighbours(current) {
                if self.map.landmass(neighbour) == Some(landmass) && seen.insert(neighbour) {
                    queue.push_back((neighbour, steps + 1));
                }
            }
        }
        None
    }

    fn europe_turns(&self, unit: &UnitSnapshot, tile: Hex, speed: u32) -> Option<u32> {
        if unit.is_naval() {
            let reachable = self.map.is_water(tile) || self.map.is_coastal(tile);
            return reachable.then_some(EUROPE_SAILING_TURNS);
        }
        let steps = self.steps_to_coast(tile)?;
        Some(EUROPE_SAILING_TURNS + steps.div_ceil(speed))
    }
}

impl Pathfinding for HexPathfinder<'_> {
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
        let speed = unit.moves_per_turn().max(1);
        match (from, to) {
            (Location::Europe, Location::Europe) => Some(0),
            (Location::Europe, Location::Tile(tile)) | (Location::Tile(tile), Location::Europe) => {
                self.europe_turns(unit, tile, speed)
            }
            (Location::Tile(start), Location::Tile(goal)) => {
                let path = self.find_path(unit, start, goal, policy)?;
                let steps = u32::try_from(path.len().saturating_sub(1)).ok()?;
                Some(steps.div_ceil(speed))
            }
        }
    }
}

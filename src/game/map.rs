use std::collections::HashMap;

use bevy::prelude::*;
use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::game::nation::NationId;

/// A place a unit or parcel can be, or be headed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Tile(Hex),
    Europe,
}

impl Location {
    pub fn tile(self) -> Option<Hex> {
        match self {
            Location::Tile(hex) => Some(hex),
            Location::Europe => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapTile {
    /// Contiguous land area id. `None` for water.
    pub landmass: Option<u32>,
    /// Water from which ships can sail to Europe.
    pub high_seas: bool,
    pub owner: Option<NationId>,
    pub settlement: Option<Entity>,
    pub lost_city_rumour: bool,
    /// Appraisal of the tile as a settlement site. Zero when unsuitable.
    pub colony_value: u32,
}

impl MapTile {
    pub fn land(landmass: u32) -> Self {
        Self {
            landmass: Some(landmass),
            ..default()
        }
    }

    pub fn ocean() -> Self {
        Self::default()
    }

    pub fn is_land(&self) -> bool {
        self.landmass.is_some()
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct GameMap {
    tiles: HashMap<Hex, MapTile>,
}

impl GameMap {
    pub fn insert(&mut self, hex: Hex, tile: MapTile) {
        self.tiles.insert(hex, tile);
    }

    pub fn tile(&self, hex: Hex) -> Option<&MapTile> {
        self.tiles.get(&hex)
    }

    pub fn tile_mut(&mut self, hex: Hex) -> Option<&mut MapTile> {
        self.tiles.get_mut(&hex)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Hex, &MapTile)> {
        self.tiles.iter().map(|(hex, tile)| (*hex, tile))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_land(&self, hex: Hex) -> bool {
        self.tile(hex).is_some_and(MapTile::is_land)
    }

    pub fn is_water(&self, hex: Hex) -> bool {
        self.tile(hex).is_some_and(|tile| !tile.is_land())
    }

    pub fn landmass(&self, hex: Hex) -> Option<u32> {
        self.tile(hex).and_then(|tile| tile.landmass)
    }

    /// Landmass of a location. Europe has none.
    pub fn landmass_of(&self, location: Location) -> Option<u32> {
        location.tile().and_then(|hex| self.landmass(hex))
    }

    /// Existing neighbours of a tile.
    pub fn neighbours(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        hex.all_neighbors()
            .into_iter()
            .filter(|neighbour| self.tiles.contains_key(neighbour))
    }

    /// Land tile touching water.
    pub fn is_coastal(&self, hex: Hex) -> bool {
        self.is_land(hex) && self.neighbours(hex).any(|n| self.is_water(n))
    }
}

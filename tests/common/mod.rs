#![allow(dead_code)]

use bevy::ecs::message::{Message, MessageReader};
use bevy::prelude::*;
use hexx::Hex;
use rust_colonization_ai::LogicPlugins;
use rust_colonization_ai::ai::AiNation;
use rust_colonization_ai::game::{GameMap, MapTile, Nation, NationId, Unit, UnitPlacement, UnitType};
use rust_colonization_ai::turn_system::TurnSystem;

pub const ISLAND_RADIUS: u32 = 5;

/// Messages of type `M` seen so far.
#[derive(Resource)]
pub struct Collected<M: Message>(pub Vec<M>);

impl<M: Message> Default for Collected<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn collect<M: Message + Clone>(mut reader: MessageReader<M>, mut collected: ResMut<Collected<M>>) {
    collected.0.extend(reader.read().cloned());
}

/// Headless app running the turn cycle and the AI.
pub fn ai_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogicPlugins));
    app.world_mut().insert_resource(island_map());
    app
}

/// Keeps every `M` written from now on in [`Collected`].
pub fn record<M: Message + Clone>(app: &mut App) {
    app.init_resource::<Collected<M>>()
        .add_systems(PostUpdate, collect::<M>);
}

pub fn collected<M: Message + Clone>(app: &App) -> &[M] {
    &app.world().resource::<Collected<M>>().0
}

pub fn clear_collected<M: Message + Clone>(app: &mut App) {
    app.world_mut().resource_mut::<Collected<M>>().0.clear();
}

/// One island with a coast, ringed by ocean and then high seas.
pub fn island_map() -> GameMap {
    let mut map = GameMap::default();
    for hex in Hex::ZERO.range(ISLAND_RADIUS) {
        map.insert(hex, MapTile::land(1));
    }
    for hex in Hex::ZERO.ring(ISLAND_RADIUS + 1) {
        map.insert(hex, MapTile::ocean());
    }
    for hex in Hex::ZERO.ring(ISLAND_RADIUS + 2) {
        map.insert(
            hex,
            MapTile {
                high_seas: true,
                ..MapTile::ocean()
            },
        );
    }
    map
}

pub fn spawn_ai_nation(app: &mut App, nation: Nation) -> Entity {
    app.world_mut().spawn((nation, AiNation)).id()
}

pub fn spawn_unit(app: &mut App, owner: NationId, unit_type: UnitType, hex: Hex) -> Entity {
    app.world_mut()
        .spawn(Unit::new(owner, unit_type, UnitPlacement::OnTile(hex)))
        .id()
}

pub fn map_mut(app: &mut App) -> Mut<'_, GameMap> {
    app.world_mut().resource_mut::<GameMap>()
}

/// Ends the player turn and runs the frame in which the AI plays.
pub fn play_enemy_phase(app: &mut App) {
    app.world_mut().resource_mut::<TurnSystem>().end_player_turn();
    app.update();
}

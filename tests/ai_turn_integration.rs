//! Integration tests for the AI turn cycle
//!
//! These drive the plugins through whole frames, the way the game runs them.

mod common;

use bevy::prelude::*;
use hexx::Hex;
use rust_colonization_ai::ai::{AiColony, AiPlayer, MissionKind};
use rust_colonization_ai::ai::wishes::{Wish, WishId, WorkerWish};
use rust_colonization_ai::game::{
    Location, Nation, NationId, Settlement, Unit, UnitPlacement, UnitRole, UnitType,
};
use rust_colonization_ai::messages::MissionOrder;
use rust_colonization_ai::turn_system::{TurnPhase, TurnSystem};

use common::*;

const DUTCH: NationId = NationId(1);
const ENGLISH: NationId = NationId(2);

#[test]
fn ai_nations_plan_once_per_enemy_phase() {
    let mut app = ai_app();
    record::<MissionOrder>(&mut app);
    let nation = spawn_ai_nation(&mut app, Nation::european(DUTCH, "Dutch"));
    let scout = Unit::new(DUTCH, UnitType::FreeColonist, UnitPlacement::OnTile(Hex::ZERO))
        .with_role(UnitRole::Scout);
    let colonist = app.world_mut().spawn(scout).id();
    if let Some(tile) = map_mut(&mut app).tile_mut(Hex::new(2, 0)) {
        tile.lost_city_rumour = true;
    }

    app.update();
    assert!(collected::<MissionOrder>(&app).is_empty());
    assert!(app.world().get::<AiPlayer>(nation).is_none());

    play_enemy_phase(&mut app);
    let orders = collected::<MissionOrder>(&app);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].unit, colonist);
    assert_eq!(orders[0].kind, MissionKind::Scouting);
    assert_eq!(orders[0].target, Some(Location::Tile(Hex::new(2, 0))));

    let turn = app.world().resource::<TurnSystem>();
    assert_eq!(turn.phase, TurnPhase::PlayerTurn);
    assert_eq!(turn.current_turn, 2);

    app.update();
    assert_eq!(collected::<MissionOrder>(&app).len(), 1);
}

#[test]
fn missions_persist_across_turns() {
    let mut app = ai_app();
    record::<MissionOrder>(&mut app);
    let nation = spawn_ai_nation(&mut app, Nation::european(DUTCH, "Dutch"));
    spawn_unit(&mut app, DUTCH, UnitType::FreeColonist, Hex::ZERO);
    if let Some(tile) = map_mut(&mut app).tile_mut(Hex::new(-3, 1)) {
        tile.colony_value = 30;
    }

    play_enemy_phase(&mut app);
    clear_collected::<MissionOrder>(&mut app);
    play_enemy_phase(&mut app);

    let orders = collected::<MissionOrder>(&app);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].kind, MissionKind::BuildColony);
    assert_eq!(orders[0].target, Some(Location::Tile(Hex::new(-3, 1))));
    assert_eq!(app.world().get::<AiPlayer>(nation).unwrap().turns_planned(), 2);
}

#[test]
fn human_nations_are_left_alone() {
    let mut app = ai_app();
    record::<MissionOrder>(&mut app);
    let human = app
        .world_mut()
        .spawn(Nation::european(ENGLISH, "English"))
        .id();
    spawn_unit(&mut app, ENGLISH, UnitType::FreeColonist, Hex::ZERO);
    if let Some(tile) = map_mut(&mut app).tile_mut(Hex::new(2, 0)) {
        tile.lost_city_rumour = true;
    }

    play_enemy_phase(&mut app);

    assert!(collected::<MissionOrder>(&app).is_empty());
    assert!(app.world().get::<AiPlayer>(human).is_none());
}

#[test]
fn a_settlement_wish_draws_an_expert() {
    let mut app = ai_app();
    record::<MissionOrder>(&mut app);
    spawn_ai_nation(&mut app, Nation::european(DUTCH, "Dutch"));
    let colony = app
        .world_mut()
        .spawn(Settlement::colony(DUTCH, "Fort Nassau", Hex::ZERO).as_port())
        .id();
    app.world_mut().entity_mut(colony).insert(AiColony {
        wishes: vec![Wish::Worker(WorkerWish {
            id: WishId {
                settlement: colony,
                serial: 1,
            },
            destination: Location::Tile(Hex::ZERO),
            value: 80,
            unit_type: UnitType::ExpertFarmer,
            transportable: None,
        })],
        improvement_plans: Vec::new(),
    });
    if let Some(tile) = map_mut(&mut app).tile_mut(Hex::ZERO) {
        tile.settlement = Some(colony);
        tile.owner = Some(DUTCH);
    }
    let farmer = spawn_unit(&mut app, DUTCH, UnitType::ExpertFarmer, Hex::new(2, 0));

    play_enemy_phase(&mut app);

    let orders = collected::<MissionOrder>(&app);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].unit, farmer);
    assert_eq!(orders[0].kind, MissionKind::WishRealization);
    assert_eq!(orders[0].target, Some(Location::Tile(Hex::ZERO)));
}

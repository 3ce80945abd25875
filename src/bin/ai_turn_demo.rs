//! Headless demo: two AI factions on a small island play a few turns.
//! Run with: cargo run --bin ai_turn_demo

use bevy::ecs::message::{MessageReader, Messages};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use hexx::Hex;
use rust_colonization_ai::LogicPlugins;
use rust_colonization_ai::ai::diplomacy::{DiplomaticTrade, TradeContext, TradeTerm};
use rust_colonization_ai::ai::wishes::{GoodsWish, Wish, WishId, WorkerWish};
use rust_colonization_ai::ai::{AiColony, AiNation};
use rust_colonization_ai::game::{
    GameMap, GoodsParcel, GoodsType, Location, MapTile, Nation, NationId, Settlement, Stance,
    Unit, UnitPlacement, UnitType,
};
use rust_colonization_ai::messages::{ActionRequest, MissionOrder, TradeProposal, TradeResponse};
use rust_colonization_ai::turn_system::TurnSystem;

const DUTCH: NationId = NationId(1);
const ENGLISH: NationId = NationId(2);
const ARAWAK: NationId = NationId(3);
const TURNS: u32 = 4;

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default(), LogicPlugins))
        .add_systems(PostUpdate, report_decisions);

    setup_world(app.world_mut());

    for turn in 0..TURNS {
        if turn == 1 {
            // The English try to buy peace with a little gold.
            app.world_mut()
                .resource_mut::<Messages<TradeProposal>>()
                .write(TradeProposal {
                    trade: DiplomaticTrade::new(TradeContext::Diplomatic, ENGLISH, DUTCH)
                        .with_item(ENGLISH, TradeTerm::Gold(150))
                        .with_item(ENGLISH, TradeTerm::Stance(Stance::Peace)),
                });
        }
        app.world_mut().resource_mut::<TurnSystem>().end_player_turn();
        app.update();
    }
}

fn setup_world(world: &mut World) {
    let mut map = GameMap::default();
    for hex in Hex::ZERO.range(5) {
        map.insert(hex, MapTile::land(1));
    }
    for hex in Hex::ZERO.ring(6) {
        map.insert(hex, MapTile::ocean());
    }
    for hex in Hex::ZERO.ring(7) {
        map.insert(
            hex,
            MapTile {
                high_seas: true,
                ..MapTile::ocean()
            },
        );
    }
    for (hex, value) in [(Hex::new(3, -1), 40), (Hex::new(-2, 4), 25)] {
        if let Some(tile) = map.tile_mut(hex) {
            tile.colony_value = value;
        }
    }
    if let Some(tile) = map.tile_mut(Hex::new(-4, 1)) {
        tile.lost_city_rumour = true;
    }

    world.spawn((
        Nation {
            gold: 1200,
            ..Nation::european(DUTCH, "Dutch")
        }
        .with_stance(ENGLISH, Stance::War)
        .with_stance(ARAWAK, Stance::Peace),
        AiNation,
    ));
    world.spawn((
        Nation {
            gold: 800,
            ..Nation::european(ENGLISH, "English")
        }
        .with_stance(DUTCH, Stance::War)
        .with_tension(DUTCH, 400),
        AiNation,
    ));
    world.spawn(Nation::native(ARAWAK, "Arawak").with_stance(DUTCH, Stance::Peace));

    let home = Hex::new(0, 5);
    let colony = world
        .spawn(Settlement::colony(DUTCH, "Nieuw Amsterdam", home).as_port())
        .id();
    world.entity_mut(colony).insert(AiColony {
        wishes: vec![
            Wish::Worker(WorkerWish {
                id: WishId {
                    settlement: colony,
                    serial: 1,
                },
                destination: Location::Tile(home),
                value: 60,
                unit_type: UnitType::ExpertFarmer,
                transportable: None,
            }),
            Wish::Goods(GoodsWish {
                id: WishId {
                    settlement: colony,
                    serial: 2,
                },
                destination: Location::Tile(home),
                value: 40,
                goods_type: GoodsType::Tools,
                amount: 100,
                transportable: None,
            }),
        ],
        improvement_plans: Vec::new(),
    });
    let camp = world
        .spawn(Settlement::native_camp(ARAWAK, "Arawak camp", Hex::new(-1, -2)))
        .id();
    for (hex, settlement, owner) in [(home, colony, DUTCH), (Hex::new(-1, -2), camp, ARAWAK)] {
        if let Some(tile) = map.tile_mut(hex) {
            tile.settlement = Some(settlement);
            tile.owner = Some(owner);
        }
    }
    world.insert_resource(map);

    for unit_type in [UnitType::FreeColonist, UnitType::ExpertFarmer] {
        world.spawn(Unit::new(DUTCH, unit_type, UnitPlacement::InSettlement(colony)));
    }
    for unit_type in [
        UnitType::FreeColonist,
        UnitType::FreeColonist,
        UnitType::HardyPioneer,
    ] {
        world.spawn(Unit::new(DUTCH, unit_type, UnitPlacement::OnTile(home)));
    }
    world.spawn(Unit::new(DUTCH, UnitType::Caravel, UnitPlacement::InEurope));
    world.spawn(Unit::new(DUTCH, UnitType::ExpertFarmer, UnitPlacement::InEurope));
    world.spawn(GoodsParcel {
        owner: DUTCH,
        settlement: None,
        goods_type: GoodsType::Tools,
        amount: 100,
        location: Some(Location::Europe),
        destination: None,
        aboard: None,
    });

    world.spawn(Unit::new(ENGLISH, UnitType::Privateer, UnitPlacement::OnTile(Hex::new(6, 0))));
    world.spawn(Unit::new(ENGLISH, UnitType::FreeColonist, UnitPlacement::InEurope));
}

fn report_decisions(
    turn: Res<TurnSystem>,
    nations: Query<(Entity, &Nation)>,
    units: Query<&Unit>,
    mut orders: MessageReader<MissionOrder>,
    mut requests: MessageReader<ActionRequest>,
    mut responses: MessageReader<TradeResponse>,
) {
    let owner_name = |unit: Entity| {
        let owner = units.get(unit).ok()?.owner;
        nations
            .iter()
            .find(|(_, nation)| nation.id == owner)
            .map(|(_, nation)| nation.name.clone())
    };
    for order in orders.read() {
        info!(
            "turn {}: {} {:?} -> {} at {:?}{}",
            turn.current_turn,
            owner_name(order.unit).unwrap_or_default(),
            order.unit,
            order.kind.label(),
            order.target,
            if order.cargo.is_empty() {
                String::new()
            } else {
                format!(" carrying {}", order.cargo.len())
            }
        );
    }
    for request in requests.read() {
        info!("turn {}: request {:?}", turn.current_turn, request);
    }
    for response in responses.read() {
        info!(
            "turn {}: {} answers {:?} with {} terms",
            turn.current_turn,
            response.responder,
            response.status,
            response.trade.items.len()
        );
    }
}

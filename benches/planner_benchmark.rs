use std::hint::black_box;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use hexx::Hex;
use rust_colonization_ai::ai::oracle::{
    CostPolicy, OrderExecutor, Pathfinding, SnapshotRequests, SnapshotStrength,
};
use rust_colonization_ai::ai::pathfinding::HexPathfinder;
use rust_colonization_ai::ai::{AiConfig, AiPlayer, AiSnapshot, Collaborators, TurnOrchestrator, build_ai_snapshot};
use rust_colonization_ai::game::{
    GameMap, Location, MapTile, Nation, NationId, Settlement, Stance, Unit, UnitPlacement, UnitRole, UnitType,
};
use rust_colonization_ai::turn_system::TurnSystem;

const DUTCH: NationId = NationId(1);
const ENGLISH: NationId = NationId(2);
const ISLAND_RADIUS: u32 = 20;

/// A large island with sites, rumours, a handful of colonies and a crowded roster.
fn create_test_world() -> (World, Entity) {
    let mut world = World::new();
    let mut map = GameMap::default();
    for hex in Hex::ZERO.range(ISLAND_RADIUS) {
        let mut tile = MapTile::land(1);
        if (hex.x * 7 + hex.y * 3).rem_euclid(11) == 0 {
            tile.colony_value = 20 + (hex.x.unsigned_abs() % 30);
        } else if (hex.x - hex.y).rem_euclid(17) == 0 {
            tile.lost_city_rumour = true;
        }
        map.insert(hex, tile);
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

    let dutch = world
        .spawn(
            Nation {
                gold: 5000,
                ..Nation::european(DUTCH, "Dutch")
            }
            .with_stance(ENGLISH, Stance::War),
        )
        .id();
    world.spawn(Nation::european(ENGLISH, "English").with_stance(DUTCH, Stance::War));

    for (index, hex) in Hex::ZERO.ring(ISLAND_RADIUS).step_by(12).enumerate() {
        let owner = if index % 2 == 0 { DUTCH } else { ENGLISH };
        let settlement = world
            .spawn(Settlement::colony(owner, format!("Colony {index}"), hex).as_port())
            .id();
        if let Some(tile) = map.tile_mut(hex) {
            tile.settlement = Some(settlement);
            tile.owner = Some(owner);
        }
        if owner == DUTCH {
            for _ in 0..3 {
                world.spawn(Unit::new(DUTCH, UnitType::FreeColonist, UnitPlacement::InSettlement(settlement)));
            }
        }
    }
    world.insert_resource(map);

    let roster = [
        (UnitType::FreeColonist, UnitRole::Default),
        (UnitType::FreeColonist, UnitRole::Scout),
        (UnitType::HardyPioneer, UnitRole::Pioneer),
        (UnitType::VeteranSoldier, UnitRole::Soldier),
        (UnitType::FreeColonist, UnitRole::Dragoon),
        (UnitType::Artillery, UnitRole::Default),
    ];
    for (index, hex) in Hex::ZERO.range(ISLAND_RADIUS - 2).step_by(9).enumerate() {
        let (unit_type, role) = roster[index % roster.len()];
        world.spawn(Unit::new(DUTCH, unit_type, UnitPlacement::OnTile(hex)).with_role(role));
        if index % 4 == 0 {
            world.spawn(Unit::new(ENGLISH, UnitType::FreeColonist, UnitPlacement::OnTile(-hex)));
        }
    }
    for _ in 0..4 {
        world.spawn(Unit::new(DUTCH, UnitType::Caravel, UnitPlacement::InEurope));
        world.spawn(Unit::new(DUTCH, UnitType::ExpertFarmer, UnitPlacement::InEurope));
    }

    world.insert_resource(TurnSystem::default());
    world.init_resource::<AiSnapshot>();
    world.init_resource::<AiConfig>();
    (world, dutch)
}

fn bench_ai(c: &mut Criterion) {
    let (mut world, dutch) = create_test_world();

    c.bench_function("build_ai_snapshot", |b| {
        b.iter(|| {
            world
                .run_system_once(build_ai_snapshot)
                .expect("snapshot system runs");
        })
    });

    let snapshot = world.resource::<AiSnapshot>().clone();
    let config = world.resource::<AiConfig>().clone();
    let pathfinder = HexPathfinder::new(&snapshot.map);
    let strength = SnapshotStrength::new(&snapshot);

    c.bench_function("plan_and_act (fresh controller)", |b| {
        b.iter_batched(
            || AiPlayer::new(DUTCH, dutch),
            |mut player| {
                let mut executor = OrderExecutor::default();
                let mut requests = SnapshotRequests::new(&snapshot);
                let mut orchestrator = TurnOrchestrator::new(&snapshot, &config);
                let mut collaborators = Collaborators {
                    pathfinder: &pathfinder,
                    strength: &strength,
                    executor: &mut executor,
                    requests: &mut requests,
                };
                let report = orchestrator
                    .plan_and_act(&mut player, &mut collaborators)
                    .expect("controller matches its faction");
                black_box(report);
                black_box(executor.into_orders());
            },
            BatchSize::SmallInput,
        )
    });

    let walker = snapshot
        .units_of(DUTCH)
        .find(|unit| !unit.is_naval())
        .expect("the roster has land units")
        .clone();
    let from = Location::Tile(Hex::new(-(ISLAND_RADIUS as i32), 0));
    let to = Location::Tile(Hex::new(ISLAND_RADIUS as i32, 0));
    c.bench_function("turns_to_reach across the island", |b| {
        b.iter(|| {
            black_box(pathfinder.turns_to_reach(
                &walker,
                black_box(from),
                black_box(to),
                CostPolicy::Strict,
            ))
        })
    });
}

criterion_group!(benches, bench_ai);
criterion_main!(benches);

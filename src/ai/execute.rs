//! Bevy systems running the AI.
//!
//! Planning happens against the snapshot; decisions leave as messages.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::ai::config::AiConfig;
use crate::ai::diplomacy::{DiplomaticEvaluator, TradeStatus};
use crate::ai::markers::AiNation;
use crate::ai::oracle::{EuropeanMarket, OrderExecutor, SnapshotRequests, SnapshotStrength};
use crate::ai::orchestrator::{Collaborators, TurnOrchestrator};
use crate::ai::pathfinding::HexPathfinder;
use crate::ai::player::AiPlayer;
use crate::ai::snapshot::AiSnapshot;
use crate::game::Nation;
use crate::messages::{ActionRequest, MissionOrder, TradeProposal, TradeResponse};

/// Gives every AI-marked nation a controller bound to its entity.
pub fn attach_ai_players(
    mut commands: Commands,
    nations: Query<(Entity, &Nation), (With<AiNation>, Without<AiPlayer>)>,
) {
    for (entity, nation) in nations.iter() {
        info!("{} is now run by the AI", nation.name);
        commands.entity(entity).insert(AiPlayer::new(nation.id, entity));
    }
}

/// Plans and acts for every AI faction. Runs once per enemy turn.
pub fn run_ai_turns(
    snapshot: Res<AiSnapshot>,
    config: Res<AiConfig>,
    mut players: Query<&mut AiPlayer>,
    mut mission_orders: MessageWriter<MissionOrder>,
    mut action_requests: MessageWriter<ActionRequest>,
) -> Result {
    let pathfinder = HexPathfinder::new(&snapshot.map);
    let strength = SnapshotStrength::new(&snapshot);

    for mut player in players.iter_mut() {
        let mut executor = OrderExecutor::default();
        let mut requests = SnapshotRequests::new(&snapshot);
        let mut orchestrator = TurnOrchestrator::new(&snapshot, &config);
        let mut collaborators = Collaborators {
            pathfinder: &pathfinder,
            strength: &strength,
            executor: &mut executor,
            requests: &mut requests,
        };
        orchestrator.plan_and_act(&mut player, &mut collaborators)?;

        for order in executor.into_orders() {
            mission_orders.write(order);
        }
        for request in requests.into_requests() {
            action_requests.write(request);
        }
    }
    Ok(())
}

/// Answers agreements offered to AI factions.
///
/// Reads the intelligence gathered at the start of the faction's last turn and
/// never refreshes it.
pub fn respond_to_trade_proposals(
    snapshot: Res<AiSnapshot>,
    config: Res<AiConfig>,
    market: Res<EuropeanMarket>,
    mut players: Query<&mut AiPlayer>,
    mut proposals: MessageReader<TradeProposal>,
    mut responses: MessageWriter<TradeResponse>,
) {
    for proposal in proposals.read() {
        let recipient = proposal.trade.recipient;
        let Some(mut player) = players.iter_mut().find(|player| player.nation == recipient) else {
            continue;
        };
        let mut trade = proposal.trade.clone();
        let (intelligence, rng) = player.intelligence_and_rng();
        let evaluator =
            DiplomaticEvaluator::new(recipient, &snapshot, intelligence, &*market, &config);
        let status = evaluator.evaluate(&mut trade, rng);
        if status == TradeStatus::Propose {
            trade.round += 1;
        }
        info!(
            "{} answers {} with {:?} ({} terms)",
            recipient,
            trade.sender,
            status,
            trade.items.len()
        );
        responses.write(TradeResponse {
            responder: recipient,
            status,
            trade,
        });
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;
    use hexx::Hex;

    use super::*;
    use crate::ai::diplomacy::{DiplomaticTrade, TradeContext, TradeTerm};
    use crate::ai::mission::MissionKind;
    use crate::game::{Location, NationId, Stance, UnitType};
    use crate::test_utils::{SnapshotBuilder, ai_player};

    const US: NationId = NationId(1);
    const THEM: NationId = NationId(2);

    fn setup_world(snapshot: AiSnapshot) -> World {
        let mut world = World::new();
        world.insert_resource(snapshot);
        world.init_resource::<AiConfig>();
        world.init_resource::<EuropeanMarket>();
        world.init_resource::<Messages<MissionOrder>>();
        world.init_resource::<Messages<ActionRequest>>();
        world.init_resource::<Messages<TradeProposal>>();
        world.init_resource::<Messages<TradeResponse>>();
        world
    }

    #[test]
    fn ai_nations_get_a_controller_once() {
        let mut world = World::new();
        let nation = world
            .spawn((Nation::european(US, "Dutch"), AiNation))
            .id();
        let human = world.spawn(Nation::european(THEM, "English")).id();

        let _ = world.run_system_once(attach_ai_players);
        let _ = world.run_system_once(attach_ai_players);

        let player = world.get::<AiPlayer>(nation).unwrap();
        assert_eq!(player.nation, US);
        assert_eq!(player.controller_of, nation);
        assert!(world.get::<AiPlayer>(human).is_none());
        let mut players = world.query::<&AiPlayer>();
        assert_eq!(players.iter(&world).count(), 1);
    }

    #[test]
    fn a_turn_emits_orders_and_requests() {
        let mut builder = SnapshotBuilder::new(US);
        builder.gold(US, 1000);
        builder.rumour(Hex::new(2, 0));
        let colonist = builder.unit(US, UnitType::FreeColonist, Location::Europe);
        let snapshot = builder.build();
        let player = ai_player(&snapshot, US);
        let mut world = setup_world(snapshot);
        world.spawn(player);

        let result: Result = world.run_system_once(run_ai_turns).unwrap();
        result.unwrap();

        let orders = world
            .run_system_once(|mut orders: MessageReader<MissionOrder>| {
                orders.read().cloned().collect::<Vec<_>>()
            })
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].unit, colonist);
        assert_eq!(orders[0].kind, MissionKind::Scouting);
        assert_eq!(orders[0].target, Some(Location::Tile(Hex::new(2, 0))));

        let requests = world
            .run_system_once(|mut requests: MessageReader<ActionRequest>| {
                requests.read().cloned().collect::<Vec<_>>()
            })
            .unwrap();
        assert!(requests.contains(&ActionRequest::Equip {
            unit: colonist,
            role: crate::game::UnitRole::Scout,
        }));
    }

    #[test]
    fn a_misregistered_controller_fails_the_system() {
        let snapshot = SnapshotBuilder::new(US).build();
        let mut world = setup_world(snapshot);
        world.spawn(AiPlayer::new(US, Entity::from_bits(999)));

        let result: Result = world.run_system_once(run_ai_turns).unwrap();
        assert!(result.is_err());
        assert!(world.resource::<Messages<MissionOrder>>().is_empty());
    }

    #[test]
    fn proposals_are_answered_by_their_recipient() {
        let mut builder = SnapshotBuilder::new(US);
        builder.rival(THEM);
        builder.stance(US, THEM, Stance::Peace);
        let snapshot = builder.build();
        let player = ai_player(&snapshot, US);
        let mut world = setup_world(snapshot);
        world.spawn(player);

        {
            let mut proposals = world.resource_mut::<Messages<TradeProposal>>();
            proposals.write(TradeProposal {
                trade: DiplomaticTrade::new(TradeContext::Trade, THEM, US)
                    .with_item(THEM, TradeTerm::Gold(100)),
            });
            proposals.write(TradeProposal {
                trade: DiplomaticTrade::new(TradeContext::Trade, US, NationId(9))
                    .with_item(US, TradeTerm::Gold(100)),
            });
        }
        let _ = world.run_system_once(respond_to_trade_proposals);

        let responses = world
            .run_system_once(|mut responses: MessageReader<TradeResponse>| {
                responses.read().cloned().collect::<Vec<_>>()
            })
            .unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].responder, US);
        assert_eq!(responses[0].status, TradeStatus::Accept);
        assert_eq!(responses[0].trade.round, 0);
    }

    #[test]
    fn counter_proposals_bump_the_round() {
        let mut builder = SnapshotBuilder::new(US);
        builder.rival(THEM);
        let snapshot = builder.build();
        let player = ai_player(&snapshot, US);
        let mut world = setup_world(snapshot);
        world.spawn(player);

        world
            .resource_mut::<Messages<TradeProposal>>()
            .write(TradeProposal {
                trade: DiplomaticTrade::new(TradeContext::Contact, THEM, US)
                    .with_item(THEM, TradeTerm::Gold(10)),
            });
        let _ = world.run_system_once(respond_to_trade_proposals);

        let responses = world
            .run_system_once(|mut responses: MessageReader<TradeResponse>| {
                responses.read().cloned().collect::<Vec<_>>()
            })
            .unwrap();
        assert_eq!(responses[0].status, TradeStatus::Propose);
        assert_eq!(responses[0].trade.round, 1);
    }
}

//! Stances, gifts and tribute towards other factions.

use std::cmp::Reverse;
use std::collections::HashSet;

use bevy::prelude::*;
use rand::Rng;

use crate::ai::intelligence::NationIntelligence;
use crate::ai::snapshot::{AiSnapshot, NationSnapshot, SettlementSnapshot};
use crate::constants::{
    GIFT_AMOUNT, TENSION_CONTENT, TENSION_DISPLEASED, TENSION_HAPPY, TENSION_HATEFUL,
    TRIBUTE_STRENGTH_RATIO,
};
use crate::game::{GoodsType, NationId, NationKind, SettlementKind, Stance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanceChange {
    pub towards: NationId,
    pub from: Stance,
    pub to: Stance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gift {
    pub colony: Entity,
    pub settlement: Entity,
    pub goods: GoodsType,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TributeDemand {
    pub unit: Entity,
    pub settlement: Entity,
}

/// Stance that `tension` pushes `current` towards.
pub fn stance_from_tension(current: Stance, tension: u32) -> Stance {
    match current {
        Stance::War if tension <= TENSION_CONTENT => Stance::CeaseFire,
        Stance::CeaseFire if tension <= TENSION_HAPPY => Stance::Peace,
        Stance::CeaseFire | Stance::Peace | Stance::Alliance if tension >= TENSION_HATEFUL => {
            Stance::War
        }
        other => other,
    }
}

/// Whether a treaty signed on turn `since` still holds back a war on `turn`.
///
/// The chance starts at certainty and shrinks to `probability` percent of
/// itself with every turn that passes.
pub fn peace_holds(since: Option<u32>, turn: u32, probability: u32, rng: &mut impl Rng) -> bool {
    let Some(since) = since else {
        return false;
    };
    let turns = i32::try_from(turn.saturating_sub(since)).unwrap_or(i32::MAX);
    let chance = (f64::from(probability.min(100)) / 100.0).powi(turns);
    let threshold = (100.0 * chance) as u32;
    threshold > 0 && rng.random_range(0..100) < threshold
}

/// Stance changes `own` wants this turn.
///
/// Factions we hold no opinion of keep their stance. A slide into war is
/// dropped while an earlier treaty still holds.
pub fn determine_stances(
    snapshot: &AiSnapshot,
    own: NationId,
    peace_probability: u32,
    rng: &mut impl Rng,
) -> Vec<StanceChange> {
    let Some(nation) = snapshot.nation(own) else {
        return Vec::new();
    };
    let mut changes = Vec::new();
    for other in snapshot.nations.values().filter(|other| other.id != own) {
        let Some(tension) = nation.tension_towards(other.id) else {
            continue;
        };
        let from = nation.stance_towards(other.id);
        let to = stance_from_tension(from, tension);
        if to == from {
            continue;
        }
        if to == Stance::War
            && peace_holds(
                nation.peace_since.get(&other.id).copied(),
                snapshot.turn,
                peace_probability,
                &mut *rng,
            )
        {
            debug!("{} keeps the peace with {} at tension {}", own, other.id, tension);
            continue;
        }
        changes.push(StanceChange {
            towards: other.id,
            from,
            to,
        });
    }
    changes
}

fn contacted_natives(
    snapshot: &AiSnapshot,
    own: NationId,
) -> impl Iterator<Item = &NationSnapshot> {
    snapshot.nations.values().filter(move |nation| {
        nation.kind == NationKind::Native
            && matches!(
                snapshot.stance(own, nation.id),
                Stance::Peace | Stance::CeaseFire | Stance::Alliance
            )
    })
}

/// Most plentiful storable goods a colony can give away, food aside.
fn spare_goods(colony: &SettlementSnapshot) -> Option<GoodsType> {
    colony
        .goods
        .iter()
        .filter(|(goods, amount)| {
            goods.is_storable() && !goods.is_food() && **amount >= GIFT_AMOUNT
        })
        .max_by_key(|(goods, amount)| (**amount, Reverse(**goods)))
        .map(|(goods, _)| *goods)
}

/// Gifts from our colonies to displeased native neighbours.
///
/// Every native settlement within `range` tiles of a colony gets at most one
/// gift per turn from the nearest colony that has goods to spare, and every
/// colony gives at most once. Both are recorded in `given`.
pub fn gifts_due(
    snapshot: &AiSnapshot,
    own: NationId,
    range: u32,
    given: &mut HashSet<Entity>,
) -> Vec<Gift> {
    let mut gifts = Vec::new();
    for native in contacted_natives(snapshot, own) {
        if native
            .tension_towards(own)
            .is_none_or(|tension| tension < TENSION_DISPLEASED)
        {
            continue;
        }
        for settlement in snapshot.settlements_of(native.id) {
            if given.contains(&settlement.entity) {
                continue;
            }
            let donor = snapshot
                .settlements_of(own)
                .filter(|colony| {
                    colony.kind == SettlementKind::Colony && !given.contains(&colony.entity)
                })
                .filter(|colony| colony.tile.unsigned_distance_to(settlement.tile) <= range)
                .filter_map(|colony| spare_goods(colony).map(|goods| (colony, goods)))
                .min_by_key(|(colony, _)| {
                    (colony.tile.unsigned_distance_to(settlement.tile), colony.entity)
                });
            let Some((colony, goods)) = donor else {
                continue;
            };
            given.insert(colony.entity);
            given.insert(settlement.entity);
            gifts.push(Gift {
                colony: colony.entity,
                settlement: settlement.entity,
                goods,
                amount: GIFT_AMOUNT,
            });
        }
    }
    gifts
}

/// Tribute our armed units can press on the native settlements beside them.
///
/// Only natives we clearly outmatch and who are not already displeased with
/// us are pressed. Each settlement and each unit is used at most once per
/// turn, recorded in `pressed`.
pub fn tribute_demands(
    snapshot: &AiSnapshot,
    own: NationId,
    intelligence: &NationIntelligence,
    pressed: &mut HashSet<Entity>,
) -> Vec<TributeDemand> {
    let mut demands = Vec::new();
    for native in contacted_natives(snapshot, own) {
        let outmatched = intelligence
            .strength_ratio(native.id)
            .is_some_and(|ratio| ratio > TRIBUTE_STRENGTH_RATIO);
        let calm = native
            .tension_towards(own)
            .is_none_or(|tension| tension < TENSION_DISPLEASED);
        if !outmatched || !calm {
            continue;
        }
        for settlement in snapshot.settlements_of(native.id) {
            if pressed.contains(&settlement.entity) {
                continue;
            }
            let unit = snapshot
                .units_of(own)
                .filter(|unit| {
                    !unit.is_naval() && unit.is_offensive() && !pressed.contains(&unit.entity)
                })
                .filter(|unit| {
                    unit.tile()
                        .is_some_and(|tile| tile.unsigned_distance_to(settlement.tile) == 1)
                })
                .map(|unit| unit.entity)
                .min();
            let Some(unit) = unit else {
                continue;
            };
            pressed.insert(unit);
            pressed.insert(settlement.entity);
            demands.push(TributeDemand {
                unit,
                settlement: settlement.entity,
            });
        }
    }
    demands
}

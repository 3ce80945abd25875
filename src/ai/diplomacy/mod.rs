//! Scoring of trade agreements proposed by other factions.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::config::AiConfig;
use crate::ai::intelligence::NationIntelligence;
use crate::ai::oracle::MarketPricing;
use crate::ai::snapshot::AiSnapshot;
use crate::constants::{
    FOREIGN_OWNED_TILE_VALUE, FOREIGN_SETTLEMENT_BASE_VALUE, FOREIGN_UNIT_VALUE, INCITE_SCALE,
    PEACE_WHEN_WEAK_SCORE, STANCE_SCALE,
};
use crate::game::{GoodsType, NationId, Stance};

/// Circumstances under which an agreement is negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeContext {
    /// First meeting of two factions.
    Contact,
    Diplomatic,
    Trade,
    Tribute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeTerm {
    Gold(i64),
    Colony(Entity),
    Goods { goods_type: GoodsType, amount: u32 },
    /// Set the receiving side against a third faction.
    Incite { victim: NationId },
    Stance(Stance),
    Unit(Entity),
}

/// One term of an agreement, given by `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeItem {
    pub source: NationId,
    pub term: TradeTerm,
}

impl TradeItem {
    pub fn new(source: NationId, term: TradeTerm) -> Self {
        Self { source, term }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiplomaticTrade {
    pub context: TradeContext,
    pub sender: NationId,
    pub recipient: NationId,
    /// Negotiation round, bumped on every counter-offer.
    pub round: u32,
    pub items: Vec<TradeItem>,
}

impl DiplomaticTrade {
    pub fn new(context: TradeContext, sender: NationId, recipient: NationId) -> Self {
        Self {
            context,
            sender,
            recipient,
            round: 0,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, source: NationId, term: TradeTerm) -> Self {
        self.items.push(TradeItem::new(source, term));
        self
    }

    pub fn other(&self, nation: NationId) -> NationId {
        if self.sender == nation {
            self.recipient
        } else {
            self.sender
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Accept,
    Reject,
    /// Counter-offer with the agreement as modified.
    Propose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermScore {
    Unacceptable,
    Value(i64),
}

pub struct DiplomaticEvaluator<'a> {
    nation: NationId,
    snapshot: &'a AiSnapshot,
    intelligence: &'a NationIntelligence,
    market: &'a dyn MarketPricing,
    config: &'a AiConfig,
}

impl<'a> DiplomaticEvaluator<'a> {
    pub fn new(
        nation: NationId,
        snapshot: &'a AiSnapshot,
        intelligence: &'a NationIntelligence,
        market: &'a dyn MarketPricing,
        config: &'a AiConfig,
    ) -> Self {
        Self {
            nation,
            snapshot,
            intelligence,
            market,
            config,
        }
    }

    /// Unknown strength reads as -1 so it never looks favourable.
    fn strength_ratio(&self, other: NationId) -> f64 {
        self.intelligence.strength_ratio(other).unwrap_or(-1.0)
    }

    fn settlement_value(&self, settlement: Entity) -> Option<i64> {
        let snapshot = self.snapshot;
        let colony = snapshot.settlement(settlement)?;
        if colony.owner == self.nation {
            let units: i64 = snapshot
                .units
                .values()
                .filter(|u| u.working_in() == Some(settlement) || u.tile() == Some(colony.tile))
                .map(|u| self.market.unit_price(u.unit_type))
                .sum();
            let goods: i64 = colony
                .goods
                .iter()
                .map(|(goods, amount)| self.market.sale_price(*goods, *amount))
                .sum();
            return Some(units + goods);
        }
        let workers = i64::try_from(snapshot.workers_in(settlement)).unwrap_or(0);
        let mut value = workers * FOREIGN_UNIT_VALUE
            + FOREIGN_SETTLEMENT_BASE_VALUE
            + i64::from(colony.owned_tiles) * FOREIGN_OWNED_TILE_VALUE;
        if colony.stockade_level > 0 {
            value = value.saturating_mul(i64::from(colony.stockade_level));
        }
        Some(value)
    }

    /// Score of one term, positive when it favours us.
    pub fn score_item(&self, trade: &DiplomaticTrade, item: &TradeItem) -> TermScore {
        let ours = item.source == self.nation;
        let sign = if ours { -1 } else { 1 };
        let other = trade.other(self.nation);
        match &item.term {
            TradeTerm::Gold(amount) => TermScore::Value(amount.saturating_mul(sign)),
            TradeTerm::Colony(settlement) => {
                let held = self.snapshot.settlements_of(self.nation).count();
                if ours && held < self.config.min_settlements_to_trade {
                    return TermScore::Unacceptable;
                }
                TermScore::Value(self.settlement_value(*settlement).unwrap_or(0).saturating_mul(sign))
            }
            TradeTerm::Goods { goods_type, amount } => TermScore::Value(if ours {
                -self.market.bid_price(*goods_type, *amount)
            } else {
                self.market.sale_price(*goods_type, *amount)
            }),
            TradeTerm::Incite { victim } => match self.snapshot.stance(self.nation, *victim) {
                Stance::Alliance => TermScore::Value(-1),
                Stance::War => TermScore::Value(0),
                _ => {
                    let value = (INCITE_SCALE * self.strength_ratio(*victim)).round() as i64;
                    TermScore::Value(value.saturating_mul(sign))
                }
            },
            TradeTerm::Stance(stance) => self.score_stance(trade, *stance, other),
            TradeTerm::Unit(unit) => {
                if ours && self.snapshot.units_of(self.nation).count() < self.config.min_units_to_trade {
                    return TermScore::Unacceptable;
                }
                let price = self
                    .snapshot
                    .unit(*unit)
                    .map_or(0, |u| self.market.unit_price(u.unit_type));
                TermScore::Value(price.saturating_mul(sign))
            }
        }
    }

    fn score_stance(&self, trade: &DiplomaticTrade, stance: Stance, other: NationId) -> TermScore {
        let ratio = self.strength_ratio(other);
        let scaled = (STANCE_SCALE * ratio).round() as i64;
        match stance {
            Stance::War if ratio < 0.33 => TermScore::Unacceptable,
            Stance::War if ratio < 0.5 => TermScore::Value(-scaled),
            Stance::War => TermScore::Value(scaled),
            Stance::Peace if trade.context == TradeContext::Contact => TermScore::Value(0),
            Stance::Peace | Stance::CeaseFire | Stance::Alliance => {
                if self.always_offered_peace(other) {
                    TermScore::Value(0)
                } else if ratio > 0.66 {
                    TermScore::Unacceptable
                } else if ratio > 0.5 {
                    TermScore::Value(-scaled)
                } else if ratio > 0.33 {
                    TermScore::Value(scaled)
                } else {
                    TermScore::Value(PEACE_WHEN_WEAK_SCORE)
                }
            }
            Stance::Uncontacted => TermScore::Unacceptable,
        }
    }

    fn always_offered_peace(&self, other: NationId) -> bool {
        self.snapshot
            .nation(other)
            .is_some_and(|nation| nation.always_offered_peace)
    }

    /// Whether a stance term is the peace we keep when rejecting.
    fn is_peace_term(&self, trade: &DiplomaticTrade, item: &TradeItem) -> bool {
        let TradeTerm::Stance(stance) = item.term else {
            return false;
        };
        match stance {
            Stance::Peace if trade.context == TradeContext::Contact => true,
            Stance::Peace | Stance::CeaseFire | Stance::Alliance => {
                self.always_offered_peace(trade.other(self.nation))
            }
            _ => false,
        }
    }

    /// Decides on `trade`, trimming it in place when counter-proposing.
    pub fn evaluate(&self, trade: &mut DiplomaticTrade, rng: &mut impl Rng) -> TradeStatus {
        let scores: Vec<TermScore> = trade
            .items
            .iter()
            .map(|item| self.score_item(trade, item))
            .collect();
        let peace = trade
            .items
            .iter()
            .rev()
            .find(|item| self.is_peace_term(trade, item))
            .cloned();
        let unacceptable = scores
            .iter()
            .filter(|score| **score == TermScore::Unacceptable)
            .count();

        let share = if trade.items.is_empty() {
            0.0
        } else {
            unacceptable as f64 / trade.items.len() as f64
        };
        if share > 0.5 - 0.5 * f64::from(trade.round) {
            debug!(
                "{} rejects trade from {}: {} unacceptable terms",
                self.nation, trade.sender, unacceptable
            );
            return reject(trade, peace);
        }

        let mut kept: Vec<(TradeItem, i64)> = trade
            .items
            .drain(..)
            .zip(scores)
            .filter_map(|(item, score)| match score {
                TermScore::Value(value) => Some((item, value)),
                TermScore::Unacceptable => None,
            })
            .collect();
        let mut sum = kept
            .iter()
            .fold(0i64, |sum, (_, value)| sum.saturating_add(*value));

        if sum >= 0 {
            let status = if trade.context == TradeContext::Contact && trade.round == 0 {
                TradeStatus::Propose
            } else if unacceptable == 0 {
                TradeStatus::Accept
            } else if kept.is_empty() {
                TradeStatus::Reject
            } else {
                TradeStatus::Propose
            };
            trade.items = kept.into_iter().map(|(item, _)| item).collect();
            debug!("{} values trade from {} at {} -> {:?}", self.nation, trade.sender, sum, status);
            return status;
        }

        if rng.random_range(0..=trade.round) > self.config.give_up_threshold {
            trade.items = kept.into_iter().map(|(item, _)| item).collect();
            debug!("{} runs out of patience at round {}", self.nation, trade.round);
            return reject(trade, peace);
        }

        while sum < 0 {
            let Some(worst) = kept
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, value))| *value)
                .map(|(index, _)| index)
            else {
                break;
            };
            let (_, value) = kept.remove(worst);
            sum = sum.saturating_sub(value);
        }
        trade.items = kept.into_iter().map(|(item, _)| item).collect();
        if sum >= 0 && !trade.items.is_empty() {
            debug!("{} counter-proposes at {}", self.nation, sum);
            TradeStatus::Propose
        } else {
            reject(trade, peace)
        }
    }
}

/// Rejection, except that an offered peace is proposed back on its own.
fn reject(trade: &mut DiplomaticTrade, peace: Option<TradeItem>) -> TradeStatus {
    match peace {
        Some(peace) => {
            trade.items = vec![peace];
            TradeStatus::Propose
        }
        None => TradeStatus::Reject,
    }
}

//! Yes or no answers to the crown, native chiefs and the continental congress.

use std::cmp::Reverse;

use bevy::prelude::*;

use crate::ai::oracle::MarketPricing;
use crate::ai::snapshot::{AiSnapshot, NationSnapshot};
use crate::constants::GOODS_PER_HOLD;
use crate::game::{GoodsType, NationId, NationalAdvantage};

/// Age from which colonies are expected to make their own special goods.
const SELF_SUFFICIENT_AGE: u8 = 3;

/// Goods the crown would throw into the harbour if a tax rise is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatenedGoods {
    pub settlement: Entity,
    pub goods: GoodsType,
    pub amount: u32,
}

/// Our most valuable single stock of storable goods.
pub fn most_valuable_goods(
    snapshot: &AiSnapshot,
    own: NationId,
    market: &dyn MarketPricing,
) -> Option<ThreatenedGoods> {
    snapshot
        .settlements_of(own)
        .flat_map(|settlement| {
            settlement
                .goods
                .iter()
                .filter(|(goods, amount)| goods.is_storable() && **amount > 0)
                .map(move |(goods, amount)| ThreatenedGoods {
                    settlement: settlement.entity,
                    goods: *goods,
                    amount: *amount,
                })
        })
        .max_by_key(|threatened| {
            (
                market.sale_price(threatened.goods, threatened.amount),
                Reverse(threatened.settlement),
            )
        })
}

/// Whether to swallow a tax rise of `tax` percent.
///
/// Food is never given up and livestock only while a second herd exists
/// elsewhere. Muskets, horses, trade goods and building material are let go
/// before the last age. Anything else is let go when it sells for less than
/// the average storable goods.
pub fn accept_tax(
    snapshot: &AiSnapshot,
    own: NationId,
    tax: u32,
    market: &dyn MarketPricing,
) -> bool {
    let Some(threatened) = most_valuable_goods(snapshot, own, market) else {
        info!("{} refuses a {}% tax with no goods under threat", own, tax);
        return false;
    };
    let goods = threatened.goods;
    let accepted = if goods.is_food() {
        false
    } else if goods.is_breedable() {
        snapshot
            .settlements_of(own)
            .filter(|settlement| settlement.goods_amount(goods) > 0)
            .count()
            < 2
    } else if goods.is_military() || goods.is_trade_goods() || goods.is_building_material() {
        snapshot.age < SELF_SUFFICIENT_AGE
    } else {
        let incomes: Vec<i64> = GoodsType::ALL
            .into_iter()
            .filter(|goods| goods.is_storable())
            .map(|goods| market.sale_price(goods, GOODS_PER_HOLD))
            .collect();
        let average = incomes.iter().sum::<i64>() / incomes.len().max(1) as i64;
        market.sale_price(goods, GOODS_PER_HOLD) < average
    };
    info!(
        "{} {} a {}% tax threatening {} {}",
        own,
        if accepted { "accepts" } else { "refuses" },
        tax,
        threatened.amount,
        goods
    );
    accepted
}

/// Whether to hand over what a native visitor demands from one of our colonies.
pub fn accept_native_demand(
    nation: &NationSnapshot,
    goods: Option<GoodsType>,
    gold: i64,
) -> bool {
    let accepted = nation.advantage != NationalAdvantage::Conquest;
    debug!(
        "{} {} a native demand for {:?} and {} gold",
        nation.id,
        if accepted { "meets" } else { "refuses" },
        goods,
        gold
    );
    accepted
}

pub fn accept_mercenaries(nation: &NationSnapshot) -> bool {
    nation.is_at_war() || nation.advantage == NationalAdvantage::Conquest
}

/// A founding father offered to the continental congress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatherCandidate {
    pub name: String,
    /// Desirability in each of the three ages.
    pub weights: [i32; 3],
    pub builds_custom_house: bool,
}

impl FatherCandidate {
    pub fn weight(&self, age: u8) -> i32 {
        self.weights[usize::from(age.clamp(1, 3)) - 1]
    }
}

/// The custom house father if offered, otherwise the first of the heaviest
/// for the current age.
pub fn select_founding_father(
    candidates: &[FatherCandidate],
    age: u8,
) -> Option<&FatherCandidate> {
    if let Some(father) = candidates.iter().find(|father| father.builds_custom_house) {
        return Some(father);
    }
    candidates
        .iter()
        .rev()
        .max_by_key(|father| father.weight(age))
}

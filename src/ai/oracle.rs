//! Collaborators the planner consults or drives, and their in-game implementations.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ai::error::{ExecutionError, IntelligenceError, RequestError};
use crate::ai::player::AiUnit;
use crate::ai::snapshot::{AiSnapshot, SettlementSnapshot, UnitSnapshot};
use crate::constants::{PIONEER_TOOLS, ROLE_PRICE_IN_EUROPE, SCOUT_HORSES};
use crate::game::{GoodsType, Location, NationId, Stance, UnitRole, UnitType};
use crate::messages::{ActionRequest, MissionOrder};

/// How path costs are judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostPolicy {
    /// Foreign settlements block the way.
    Strict,
    /// Only the terrain matters.
    Relaxed,
}

/// Reachability oracle.
pub trait Pathfinding {
    /// Turns for `unit` to get from `from` to `to`, or `None` if unreachable.
    fn turns_to_reach(
        &self,
        unit: &UnitSnapshot,
        from: Location,
        to: Location,
        policy: CostPolicy,
    ) -> Option<u32>;
}

/// Military and naval strength of one faction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NationSummary {
    pub strength: f64,
    pub naval_strength: f64,
}

pub trait StrengthAppraisal {
    fn appraise(&self, nation: NationId) -> Result<NationSummary, IntelligenceError>;
}

pub trait MarketPricing {
    /// Gold received for selling goods.
    fn sale_price(&self, goods: GoodsType, amount: u32) -> i64;
    /// Gold paid for buying goods.
    fn bid_price(&self, goods: GoodsType, amount: u32) -> i64;
    fn unit_price(&self, unit_type: UnitType) -> i64;
}

/// Outcome of one mission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionReport {
    pub moves_left: bool,
    pub disposed: bool,
}

/// Advances a unit's mission by one step.
pub trait MissionExecution {
    fn advance(
        &mut self,
        unit: &mut AiUnit,
        snapshot: &AiSnapshot,
    ) -> Result<ExecutionReport, ExecutionError>;
}

/// Remote actions used to carry out decisions. Any of them may fail.
pub trait ActionRequests {
    fn equip(&mut self, unit: &UnitSnapshot, role: UnitRole) -> Result<(), RequestError>;
    fn recruit(&mut self, nation: NationId) -> Result<(), RequestError>;
    fn train(&mut self, nation: NationId, unit_type: UnitType) -> Result<(), RequestError>;
    fn request_emigration(&mut self, nation: NationId) -> Result<(), RequestError>;
    fn change_stance(
        &mut self,
        nation: NationId,
        towards: NationId,
        stance: Stance,
    ) -> Result<(), RequestError>;
    fn deliver_gift(
        &mut self,
        colony: &SettlementSnapshot,
        settlement: &SettlementSnapshot,
        goods: GoodsType,
        amount: u32,
    ) -> Result<(), RequestError>;
    fn demand_tribute(
        &mut self,
        unit: &UnitSnapshot,
        settlement: &SettlementSnapshot,
    ) -> Result<(), RequestError>;
}

/// Strength read from the units in the snapshot.
pub struct SnapshotStrength<'a> {
    snapshot: &'a AiSnapshot,
}

impl<'a> SnapshotStrength<'a> {
    pub fn new(snapshot: &'a AiSnapshot) -> Self {
        Self { snapshot }
    }
}

impl StrengthAppraisal for SnapshotStrength<'_> {
    fn appraise(&self, nation: NationId) -> Result<NationSummary, IntelligenceError> {
        if self.snapshot.nation(nation).is_none() {
            return Err(IntelligenceError::Unavailable(nation));
        }
        let mut summary = NationSummary::default();
        for unit in self.snapshot.units_of(nation) {
            let offence = unit.unit_type.offence(unit.role);
            if unit.is_naval() {
                summary.naval_strength += offence;
            } else {
                summary.strength += offence;
            }
        }
        Ok(summary)
    }
}

/// Prices in the European market.
#[derive(Resource, Debug, Clone)]
pub struct EuropeanMarket {
    /// (sale, bid) per hundred goods.
    prices: BTreeMap<GoodsType, (i64, i64)>,
}

impl Default for EuropeanMarket {
    fn default() -> Self {
        let prices = [
            (GoodsType::Food, (1, 8)),
            (GoodsType::Sugar, (3, 5)),
            (GoodsType::Tobacco, (3, 5)),
            (GoodsType::Cotton, (2, 4)),
            (GoodsType::Furs, (3, 5)),
            (GoodsType::Lumber, (1, 2)),
            (GoodsType::Ore, (4, 5)),
            (GoodsType::Silver, (19, 20)),
            (GoodsType::Horses, (1, 2)),
            (GoodsType::Rum, (10, 11)),
            (GoodsType::Cigars, (10, 11)),
            (GoodsType::Cloth, (10, 11)),
            (GoodsType::Coats, (10, 11)),
            (GoodsType::TradeGoods, (1, 2)),
            (GoodsType::Tools, (1, 2)),
            (GoodsType::Muskets, (2, 3)),
        ]
        .into_iter()
        .collect();
        Self { prices }
    }
}

impl EuropeanMarket {
    pub fn with_price(mut self, goods: GoodsType, sale: i64, bid: i64) -> Self {
        self.prices.insert(goods, (sale, bid));
        self
    }
}

impl MarketPricing for EuropeanMarket {
    fn sale_price(&self, goods: GoodsType, amount: u32) -> i64 {
        self.prices
            .get(&goods)
            .map_or(0, |(sale, _)| sale * i64::from(amount))
    }

    fn bid_price(&self, goods: GoodsType, amount: u32) -> i64 {
        self.prices
            .get(&goods)
            .map_or(0, |(_, bid)| bid * i64::from(amount))
    }

    fn unit_price(&self, unit_type: UnitType) -> i64 {
        unit_type.base_price()
    }
}

/// Hands every mission step to the game as a [`MissionOrder`].
///
/// Execution happens outside the AI, so units never report moves left and
/// each unit gets at most one order per turn. Later planning passes only
/// reach units that received their mission in that pass.
#[derive(Debug, Default)]
pub struct OrderExecutor {
    orders: Vec<MissionOrder>,
}

impl OrderExecutor {
    pub fn into_orders(self) -> Vec<MissionOrder> {
        self.orders
    }
}

impl MissionExecution for OrderExecutor {
    fn advance(
        &mut self,
        unit: &mut AiUnit,
        _snapshot: &AiSnapshot,
    ) -> Result<ExecutionReport, ExecutionError> {
        let mission = unit
            .mission
            .as_ref()
            .ok_or(ExecutionError::NoMission(unit.entity))?;
        self.orders.push(MissionOrder::for_mission(unit.entity, mission));
        Ok(ExecutionReport::default())
    }
}

/// Checks requests against the snapshot before queuing them for the game.
pub struct SnapshotRequests<'a> {
    snapshot: &'a AiSnapshot,
    pending: Vec<ActionRequest>,
}

impl<'a> SnapshotRequests<'a> {
    pub fn new(snapshot: &'a AiSnapshot) -> Self {
        Self {
            snapshot,
            pending: Vec::new(),
        }
    }

    pub fn into_requests(self) -> Vec<ActionRequest> {
        self.pending
    }

    fn gold(&self, nation: NationId) -> i64 {
        self.snapshot.nation(nation).map_or(0, |n| n.gold)
    }
}

impl ActionRequests for SnapshotRequests<'_> {
    fn equip(&mut self, unit: &UnitSnapshot, role: UnitRole) -> Result<(), RequestError> {
        if unit.role == role {
            return Ok(());
        }
        let equipment = match role {
            UnitRole::Scout => Some((GoodsType::Horses, SCOUT_HORSES)),
            UnitRole::Pioneer => Some((GoodsType::Tools, PIONEER_TOOLS)),
            UnitRole::Missionary => None,
            _ => return Err(RequestError::Refused(format!("cannot equip as {:?}", role))),
        };
        let available = if unit.is_in_europe() {
            self.gold(unit.owner) >= ROLE_PRICE_IN_EUROPE
        } else {
            match (unit.tile().and_then(|t| self.snapshot.settlement_at(t)), equipment) {
                (Some(settlement), Some((goods, amount))) => {
                    settlement.owner == unit.owner && settlement.goods_amount(goods) >= amount
                }
                (Some(settlement), None) => settlement.owner == unit.owner,
                (None, _) => false,
            }
        };
        if !available {
            return Err(RequestError::Refused(format!(
                "no equipment for {:?} near {:?}",
                role, unit.location
            )));
        }
        self.pending.push(ActionRequest::Equip {
            unit: unit.entity,
            role,
        });
        Ok(())
    }

    fn recruit(&mut self, nation: NationId) -> Result<(), RequestError> {
        if self.gold(nation) < UnitType::FreeColonist.base_price() {
            return Err(RequestError::NoEffect);
        }
        self.pending.push(ActionRequest::Recruit { nation });
        Ok(())
    }

    fn train(&mut self, nation: NationId, unit_type: UnitType) -> Result<(), RequestError> {
        if self.gold(nation) < unit_type.base_price() {
            return Err(RequestError::NoEffect);
        }
        self.pending.push(ActionRequest::Train { nation, unit_type });
        Ok(())
    }

    fn request_emigration(&mut self, nation: NationId) -> Result<(), RequestError> {
        self.pending.push(ActionRequest::Emigrate { nation });
        Ok(())
    }

    fn change_stance(
        &mut self,
        nation: NationId,
        towards: NationId,
        stance: Stance,
    ) -> Result<(), RequestError> {
        if self.snapshot.stance(nation, towards) == stance {
            return Err(RequestError::NoEffect);
        }
        self.pending.push(ActionRequest::ChangeStance {
            nation,
            towards,
            stance,
        });
        Ok(())
    }

    fn deliver_gift(
        &mut self,
        colony: &SettlementSnapshot,
        settlement: &SettlementSnapshot,
        goods: GoodsType,
        amount: u32,
    ) -> Result<(), RequestError> {
        if colony.goods_amount(goods) < amount {
            return Err(RequestError::Refused(format!(
                "{} lacks {} {:?}",
                colony.name, amount, goods
            )));
        }
        self.pending.push(ActionRequest::Gift {
            colony: colony.entity,
            settlement: settlement.entity,
            goods,
            amount,
        });
        Ok(())
    }

    fn demand_tribute(
        &mut self,
        unit: &UnitSnapshot,
        settlement: &SettlementSnapshot,
    ) -> Result<(), RequestError> {
        let adjacent = unit
            .tile()
            .is_some_and(|tile| tile.unsigned_distance_to(settlement.tile) == 1);
        if !adjacent || !unit.is_offensive() {
            return Err(RequestError::Refused(format!(
                "{:?} cannot press {}",
                unit.unit_type, settlement.name
            )));
        }
        self.pending.push(ActionRequest::DemandTribute {
            unit: unit.entity,
            settlement: settlement.entity,
        });
        Ok(())
    }
}

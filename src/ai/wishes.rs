//! Bookkeeping of the worker and goods requests raised by settlements.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::ai::oracle::{CostPolicy, Pathfinding};
use crate::ai::snapshot::{AiSnapshot, UnitSnapshot};
use crate::ai::transport::TransportableId;
use crate::game::{GoodsType, Location, NationId, UnitType};

/// Identity of a wish: the raising settlement and its own serial number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WishId {
    pub settlement: Entity,
    pub serial: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerWish {
    pub id: WishId,
    pub destination: Location,
    pub value: i32,
    pub unit_type: UnitType,
    pub transportable: Option<TransportableId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoodsWish {
    pub id: WishId,
    pub destination: Location,
    pub value: i32,
    pub goods_type: GoodsType,
    pub amount: u32,
    pub transportable: Option<TransportableId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Wish {
    Worker(WorkerWish),
    Goods(GoodsWish),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishType {
    Worker,
    Goods,
}

impl Wish {
    pub fn id(&self) -> WishId {
        match self {
            Wish::Worker(wish) => wish.id,
            Wish::Goods(wish) => wish.id,
        }
    }

    pub fn destination(&self) -> Location {
        match self {
            Wish::Worker(wish) => wish.destination,
            Wish::Goods(wish) => wish.destination,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            Wish::Worker(wish) => wish.value,
            Wish::Goods(wish) => wish.value,
        }
    }

    pub fn transportable(&self) -> Option<TransportableId> {
        match self {
            Wish::Worker(wish) => wish.transportable,
            Wish::Goods(wish) => wish.transportable,
        }
    }

    pub fn wish_type(&self) -> WishType {
        match self {
            Wish::Worker(_) => WishType::Worker,
            Wish::Goods(_) => WishType::Goods,
        }
    }

    fn bind(&mut self, transportable: TransportableId) {
        match self {
            Wish::Worker(wish) => wish.transportable = Some(transportable),
            Wish::Goods(wish) => wish.transportable = Some(transportable),
        }
    }
}

/// Outstanding wishes, indexed by wanted type and by destination.
///
/// Every wish held here is still unfulfilled and unbound. Rebuilt from scratch
/// each turn.
#[derive(Debug, Default)]
pub struct WishRegistry {
    worker_wishes: HashMap<UnitType, Vec<WorkerWish>>,
    goods_wishes: HashMap<GoodsType, Vec<GoodsWish>>,
    by_destination: HashMap<Location, Vec<Wish>>,
}

impl WishRegistry {
    /// Recollects wishes from every settlement of `nation`.
    ///
    /// `bound` lists wishes some transportable is already working on; those are
    /// not outstanding. Goods wishes for non-storable goods are skipped.
    pub fn rebuild(&mut self, snapshot: &AiSnapshot, nation: NationId, bound: &HashSet<WishId>) {
        self.clear();
        for settlement in snapshot.settlements_of(nation) {
            let mut wishes: Vec<&Wish> = settlement.wishes.iter().collect();
            wishes.sort_by(|a, b| b.value().cmp(&a.value()));
            for wish in wishes {
                if bound.contains(&wish.id()) || wish.transportable().is_some() {
                    continue;
                }
                match wish {
                    Wish::Worker(worker) => {
                        self.worker_wishes
                            .entry(worker.unit_type)
                            .or_default()
                            .push(worker.clone());
                    }
                    Wish::Goods(goods) => {
                        if !goods.goods_type.is_storable() {
                            continue;
                        }
                        self.goods_wishes
                            .entry(goods.goods_type)
                            .or_default()
                            .push(goods.clone());
                    }
                }
                self.by_destination
                    .entry(wish.destination())
                    .or_default()
                    .push(wish.clone());
            }
        }
    }

    /// Best worker wish for `unit` travelling as `unit_type`.
    ///
    /// Reachable wishes are ranked by value per turn. When none is reachable the
    /// most valuable unreachable one is returned. Earlier wishes win ties.
    pub fn best_worker_wish(
        &self,
        unit: &UnitSnapshot,
        unit_type: UnitType,
        pathfinder: &dyn Pathfinding,
    ) -> Option<&WorkerWish> {
        let wishes = self.worker_wishes.get(&unit_type)?;
        let mut best: Option<(&WorkerWish, f64)> = None;
        let mut unreachable: Option<&WorkerWish> = None;
        for wish in wishes {
            let turns = unit.location.and_then(|from| {
                pathfinder.turns_to_reach(unit, from, wish.destination, CostPolicy::Strict)
            });
            match turns {
                Some(turns) => {
                    let value = f64::from(wish.value) / f64::from(turns + 1);
                    if best.is_none_or(|(_, best_value)| best_value < value) {
                        best = Some((wish, value));
                    }
                }
                None => {
                    if unreachable.is_none_or(|current| current.value < wish.value) {
                        unreachable = Some(wish);
                    }
                }
            }
        }
        best.map(|(wish, _)| wish).or(unreachable)
    }

    /// Best goods wish a carrier can deliver to. Unreachable wishes never win.
    pub fn best_goods_wish(
        &self,
        carrier: &UnitSnapshot,
        goods_type: GoodsType,
        pathfinder: &dyn Pathfinding,
    ) -> Option<&GoodsWish> {
        let wishes = self.goods_wishes.get(&goods_type)?;
        let from = carrier.location?;
        let mut best: Option<(&GoodsWish, f64)> = None;
        for wish in wishes {
            let Some(turns) =
                pathfinder.turns_to_reach(carrier, from, wish.destination, CostPolicy::Strict)
            else {
                continue;
            };
            let value = f64::from(wish.value) / f64::from(turns + 1);
            if best.is_none_or(|(_, best_value)| best_value < value) {
                best = Some((wish, value));
            }
        }
        best.map(|(wish, _)| wish)
    }

    /// Removes a wish and binds it to `transportable`.
    ///
    /// Returns the bound wish, or `None` if it was already gone.
    pub fn consume(&mut self, transportable: TransportableId, wish: WishId) -> Option<Wish> {
        let mut removed = self.remove(wish)?;
        removed.bind(transportable);
        Some(removed)
    }

    /// Removes a delivered wish. Returns `false` if it was already gone.
    pub fn complete(&mut self, wish: WishId) -> bool {
        self.remove(wish).is_some()
    }

    /// Outstanding wishes of one type at a destination.
    pub fn wishes_at(&self, location: Location, wish_type: WishType) -> Vec<&Wish> {
        self.by_destination
            .get(&location)
            .map(|wishes| {
                wishes
                    .iter()
                    .filter(|wish| wish.wish_type() == wish_type)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn destinations(&self) -> impl Iterator<Item = (&Location, &Vec<Wish>)> {
        self.by_destination.iter()
    }

    pub fn worker_wish_count(&self) -> usize {
        self.worker_wishes.values().map(Vec::len).sum()
    }

    pub fn goods_wish_count(&self) -> usize {
        self.goods_wishes.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.worker_wishes.clear();
        self.goods_wishes.clear();
        self.by_destination.clear();
    }

    fn remove(&mut self, id: WishId) -> Option<Wish> {
        let mut removed = None;
        for wishes in self.worker_wishes.values_mut() {
            if let Some(index) = wishes.iter().position(|wish| wish.id == id) {
                removed = Some(Wish::Worker(wishes.remove(index)));
                break;
            }
        }
        if removed.is_none() {
            for wishes in self.goods_wishes.values_mut() {
                if let Some(index) = wishes.iter().position(|wish| wish.id == id) {
                    removed = Some(Wish::Goods(wishes.remove(index)));
                    break;
                }
            }
        }
        let removed = removed?;
        if let Some(wishes) = self.by_destination.get_mut(&removed.destination()) {
            wishes.retain(|wish| wish.id() != id);
            if wishes.is_empty() {
                self.by_destination.remove(&removed.destination());
            }
        }
        Some(removed)
    }
}

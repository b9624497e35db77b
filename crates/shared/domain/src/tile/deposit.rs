use crate::resource::{Resource, Stock};
use crate::time::SimTime;
use serde::{Deserialize, Serialize};

/// How a deposit refills over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regrowth {
    None,
    Monthly(u32),
    Yearly(u32),
}

/// Result of a [`ResourceDeposit::harvest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Harvest {
    pub harvested: u32,
    pub refunded_work: u32,
}

/// A harvestable resource bound to a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    pub resource: Resource,
    pub stock: Stock,
    pub capacity: Stock,
    pub harvest_cost: u32,
    pub work_progress: u32,
    pub harvested_total: u32,
    pub regrowth: Regrowth,
}

impl ResourceDeposit {
    const fn new(resource: Resource, stock: Stock, capacity: Stock, harvest_cost: u32, regrowth: Regrowth) -> Self {
        Self { resource, stock, capacity, harvest_cost, work_progress: 0, harvested_total: 0, regrowth }
    }

    #[must_use]
    pub const fn forest() -> Self {
        Self::new(Resource::Wood, Stock::Finite(10), Stock::Finite(10), 50, Regrowth::Yearly(1))
    }

    #[must_use]
    pub const fn stone() -> Self {
        Self::new(Resource::Stone, Stock::Unlimited, Stock::Unlimited, 200, Regrowth::None)
    }

    #[must_use]
    pub const fn food() -> Self {
        Self::new(Resource::Food, Stock::Finite(15), Stock::Finite(20), 15, Regrowth::Monthly(1))
    }

    #[must_use]
    pub const fn cactus() -> Self {
        Self::new(Resource::Food, Stock::Finite(5), Stock::Finite(8), 50, Regrowth::Yearly(5))
    }

    #[must_use]
    pub const fn gem() -> Self {
        Self::new(Resource::Gem, Stock::Unlimited, Stock::Unlimited, 5000, Regrowth::None)
    }

    /// Work needed to harvest `quantity` units, optionally crediting saved progress.
    #[must_use]
    pub const fn harvest_work(&self, quantity: u32, consider_progress: bool) -> u32 {
        let work = self.harvest_cost.saturating_mul(quantity);
        if consider_progress { work.saturating_sub(self.work_progress) } else { work }
    }

    /// Spends `work` (plus saved progress) on whole units.
    ///
    /// An empty deposit refunds all of `work`. Otherwise leftover work is either refunded
    /// (`refund_work`) or kept as progress towards the next unit.
    pub fn harvest(&mut self, work: u32, refund_work: bool) -> Harvest {
        if self.stock.is_empty() {
            return Harvest { harvested: 0, refunded_work: work };
        }

        let total = work.saturating_add(self.work_progress);
        let harvested = self.stock.available(total / self.harvest_cost.max(1));
        let leftover = total - harvested * self.harvest_cost;

        if let Stock::Finite(n) = &mut self.stock {
            *n -= harvested;
        }
        self.harvested_total += harvested;

        if refund_work {
            self.work_progress = 0;
            Harvest { harvested, refunded_work: leftover }
        } else {
            self.work_progress = leftover;
            Harvest { harvested, refunded_work: 0 }
        }
    }

    /// Applies regrowth at the top of the matching period; returns whether stock changed.
    pub fn regrow(&mut self, time: SimTime) -> bool {
        let amount = match self.regrowth {
            Regrowth::Monthly(n) if time.is_top_of_month() => n,
            Regrowth::Yearly(n) if time.is_top_of_year() => n,
            _ => return false,
        };
        match (&mut self.stock, self.capacity) {
            (Stock::Finite(stock), Stock::Finite(cap)) if *stock < cap => {
                *stock = (*stock + amount).min(cap);
                true
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvest_consumes_stock_and_keeps_progress() {
        let mut forest = ResourceDeposit::forest();
        let outcome = forest.harvest(120, false);
        assert_eq!(outcome, Harvest { harvested: 2, refunded_work: 0 });
        assert_eq!(forest.stock, Stock::Finite(8));
        assert_eq!(forest.work_progress, 20);
        assert_eq!(forest.harvest_work(1, true), 30);
        assert_eq!(forest.harvest_work(1, false), 50);

        let outcome = forest.harvest(30, false);
        assert_eq!(outcome.harvested, 1);
        assert_eq!(forest.work_progress, 0);
        assert_eq!(forest.harvested_total, 3);
    }

    #[test]
    fn harvest_can_refund_leftover_work() {
        let mut food = ResourceDeposit::food();
        let outcome = food.harvest(40, true);
        assert_eq!(outcome, Harvest { harvested: 2, refunded_work: 10 });
        assert_eq!(food.work_progress, 0);
    }

    #[test]
    fn harvest_is_limited_by_stock() {
        let mut cactus = ResourceDeposit::cactus();
        let outcome = cactus.harvest(1_000, true);
        assert_eq!(outcome, Harvest { harvested: 5, refunded_work: 750 });
        assert!(cactus.stock.is_empty());

        let outcome = cactus.harvest(75, false);
        assert_eq!(outcome, Harvest { harvested: 0, refunded_work: 75 });
    }

    #[test]
    fn unlimited_deposits_never_run_out() {
        let mut stone = ResourceDeposit::stone();
        assert_eq!(stone.harvest(2_000, false).harvested, 10);
        assert_eq!(stone.stock, Stock::Unlimited);
        assert!(!stone.regrow(SimTime::ZERO));
    }

    #[test]
    fn regrowth_follows_the_calendar() {
        let mut food = ResourceDeposit::food();
        assert!(!food.regrow(SimTime::days(1)));
        assert!(food.regrow(SimTime::months(1)));
        assert_eq!(food.stock, Stock::Finite(16));

        let mut cactus = ResourceDeposit::cactus();
        cactus.stock = Stock::Finite(6);
        assert!(!cactus.regrow(SimTime::months(1)));
        assert!(cactus.regrow(SimTime::years(1)));
        assert_eq!(cactus.stock, cactus.capacity);

        let mut forest = ResourceDeposit::forest();
        assert!(!forest.regrow(SimTime::years(1)));
        forest.stock = Stock::Finite(9);
        assert!(forest.regrow(SimTime::years(2)));
        assert_eq!(forest.stock, Stock::Finite(10));
    }
}

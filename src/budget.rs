//! Budget aggregation.
//!
//! Every priced part of a character produces a `PointBreakdown` in some
//! currency. The aggregator folds those into one running total per
//! currency and sets it against the cap the sheet grants.

use crate::breakdown::PointBreakdown;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Point currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// Fortune Points, spent on non-magic purchases.
    Fortune,
    /// Blessing Points, spent on magic.
    Blessing,
    Companion,
    Weapon,
    Beast,
    Vehicle,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Currency::Fortune => "FP",
            Currency::Blessing => "BP",
            Currency::Companion => "Companion Points",
            Currency::Weapon => "Weapon Points",
            Currency::Beast => "Beast Points",
            Currency::Vehicle => "Vehicle Points",
        };
        f.write_str(name)
    }
}

/// Spending in one currency against its cap.
///
/// # Examples
///
/// ```rust
/// use magecraft::{Budget, Currency};
///
/// let budget = Budget { currency: Currency::Fortune, cap: 10, spent: 12 };
/// assert_eq!(budget.remaining(), -2);
/// assert!(budget.is_overdrawn());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub currency: Currency,
    pub cap: i32,
    pub spent: i32,
}

impl Budget {
    pub fn remaining(&self) -> i32 {
        self.cap - self.spent
    }

    /// Change to the balance caused by spending; grants are positive.
    pub fn delta(&self) -> i32 {
        -self.spent
    }

    pub fn is_overdrawn(&self) -> bool {
        self.spent > self.cap
    }
}

/// Balances for every currency that has a cap or any spending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budgets: BTreeMap<Currency, Budget>,
    pub breakdowns: BTreeMap<Currency, PointBreakdown>,
}

impl BudgetSummary {
    /// Balance for a currency; zero cap and spend if nothing touched it.
    pub fn get(&self, currency: Currency) -> Budget {
        self.budgets.get(&currency).copied().unwrap_or(Budget {
            currency,
            cap: 0,
            spent: 0,
        })
    }

    pub fn breakdown(&self, currency: Currency) -> Option<&PointBreakdown> {
        self.breakdowns.get(&currency)
    }
}

/// Folds per-part breakdowns into per-currency totals.
///
/// # Examples
///
/// ```rust
/// use magecraft::{BudgetAggregator, Currency, PointBreakdown};
///
/// let mut part = PointBreakdown::new(Currency::Fortune);
/// part.add_line("Lucky", -3);
/// part.add_line("Rich", 2);
///
/// let mut aggregator = BudgetAggregator::new();
/// aggregator.add(&part);
/// let summary = aggregator.finish([(Currency::Fortune, 20)]);
///
/// assert_eq!(summary.get(Currency::Fortune).delta(), 1);
/// assert_eq!(summary.get(Currency::Fortune).remaining(), 21);
/// ```
#[derive(Debug, Default)]
pub struct BudgetAggregator {
    totals: BTreeMap<Currency, PointBreakdown>,
}

impl BudgetAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every line of `part` to its currency's running total.
    pub fn add(&mut self, part: &PointBreakdown) {
        let total = self
            .totals
            .entry(part.currency)
            .or_insert_with(|| PointBreakdown::new(part.currency));
        for (description, points) in &part.lines {
            total.add_line(description.clone(), *points);
        }
    }

    /// Add a single line.
    pub fn add_line(&mut self, currency: Currency, description: impl Into<String>, points: i32) {
        self.totals
            .entry(currency)
            .or_insert_with(|| PointBreakdown::new(currency))
            .add_line(description, points);
    }

    /// Set the totals against caps. Currencies without a cap get zero.
    pub fn finish<I>(self, caps: I) -> BudgetSummary
    where
        I: IntoIterator<Item = (Currency, i32)>,
    {
        let mut budgets: BTreeMap<Currency, Budget> = caps
            .into_iter()
            .map(|(currency, cap)| {
                (
                    currency,
                    Budget {
                        currency,
                        cap,
                        spent: 0,
                    },
                )
            })
            .collect();

        for (currency, breakdown) in &self.totals {
            budgets
                .entry(*currency)
                .or_insert(Budget {
                    currency: *currency,
                    cap: 0,
                    spent: 0,
                })
                .spent = breakdown.total;
        }

        BudgetSummary {
            budgets,
            breakdowns: self.totals,
        }
    }
}

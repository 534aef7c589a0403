//! Point breakdown module.
//!
//! Contains `PointBreakdown`, the itemised result of pricing a build or a
//! currency: the net total plus one line per contribution, so a sheet can
//! show where every point went.

use crate::budget::Currency;
use serde::{Deserialize, Serialize};

/// A priced total with its line items.
///
/// # Examples
///
/// ```rust
/// use magecraft::{Currency, PointBreakdown};
///
/// let mut points = PointBreakdown::new(Currency::Companion);
/// points.add_line("Category: familiar", 4);
/// points.add_line("BP discount", -2);
///
/// assert_eq!(points.total, 2);
/// assert_eq!(points.lines.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBreakdown {
    pub currency: Currency,

    /// Sum of every line.
    pub total: i32,

    /// `(description, points)` in the order they were added.
    pub lines: Vec<(String, i32)>,
}

impl PointBreakdown {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            total: 0,
            lines: Vec::new(),
        }
    }

    /// Append a contribution and update the total.
    pub fn add_line(&mut self, description: impl Into<String>, points: i32) {
        self.total = self.total.saturating_add(points);
        self.lines.push((description.into(), points));
    }

    /// Points recorded under lines starting with `prefix`.
    pub fn sum_where(&self, prefix: &str) -> i32 {
        self.lines
            .iter()
            .filter(|(desc, _)| desc.starts_with(prefix))
            .map(|(_, points)| points)
            .sum()
    }
}

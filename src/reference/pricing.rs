//! Non-linear pricing helpers.

use std::collections::BTreeMap;

/// Cost of `n` purchases where the first costs `first` and every later
/// one costs `subsequent`.
///
/// # Examples
///
/// ```rust
/// use magecraft::reference::pricing::stepped_cost;
///
/// assert_eq!(stepped_cost(0, 5, 10), 0);
/// assert_eq!(stepped_cost(1, 5, 10), 5);
/// assert_eq!(stepped_cost(3, 5, 10), 25);
/// ```
pub fn stepped_cost(n: u32, first: i32, subsequent: i32) -> i32 {
    if n == 0 {
        return 0;
    }
    let extra = i32::try_from(n - 1).unwrap_or(i32::MAX);
    first.saturating_add(extra.saturating_mul(subsequent))
}

/// Signature power pricing: 5 for the first, 10 for each one after.
pub fn signature_cost(n: u32) -> i32 {
    stepped_cost(n, 5, 10)
}

/// Total surcharge for `n` Xuth picks inside a signature power:
/// 5 for the first, 10 for each one after.
pub fn grade_surcharge(n: u32) -> i32 {
    stepped_cost(n, 5, 10)
}

/// Price of a directly chosen tier; unknown tiers cost nothing.
pub fn tiered_cost(tier: u32, tiers: &BTreeMap<u32, i32>) -> i32 {
    tiers.get(&tier).copied().unwrap_or(0)
}

/// Impressive career tiers.
pub fn career_tiers() -> BTreeMap<u32, i32> {
    BTreeMap::from([(1, 5), (2, 10), (3, 15)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_increments() {
        let totals: Vec<i32> = (1..=3).map(signature_cost).collect();
        assert_eq!(totals, vec![5, 15, 25]);

        let increments: Vec<i32> = (1..=3)
            .map(|n| signature_cost(n) - signature_cost(n - 1))
            .collect();
        assert_eq!(increments, vec![5, 10, 10]);
    }

    #[test]
    fn test_grade_surcharge_is_cumulative() {
        assert_eq!(grade_surcharge(0), 0);
        assert_eq!(grade_surcharge(1), 5);
        assert_eq!(grade_surcharge(2), 15);
    }

    #[test]
    fn test_career_tier_is_direct() {
        let tiers = career_tiers();
        assert_eq!(tiered_cost(2, &tiers), 10);
        assert_eq!(tiered_cost(3, &tiers), 15);
        assert_eq!(tiered_cost(4, &tiers), 0);
    }
}

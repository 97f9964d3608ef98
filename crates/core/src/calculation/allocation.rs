//! Amount allocation using the Largest Remainder Method.
//!
//! This module distributes a refund across payment methods while ensuring
//! the parts sum exactly to the whole (no cents lost or gained).
//!
//! The allocation works in two passes:
//! 1. Compute each share at full precision and round it half-up
//! 2. Hand the residual (whole minus sum of parts) back one unit at a time,
//!    starting with the largest weight

use std::cmp::Ordering;

use rust_decimal::prelude::*;

/// Allocation utility for distributing amounts.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Allocate `total` proportionally to `weights`.
    ///
    /// `total` is first rounded to `decimal_places`. Each share is
    /// `total × weight / Σweights` rounded half-up; any residual is then
    /// moved one unit at a time to the shares with the largest weights
    /// (ties broken by position), so the result always sums to `total`.
    ///
    /// Returns an empty vector when there are no weights or they sum to zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use refund_core::calculation::AllocationUtil;
    ///
    /// // 100 split three ways
    /// let weights = vec![dec!(1), dec!(1), dec!(1)];
    /// let result = AllocationUtil::allocate_by_weights(dec!(100), &weights, 2);
    /// assert_eq!(result, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    /// ```
    #[must_use]
    pub fn allocate_by_weights(total: Decimal, weights: &[Decimal], decimal_places: u32) -> Vec<Decimal> {
        let weight_sum: Decimal = weights.iter().copied().sum();
        if weights.is_empty() || weight_sum.is_zero() {
            return vec![];
        }

        let unit = Decimal::new(1, decimal_places);
        let round = |value: Decimal| {
            let mut rounded = value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(decimal_places);
            rounded
        };

        let total_rounded = round(total);

        // First pass: independent half-up rounding
        let mut allocated: Vec<Decimal> = weights
            .iter()
            .map(|w| round(total_rounded * *w / weight_sum))
            .collect();

        let residual = total_rounded - allocated.iter().copied().sum::<Decimal>();
        if residual.is_zero() {
            return allocated;
        }

        // Second pass: largest weight first
        let mut order: Vec<usize> = (0..weights.len()).collect();
        order.sort_by(|&a, &b| match weights[b].cmp(&weights[a]) {
            Ordering::Equal => a.cmp(&b),
            other => other,
        });

        let step = if residual.is_sign_negative() { -unit } else { unit };
        let units = (residual.abs() / unit)
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .to_usize()
            .unwrap_or(0);

        for idx in order.iter().cycle().take(units) {
            allocated[*idx] += step;
        }

        allocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_allocate_empty() {
        assert!(AllocationUtil::allocate_by_weights(dec!(100), &[], 2).is_empty());
        assert!(AllocationUtil::allocate_by_weights(dec!(100), &[Decimal::ZERO], 2).is_empty());
    }

    #[test]
    fn test_allocate_single() {
        let result = AllocationUtil::allocate_by_weights(dec!(58.13), &[dec!(100)], 2);
        assert_eq!(result, vec![dec!(58.13)]);
    }

    #[test]
    fn test_allocate_split_exact() {
        // 60/40 split of a full refund
        let result = AllocationUtil::allocate_by_weights(dec!(100), &[dec!(60), dec!(40)], 2);
        assert_eq!(result, vec![dec!(60.00), dec!(40.00)]);
    }

    #[test]
    fn test_allocate_proportional() {
        // 38.40 over 60/40 -> 23.04 / 15.36
        let result = AllocationUtil::allocate_by_weights(dec!(38.40), &[dec!(60), dec!(40)], 2);
        assert_eq!(result, vec![dec!(23.04), dec!(15.36)]);
    }

    #[test]
    fn test_residual_goes_to_largest_weight() {
        // 0.05 over 50/50 -> 0.025 each -> 0.03 + 0.03 overshoots by a cent,
        // taken back from the first of the tied largest weights.
        let result = AllocationUtil::allocate_by_weights(dec!(0.05), &[dec!(50), dec!(50)], 2);
        assert_eq!(result, vec![dec!(0.02), dec!(0.03)]);

        // Weighted so the smaller share is listed first.
        let result = AllocationUtil::allocate_by_weights(dec!(0.05), &[dec!(1), dec!(1), dec!(3)], 2);
        assert_eq!(result.iter().copied().sum::<Decimal>(), dec!(0.05));
        assert_eq!(result[2], dec!(0.03));
    }

    #[test]
    fn test_allocate_thirds_undershoot() {
        // 100 / 3 -> 33.33 * 3 = 99.99, one cent to the first tied weight
        let weights = vec![dec!(20), dec!(20), dec!(20)];
        let result = AllocationUtil::allocate_by_weights(dec!(100), &weights, 2);
        assert_eq!(result, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    }

    #[test]
    fn test_residual_on_rounded_up_share_stays_within_a_cent_and_a_half() {
        // Every share rounds to the nearest cent, leaving one cent short.
        // It goes to the largest weight, whose share was already rounded up.
        let weights = vec![dec!(7145.82), dec!(6279.60), dec!(364.47), dec!(3200.60)];
        let result = AllocationUtil::allocate_by_weights(dec!(885.33), &weights, 2);
        assert_eq!(result, vec![dec!(372.36), dec!(327.21), dec!(18.99), dec!(166.77)]);

        let weight_sum: Decimal = weights.iter().copied().sum();
        for (share, weight) in result.iter().zip(&weights) {
            let exact = dec!(885.33) * *weight / weight_sum;
            assert!((*share - exact).abs() <= dec!(0.015), "{share} vs {exact}");
        }
        assert!(result[0] - dec!(885.33) * weights[0] / weight_sum > dec!(0.01));
    }

    #[test]
    fn test_allocate_sum_invariant() {
        let test_cases = [
            (dec!(100), vec![dec!(33.33), dec!(33.33), dec!(33.34)]),
            (dec!(1000), vec![dec!(25), dec!(25), dec!(25), dec!(25)]),
            (dec!(99.99), vec![dec!(10), dec!(20), dec!(30), dec!(40)]),
            (dec!(0.01), vec![dec!(1), dec!(1), dec!(1)]),
            (dec!(64.00), vec![dec!(38.40), dec!(25.60)]),
            (dec!(17.17), vec![dec!(7), dec!(7), dec!(7), dec!(7), dec!(7), dec!(7), dec!(7)]),
        ];

        for (total, weights) in test_cases {
            let result = AllocationUtil::allocate_by_weights(total, &weights, 2);
            assert_eq!(
                result.iter().copied().sum::<Decimal>(),
                total,
                "Sum invariant failed for total={total}, weights={weights:?}"
            );
        }
    }
}

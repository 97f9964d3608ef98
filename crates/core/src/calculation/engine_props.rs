//! Property-based tests for the refund calculator.
//!
//! These tests verify allocation and rounding properties over random
//! transactions:
//! - Payment allocations always reconcile to the refund total
//! - Partial refunds never exceed what the selected items carried
//! - Full and installment refunds never exceed the remaining balance

use proptest::prelude::*;
use rust_decimal::Decimal;
use refund_shared::types::{money_unit, round_money};

use super::allocation::AllocationUtil;
use super::engine::RefundCalculator;
use super::types::{RefundScope, RefundableBalance};
use crate::ledger::{PaymentMethodType, Transaction};
use crate::test_support::{flat_transaction, item, payment};

/// Positive amount in cents, 0.01 ..= 10,000.00.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn fee_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A transaction with 1-4 items and 1-4 payments whose amounts add up to the total.
fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        prop::collection::vec(amount_strategy(), 1..5),
        fee_strategy(),
        fee_strategy(),
        prop::collection::vec(1u32..100u32, 1..5),
    )
        .prop_map(|(item_amounts, tax, shipping, payment_weights)| {
            let subtotal: Decimal = item_amounts.iter().copied().sum();
            let total = subtotal + tax + shipping;
            let weights: Vec<Decimal> = payment_weights.iter().map(|w| Decimal::from(*w)).collect();
            let shares = AllocationUtil::allocate_by_weights(total, &weights, 2);

            let mut tx = flat_transaction("TXN-PROP", total);
            tx.subtotal = subtotal;
            tx.tax = tax;
            tx.shipping = shipping;
            tx.items = item_amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| item(&format!("ITEM-{i}"), *amount))
                .collect();
            tx.payments = shares
                .into_iter()
                .enumerate()
                .map(|(i, share)| payment(&format!("PAY-{i}"), PaymentMethodType::Card, share, "USD"))
                .collect();
            tx
        })
        .prop_filter("every payment must be positive", |tx| {
            tx.payments.iter().all(|p| p.amount > Decimal::ZERO)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: allocations always sum exactly to the rounded total.
    #[test]
    fn prop_allocation_reconciles(
        total in amount_strategy(),
        weights in prop::collection::vec(amount_strategy(), 1..6),
    ) {
        let shares = AllocationUtil::allocate_by_weights(total, &weights, 2);
        prop_assert_eq!(shares.len(), weights.len());
        prop_assert_eq!(shares.iter().copied().sum::<Decimal>(), round_money(total));
    }

    /// Property: each share is within a cent and a half of its exact
    /// proportion. A residual cent landing on a share that was already
    /// rounded up can push it past a single cent.
    #[test]
    fn prop_allocation_is_near_proportional(
        total in amount_strategy(),
        weights in prop::collection::vec(amount_strategy(), 1..6),
    ) {
        let weight_sum: Decimal = weights.iter().copied().sum();
        let shares = AllocationUtil::allocate_by_weights(total, &weights, 2);
        for (share, weight) in shares.iter().zip(&weights) {
            let exact = total * *weight / weight_sum;
            prop_assert!((*share - exact).abs() <= money_unit() + money_unit() / Decimal::TWO);
        }
    }

    /// Property: a full refund of a fresh transaction returns the total,
    /// split exactly across the payments.
    #[test]
    fn prop_full_refund_reconciles(tx in transaction_strategy()) {
        let balance = RefundableBalance { remaining: tx.total, refunded: Decimal::ZERO };
        let breakdown = RefundCalculator::calculate(&tx, &RefundScope::Full, balance).unwrap();

        prop_assert_eq!(breakdown.total_refund, tx.total);
        let allocated: Decimal = breakdown.payment_breakdown.iter().map(|p| p.refund_amount).sum();
        prop_assert_eq!(allocated, breakdown.total_refund);
    }

    /// Property: a partial refund carries the item ratio of tax and shipping
    /// within one rounding unit and never more than the items could carry.
    #[test]
    fn prop_partial_refund_bounded(tx in transaction_strategy(), pick in 0usize..4) {
        let selected = vec![&tx.items[pick % tx.items.len()]];
        let principal: Decimal = selected.iter().map(|i| i.amount()).sum();
        let breakdown = RefundCalculator::partial_refund(&tx, &selected).unwrap();

        let ratio = principal / tx.subtotal;
        let expected_fees = ratio * (tx.tax + tx.shipping);
        let fees = breakdown.tax_refund + breakdown.shipping_refund;
        prop_assert!((fees - expected_fees).abs() <= money_unit());
        prop_assert!(breakdown.total_refund <= round_money(principal + tx.tax + tx.shipping));
        prop_assert!(breakdown.total_refund <= tx.total);

        let allocated: Decimal = breakdown.payment_breakdown.iter().map(|p| p.refund_amount).sum();
        prop_assert_eq!(allocated, breakdown.total_refund);
    }

    /// Property: installment refunds never exceed the remaining balance.
    #[test]
    fn prop_installment_refund_capped(
        tx in transaction_strategy(),
        installments in 2u32..13,
        charged_seed in 0u32..13,
        refunded_cents in 0i64..1_000_000i64,
    ) {
        let mut tx = tx;
        tx.installments_total = installments;
        tx.installments_charged = charged_seed % (installments + 1);

        let refunded = Decimal::new(refunded_cents, 2).min(tx.total);
        let balance = RefundableBalance { remaining: tx.total - refunded, refunded };
        let breakdown = RefundCalculator::installment_refund(&tx, balance).unwrap();

        prop_assert!(breakdown.total_refund >= Decimal::ZERO);
        prop_assert!(breakdown.total_refund <= balance.remaining);
    }
}

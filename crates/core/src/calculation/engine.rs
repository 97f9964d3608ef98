//! Refund calculation engine.
//!
//! Pure functions with no side effects. All monetary math uses `Decimal`;
//! each returned figure is rounded half-up to cents exactly once, at the end.

use rust_decimal::{Decimal, RoundingStrategy};
use refund_shared::types::{MONEY_SCALE, round_money};

use super::allocation::AllocationUtil;
use super::conversion::convert_amount;
use super::error::CalculationError;
use super::types::{
    CalculationBreakdown, InstallmentDetail, PaymentRefund, RefundScenario, RefundScope,
    RefundableBalance, SettlementConversion,
};
use crate::ledger::{Item, Transaction};

/// Places kept on the displayed item ratio.
const RATIO_SCALE: u32 = 4;

/// Stateless refund calculator.
pub struct RefundCalculator;

impl RefundCalculator {
    /// Computes the refund for `scope` against a transaction.
    ///
    /// Topology is picked in this order:
    /// 1. An item subset is a partial refund
    /// 2. A full refund of an installment transaction refunds charged installments
    /// 3. Any other full refund refunds the remaining balance
    ///
    /// Cross-border transactions additionally get a settlement conversion.
    ///
    /// # Errors
    ///
    /// Returns a [`CalculationError`] when a divisor is zero, there is nothing
    /// to allocate to, or the exchange rate is not positive.
    pub fn calculate(
        transaction: &Transaction,
        scope: &RefundScope<'_>,
        balance: RefundableBalance,
    ) -> Result<CalculationBreakdown, CalculationError> {
        if transaction.total.is_zero() {
            return Err(CalculationError::ZeroTransactionTotal);
        }
        if transaction.payments.is_empty() {
            return Err(CalculationError::NoPayments);
        }
        if transaction.installments_total == 0 {
            return Err(CalculationError::ZeroInstallments);
        }

        let mut breakdown = match scope {
            RefundScope::Items(items) => Self::partial_refund(transaction, items)?,
            RefundScope::Full if transaction.is_installment() => {
                Self::installment_refund(transaction, balance)?
            }
            RefundScope::Full => Self::full_refund(transaction, balance)?,
        };

        if transaction.is_cross_border() {
            breakdown.settlement = Some(Self::settlement(transaction, breakdown.total_refund)?);
        }

        Ok(breakdown)
    }

    /// Refunds whatever is still refundable, split across payments by weight.
    ///
    /// # Errors
    ///
    /// Returns `ZeroTransactionTotal` if the transaction total is zero.
    pub fn full_refund(
        transaction: &Transaction,
        balance: RefundableBalance,
    ) -> Result<CalculationBreakdown, CalculationError> {
        let scenario = if transaction.payments.len() == 1 {
            RefundScenario::FullSinglePayment
        } else {
            RefundScenario::FullSplitPayment
        };
        let amount = balance.remaining.max(Decimal::ZERO);
        let (tax, shipping) = Self::fees_share(transaction, amount)?;
        Self::assemble(transaction, scenario, amount, tax, shipping)
    }

    /// Refunds a subset of items plus their share of tax and shipping.
    ///
    /// `item_ratio = Σ selected / subtotal`; tax and shipping are refunded in
    /// that ratio.
    ///
    /// # Errors
    ///
    /// Returns `ZeroSubtotal` or `ZeroTransactionTotal` on a zero divisor.
    pub fn partial_refund(
        transaction: &Transaction,
        items: &[&Item],
    ) -> Result<CalculationBreakdown, CalculationError> {
        if transaction.subtotal.is_zero() {
            return Err(CalculationError::ZeroSubtotal);
        }

        let items_subtotal: Decimal = items.iter().map(|item| item.amount()).sum();
        let ratio = items_subtotal / transaction.subtotal;
        let tax = transaction.tax * ratio;
        let shipping = transaction.shipping * ratio;

        let mut breakdown = Self::assemble(
            transaction,
            RefundScenario::PartialItems,
            items_subtotal + tax + shipping,
            tax,
            shipping,
        )?;
        breakdown.items_subtotal = Some(round_money(items_subtotal));
        breakdown.item_ratio = Some(
            ratio.round_dp_with_strategy(RATIO_SCALE, RoundingStrategy::MidpointAwayFromZero),
        );
        Ok(breakdown)
    }

    /// Refunds the installments charged so far, less what was already refunded.
    ///
    /// The amount is capped at the remaining balance and floored at zero.
    ///
    /// # Errors
    ///
    /// Returns `ZeroInstallments` or `ZeroTransactionTotal` on a zero divisor.
    pub fn installment_refund(
        transaction: &Transaction,
        balance: RefundableBalance,
    ) -> Result<CalculationBreakdown, CalculationError> {
        if transaction.installments_total == 0 {
            return Err(CalculationError::ZeroInstallments);
        }

        let paid: Decimal = transaction.payments.iter().map(|p| p.amount).sum();
        let installment_value = paid / Decimal::from(transaction.installments_total);
        let charged_amount = installment_value * Decimal::from(transaction.installments_charged);
        let amount = (charged_amount - balance.refunded)
            .min(balance.remaining)
            .max(Decimal::ZERO);

        let (tax, shipping) = Self::fees_share(transaction, amount)?;
        let mut breakdown =
            Self::assemble(transaction, RefundScenario::Installment, amount, tax, shipping)?;
        breakdown.installments = Some(InstallmentDetail {
            installments_total: transaction.installments_total,
            installments_charged: transaction.installments_charged,
            installment_value: round_money(installment_value),
            charged_amount: round_money(charged_amount),
            previously_refunded: round_money(balance.refunded),
        });
        Ok(breakdown)
    }

    /// Converts a refund total into the settlement currency at the purchase-time rate.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveExchangeRate` if the stored rate is not positive.
    pub fn settlement(
        transaction: &Transaction,
        total_refund: Decimal,
    ) -> Result<SettlementConversion, CalculationError> {
        Ok(SettlementConversion {
            currency: transaction.settlement_currency.clone(),
            exchange_rate: transaction.exchange_rate,
            amount: convert_amount(total_refund, transaction.exchange_rate)?,
        })
    }

    /// Tax and shipping carried by `amount`, in proportion to the transaction total.
    fn fees_share(
        transaction: &Transaction,
        amount: Decimal,
    ) -> Result<(Decimal, Decimal), CalculationError> {
        if transaction.total.is_zero() {
            return Err(CalculationError::ZeroTransactionTotal);
        }
        Ok((
            transaction.tax * amount / transaction.total,
            transaction.shipping * amount / transaction.total,
        ))
    }

    fn assemble(
        transaction: &Transaction,
        scenario: RefundScenario,
        total: Decimal,
        tax: Decimal,
        shipping: Decimal,
    ) -> Result<CalculationBreakdown, CalculationError> {
        let total_refund = round_money(total);
        let weights: Vec<Decimal> = transaction.payments.iter().map(|p| p.amount).collect();
        let shares = AllocationUtil::allocate_by_weights(total_refund, &weights, MONEY_SCALE);
        if shares.len() != transaction.payments.len() {
            return Err(CalculationError::ZeroTransactionTotal);
        }

        let payment_breakdown = transaction
            .payments
            .iter()
            .zip(shares)
            .map(|(payment, refund_amount)| PaymentRefund {
                payment_id: payment.id.clone(),
                method: payment.method,
                original_amount: round_money(payment.amount),
                refund_amount,
                currency: payment.currency.clone(),
            })
            .collect();

        Ok(CalculationBreakdown {
            scenario,
            currency: transaction.currency.clone(),
            items_subtotal: None,
            item_ratio: None,
            tax_refund: round_money(tax),
            shipping_refund: round_money(shipping),
            total_refund,
            payment_breakdown,
            installments: None,
            settlement: None,
        })
    }
}

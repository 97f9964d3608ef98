//! Domain types produced by the calculation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use refund_shared::types::{CurrencyCode, PaymentId};

use crate::ledger::{Item, PaymentMethodType};

/// Which allocation rule produced a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundScenario {
    /// Full refund of a transaction paid with one method.
    FullSinglePayment,
    /// Full refund of a transaction paid with several methods.
    FullSplitPayment,
    /// Refund of a subset of items.
    PartialItems,
    /// Refund of the charged installments.
    Installment,
}

/// What the caller asked to refund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundScope<'a> {
    /// Everything that is still refundable.
    Full,
    /// A resolved, de-duplicated subset of the transaction's items.
    Items(Vec<&'a Item>),
}

impl RefundScope<'_> {
    /// Returns true for a full refund.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Balance state of a transaction at calculation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundableBalance {
    /// Amount that can still be refunded.
    pub remaining: Decimal,
    /// Amount already refunded.
    pub refunded: Decimal,
}

/// One payment method's share of a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRefund {
    /// Payment being refunded.
    pub payment_id: PaymentId,
    /// Method of that payment.
    pub method: PaymentMethodType,
    /// Amount originally paid with the method.
    pub original_amount: Decimal,
    /// Amount returned to the method.
    pub refund_amount: Decimal,
    /// Currency of the payment.
    pub currency: CurrencyCode,
}

/// Installment figures behind an installment refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentDetail {
    pub installments_total: u32,
    pub installments_charged: u32,
    /// Value of a single installment, rounded for display.
    pub installment_value: Decimal,
    /// Amount collected so far.
    pub charged_amount: Decimal,
    /// Amount refunded before this refund.
    pub previously_refunded: Decimal,
}

/// Refund total expressed in the merchant's settlement currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConversion {
    pub currency: CurrencyCode,
    /// Rate captured at purchase time.
    pub exchange_rate: Decimal,
    pub amount: Decimal,
}

/// Full result of a refund calculation.
///
/// Every monetary figure is rounded to two places, half-up. The breakdown is
/// also the calculation snapshot stored with audit entries.
///
/// `tax_refund`, `shipping_refund` and `total_refund` are each rounded from
/// their unrounded values, so the components need not sum to the total to
/// the cent. Only `payment_breakdown` is guaranteed to sum to `total_refund`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    pub scenario: RefundScenario,
    /// Purchase currency.
    pub currency: CurrencyCode,
    /// Sum of the selected items, for partial refunds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_subtotal: Option<Decimal>,
    /// Selected items over subtotal, four places, for partial refunds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ratio: Option<Decimal>,
    /// Portion of the tax being returned.
    pub tax_refund: Decimal,
    /// Portion of the shipping being returned.
    pub shipping_refund: Decimal,
    /// Amount being returned.
    pub total_refund: Decimal,
    /// Allocation across payment methods. Sums exactly to `total_refund`.
    pub payment_breakdown: Vec<PaymentRefund>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<InstallmentDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementConversion>,
}

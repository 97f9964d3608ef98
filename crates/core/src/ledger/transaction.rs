//! Captured payment transaction aggregate.
//!
//! A transaction, its payments and its items are immutable once registered
//! with the ledger store. Only the refundable balance, which lives next to the
//! transaction in the store, ever changes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use refund_shared::types::{CurrencyCode, ItemId, PaymentId, TransactionId};

use super::error::LedgerError;

/// Transaction lifecycle status as reported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Funds reserved, not yet captured.
    Authorized,
    /// Funds captured.
    Captured,
    /// Funds settled to the merchant.
    Settled,
    /// Authorization cancelled before capture.
    Voided,
    /// Disputed by the cardholder and reversed.
    Chargebacked,
}

impl TransactionStatus {
    /// Returns true if refunds may be issued against this status.
    #[must_use]
    pub fn allows_refund(self) -> bool {
        matches!(self, Self::Captured | Self::Settled)
    }

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authorized => "AUTHORIZED",
            Self::Captured => "CAPTURED",
            Self::Settled => "SETTLED",
            Self::Voided => "VOIDED",
            Self::Chargebacked => "CHARGEBACKED",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodType {
    /// Credit or debit card.
    Card,
    /// Digital wallet.
    Wallet,
    /// Bank transfer.
    BankTransfer,
    /// Cash voucher.
    Cash,
}

/// One payment method's share of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment identifier.
    pub id: PaymentId,
    /// Payment method type.
    pub method: PaymentMethodType,
    /// Amount paid with this method.
    pub amount: Decimal,
    /// Currency of the payment.
    pub currency: CurrencyCode,
    /// Last four digits of the card, for card payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
}

/// A purchased line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier, unique within its transaction.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Price of one unit.
    pub unit_price: Decimal,
    /// Units purchased.
    pub quantity: u32,
}

impl Item {
    /// Line amount (`unit_price × quantity`).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A captured purchase that refunds are reconciled against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Merchant the purchase was made with.
    pub merchant_id: String,
    /// Processor status.
    pub status: TransactionStatus,
    /// Purchase currency.
    pub currency: CurrencyCode,
    /// Currency the merchant settles in.
    pub settlement_currency: CurrencyCode,
    /// Settlement-currency units per purchase-currency unit, fixed at purchase time.
    pub exchange_rate: Decimal,
    /// Sum of item amounts before tax and shipping.
    pub subtotal: Decimal,
    /// Tax charged.
    pub tax: Decimal,
    /// Shipping charged.
    pub shipping: Decimal,
    /// Grand total (`subtotal + tax + shipping`).
    pub total: Decimal,
    /// Payments, in the order they were taken.
    pub payments: Vec<Payment>,
    /// Purchased items.
    pub items: Vec<Item>,
    /// Number of installments the purchase was split into (1 = paid at once).
    pub installments_total: u32,
    /// Installments charged so far.
    pub installments_charged: u32,
}

impl Transaction {
    /// Returns true if the purchase and settlement currencies differ.
    #[must_use]
    pub fn is_cross_border(&self) -> bool {
        self.currency != self.settlement_currency
    }

    /// Returns true if the purchase is paid in more than one installment.
    #[must_use]
    pub fn is_installment(&self) -> bool {
        self.installments_total > 1
    }

    /// Looks up an item by identifier.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Checks the structural invariants a transaction must satisfy before
    /// refunds can be reconciled against it.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.payments.is_empty() {
            return Err(LedgerError::NoPayments(self.id.clone()));
        }
        if self.total <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount { field: "total" });
        }
        if self.subtotal < Decimal::ZERO || self.tax < Decimal::ZERO || self.shipping < Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount {
                field: "subtotal/tax/shipping",
            });
        }
        if self.payments.iter().any(|p| p.amount <= Decimal::ZERO) {
            return Err(LedgerError::NonPositiveAmount { field: "payment.amount" });
        }
        if self
            .items
            .iter()
            .any(|i| i.unit_price <= Decimal::ZERO || i.quantity == 0)
        {
            return Err(LedgerError::NonPositiveAmount { field: "item.amount" });
        }

        let payments: Decimal = self.payments.iter().map(|p| p.amount).sum();
        if payments != self.total {
            return Err(LedgerError::PaymentsDoNotMatchTotal {
                payments,
                total: self.total,
            });
        }

        let items: Decimal = self.items.iter().map(Item::amount).sum();
        if items > self.subtotal {
            return Err(LedgerError::ItemsExceedSubtotal {
                items,
                subtotal: self.subtotal,
            });
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.items.iter().find(|i| !seen.insert(&i.id)) {
            return Err(LedgerError::DuplicateItem(dup.id.clone()));
        }

        if self.installments_total == 0 || self.installments_charged > self.installments_total {
            return Err(LedgerError::InvalidInstallments {
                total: self.installments_total,
                charged: self.installments_charged,
            });
        }

        if self.exchange_rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate(self.exchange_rate));
        }

        Ok(())
    }
}

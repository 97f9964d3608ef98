//! Demo transactions for local development.
//!
//! Covers every refund topology plus the statuses that must be rejected.

use anyhow::Context;
use rust_decimal::Decimal;
use refund_core::ledger::{Item, Payment, PaymentMethodType, Transaction, TransactionStatus};
use refund_core::reconciliation::RefundOrchestrator;
use refund_shared::types::{CurrencyCode, ItemId, PaymentId, TransactionId, round_money};

const MERCHANT: &str = "MERCHANT-SOLARA";

/// Purchase currency and units of that currency per settlement unit.
const CROSS_BORDER: [(&str, i64); 5] = [
    ("BRL", 520),
    ("MXN", 1715),
    ("COP", 410_000),
    ("ARS", 90_000),
    ("CLP", 95_000),
];

/// Registers the demo transactions and returns how many were loaded.
pub fn load(orchestrator: &RefundOrchestrator, settlement: &CurrencyCode) -> anyhow::Result<usize> {
    let transactions = demo_transactions(settlement)?;
    let count = transactions.len();
    for tx in transactions {
        let id = tx.id.clone();
        orchestrator
            .register_transaction(tx)
            .with_context(|| format!("Failed to seed {id}"))?;
    }
    Ok(count)
}

struct Draft {
    id: String,
    status: TransactionStatus,
    currency: CurrencyCode,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    /// Item id suffix and share of the subtotal, in percent.
    items: Vec<(&'static str, i64)>,
    /// Payment id suffix, method and share of the total, in percent.
    payments: Vec<(&'static str, PaymentMethodType, i64)>,
}

impl Draft {
    fn new(id: String, status: TransactionStatus, currency: &CurrencyCode, subtotal: Decimal) -> Self {
        Self {
            id,
            status,
            currency: currency.clone(),
            subtotal,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            items: vec![("A", 100)],
            payments: vec![("", PaymentMethodType::Card, 100)],
        }
    }

    fn fees(mut self, tax_percent: i64, shipping: Decimal) -> Self {
        self.tax = round_money(self.subtotal * Decimal::new(tax_percent, 2));
        self.shipping = shipping;
        self
    }

    fn build(self) -> Transaction {
        let total = self.subtotal + self.tax + self.shipping;
        let suffix = self.id.trim_start_matches("TXN-").to_string();

        let items = self
            .items
            .iter()
            .map(|(tag, percent)| Item {
                id: ItemId::new(format!("ITEM-{suffix}-{tag}")),
                name: format!("Product {tag} ({suffix})"),
                unit_price: self.subtotal * Decimal::new(*percent, 2),
                quantity: 1,
            })
            .collect();

        // The last payment absorbs rounding so the split sums to the total
        let mut allocated = Decimal::ZERO;
        let last = self.payments.len().saturating_sub(1);
        let payments = self
            .payments
            .iter()
            .enumerate()
            .map(|(i, (tag, method, percent))| {
                let amount = if i == last {
                    total - allocated
                } else {
                    round_money(total * Decimal::new(*percent, 2))
                };
                allocated += amount;
                Payment {
                    id: PaymentId::new(format!("PAY-{suffix}{tag}")),
                    method: *method,
                    amount,
                    currency: self.currency.clone(),
                    card_last4: matches!(method, PaymentMethodType::Card).then(|| "4242".to_string()),
                }
            })
            .collect();

        Transaction {
            id: TransactionId::new(self.id),
            merchant_id: MERCHANT.to_string(),
            status: self.status,
            currency: self.currency.clone(),
            settlement_currency: self.currency,
            exchange_rate: Decimal::ONE,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping: self.shipping,
            total,
            payments,
            items,
            installments_total: 1,
            installments_charged: 1,
        }
    }
}

fn code(value: &str) -> anyhow::Result<CurrencyCode> {
    value.parse().map_err(anyhow::Error::msg)
}

/// Builds the demo transaction set.
pub fn demo_transactions(settlement: &CurrencyCode) -> anyhow::Result<Vec<Transaction>> {
    let mut transactions = Vec::new();

    // Regular single-method
    let currencies = [code("BRL")?, code("MXN")?, code("COP")?, code("USD")?];
    for i in 1..=40_i64 {
        let status = if i % 2 == 1 {
            TransactionStatus::Captured
        } else {
            TransactionStatus::Settled
        };
        let currency = &currencies[usize::try_from((i - 1) % 4)?];
        let mut draft = Draft::new(format!("TXN-REG-{i:03}"), status, currency, Decimal::from(10 + i * 2))
            .fees(15, Decimal::new(500, 2));
        draft.items = vec![("A", 60), ("B", 40)];
        transactions.push(draft.build());
    }

    // Split payment
    let brl = code("BRL")?;
    for i in 1..=5_i64 {
        let mut draft = Draft::new(
            format!("TXN-SPLIT-{i:03}"),
            TransactionStatus::Captured,
            &brl,
            Decimal::from(50 + i * 10),
        )
        .fees(10, Decimal::new(800, 2));
        draft.items = vec![("A", 50), ("B", 30), ("C", 20)];
        draft.payments = vec![
            ("-CARD", PaymentMethodType::Card, 60),
            ("-WALLET", PaymentMethodType::Wallet, 40),
        ];
        transactions.push(draft.build());
    }

    // Installments: (total, charged)
    let mxn = code("MXN")?;
    for (i, (total, charged)) in [(3, 2), (6, 3), (6, 6), (12, 5), (12, 12), (6, 0)].into_iter().enumerate() {
        let n = i64::try_from(i)? + 1;
        let mut tx = Draft::new(
            format!("TXN-INSTALL-{n:03}"),
            TransactionStatus::Captured,
            &mxn,
            Decimal::from(120 + n * 20),
        )
        .fees(12, Decimal::new(1000, 2))
        .build();
        tx.installments_total = total;
        tx.installments_charged = charged;
        transactions.push(tx);
    }

    // Cross-border, settled in the configured currency
    for (i, (purchase, units_per_settlement)) in CROSS_BORDER.into_iter().enumerate() {
        let n = i64::try_from(i)? + 1;
        let mut draft = Draft::new(
            format!("TXN-CROSS-{n:03}"),
            TransactionStatus::Settled,
            &code(purchase)?,
            Decimal::from(200 + n * 50),
        )
        .fees(18, Decimal::new(1500, 2));
        draft.items = vec![("A", 60), ("B", 40)];
        let mut tx = draft.build();
        tx.settlement_currency = settlement.clone();
        tx.exchange_rate = (Decimal::ONE / Decimal::new(units_per_settlement, 2)).round_dp(8);
        transactions.push(tx);
    }

    // Non-refundable statuses
    let usd = code("USD")?;
    let rejected = [
        ("VOID", TransactionStatus::Voided, 5000),
        ("CB", TransactionStatus::Chargebacked, 7500),
        ("AUTH", TransactionStatus::Authorized, 3000),
    ];
    for (prefix, status, cents) in rejected {
        for i in 1..=3 {
            let draft = Draft::new(format!("TXN-{prefix}-{i:03}"), status, &usd, Decimal::new(cents, 2))
                .fees(15, Decimal::new(500, 2));
            transactions.push(draft.build());
        }
    }

    Ok(transactions)
}

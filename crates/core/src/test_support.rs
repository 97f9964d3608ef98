//! Transaction fixtures shared by unit tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use refund_shared::types::{CurrencyCode, ItemId, PaymentId, TransactionId};

use crate::ledger::{Item, Payment, PaymentMethodType, Transaction, TransactionStatus};

pub(crate) fn currency(code: &str) -> CurrencyCode {
    code.parse().expect("valid currency code")
}

pub(crate) fn payment(id: &str, method: PaymentMethodType, amount: Decimal, code: &str) -> Payment {
    Payment {
        id: PaymentId::from(id),
        method,
        amount,
        currency: currency(code),
        card_last4: matches!(method, PaymentMethodType::Card).then(|| "4242".to_string()),
    }
}

pub(crate) fn item(id: &str, unit_price: Decimal) -> Item {
    Item {
        id: ItemId::from(id),
        name: format!("Item {id}"),
        unit_price,
        quantity: 1,
    }
}

fn base(id: &str, code: &str, subtotal: Decimal, tax: Decimal, shipping: Decimal) -> Transaction {
    Transaction {
        id: TransactionId::from(id),
        merchant_id: "MERCH-001".to_string(),
        status: TransactionStatus::Captured,
        currency: currency(code),
        settlement_currency: currency(code),
        exchange_rate: Decimal::ONE,
        subtotal,
        tax,
        shipping,
        total: subtotal + tax + shipping,
        payments: vec![],
        items: vec![],
        installments_total: 1,
        installments_charged: 1,
    }
}

/// One item worth the whole total, paid with one card, no tax or shipping.
pub(crate) fn flat_transaction(id: &str, total: Decimal) -> Transaction {
    let mut tx = base(id, "USD", total, Decimal::ZERO, Decimal::ZERO);
    tx.payments = vec![payment("PAY-1", PaymentMethodType::Card, total, "USD")];
    tx.items = vec![item("ITEM-A", total)];
    tx
}

/// Subtotal 80 (items 50 + 30), tax 8, shipping 5, one card payment of 93.
pub(crate) fn single_payment_transaction() -> Transaction {
    let mut tx = base("TXN-SINGLE", "USD", dec!(80.00), dec!(8.00), dec!(5.00));
    tx.payments = vec![payment("PAY-1", PaymentMethodType::Card, dec!(93.00), "USD")];
    tx.items = vec![item("ITEM-A", dec!(50.00)), item("ITEM-B", dec!(30.00))];
    tx
}

/// Subtotal 80 (items 50 + 30), tax 8, shipping 12, card 60 + wallet 40.
pub(crate) fn split_payment_transaction() -> Transaction {
    let mut tx = base("TXN-SPLIT", "USD", dec!(80.00), dec!(8.00), dec!(12.00));
    tx.payments = vec![
        payment("PAY-CARD", PaymentMethodType::Card, dec!(60.00), "USD"),
        payment("PAY-WALLET", PaymentMethodType::Wallet, dec!(40.00), "USD"),
    ];
    tx.items = vec![item("ITEM-A", dec!(50.00)), item("ITEM-B", dec!(30.00))];
    tx
}

/// Total 64.00 MXN paid by card in `total` installments, `charged` collected.
pub(crate) fn installment_transaction(total: u32, charged: u32) -> Transaction {
    let mut tx = base("TXN-INSTALL", "MXN", dec!(50.00), dec!(9.00), dec!(5.00));
    tx.payments = vec![payment("PAY-1", PaymentMethodType::Card, dec!(64.00), "MXN")];
    tx.items = vec![item("ITEM-A", dec!(30.00)), item("ITEM-B", dec!(20.00))];
    tx.installments_total = total;
    tx.installments_charged = charged;
    tx
}

/// Total 64.00 BRL settled in USD at `rate` USD per BRL.
pub(crate) fn cross_border_transaction(rate: Decimal) -> Transaction {
    let mut tx = base("TXN-CROSS", "BRL", dec!(50.00), dec!(9.00), dec!(5.00));
    tx.settlement_currency = currency("USD");
    tx.exchange_rate = rate;
    tx.payments = vec![payment("PAY-1", PaymentMethodType::Card, dec!(64.00), "BRL")];
    tx.items = vec![item("ITEM-A", dec!(30.00)), item("ITEM-B", dec!(20.00))];
    tx
}

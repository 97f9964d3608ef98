//! Refund request as presented to the engine.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use refund_shared::types::{ItemId, TransactionId};

/// Longest accepted transaction, item or operator identifier.
pub const MAX_ID_LEN: usize = 50;

/// A request to refund all or part of a transaction.
///
/// `item_ids: None` asks for a full refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RefundRequest {
    #[validate(custom(function = "transaction_id_format"))]
    pub transaction_id: TransactionId,
    #[serde(default)]
    #[validate(length(max = 100), custom(function = "item_ids_format"))]
    pub item_ids: Option<Vec<ItemId>>,
    #[validate(length(min = 1, max = 50), custom(function = "operator_id_format"))]
    pub operator_id: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub idempotency_key: Option<String>,
}

fn transaction_id_format(id: &TransactionId) -> Result<(), ValidationError> {
    let valid = !id.as_str().is_empty()
        && id.as_str().len() <= MAX_ID_LEN
        && id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("transaction_id_format")
            .with_message("must be 1-50 characters of A-Z, 0-9, '_' or '-'".into()))
    }
}

fn item_ids_format(ids: &[ItemId]) -> Result<(), ValidationError> {
    if ids
        .iter()
        .all(|id| !id.as_str().is_empty() && id.as_str().len() <= MAX_ID_LEN)
    {
        Ok(())
    } else {
        Err(ValidationError::new("item_id_format").with_message("item ids must be 1-50 characters".into()))
    }
}

fn operator_id_format(id: &str) -> Result<(), ValidationError> {
    if id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        Ok(())
    } else {
        Err(ValidationError::new("operator_id_format")
            .with_message("must contain only letters, digits, '_' or '-'".into()))
    }
}

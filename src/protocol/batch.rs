//! Order batch decoding.
//!
//! Decision sources answer with JSON: either a bare array of orders or an
//! object with an `orders` array. Entries that do not match the closed order
//! set are skipped one by one; only a payload that cannot be read at all is
//! an error, which callers treat as an implicit pass.

use serde_json::Value;

use crate::board::Order;

/// Errors that make a whole payload unusable.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has no order list")]
    MissingOrders,
}

/// A decoded batch plus a note of what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedBatch {
    pub orders: Vec<Order>,
    /// Index and reason of each malformed entry.
    pub skipped: Vec<(usize, String)>,
}

/// Decodes a raw decision payload.
pub fn parse_order_batch(payload: &str) -> Result<DecodedBatch, BatchError> {
    let value: Value = serde_json::from_str(payload.trim())?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("orders") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(BatchError::MissingOrders),
        },
        _ => return Err(BatchError::MissingOrders),
    };

    let mut batch = DecodedBatch::default();
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Order>(entry) {
            Ok(order) => batch.orders.push(order),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "skipping malformed order");
                batch.skipped.push((i, e.to_string()));
            }
        }
    }
    Ok(batch)
}

/// Encodes orders in the same wire format.
pub fn format_orders(orders: &[Order]) -> String {
    serde_json::to_string(orders).unwrap_or_else(|_| "[]".to_string())
}

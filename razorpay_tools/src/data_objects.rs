use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spg_common::Rupees;

/// The payload for `POST /orders` on the gateway. Amounts are always expressed in the minor unit
/// (paise), which is why the constructor takes [`Rupees`] rather than a raw integer.
#[derive(Debug, Clone, Serialize)]
pub struct RazorpayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub notes: HashMap<String, String>,
}

impl RazorpayOrderRequest {
    pub fn new(amount: Rupees, currency: &str, receipt: &str) -> Self {
        Self {
            amount: amount.value(),
            currency: currency.to_string(),
            receipt: receipt.to_string(),
            notes: HashMap::new(),
        }
    }

    pub fn with_notes(mut self, notes: HashMap<String, String>) -> Self {
        self.notes = notes;
        self
    }
}

/// The gateway's order object, as returned by its orders API. Field names follow the gateway's
/// wire format so the object can be passed through to clients untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub entity: String,
    pub amount: i64,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub notes: serde_json::Value,
    pub created_at: i64,
}

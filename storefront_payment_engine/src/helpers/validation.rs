//! Server-side validation of untrusted order and payment payloads.
//!
//! Every bound here is checked before any database write or gateway call. Failures are reported as
//! a list of `(field path, message)` pairs so the storefront UI can attach messages to the fields
//! that caused them.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use spg_common::Rupees;

use crate::db_types::{NewOrder, OrderItem, PaymentConfirmation};

pub const MAX_ITEM_QUANTITY: u32 = 100;
/// Per-item price ceiling, in paise (₹100 000).
pub const MAX_ITEM_PRICE: i64 = 100_000 * 100;
/// Order / gateway amount ceiling, in paise (₹500 000). Guards against gross overcharge and typo
/// attacks.
pub const MAX_ORDER_TOTAL: i64 = 500_000 * 100;
/// Gateway constraint on the receipt field.
pub const MAX_RECEIPT_LEN: usize = 40;

const MAX_NAME_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;
const MAX_NOTES_LEN: usize = 500;
const MAX_ITEMS: usize = 50;
const MAX_NOTE_ENTRIES: usize = 15;
const MAX_NOTE_VALUE_LEN: usize = 256;
const MAX_GATEWAY_FIELD_LEN: usize = 256;

const PHONE_PATTERN: &str = r"^[6-9][0-9]{9}$";
const PINCODE_PATTERN: &str = r"^[0-9]{6}$";
const CURRENCY_PATTERN: &str = r"^[A-Z]{3}$";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

/// Validates an order submission against the intake schema. Returns all issues found, not just the
/// first one.
pub fn validate_new_order(order: &NewOrder) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    check_required_str(&mut issues, "customer_name", &order.customer_name, MAX_NAME_LEN);
    check_required_str(&mut issues, "address_line1", &order.address_line1, MAX_ADDRESS_LEN);
    check_required_str(&mut issues, "city", &order.city, MAX_NAME_LEN);
    check_required_str(&mut issues, "state", &order.state, MAX_NAME_LEN);
    if let Some(line2) = &order.address_line2 {
        check_max_len(&mut issues, "address_line2", line2, MAX_ADDRESS_LEN);
    }
    let phone_re = Regex::new(PHONE_PATTERN).unwrap();
    if !phone_re.is_match(&order.phone) {
        issues.push(ValidationIssue::new("phone", "Must be a 10-digit Indian mobile number"));
    }
    let pincode_re = Regex::new(PINCODE_PATTERN).unwrap();
    if !pincode_re.is_match(&order.pincode) {
        issues.push(ValidationIssue::new("pincode", "Must be a 6-digit pincode"));
    }
    if let Some(email) = &order.email {
        check_max_len(&mut issues, "email", email, MAX_EMAIL_LEN);
        // Deliberately loose. Real mailbox validation happens when mail bounces.
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            issues.push(ValidationIssue::new("email", "Must be a valid email address"));
        }
    }
    if let Some(notes) = &order.order_notes {
        check_max_len(&mut issues, "order_notes", notes, MAX_NOTES_LEN);
    }
    validate_items(&mut issues, &order.items);
    check_amount(&mut issues, "subtotal", order.subtotal);
    check_amount(&mut issues, "total", order.total);
    if let Some(shipping) = order.shipping_charge {
        if shipping.value() < 0 || shipping.value() > MAX_ORDER_TOTAL {
            issues.push(ValidationIssue::new("shipping_charge", "Amount is out of range"));
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn validate_items(issues: &mut Vec<ValidationIssue>, items: &[OrderItem]) {
    if items.is_empty() {
        issues.push(ValidationIssue::new("items", "Order must contain at least one item"));
        return;
    }
    if items.len() > MAX_ITEMS {
        issues.push(ValidationIssue::new("items", format!("Order cannot contain more than {MAX_ITEMS} items")));
    }
    for (i, item) in items.iter().enumerate() {
        check_required_str(issues, &format!("items[{i}].product_id"), &item.product_id, MAX_NAME_LEN);
        check_required_str(issues, &format!("items[{i}].product_name"), &item.product_name, MAX_ADDRESS_LEN);
        check_max_len(issues, &format!("items[{i}].variant"), &item.variant, MAX_NAME_LEN);
        if item.price.value() <= 0 || item.price.value() > MAX_ITEM_PRICE {
            issues.push(ValidationIssue::new(format!("items[{i}].price"), "Price is out of range"));
        }
        if item.quantity == 0 || item.quantity > MAX_ITEM_QUANTITY {
            issues.push(ValidationIssue::new(
                format!("items[{i}].quantity"),
                format!("Quantity must be between 1 and {MAX_ITEM_QUANTITY}"),
            ));
        }
        if let Some(image) = &item.image {
            check_max_len(issues, &format!("items[{i}].image"), image, MAX_NOTES_LEN);
        }
    }
}

/// Validates a gateway order-initiation request and converts the rupee amount to paise. The
/// receipt length limit is imposed by the gateway itself.
pub fn validate_gateway_order_request(
    amount: f64,
    currency: &str,
    receipt: &str,
    notes: &HashMap<String, String>,
) -> Result<Rupees, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let amount = match Rupees::try_from_rupees(amount) {
        Ok(a) => {
            if a.value() <= 0 || a.value() > MAX_ORDER_TOTAL {
                issues.push(ValidationIssue::new("amount", "Amount is out of range"));
            }
            a
        },
        Err(e) => {
            issues.push(ValidationIssue::new("amount", e.to_string()));
            Rupees::default()
        },
    };
    let currency_re = Regex::new(CURRENCY_PATTERN).unwrap();
    if !currency_re.is_match(currency) {
        issues.push(ValidationIssue::new("currency", "Must be a 3-letter uppercase currency code"));
    }
    if receipt.is_empty() || receipt.len() > MAX_RECEIPT_LEN {
        issues.push(ValidationIssue::new("receipt", format!("Must be 1-{MAX_RECEIPT_LEN} characters")));
    }
    if notes.len() > MAX_NOTE_ENTRIES {
        issues.push(ValidationIssue::new("notes", format!("Cannot contain more than {MAX_NOTE_ENTRIES} entries")));
    }
    for (key, value) in notes {
        if key.is_empty() || key.len() > MAX_NAME_LEN || value.len() > MAX_NOTE_VALUE_LEN {
            issues.push(ValidationIssue::new(format!("notes.{key}"), "Note entries must be short strings"));
        }
    }
    if issues.is_empty() {
        Ok(amount)
    } else {
        Err(issues)
    }
}

/// Shape-validates a payment confirmation before any cryptography or database access.
pub fn validate_payment_confirmation(confirmation: &PaymentConfirmation) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    check_gateway_handle(&mut issues, "razorpay_order_id", &confirmation.razorpay_order_id);
    check_gateway_handle(&mut issues, "razorpay_payment_id", &confirmation.razorpay_payment_id);
    let sig = &confirmation.razorpay_signature;
    if sig.is_empty() || sig.len() > MAX_GATEWAY_FIELD_LEN || !sig.bytes().all(|b| b.is_ascii_hexdigit()) {
        issues.push(ValidationIssue::new("razorpay_signature", "Must be a hex-encoded signature"));
    }
    if let Some(order_id) = &confirmation.order_id {
        if order_id.as_str().is_empty() || order_id.as_str().len() > MAX_GATEWAY_FIELD_LEN {
            issues.push(ValidationIssue::new("order_id", "Invalid order id"));
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_gateway_handle(issues: &mut Vec<ValidationIssue>, path: &str, value: &str) {
    if value.is_empty() || value.len() > MAX_GATEWAY_FIELD_LEN {
        issues.push(ValidationIssue::new(path, "Field is required"));
    }
}

fn check_required_str(issues: &mut Vec<ValidationIssue>, path: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(path, "Field is required"));
    } else if value.len() > max_len {
        issues.push(ValidationIssue::new(path, format!("Cannot be longer than {max_len} characters")));
    }
}

fn check_max_len(issues: &mut Vec<ValidationIssue>, path: &str, value: &str, max_len: usize) {
    if value.len() > max_len {
        issues.push(ValidationIssue::new(path, format!("Cannot be longer than {max_len} characters")));
    }
}

fn check_amount(issues: &mut Vec<ValidationIssue>, path: &str, amount: Rupees) {
    if amount.value() <= 0 || amount.value() > MAX_ORDER_TOTAL {
        issues.push(ValidationIssue::new(path, "Amount is out of range"));
    }
}

use std::collections::HashMap;

use razorpay_tools::RazorpayOrder;
use serde::{Deserialize, Serialize};
use spg_common::Rupees;
use storefront_payment_engine::{
    db_types::{NewOrder, OrderId, OrderItem, PaymentConfirmation, PaymentMethod},
    helpers::ValidationIssue,
};

/// The body of `POST /create-order`. The storefront wraps the order fields in an `orderData`
/// envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSubmission {
    #[serde(rename = "orderData")]
    pub order_data: NewOrderPayload,
}

/// The wire shape of an incoming order. Monetary amounts arrive as rupee JSON numbers and the
/// payment method as a free string; both are converted here so that every downstream type is
/// already strongly typed.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderPayload {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub items: Vec<OrderItemPayload>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub shipping_charge: Option<f64>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub order_notes: Option<String>,
    #[serde(default)]
    pub payment_method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemPayload {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewOrderPayload {
    /// Converts the wire payload into a [`NewOrder`]. Only conversion-level problems (unparseable
    /// amounts, unknown payment method) are reported here; the full schema check happens in the
    /// engine's validation pass.
    pub fn try_into_new_order(self) -> Result<NewOrder, Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let subtotal = convert_amount(&mut issues, "subtotal", self.subtotal);
        let total = convert_amount(&mut issues, "total", self.total);
        let shipping_charge = self.shipping_charge.map(|v| convert_amount(&mut issues, "shipping_charge", v));
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| OrderItem {
                product_id: item.product_id,
                product_name: item.product_name,
                variant: item.variant,
                price: convert_amount(&mut issues, &format!("items[{i}].price"), item.price),
                quantity: item.quantity,
                image: item.image,
            })
            .collect();
        let payment_method = self.payment_method.parse::<PaymentMethod>().unwrap_or_else(|_| {
            issues.push(ValidationIssue::new("payment_method", "Must be one of COD, Razorpay"));
            PaymentMethod::Cod
        });
        let order = NewOrder {
            customer_name: self.customer_name,
            phone: self.phone,
            email: self.email,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            items,
            subtotal,
            shipping_charge,
            total,
            order_notes: self.order_notes,
            payment_method,
        };
        if issues.is_empty() {
            Ok(order)
        } else {
            Err(issues)
        }
    }
}

fn convert_amount(issues: &mut Vec<ValidationIssue>, path: &str, rupees: f64) -> Rupees {
    Rupees::try_from_rupees(rupees).unwrap_or_else(|e| {
        issues.push(ValidationIssue::new(path, e.to_string()));
        Rupees::default()
    })
}

/// The body of `POST /create-razorpay-order`. Everything is optional on the wire; missing required
/// fields surface as validation issues rather than deserialization failures.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrderRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: Option<HashMap<String, String>>,
}

/// The success response for `POST /create-razorpay-order`: the gateway's order object as-is, plus
/// the public key id clients need to open the hosted checkout. The API secret is never part of
/// this object.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderResponse {
    #[serde(flatten)]
    pub order: RazorpayOrder,
    pub key_id: String,
}

/// The form fields the gateway posts to `/razorpay-callback`. All optional so that a malformed
/// callback still reaches the handler and earns its `missing_fields` redirect.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

impl CallbackParams {
    pub fn into_confirmation(self) -> Option<PaymentConfirmation> {
        match (self.razorpay_order_id, self.razorpay_payment_id, self.razorpay_signature) {
            (Some(order_id), Some(payment_id), Some(signature)) => Some(PaymentConfirmation {
                razorpay_order_id: order_id,
                razorpay_payment_id: payment_id,
                razorpay_signature: signature,
                order_id: None,
            }),
            _ => None,
        }
    }
}

/// The JSON body of `POST /verify-razorpay-payment`. On this path the client must name the local
/// order explicitly, so all four fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl VerifyRequest {
    pub fn into_confirmation(self) -> Result<PaymentConfirmation, Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let razorpay_order_id = require(&mut issues, "razorpay_order_id", self.razorpay_order_id);
        let razorpay_payment_id = require(&mut issues, "razorpay_payment_id", self.razorpay_payment_id);
        let razorpay_signature = require(&mut issues, "razorpay_signature", self.razorpay_signature);
        let order_id = require(&mut issues, "order_id", self.order_id);
        if issues.is_empty() {
            Ok(PaymentConfirmation {
                razorpay_order_id,
                razorpay_payment_id,
                razorpay_signature,
                order_id: Some(OrderId(order_id)),
            })
        } else {
            Err(issues)
        }
    }
}

fn require(issues: &mut Vec<ValidationIssue>, path: &str, value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            issues.push(ValidationIssue::new(path, "Field is required"));
            String::new()
        },
    }
}

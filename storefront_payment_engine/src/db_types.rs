use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spg_common::Rupees;
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public, opaque identifier of an order. Assigned by the store at insert time and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------   OrderStatusType     -------------------------------------------------------
/// The order status state machine. The only forward transition driven by the payment core is
/// `PaymentPending → Paid`. `Expired` is applied by the reconciliation sweep to pending orders
/// that outlived their deadline. `Cod` orders never enter the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and the customer has not completed the gateway payment yet.
    #[serde(rename = "Payment Pending")]
    PaymentPending,
    /// A gateway payment for this order has been verified in full.
    Paid,
    /// Cash on delivery. Terminal as far as the payment gateway is concerned.
    #[serde(rename = "COD")]
    Cod,
    /// The order sat in `Payment Pending` past the deadline and was swept.
    Expired,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::PaymentPending => write!(f, "Payment Pending"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Cod => write!(f, "COD"),
            OrderStatusType::Expired => write!(f, "Expired"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Payment Pending" => Ok(Self::PaymentPending),
            "Paid" => Ok(Self::Paid),
            "COD" => Ok(Self::Cod),
            "Expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    Razorpay,
}

impl PaymentMethod {
    /// The status a freshly intaken order starts in.
    pub fn initial_status(&self) -> OrderStatusType {
        match self {
            PaymentMethod::Cod => OrderStatusType::Cod,
            PaymentMethod::Razorpay => OrderStatusType::PaymentPending,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "COD"),
            PaymentMethod::Razorpay => write!(f, "Razorpay"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "Razorpay" => Ok(Self::Razorpay),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// A single line item. Prices are stored in paise; the HTTP layer converts from the rupee amounts
/// clients submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub variant: String,
    pub price: Rupees,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Rupees,
    pub shipping_charge: Option<Rupees>,
    pub total: Rupees,
    pub order_notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    /// The gateway-side order handle, recorded at initiation time so that callbacks can be bound
    /// to the order that triggered them.
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlite")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Order {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        let decode_err = |column: &str, e: String| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(ConversionError(e)),
        };
        let items_json: String = row.try_get("items")?;
        let items = serde_json::from_str::<Vec<OrderItem>>(&items_json)
            .map_err(|e| decode_err("items", e.to_string()))?;
        let status = row
            .try_get::<String, _>("status")?
            .parse::<OrderStatusType>()
            .map_err(|e| decode_err("status", e.to_string()))?;
        let payment_method = row
            .try_get::<String, _>("payment_method")?
            .parse::<PaymentMethod>()
            .map_err(|e| decode_err("payment_method", e.to_string()))?;
        Ok(Self {
            id: row.try_get("id")?,
            order_id: OrderId(row.try_get("order_id")?),
            customer_name: row.try_get("customer_name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            address_line1: row.try_get("address_line1")?,
            address_line2: row.try_get("address_line2")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            pincode: row.try_get("pincode")?,
            items,
            subtotal: row.try_get("subtotal")?,
            shipping_charge: row.try_get("shipping_charge")?,
            total: row.try_get("total")?,
            order_notes: row.try_get("order_notes")?,
            payment_method,
            status,
            razorpay_order_id: row.try_get("razorpay_order_id")?,
            razorpay_payment_id: row.try_get("razorpay_payment_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// An order submission that has passed (or is about to pass) validation, before it has been
/// assigned an id or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Rupees,
    pub shipping_charge: Option<Rupees>,
    pub total: Rupees,
    pub order_notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    pub fn initial_status(&self) -> OrderStatusType {
        self.payment_method.initial_status()
    }
}

//--------------------------------------  PaymentConfirmation  -------------------------------------------------------
/// An inbound payment notification. Ephemeral: constructed per request, verified, discarded.
///
/// `order_id` is present on the direct client-confirmation path and absent on the gateway's
/// redirect-callback path, which carries no local order reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

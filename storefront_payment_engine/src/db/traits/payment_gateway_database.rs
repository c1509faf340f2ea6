use chrono::{DateTime, Utc};

use crate::db_types::{NewOrder, Order, OrderId};

/// The behaviour a backend must provide to act as the order store for the payment gateway.
///
/// The store is the single source of truth for order status. Handlers never cache status across
/// requests; every operation here is a single-row read or write that the backend is expected to
/// apply atomically.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persists a validated order, assigning it a fresh public order id and the initial status
    /// derived from its payment method. Exactly one row is inserted per successful call.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, Self::Error>;

    /// Fetches an order by its public order id.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error>;

    /// Fetches the order that the given gateway order handle was attached to, if any. The lookup
    /// is not filtered by status, so a redelivered notification resolves to the already-`Paid`
    /// order rather than falling through to the pending-order heuristic.
    async fn fetch_order_by_gateway_order_id(&self, razorpay_order_id: &str) -> Result<Option<Order>, Self::Error>;

    /// Fetches the most recently created order in `Payment Pending` status. This backs the
    /// callback path's fallback heuristic when a notification carries no usable order reference.
    async fn fetch_latest_pending_order(&self) -> Result<Option<Order>, Self::Error>;

    /// Records the gateway-side order handle against a local pending order so later notifications
    /// can be bound to it. Returns `false` if no matching pending order exists.
    async fn attach_gateway_order(&self, order_id: &OrderId, razorpay_order_id: &str) -> Result<bool, Self::Error>;

    /// Sets the order's status to `Paid` and records the gateway payment id, refreshing
    /// `updated_at`. The update is an unconditional set: marking an already-`Paid` order paid
    /// again is a safe no-op, which is what makes concurrent callback/confirmation delivery safe.
    ///
    /// Returns the updated order, or `None` if no order with that id exists.
    async fn mark_order_paid(&self, order_id: &OrderId, razorpay_payment_id: &str)
        -> Result<Option<Order>, Self::Error>;

    /// Transitions every `Payment Pending` order created before the cutoff to `Expired` and
    /// returns them.
    async fn expire_pending_orders_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>, Self::Error>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

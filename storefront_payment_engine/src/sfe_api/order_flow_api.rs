use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, PaymentConfirmation},
    helpers::{validate_new_order, validate_payment_confirmation, verify_payment_signature},
    sfe_api::errors::OrderFlowError,
    PaymentGatewayDatabase,
};

/// `OrderFlowApi` is the primary API for the order lifecycle: intake of new orders, binding of
/// gateway order handles, verification and idempotent confirmation of payments, and expiry of
/// stale pending orders.
///
/// The gateway secret is passed in per call rather than held by the API, so the verification core
/// can be exercised with fake secrets in tests.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Validates and persists a new order submission.
    ///
    /// The order is written with status `COD` or `Payment Pending` according to its payment
    /// method. On validation failure, nothing is written and every offending field is reported.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        validate_new_order(&order).map_err(OrderFlowError::ValidationFailed)?;
        let order = self.db.insert_order(order).await.map_err(|e| OrderFlowError::DatabaseError(e.to_string()))?;
        info!("🔄️📦️ Order {} persisted with status {}", order.order_id, order.status);
        Ok(order)
    }

    /// Records the gateway-side order handle against the local order named by the receipt, so that
    /// later payment notifications can be bound to it unambiguously. Returns `false` when the
    /// receipt does not name a local pending order; callers treat that as advisory, not fatal.
    pub async fn attach_gateway_order(&self, receipt: &str, razorpay_order_id: &str) -> Result<bool, OrderFlowError> {
        let order_id = OrderId(receipt.to_string());
        let attached = self
            .db
            .attach_gateway_order(&order_id, razorpay_order_id)
            .await
            .map_err(|e| OrderFlowError::DatabaseError(e.to_string()))?;
        if attached {
            debug!("🔄️🔗️ Gateway order {razorpay_order_id} bound to local order {order_id}");
        } else {
            debug!("🔄️🔗️ Receipt '{receipt}' does not name a local pending order. Nothing bound.");
        }
        Ok(attached)
    }

    /// Verifies a payment confirmation and transitions the matching order to `Paid`.
    ///
    /// The signature check happens before any database access. A failed check makes no writes.
    /// The status update is an unconditional set, so re-delivering a confirmation for an order
    /// that is already `Paid` succeeds without further effect.
    ///
    /// When the confirmation carries no `order_id` (gateway callback path), the target order is
    /// resolved by the stored gateway order handle first, falling back to the most recently
    /// created pending order.
    pub async fn confirm_payment(
        &self,
        secret: &str,
        confirmation: &PaymentConfirmation,
    ) -> Result<Order, OrderFlowError> {
        validate_payment_confirmation(confirmation).map_err(OrderFlowError::ConfirmationInvalid)?;
        let verified = verify_payment_signature(
            &confirmation.razorpay_order_id,
            &confirmation.razorpay_payment_id,
            &confirmation.razorpay_signature,
            secret,
        );
        if !verified {
            warn!(
                "🔄️🚨️ Signature verification failed for payment {}. Possible forgery attempt.",
                confirmation.razorpay_payment_id
            );
            return Err(OrderFlowError::SignatureInvalid);
        }
        let (target, explicit) = match &confirmation.order_id {
            Some(order_id) => (order_id.clone(), true),
            None => (self.resolve_callback_target(&confirmation.razorpay_order_id).await?, false),
        };
        let updated = self
            .db
            .mark_order_paid(&target, &confirmation.razorpay_payment_id)
            .await
            .map_err(|e| OrderFlowError::DatabaseError(e.to_string()))?;
        let updated = match updated {
            Some(order) => order,
            // A resolved target can only go missing if the row changed under us.
            None if explicit => return Err(OrderFlowError::OrderNotFound(target)),
            None => return Err(OrderFlowError::UpdateFailed),
        };
        info!("🔄️✅️ Order {} is Paid (payment {})", updated.order_id, confirmation.razorpay_payment_id);
        Ok(updated)
    }

    /// Finds the order a gateway callback refers to. The callback body carries no local order id,
    /// so we prefer the order the gateway handle was bound to at initiation time. The
    /// most-recent-pending fallback only exists for orders initiated before a handle could be
    /// recorded; it is a heuristic, not a guarantee.
    async fn resolve_callback_target(&self, razorpay_order_id: &str) -> Result<OrderId, OrderFlowError> {
        let bound = self
            .db
            .fetch_order_by_gateway_order_id(razorpay_order_id)
            .await
            .map_err(|e| OrderFlowError::DatabaseError(e.to_string()))?;
        if let Some(order) = bound {
            trace!("🔄️🔗️ Callback for {razorpay_order_id} resolved via stored gateway handle to {}", order.order_id);
            return Ok(order.order_id);
        }
        let latest = self
            .db
            .fetch_latest_pending_order()
            .await
            .map_err(|e| OrderFlowError::DatabaseError(e.to_string()))?
            .ok_or(OrderFlowError::NoMatchingPendingOrder)?;
        warn!(
            "🔄️🔗️ Callback for {razorpay_order_id} has no bound order. Falling back to most recent pending order {}.",
            latest.order_id
        );
        Ok(latest.order_id)
    }

    /// Expires every `Payment Pending` order older than `max_age` and returns them. Run
    /// periodically so that abandoned checkouts reach a terminal state instead of pending forever.
    pub async fn expire_old_orders(&self, max_age: Duration) -> Result<Vec<Order>, OrderFlowError> {
        let cutoff = Utc::now() - max_age;
        self.db.expire_pending_orders_before(cutoff).await.map_err(|e| OrderFlowError::DatabaseError(e.to_string()))
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

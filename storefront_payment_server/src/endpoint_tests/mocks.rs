use chrono::{DateTime, Utc};
use mockall::mock;
use storefront_payment_engine::{
    db_types::{NewOrder, Order, OrderId},
    PaymentGatewayDatabase,
};

#[derive(Debug, thiserror::Error)]
#[error("mock database error: {0}")]
pub struct MockDbError(pub String);

mock! {
    pub OrderDb {}
    impl PaymentGatewayDatabase for OrderDb {
        type Error = MockDbError;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, MockDbError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, MockDbError>;
        async fn fetch_order_by_gateway_order_id(&self, razorpay_order_id: &str) -> Result<Option<Order>, MockDbError>;
        async fn fetch_latest_pending_order(&self) -> Result<Option<Order>, MockDbError>;
        async fn attach_gateway_order(&self, order_id: &OrderId, razorpay_order_id: &str) -> Result<bool, MockDbError>;
        async fn mark_order_paid(&self, order_id: &OrderId, razorpay_payment_id: &str) -> Result<Option<Order>, MockDbError>;
        async fn expire_pending_orders_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>, MockDbError>;
        async fn close(&mut self) -> Result<(), MockDbError>;
    }
}

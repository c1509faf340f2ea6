use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::{db_url, new_pool, orders, SqliteDatabaseError};
use crate::{
    db::traits::PaymentGatewayDatabase,
    db_types::{NewOrder, Order, OrderId},
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id TEXT NOT NULL UNIQUE,
        customer_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT,
        address_line1 TEXT NOT NULL,
        address_line2 TEXT,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        pincode TEXT NOT NULL,
        items TEXT NOT NULL,
        subtotal INTEGER NOT NULL,
        shipping_charge INTEGER,
        total INTEGER NOT NULL,
        order_notes TEXT,
        payment_method TEXT NOT NULL,
        status TEXT NOT NULL,
        razorpay_order_id TEXT,
        razorpay_payment_id TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    "#,
    "CREATE INDEX IF NOT EXISTS orders_status_created_idx ON orders (status, created_at);",
    "CREATE INDEX IF NOT EXISTS orders_gateway_order_idx ON orders (razorpay_order_id);",
];

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the url from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_order(&self, order: NewOrder) -> Result<Order, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_order_by_gateway_order_id(&self, razorpay_order_id: &str) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_gateway_order_id(razorpay_order_id, &mut conn).await
    }

    async fn fetch_latest_pending_order(&self) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_latest_pending_order(&mut conn).await
    }

    async fn attach_gateway_order(&self, order_id: &OrderId, razorpay_order_id: &str) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::attach_gateway_order(order_id, razorpay_order_id, &mut conn).await
    }

    async fn mark_order_paid(
        &self,
        order_id: &OrderId,
        razorpay_payment_id: &str,
    ) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_order_paid(order_id, razorpay_payment_id, &mut conn).await
    }

    async fn expire_pending_orders_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let expired = orders::expire_pending_orders_before(cutoff, &mut tx).await?;
        tx.commit().await?;
        if !expired.is_empty() {
            debug!("🗃️ {} stale pending orders expired", expired.len());
        }
        Ok(expired)
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.pool.close().await;
        Ok(())
    }
}

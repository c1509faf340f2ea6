use chrono::{DateTime, Utc};
use log::{debug, trace};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
};

const ORDER_COLUMNS: &str = "id, order_id, customer_name, phone, email, address_line1, address_line2, city, state, \
                             pincode, items, subtotal, shipping_charge, total, order_notes, payment_method, status, \
                             razorpay_order_id, razorpay_payment_id, created_at, updated_at";

/// Generates a fresh public order id. 12 alphanumeric characters gives a collision probability
/// that is negligible next to the UNIQUE constraint backing it up.
pub fn new_order_id() -> OrderId {
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(12).map(|b| (b as char).to_ascii_uppercase()).collect();
    OrderId(format!("ORD-{suffix}"))
}

/// Inserts a new order using the given connection. This is not atomic on its own. You can embed
/// this call inside a transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let order_id = new_order_id();
    let items = serde_json::to_string(&order.items).map_err(|e| SqliteDatabaseError::ItemEncodingError(e.to_string()))?;
    let status = order.initial_status().to_string();
    let payment_method = order.payment_method.to_string();
    sqlx::query(
        r#"
            INSERT INTO orders (
                order_id, customer_name, phone, email, address_line1, address_line2, city, state, pincode,
                items, subtotal, shipping_charge, total, order_notes, payment_method, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16);
        "#,
    )
    .bind(order_id.as_str())
    .bind(&order.customer_name)
    .bind(&order.phone)
    .bind(&order.email)
    .bind(&order.address_line1)
    .bind(&order.address_line2)
    .bind(&order.city)
    .bind(&order.state)
    .bind(&order.pincode)
    .bind(items)
    .bind(order.subtotal)
    .bind(order.shipping_charge)
    .bind(order.total)
    .bind(&order.order_notes)
    .bind(payment_method)
    .bind(status)
    .execute(&mut *conn)
    .await?;
    debug!("🗃️ Order {order_id} has been saved in the DB");
    fetch_order_by_order_id(&order_id, conn)
        .await?
        .ok_or_else(|| SqliteDatabaseError::InsertReadbackError(order_id.to_string()))
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 LIMIT 1;");
    let order = sqlx::query_as::<_, Order>(&q).bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_gateway_order_id(
    razorpay_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE razorpay_order_id = $1 ORDER BY id DESC LIMIT 1;");
    let order = sqlx::query_as::<_, Order>(&q).bind(razorpay_order_id).fetch_optional(conn).await?;
    Ok(order)
}

/// The most recently created order still awaiting payment. Backs the callback path's fallback
/// heuristic when the notification cannot be bound to a specific order.
pub async fn fetch_latest_pending_order(conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY created_at DESC, id DESC LIMIT 1;"
    );
    let order = sqlx::query_as::<_, Order>(&q)
        .bind(OrderStatusType::PaymentPending.to_string())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Records the gateway order handle against a local pending order. Only pending orders can be
/// (re)bound; returns `false` when nothing matched.
pub async fn attach_gateway_order(
    order_id: &OrderId,
    razorpay_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let res = sqlx::query(
        "UPDATE orders SET razorpay_order_id = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = $3",
    )
    .bind(razorpay_order_id)
    .bind(order_id.as_str())
    .bind(OrderStatusType::PaymentPending.to_string())
    .execute(conn)
    .await?;
    trace!("🗃️ Gateway order {razorpay_order_id} attached to {order_id}: {}", res.rows_affected() > 0);
    Ok(res.rows_affected() > 0)
}

/// Marks an order as paid. The update is an unconditional set so that re-delivery of the same
/// payment notification is a no-op rather than an error.
pub async fn mark_order_paid(
    order_id: &OrderId,
    razorpay_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let res = sqlx::query(
        "UPDATE orders SET status = $1, razorpay_payment_id = $2, updated_at = CURRENT_TIMESTAMP WHERE order_id = $3",
    )
    .bind(OrderStatusType::Paid.to_string())
    .bind(razorpay_payment_id)
    .bind(order_id.as_str())
    .execute(&mut *conn)
    .await?;
    if res.rows_affected() == 0 {
        return Ok(None);
    }
    debug!("🗃️ Order {order_id} marked as Paid");
    fetch_order_by_order_id(order_id, conn).await
}

/// Fetches the pending orders created before the cutoff and flips them to `Expired`. Call inside
/// a transaction so the select and update see the same rows.
pub async fn expire_pending_orders_before(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    // CURRENT_TIMESTAMP stores "YYYY-MM-DD HH:MM:SS", so the cutoff must be bound in the same
    // format for the comparison to be meaningful.
    let cutoff = cutoff.format("%Y-%m-%d %H:%M:%S").to_string();
    let q = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 AND created_at < $2;");
    let mut stale = sqlx::query_as::<_, Order>(&q)
        .bind(OrderStatusType::PaymentPending.to_string())
        .bind(&cutoff)
        .fetch_all(&mut *conn)
        .await?;
    if stale.is_empty() {
        return Ok(stale);
    }
    sqlx::query("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE status = $2 AND created_at < $3")
        .bind(OrderStatusType::Expired.to_string())
        .bind(OrderStatusType::PaymentPending.to_string())
        .bind(&cutoff)
        .execute(conn)
        .await?;
    for order in &mut stale {
        order.status = OrderStatusType::Expired;
    }
    Ok(stale)
}

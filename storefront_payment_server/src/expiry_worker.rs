use chrono::Duration;
use log::*;
use storefront_payment_engine::{db_types::Order, OrderFlowApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Orders that stay in `Payment Pending` past the configured timeout are swept to `Expired` so
/// that abandoned checkouts reach a terminal state.
pub fn start_expiry_worker(db: SqliteDatabase, unpaid_expiry: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        let api = OrderFlowApi::new(db);
        info!("🕰️ Stale order expiry worker started");
        loop {
            timer.tick().await;
            match api.expire_old_orders(unpaid_expiry).await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No stale pending orders"),
                Ok(expired) => {
                    info!("🕰️ {} stale pending orders expired", expired.len());
                    debug!("🕰️ Expired orders: {}", order_list(&expired));
                },
                Err(e) => error!("🕰️ Error running order expiry job: {e}"),
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders.iter().map(|o| format!("[{}] {}", o.id, o.order_id)).collect::<Vec<String>>().join(", ")
}

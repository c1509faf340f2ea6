use std::time::Duration;

use actix_web::{
    dev::{Server, Service},
    http::{
        header::{self, HeaderValue},
        KeepAlive,
    },
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use razorpay_tools::RazorpayApi;
use storefront_payment_engine::{OrderFlowApi, SqliteDatabase};

use crate::{
    config::{ServerConfig, VerifierConfig},
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    routes::{
        cors_preflight,
        health,
        CreateOrderRoute,
        CreateRazorpayOrderRoute,
        RazorpayCallbackRoute,
        VerifyRazorpayPaymentRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    start_expiry_worker(db.clone(), config.unpaid_order_timeout);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Inserts the CORS response headers. Every response goes through this, including error bodies
/// and the preflight fallback, so the browser never sees an unheadered response.
pub fn insert_cors_headers(headers: &mut header::HeaderMap, origin: &HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let razorpay =
        RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let verifier = VerifierConfig::from_config(&config);
    // The origin is validated here, once, so the per-response header insertion cannot fail.
    let allowed_origin = config
        .cors_allowed_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
        .unwrap_or_else(|| HeaderValue::from_static("*"));
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let origin = allowed_origin.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .wrap_fn(move |req, srv| {
                let origin = origin.clone();
                let fut = srv.call(req);
                async move {
                    let mut res = fut.await?;
                    insert_cors_headers(res.headers_mut(), &origin);
                    Ok(res)
                }
            })
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(razorpay.clone()))
            .app_data(web::Data::new(verifier.clone()))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(CreateRazorpayOrderRoute::<SqliteDatabase>::new())
            .service(RazorpayCallbackRoute::<SqliteDatabase>::new())
            .service(VerifyRazorpayPaymentRoute::<SqliteDatabase>::new())
            .default_service(web::route().to(cors_preflight))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

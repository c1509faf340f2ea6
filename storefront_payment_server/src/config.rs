use std::env;

use chrono::Duration;
use log::*;
use razorpay_tools::RazorpayConfig;
use spg_common::Secret;

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_UNPAID_ORDER_TIMEOUT: Duration = Duration::hours(48);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The storefront base URL. The gateway callback redirects here with the payment result.
    pub frontend_url: String,
    /// The origin reflected in CORS headers. When unset, `*` is used.
    pub cors_allowed_origin: Option<String>,
    /// The time before an unpaid order is considered expired and marked as such.
    pub unpaid_order_timeout: Duration,
    /// Payment gateway credentials and endpoint.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            cors_allowed_origin: None,
            unpaid_order_timeout: DEFAULT_UNPAID_ORDER_TIMEOUT,
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}, instead.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let frontend_url = env::var("SPG_FRONTEND_URL").ok().unwrap_or_else(|| {
            warn!(
                "🪛️ SPG_FRONTEND_URL is not set. Payment callbacks will redirect to the default, \
                 {DEFAULT_FRONTEND_URL}, instead."
            );
            DEFAULT_FRONTEND_URL.to_string()
        });
        let cors_allowed_origin = env::var("SPG_CORS_ALLOWED_ORIGIN").ok();
        match &cors_allowed_origin {
            Some(origin) => info!("🪛️ CORS requests are allowed from {origin}"),
            None => info!("🪛️ SPG_CORS_ALLOWED_ORIGIN is not set. CORS headers will allow any origin (*)."),
        }
        let unpaid_order_timeout = configure_order_timeout();
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self { host, port, database_url, frontend_url, cors_allowed_origin, unpaid_order_timeout, razorpay }
    }
}

fn configure_order_timeout() -> Duration {
    env::var("SPG_UNPAID_ORDER_TIMEOUT")
        .map_err(|_| {
            info!(
                "🪛️ SPG_UNPAID_ORDER_TIMEOUT is not set. Using the default value of {} hrs.",
                DEFAULT_UNPAID_ORDER_TIMEOUT.num_hours()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::hours)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SPG_UNPAID_ORDER_TIMEOUT. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_UNPAID_ORDER_TIMEOUT)
}

//-------------------------------------------------  VerifierConfig  --------------------------------------------------
/// The slice of the configuration the payment-verification handlers need: the secret used to check
/// notification signatures, and the storefront URL the callback redirects to. It is injected into
/// handlers as app data; nothing in the request path consults the environment, which keeps the
/// verification core testable with fake secrets.
#[derive(Clone, Debug)]
pub struct VerifierConfig {
    pub gateway_secret: Secret<String>,
    pub frontend_url: String,
}

impl VerifierConfig {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { gateway_secret: config.razorpay.key_secret.clone(), frontend_url: config.frontend_url.clone() }
    }
}

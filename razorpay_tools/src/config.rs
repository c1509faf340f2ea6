use log::*;
use spg_common::Secret;

const DEFAULT_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    /// The public key identifier. This value is shared with clients so that they can open the
    /// gateway's hosted checkout.
    pub key_id: String,
    /// The API secret. Used for Basic auth on the orders API and for verifying payment signatures.
    /// Never included in any response.
    pub key_secret: Secret<String>,
    pub api_url: String,
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("SPG_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            error!("🔑️ SPG_RAZORPAY_KEY_ID is not set. Gateway order creation will fail until it is.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("SPG_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            error!("🔑️ SPG_RAZORPAY_KEY_SECRET is not set. Payment verification will fail until it is.");
            String::default()
        }));
        let api_url = std::env::var("SPG_RAZORPAY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self { key_id, key_secret, api_url }
    }

    /// True when both halves of the credential pair are present.
    pub fn is_configured(&self) -> bool {
        !self.key_id.is_empty() && !self.key_secret.reveal().is_empty()
    }
}

use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

use crate::{config::RazorpayConfig, data_objects::RazorpayOrder, RazorpayApiError, RazorpayOrderRequest};

/// The outbound call is bounded so that a stalled gateway cannot hold a client request open
/// indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates an order on the gateway. The gateway holds the authoritative payment state; the
    /// returned object carries the `order_...` identifier that later payment notifications refer
    /// back to.
    pub async fn create_order(&self, request: RazorpayOrderRequest) -> Result<RazorpayOrder, RazorpayApiError> {
        if !self.config.is_configured() {
            return Err(RazorpayApiError::MissingCredentials);
        }
        let url = self.url("/orders");
        trace!("🛒️ Creating gateway order of {} paise against {url}", request.amount);
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()))
            .json(&request)
            .send()
            .await
            .map_err(|e| RazorpayApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🛒️ Gateway order created. {}", response.status());
            response.json::<RazorpayOrder>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::RequestError(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }
}

//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database operations, the
//! outbound gateway call) is expressed as a future so worker threads keep handling other requests while it is pending.

use actix_web::{get, http::header, web, HttpRequest, HttpResponse, Responder};
use log::*;
use razorpay_tools::{RazorpayApi, RazorpayApiError, RazorpayOrderRequest};
use serde_json::json;
use spg_common::INR_CURRENCY_CODE;
use storefront_payment_engine::{
    helpers::validate_gateway_order_request,
    OrderFlowError,
    OrderFlowApi,
    PaymentGatewayDatabase,
};

use crate::{
    config::VerifierConfig,
    data_objects::{CallbackParams, GatewayOrderRequest, GatewayOrderResponse, OrderSubmission, VerifyRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Order intake  ----------------------------------------------------
route!(create_order => Post "/create-order" impl PaymentGatewayDatabase);
/// Route handler for order submissions from the storefront.
///
/// Validation failures return the full list of offending fields so the storefront can attach
/// messages to its form fields. On success, only the freshly assigned public order id is returned.
pub async fn create_order<B: PaymentGatewayDatabase>(
    body: web::Json<OrderSubmission>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received new order submission");
    let new_order = body.into_inner().order_data.try_into_new_order().map_err(ServerError::ValidationFailed)?;
    match api.process_new_order(new_order).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({ "orderId": order.order_id.as_str() }))),
        Err(OrderFlowError::ValidationFailed(details)) => Err(ServerError::ValidationFailed(details)),
        Err(e) => {
            warn!("💻️ Could not save incoming order. {e}");
            Err(ServerError::OrderStoreError("The order could not be saved".to_string()))
        },
    }
}

//----------------------------------------------   Gateway order  ----------------------------------------------------
route!(create_razorpay_order => Post "/create-razorpay-order" impl PaymentGatewayDatabase);
/// Route handler for gateway order initiation.
///
/// The rupee amount is converted to paise and sent to the gateway's orders API. The response is
/// the gateway order plus the public `key_id`; the API secret stays server-side. When the receipt
/// names a known local pending order, the gateway order id is recorded against it so that the
/// later callback can be bound to the right order.
pub async fn create_razorpay_order<B: PaymentGatewayDatabase>(
    body: web::Json<GatewayOrderRequest>,
    gateway: web::Data<RazorpayApi>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let currency = request.currency.unwrap_or_else(|| INR_CURRENCY_CODE.to_string());
    let receipt = request.receipt.unwrap_or_default();
    let notes = request.notes.unwrap_or_default();
    let amount = validate_gateway_order_request(request.amount.unwrap_or_default(), &currency, &receipt, &notes)
        .map_err(ServerError::ValidationFailed)?;
    debug!("💳️ Creating gateway order of {amount} for receipt {receipt}");
    let order_request = RazorpayOrderRequest::new(amount, &currency, &receipt).with_notes(notes);
    let order = match gateway.create_order(order_request).await {
        Ok(order) => order,
        Err(RazorpayApiError::MissingCredentials) => {
            error!("💳️ Gateway order creation failed: credentials are not configured.");
            return Err(ServerError::GatewayNotConfigured);
        },
        Err(e) => {
            error!("💳️ Gateway order creation failed. {e}");
            return Err(ServerError::GatewayError);
        },
    };
    if let Err(e) = api.attach_gateway_order(&receipt, &order.id).await {
        // Binding is advisory. The callback can still fall back to its pending-order heuristic.
        warn!("💳️ Could not record gateway order {} against receipt {receipt}. {e}", order.id);
    }
    let key_id = gateway.key_id().to_string();
    Ok(HttpResponse::Ok().json(GatewayOrderResponse { order, key_id }))
}

//----------------------------------------------   Gateway callback  --------------------------------------------------
route!(razorpay_callback => Post "/razorpay-callback" impl PaymentGatewayDatabase);
/// Route handler for the gateway's redirect callback.
///
/// The user's browser lands here after the hosted payment page completes, so this handler never
/// answers with JSON. Every outcome is a 302 back to the storefront carrying `payment_status` and
/// either the order id or a coarse failure reason. Diagnostic detail goes to the log only.
pub async fn razorpay_callback<B: PaymentGatewayDatabase>(
    form: web::Form<CallbackParams>,
    api: web::Data<OrderFlowApi<B>>,
    config: web::Data<VerifierConfig>,
) -> HttpResponse {
    trace!("💳️ Received payment callback from the gateway");
    let Some(confirmation) = form.into_inner().into_confirmation() else {
        warn!("💳️ Payment callback was missing one or more required fields.");
        return redirect_failure(&config.frontend_url, "missing_fields");
    };
    if config.gateway_secret.reveal().is_empty() {
        error!("💳️ Cannot verify payment callback: the gateway secret is not configured.");
        return redirect_failure(&config.frontend_url, "config_error");
    }
    match api.confirm_payment(config.gateway_secret.reveal(), &confirmation).await {
        Ok(order) => {
            info!("💳️ Payment callback verified for order {}", order.order_id);
            redirect_success(&config.frontend_url, order.order_id.as_str())
        },
        Err(e) => {
            warn!("💳️ Payment callback rejected. {e}");
            redirect_failure(&config.frontend_url, callback_failure_reason(&e))
        },
    }
}

fn callback_failure_reason(e: &OrderFlowError) -> &'static str {
    match e {
        OrderFlowError::ConfirmationInvalid(_) => "missing_fields",
        OrderFlowError::SignatureInvalid => "signature_invalid",
        OrderFlowError::OrderNotFound(_) | OrderFlowError::NoMatchingPendingOrder => "order_not_found",
        OrderFlowError::UpdateFailed => "update_failed",
        OrderFlowError::ValidationFailed(_) | OrderFlowError::DatabaseError(_) => "server_error",
    }
}

fn redirect_success(frontend_url: &str, order_id: &str) -> HttpResponse {
    let location = format!("{frontend_url}/payment-result?payment_status=success&orderId={order_id}");
    HttpResponse::Found().insert_header((header::LOCATION, location)).finish()
}

fn redirect_failure(frontend_url: &str, reason: &str) -> HttpResponse {
    let location = format!("{frontend_url}/payment-result?payment_status=failed&reason={reason}");
    HttpResponse::Found().insert_header((header::LOCATION, location)).finish()
}

//----------------------------------------------   Direct verification  -----------------------------------------------
route!(verify_razorpay_payment => Post "/verify-razorpay-payment" impl PaymentGatewayDatabase);
/// Route handler for client-submitted payment confirmations.
///
/// The client names the local order explicitly, so no resolution heuristic is involved. A failed
/// signature check is reported generically; nothing in the response says *why* the signature did
/// not match.
pub async fn verify_razorpay_payment<B: PaymentGatewayDatabase>(
    body: web::Json<VerifyRequest>,
    api: web::Data<OrderFlowApi<B>>,
    config: web::Data<VerifierConfig>,
) -> HttpResponse {
    trace!("💳️ Received payment verification request");
    let confirmation = match body.into_inner().into_confirmation() {
        Ok(confirmation) => confirmation,
        Err(details) => {
            return HttpResponse::BadRequest().json(json!({ "status": "validation_failed", "details": details }))
        },
    };
    if config.gateway_secret.reveal().is_empty() {
        error!("💳️ Cannot verify payment: the gateway secret is not configured.");
        return HttpResponse::InternalServerError()
            .json(json!({ "status": "error", "message": "Server configuration error" }));
    }
    match api.confirm_payment(config.gateway_secret.reveal(), &confirmation).await {
        Ok(order) => {
            info!("💳️ Payment {} verified for order {}", confirmation.razorpay_payment_id, order.order_id);
            HttpResponse::Ok().json(json!({ "status": "ok", "payment_id": confirmation.razorpay_payment_id }))
        },
        Err(OrderFlowError::ConfirmationInvalid(details)) => {
            HttpResponse::BadRequest().json(json!({ "status": "validation_failed", "details": details }))
        },
        Err(OrderFlowError::SignatureInvalid) => {
            HttpResponse::BadRequest().json(json!({ "status": "verification_failed" }))
        },
        Err(e @ (OrderFlowError::OrderNotFound(_) | OrderFlowError::UpdateFailed)) => {
            warn!("💳️ Verified payment could not be applied. {e}");
            HttpResponse::InternalServerError()
                .json(json!({ "status": "error", "message": "The order could not be updated" }))
        },
        Err(e) => {
            error!("💳️ Unexpected error while verifying payment. {e}");
            HttpResponse::InternalServerError().json(json!({ "status": "error", "message": "Internal server error" }))
        },
    }
}

//----------------------------------------------   CORS preflight  ----------------------------------------------------
/// Fallback handler. The named routes only answer `POST`, so `OPTIONS` preflight requests land
/// here and are answered with an empty 204; the CORS middleware adds the headers on the way out.
pub async fn cors_preflight(req: HttpRequest) -> HttpResponse {
    if req.method() == actix_web::http::Method::OPTIONS {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().finish()
    }
}

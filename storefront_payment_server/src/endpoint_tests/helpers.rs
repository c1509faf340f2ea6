use actix_web::{
    body::MessageBody,
    dev::Service,
    http::{
        header::{self, HeaderValue},
        StatusCode,
    },
    test::{self, TestRequest},
    web,
    App,
};
use chrono::Utc;
use razorpay_tools::{RazorpayApi, RazorpayConfig};
use serde::Serialize;
use spg_common::{Rupees, Secret};
use storefront_payment_engine::{
    db_types::{Order, OrderId, OrderItem, OrderStatusType, PaymentMethod},
    OrderFlowApi,
};

use crate::{
    config::VerifierConfig,
    endpoint_tests::mocks::MockOrderDb,
    routes::{
        cors_preflight,
        CreateOrderRoute,
        CreateRazorpayOrderRoute,
        RazorpayCallbackRoute,
        VerifyRazorpayPaymentRoute,
    },
    server::insert_cors_headers,
};

// Signing secret for test payment notifications. DO NOT re-use anywhere.
pub const TEST_SECRET: &str = "spg-endpoint-test-secret";
pub const TEST_FRONTEND_URL: &str = "https://shop.example.com";
pub const TEST_ORDER_ID: &str = "ORD-TEST123456";

pub fn verifier_config() -> VerifierConfig {
    VerifierConfig { gateway_secret: Secret::new(TEST_SECRET.to_string()), frontend_url: TEST_FRONTEND_URL.to_string() }
}

/// Gateway credentials pointing at an unroutable address, so a test that unexpectedly reaches for
/// the network fails fast instead of talking to the real gateway.
pub fn test_gateway_config() -> RazorpayConfig {
    RazorpayConfig {
        key_id: "rzp_test_key".to_string(),
        key_secret: Secret::new(TEST_SECRET.to_string()),
        api_url: "http://127.0.0.1:1".to_string(),
    }
}

pub fn sample_order(status: OrderStatusType) -> Order {
    let now = Utc::now();
    Order {
        id: 1,
        order_id: OrderId(TEST_ORDER_ID.to_string()),
        customer_name: "Anita Rao".to_string(),
        phone: "9876543210".to_string(),
        email: None,
        address_line1: "14 MG Road".to_string(),
        address_line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
        items: vec![OrderItem {
            product_id: "banana-powder".to_string(),
            product_name: "Banana Powder".to_string(),
            variant: "250g".to_string(),
            price: Rupees::from_whole_rupees(150),
            quantity: 2,
            image: None,
        }],
        subtotal: Rupees::from_whole_rupees(300),
        shipping_charge: None,
        total: Rupees::from_whole_rupees(300),
        order_notes: None,
        payment_method: PaymentMethod::Razorpay,
        status,
        razorpay_order_id: None,
        razorpay_payment_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub headers: header::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Builds the app with the same CORS middleware and preflight fallback as
/// `create_server_instance`, so the test requests see the headers a browser would.
pub async fn send_request(db: MockOrderDb, gateway: RazorpayConfig, req: TestRequest) -> TestResponse {
    let allowed_origin = HeaderValue::from_static(TEST_FRONTEND_URL);
    let app = App::new()
        .wrap_fn(move |req, srv| {
            let origin = allowed_origin.clone();
            let fut = srv.call(req);
            async move {
                let mut res = fut.await?;
                insert_cors_headers(res.headers_mut(), &origin);
                Ok(res)
            }
        })
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(RazorpayApi::new(gateway).expect("could not build gateway client")))
        .app_data(web::Data::new(verifier_config()))
        .service(CreateOrderRoute::<MockOrderDb>::new())
        .service(CreateRazorpayOrderRoute::<MockOrderDb>::new())
        .service(RazorpayCallbackRoute::<MockOrderDb>::new())
        .service(VerifyRazorpayPaymentRoute::<MockOrderDb>::new())
        .default_service(web::route().to(cors_preflight));
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let location = res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).map(String::from);
    let headers = res.headers().clone();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    TestResponse { status, location, headers, body }
}

pub async fn post_json(db: MockOrderDb, path: &str, body: serde_json::Value) -> TestResponse {
    send_request(db, test_gateway_config(), TestRequest::post().uri(path).set_json(body)).await
}

pub async fn post_form<T: Serialize>(db: MockOrderDb, path: &str, form: &T) -> TestResponse {
    send_request(db, test_gateway_config(), TestRequest::post().uri(path).set_form(form)).await
}

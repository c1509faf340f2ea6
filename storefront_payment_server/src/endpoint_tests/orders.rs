use actix_web::{
    http::{header, Method, StatusCode},
    test::TestRequest,
};
use serde_json::json;
use spg_common::Rupees;
use storefront_payment_engine::db_types::{OrderStatusType, PaymentMethod};

use crate::endpoint_tests::{
    helpers::{post_json, sample_order, send_request, test_gateway_config, TEST_FRONTEND_URL, TEST_ORDER_ID},
    mocks::{MockDbError, MockOrderDb},
};

fn order_payload() -> serde_json::Value {
    json!({
        "orderData": {
            "customer_name": "Anita Rao",
            "phone": "9876543210",
            "address_line1": "14 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001",
            "items": [{
                "product_id": "banana-powder",
                "product_name": "Banana Powder",
                "variant": "250g",
                "price": 150.0,
                "quantity": 2
            }],
            "subtotal": 300.0,
            "total": 300.0,
            "payment_method": "COD"
        }
    })
}

#[actix_web::test]
async fn valid_order_is_persisted_and_id_returned() {
    let mut db = MockOrderDb::new();
    db.expect_insert_order()
        .withf(|order| {
            order.payment_method == PaymentMethod::Cod
                && order.total == Rupees::from_whole_rupees(300)
                && order.items.len() == 1
                && order.items[0].price == Rupees::from_whole_rupees(150)
        })
        .returning(|_| Ok(sample_order(OrderStatusType::Cod)));
    let res = post_json(db, "/create-order", order_payload()).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("\"orderId\""));
    assert!(res.body.contains(TEST_ORDER_ID));
}

#[actix_web::test]
async fn invalid_phone_is_rejected_without_a_write() {
    // No expectations on the mock: any database call panics the test.
    let db = MockOrderDb::new();
    let mut payload = order_payload();
    payload["orderData"]["phone"] = json!("12345");
    let res = post_json(db, "/create-order", payload).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Validation failed"));
    assert!(res.body.contains("phone"));
}

#[actix_web::test]
async fn excessive_quantity_is_rejected() {
    let db = MockOrderDb::new();
    let mut payload = order_payload();
    payload["orderData"]["items"][0]["quantity"] = json!(101);
    let res = post_json(db, "/create-order", payload).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("items[0].quantity"));
}

#[actix_web::test]
async fn unknown_payment_method_is_rejected() {
    let db = MockOrderDb::new();
    let mut payload = order_payload();
    payload["orderData"]["payment_method"] = json!("UPI");
    let res = post_json(db, "/create-order", payload).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("payment_method"));
}

#[actix_web::test]
async fn preflight_gets_no_content_with_cors_headers() {
    let endpoints = ["/create-order", "/create-razorpay-order", "/razorpay-callback", "/verify-razorpay-payment"];
    for path in endpoints {
        let db = MockOrderDb::new();
        let req = TestRequest::default().method(Method::OPTIONS).uri(path);
        let res = send_request(db, test_gateway_config(), req).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT, "OPTIONS {path}");
        assert_eq!(res.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), Some(TEST_FRONTEND_URL), "OPTIONS {path}");
        assert_eq!(res.header(header::ACCESS_CONTROL_ALLOW_METHODS), Some("POST, OPTIONS"), "OPTIONS {path}");
        assert_eq!(res.header(header::ACCESS_CONTROL_ALLOW_HEADERS), Some("Content-Type"), "OPTIONS {path}");
    }
}

#[actix_web::test]
async fn handler_responses_carry_the_allowed_origin() {
    let mut db = MockOrderDb::new();
    db.expect_insert_order().returning(|_| Ok(sample_order(OrderStatusType::Cod)));
    let res = post_json(db, "/create-order", order_payload()).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), Some(TEST_FRONTEND_URL));

    // Error responses go through the same middleware.
    let db = MockOrderDb::new();
    let mut payload = order_payload();
    payload["orderData"]["phone"] = json!("12345");
    let res = post_json(db, "/create-order", payload).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), Some(TEST_FRONTEND_URL));
}

#[actix_web::test]
async fn store_failure_is_reported() {
    let mut db = MockOrderDb::new();
    db.expect_insert_order().returning(|_| Err(MockDbError("disk full".to_string())));
    let res = post_json(db, "/create-order", order_payload()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("error"));
    // Backend detail stays in the log.
    assert!(!res.body.contains("disk full"));
}

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use sps_common::Money;
use storefront_payment_engine::{
    db_types::{OrderStatus, PaymentMethod, PaymentStatus},
    traits::CheckoutError,
    OrderFlowApi, OrdersApi, PricingPolicy,
};

use super::{
    helpers::{get_request, post_request, put_request, sample_cart, sample_order, test_gateway},
    mocks::MockCheckoutManager,
};
use crate::routes::{OrderByIdRoute, OrdersForUserRoute, PlaceOrderRoute, UpdateOrderStatusRoute};

fn pricing() -> PricingPolicy {
    PricingPolicy { tax_percent: 5.0, delivery_charge: Money::from_units(5) }
}

#[actix_web::test]
async fn list_orders_for_a_customer() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/user/alice@example.com", configure_listing).await;
    assert_eq!(status, StatusCode::OK);
    let orders: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["payment_status"], "PENDING");
    assert_eq!(orders[0]["grand_total"], 21_500);
}

#[actix_web::test]
async fn missing_orders_are_a_404_with_a_stable_kind() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/ord-does-not-exist", configure_listing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "order_not_found");
}

fn configure_listing(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fetch_orders_for_customer().returning(|_| {
        Ok(vec![sample_order(PaymentMethod::CashOnDelivery, PaymentStatus::Pending, OrderStatus::Confirmed)])
    });
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let api = OrdersApi::new(db);
    cfg.service(OrdersForUserRoute::<MockCheckoutManager>::new())
        .service(OrderByIdRoute::<MockCheckoutManager>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn checkout_with_a_cash_cart_succeeds() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders/from-cart", checkout_body("CASH_ON_DELIVERY"), configure_cash).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["order"]["order_status"], "CONFIRMED");
    assert!(response.get("payment").is_none());
}

fn configure_cash(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fetch_cart().returning(|_| Ok(sample_cart()));
    db.expect_create_cash_order().returning(|_| {
        Ok(sample_order(PaymentMethod::CashOnDelivery, PaymentStatus::Pending, OrderStatus::Confirmed))
    });
    let api = OrderFlowApi::new(db, test_gateway());
    cfg.service(PlaceOrderRoute::<MockCheckoutManager>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(pricing()));
}

#[actix_web::test]
async fn insufficient_stock_reports_the_available_count() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders/from-cart", checkout_body("CASH_ON_DELIVERY"), configure_out_of_stock).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "insufficient_stock");
    assert_eq!(error["requested"], 2);
    assert_eq!(error["available"], 1);
}

fn configure_out_of_stock(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fetch_cart().returning(|_| Ok(sample_cart()));
    db.expect_create_cash_order()
        .returning(|_| Err(CheckoutError::InsufficientStock { product_id: 1, requested: 2, available: 1 }));
    let api = OrderFlowApi::new(db, test_gateway());
    cfg.service(PlaceOrderRoute::<MockCheckoutManager>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(pricing()));
}

#[actix_web::test]
async fn checkout_with_an_empty_cart_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders/from-cart", checkout_body("GATEWAY"), configure_empty_cart).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "empty_cart");
}

fn configure_empty_cart(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fetch_cart()
        .returning(|owner| Ok(storefront_payment_engine::db_types::Cart::empty(owner)));
    let api = OrderFlowApi::new(db, test_gateway());
    cfg.service(PlaceOrderRoute::<MockCheckoutManager>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(pricing()));
}

#[actix_web::test]
async fn invalid_status_transitions_are_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        put_request("/orders/ord-240612-0000cafe/status", json!({ "status": "PENDING" }), configure_transition).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "invalid_status_transition");
}

#[actix_web::test]
async fn delivering_an_order_succeeds() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        put_request("/orders/ord-240612-0000cafe/status", json!({ "status": "DELIVERED" }), configure_transition)
            .await;
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["order_status"], "DELIVERED");
    assert_eq!(order["payment_status"], "PAID");
}

fn configure_transition(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_set_order_status().returning(|_, new_status| match new_status {
        OrderStatus::Delivered => {
            Ok(sample_order(PaymentMethod::CashOnDelivery, PaymentStatus::Paid, OrderStatus::Delivered))
        },
        other => Err(CheckoutError::InvalidStatusTransition { from: OrderStatus::Confirmed, to: other }),
    });
    let api = OrderFlowApi::new(db, test_gateway());
    cfg.service(UpdateOrderStatusRoute::<MockCheckoutManager>::new()).app_data(web::Data::new(api));
}

fn checkout_body(method: &str) -> serde_json::Value {
    json!({
        "customer_key": "alice@example.com",
        "customer_name": "Alice",
        "address": {
            "recipient": "Alice",
            "phone": "555-0100",
            "street": "12 Long Road",
            "city": "Springfield",
            "postal_code": null
        },
        "payment_method": method
    })
}

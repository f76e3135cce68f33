use std::time::Duration;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use sps_common::{Money, Secret};
use storefront_payment_engine::{
    db_types::{Address, Cart, CartItem, Order, OrderId, OrderStatus, PaymentMethod, PaymentStatus, TransactionId},
    gateway::{GatewayClient, GatewayConfig},
};

pub const TEST_SIGNING_SECRET: &str = "endpoint-test-secret";

/// A gateway client whose status endpoint is unreachable, so callback flows exercise the trust-the-signed-callback
/// fallback. DO NOT re-use this secret anywhere.
pub fn test_gateway() -> GatewayClient {
    GatewayClient::new(GatewayConfig {
        product_code: "STOREFRONT".to_string(),
        secret_key: Secret::new(TEST_SIGNING_SECRET.to_string()),
        base_url: "http://127.0.0.1:9".to_string(),
        success_url: "http://localhost/orders/gateway/success".to_string(),
        failure_url: "http://localhost/orders/gateway/failure".to_string(),
        poll_timeout: Duration::from_millis(250),
    })
    .expect("gateway client")
}

pub fn sample_order(
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    order_status: OrderStatus,
) -> Order {
    Order {
        id: 1,
        order_id: OrderId("ord-240612-0000cafe".into()),
        customer_key: "alice@example.com".into(),
        customer_name: "Alice".into(),
        address: Address {
            recipient: "Alice".into(),
            phone: "555-0100".into(),
            street: "12 Long Road".into(),
            city: "Springfield".into(),
            postal_code: None,
        },
        payment_method,
        payment_status,
        order_status,
        items_subtotal: Money::from_units(200),
        tax: Money::from_units(10),
        delivery_charge: Money::from_units(5),
        grand_total: Money::from_units(215),
        transaction_id: matches!(payment_method, PaymentMethod::Gateway)
            .then(|| TransactionId("txn-240612-0000cafe".into())),
        gateway_transaction_code: None,
        gateway_ref_id: None,
        gateway_signature: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        items: Vec::new(),
    }
}

pub fn sample_cart() -> Cart {
    Cart {
        owner_key: "alice@example.com".into(),
        items: vec![CartItem {
            product_id: 1,
            quantity: 2,
            unit_price: Money::from_units(100),
            name: "Mechanical keyboard".into(),
            image_url: None,
        }],
        updated_at: Utc::now(),
    }
}

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    send(TestRequest::get().uri(path).to_request(), configure).await
}

pub async fn post_request(
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send(TestRequest::post().uri(path).set_json(body).to_request(), configure).await
}

pub async fn put_request(
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send(TestRequest::put().uri(path).set_json(body).to_request(), configure).await
}

async fn send(req: actix_http::Request, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

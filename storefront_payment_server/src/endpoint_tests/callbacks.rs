use actix_web::{http::StatusCode, web, web::ServiceConfig};
use sps_common::Money;
use storefront_payment_engine::{
    db_types::{OrderStatus, PaymentMethod, PaymentStatus, TransactionId},
    gateway::{build_payment_request, CallbackPayload, SIGNED_FIELD_ORDER},
    traits::Settlement,
    OrderFlowApi,
};

use super::{
    helpers::{get_request, sample_order, test_gateway},
    mocks::MockCheckoutManager,
};
use crate::routes::{gateway_failure, gateway_success};

/// A callback whose signature was genuinely produced with the test signing secret.
fn signed_callback(status: &str) -> CallbackPayload {
    let config = test_gateway().config().clone();
    let request = build_payment_request(
        &config,
        Money::from_units(200),
        Money::from_units(10),
        Money::from_units(5),
        &TransactionId("txn-240612-0000cafe".into()),
    );
    CallbackPayload {
        transaction_code: "000ABC".to_string(),
        status: status.to_string(),
        total_amount: request.total_amount,
        transaction_uuid: request.transaction_uuid,
        product_code: request.product_code,
        signed_field_names: SIGNED_FIELD_ORDER.to_string(),
        signature: request.signature,
    }
}

/// base64 then percent-encoded, the way a well-behaved gateway puts it on the redirect URL. `+`, `/` and `=` would
/// otherwise be mangled by query-string decoding.
fn encode(payload: &CallbackPayload) -> String {
    base64::encode(serde_json::to_string(payload).unwrap())
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D")
}

#[actix_web::test]
async fn verified_callback_confirms_the_order() {
    let _ = env_logger::try_init().ok();
    let data = encode(&signed_callback("COMPLETE"));
    let (status, body) = get_request(&format!("/orders/gateway/success?data={data}"), configure_success).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["success"], true);
    assert_eq!(response["order"]["payment_status"], "PAID");
}

#[actix_web::test]
async fn tampered_callback_is_rejected_without_touching_the_ledger() {
    let _ = env_logger::try_init().ok();
    let mut payload = signed_callback("COMPLETE");
    payload.total_amount = "1".to_string();
    let data = encode(&payload);
    // No mock expectations are set: reaching the database would panic the test.
    let (status, body) = get_request(&format!("/orders/gateway/success?data={data}"), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "invalid_signature");
}

#[actix_web::test]
async fn malformed_callback_payloads_are_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/gateway/success?data=%21%21garbage%21%21", configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "malformed_payload");
}

#[actix_web::test]
async fn failure_redirect_cancels_the_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request("/orders/gateway/failure?transaction_uuid=txn-240612-0000cafe", configure_failure).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["order"]["order_status"], "CANCELLED");
}

fn configure_success(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fetch_order_by_transaction_id().returning(|_| {
        Ok(Some(sample_order(PaymentMethod::Gateway, PaymentStatus::Pending, OrderStatus::Pending)))
    });
    db.expect_settle_gateway_payment().returning(|_, _| {
        Ok(Settlement::Confirmed(sample_order(
            PaymentMethod::Gateway,
            PaymentStatus::Paid,
            OrderStatus::Confirmed,
        )))
    });
    register_callback_routes(cfg, db);
}

fn configure_untouched(cfg: &mut ServiceConfig) {
    register_callback_routes(cfg, MockCheckoutManager::new());
}

fn configure_failure(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fail_gateway_payment().returning(|_| {
        Ok(sample_order(PaymentMethod::Gateway, PaymentStatus::Failed, OrderStatus::Cancelled))
    });
    register_callback_routes(cfg, db);
}

fn register_callback_routes(cfg: &mut ServiceConfig, db: MockCheckoutManager) {
    let api = OrderFlowApi::new(db, test_gateway());
    cfg.service(
        web::resource("/orders/gateway/success").route(web::get().to(gateway_success::<MockCheckoutManager>)),
    )
    .service(web::resource("/orders/gateway/failure").route(web::get().to(gateway_failure::<MockCheckoutManager>)))
    .app_data(web::Data::new(api));
}

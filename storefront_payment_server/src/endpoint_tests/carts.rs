use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use storefront_payment_engine::{traits::CheckoutError, CartApi};

use super::{
    helpers::{get_request, post_request, sample_cart},
    mocks::MockCheckoutManager,
};
use crate::routes::{MyCartRoute, SetCartItemRoute};

#[actix_web::test]
async fn fetch_a_cart() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/cart/alice@example.com", configure).await;
    assert_eq!(status, StatusCode::OK);
    let cart: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 2);
}

#[actix_web::test]
async fn adding_an_unknown_product_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/cart/alice@example.com/items", json!({ "product_id": 42, "quantity": 1 }), configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "product_not_found");
}

fn configure(cfg: &mut ServiceConfig) {
    let mut db = MockCheckoutManager::new();
    db.expect_fetch_cart().returning(|_| Ok(sample_cart()));
    db.expect_upsert_cart_item().returning(|_, product_id, _| Err(CheckoutError::ProductNotFound(product_id)));
    let api = CartApi::new(db);
    cfg.service(MyCartRoute::<MockCheckoutManager>::new())
        .service(SetCartItemRoute::<MockCheckoutManager>::new())
        .app_data(web::Data::new(api));
}

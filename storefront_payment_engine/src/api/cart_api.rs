use log::debug;

use crate::{
    db_types::Cart,
    traits::{CartManagement, CheckoutError},
};

/// The cart-facing API. Line items carry a snapshot of the product's price and name taken when the line was last
/// written; checkout consumes the cart as-is.
#[derive(Debug, Clone)]
pub struct CartApi<B> {
    db: B,
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn cart(&self, owner_key: &str) -> Result<Cart, CheckoutError> {
        self.db.fetch_cart(owner_key).await
    }

    /// Sets a line's quantity (last write wins). Quantity zero removes the line.
    pub async fn set_item(&self, owner_key: &str, product_id: i64, quantity: i64) -> Result<Cart, CheckoutError> {
        debug!("🛒️ Setting cart line ({owner_key}, {product_id}) to {quantity}");
        self.db.upsert_cart_item(owner_key, product_id, quantity).await
    }

    pub async fn remove_item(&self, owner_key: &str, product_id: i64) -> Result<Cart, CheckoutError> {
        debug!("🛒️ Removing cart line ({owner_key}, {product_id})");
        self.db.remove_cart_item(owner_key, product_id).await
    }
}

use crate::{
    db_types::{Cart, NewProduct, Order, OrderId, Product, TransactionId},
    traits::CheckoutError,
};

/// Read access to the order ledger.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches an order (with its line items) by its public id.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError>;

    /// Fetches the order a gateway callback correlates to.
    async fn fetch_order_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Order>, CheckoutError>;

    /// All orders belonging to a customer, most recent first.
    async fn fetch_orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError>;
}

/// The per-customer pending item list. At most one cart exists per owner key; it is created lazily on the first
/// upsert. Concurrent writes to the same line are last-write-wins.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// The owner's cart. An owner without a cart gets an empty one back.
    async fn fetch_cart(&self, owner_key: &str) -> Result<Cart, CheckoutError>;

    /// Adds a line or replaces its quantity (and refreshes the price snapshot). A quantity of zero removes the
    /// line. Fails with `ProductNotFound` for unknown products.
    async fn upsert_cart_item(&self, owner_key: &str, product_id: i64, quantity: i64) -> Result<Cart, CheckoutError>;

    /// Removes a line. A no-op if the line (or cart) is absent.
    async fn remove_cart_item(&self, owner_key: &str, product_id: i64) -> Result<Cart, CheckoutError>;

    /// Empties the cart, keeping the cart row itself. Idempotent: absent or already-empty carts are a no-op.
    async fn clear_cart(&self, owner_key: &str) -> Result<(), CheckoutError>;
}

/// Product records and the stock they carry. Reservation and release are internal to the order ledger's units of
/// work and are deliberately not exposed here.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CheckoutError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutError>;
}

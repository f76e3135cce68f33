//! `SqliteDatabase` is a concrete implementation of a storefront payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Each unit of work from [`CheckoutDatabase`] is a single transaction whose first statement is a write, so
//! concurrent units serialise on SQLite's write lock instead of deadlocking on a read-to-write upgrade.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{carts, db_url, new_pool, orders, products};
use crate::{
    db_types::{Cart, NewOrder, NewProduct, Order, OrderId, OrderStatus, PaymentStatus, Product, TransactionId},
    traits::{
        plan_status_change, CartManagement, CheckoutDatabase, CheckoutError, GatewayReceipt, InventoryManagement,
        OrderManagement, Settlement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_cash_order(&self, order: NewOrder) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        // Reserving first keeps the transaction write-first; an insufficient line aborts the whole unit with no
        // partial reservation surviving the rollback.
        for item in &order.items {
            products::try_reserve(item.product_id, item.quantity, &mut tx).await?;
        }
        let order = orders::insert_order(order, &mut tx).await?;
        carts::clear_cart(&order.customer_key, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Cash order [{}] confirmed, stock reserved and cart cleared", order.order_id);
        Ok(order)
    }

    async fn create_gateway_order(&self, order: NewOrder) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Gateway order [{}] recorded as pending under transaction [{}]. Stock and cart untouched.",
            order.order_id,
            order.transaction_id.as_ref().map(|t| t.as_str()).unwrap_or("??")
        );
        Ok(order)
    }

    async fn settle_gateway_payment(
        &self,
        transaction_id: &TransactionId,
        receipt: GatewayReceipt,
    ) -> Result<Settlement, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        match orders::mark_paid_and_confirmed(transaction_id, &receipt, &mut tx).await? {
            Some(mut order) => {
                let items = orders::fetch_order_items(order.id, &mut tx).await?;
                for item in &items {
                    products::try_reserve(item.product_id, item.quantity, &mut tx).await?;
                }
                carts::clear_cart(&order.customer_key, &mut tx).await?;
                tx.commit().await?;
                order.items = items;
                info!("🗃️ Order [{}] settled: payment [{transaction_id}] is Paid, stock reserved", order.order_id);
                Ok(Settlement::Confirmed(order))
            },
            // The compare-and-swap did not fire: the payment is no longer Pending, or the transaction is unknown.
            None => match orders::fetch_order_by_transaction_id(transaction_id, &mut tx).await? {
                Some(order) if order.payment_status == PaymentStatus::Paid => {
                    info!("🗃️ Payment [{transaction_id}] was already settled. Nothing to do.");
                    Ok(Settlement::AlreadyPaid(order))
                },
                Some(order) => Err(CheckoutError::InvalidStatusTransition {
                    from: order.order_status,
                    to: OrderStatus::Confirmed,
                }),
                None => Err(CheckoutError::TransactionNotFound(transaction_id.clone())),
            },
        }
    }

    async fn fail_gateway_payment(&self, transaction_id: &TransactionId) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        match orders::mark_failed_and_cancelled(transaction_id, &mut tx).await? {
            Some(mut order) => {
                order.items = orders::fetch_order_items(order.id, &mut tx).await?;
                tx.commit().await?;
                info!("🗃️ Payment [{transaction_id}] marked Failed; order [{}] cancelled", order.order_id);
                Ok(order)
            },
            // Already terminal (or unknown). Terminal orders are returned unchanged so that replayed failure
            // redirects stay idempotent.
            None => match orders::fetch_order_by_transaction_id(transaction_id, &mut tx).await? {
                Some(order) => {
                    debug!(
                        "🗃️ Payment [{transaction_id}] is already {}; leaving order [{}] untouched",
                        order.payment_status, order.order_id
                    );
                    Ok(order)
                },
                None => Err(CheckoutError::TransactionNotFound(transaction_id.clone())),
            },
        }
    }

    async fn set_order_status(&self, order_id: &OrderId, new_status: OrderStatus) -> Result<Order, CheckoutError> {
        match self.try_set_order_status(order_id, new_status).await {
            Err(CheckoutError::Conflict(e)) => {
                debug!("🗃️ Status update for [{order_id}] hit a write conflict ({e}). Retrying once.");
                self.try_set_order_status(order_id, new_status).await
            },
            other => other,
        }
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn fetch_order_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_transaction_id(transaction_id, &mut conn).await?)
    }

    async fn fetch_orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_customer(customer_key, &mut conn).await?)
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, owner_key: &str) -> Result<Cart, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(carts::fetch_cart(owner_key, &mut conn).await?)
    }

    async fn upsert_cart_item(&self, owner_key: &str, product_id: i64, quantity: i64) -> Result<Cart, CheckoutError> {
        if quantity < 0 {
            return Err(CheckoutError::Validation(format!("Quantity may not be negative (got {quantity})")));
        }
        if quantity == 0 {
            return self.remove_cart_item(owner_key, product_id).await;
        }
        let mut tx = self.pool.begin().await?;
        let product = products::fetch_product(product_id, &mut tx)
            .await?
            .ok_or(CheckoutError::ProductNotFound(product_id))?;
        carts::upsert_item(owner_key, &product, quantity, &mut tx).await?;
        let cart = carts::fetch_cart(owner_key, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Cart line ({owner_key}, {product_id}) set to {quantity}");
        Ok(cart)
    }

    async fn remove_cart_item(&self, owner_key: &str, product_id: i64) -> Result<Cart, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        carts::remove_item(owner_key, product_id, &mut conn).await?;
        Ok(carts::fetch_cart(owner_key, &mut conn).await?)
    }

    async fn clear_cart(&self, owner_key: &str) -> Result<(), CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(carts::clear_cart(owner_key, &mut conn).await?)
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_product(product, &mut conn).await
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(product_id, &mut conn).await?)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn try_set_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;
        let change = plan_status_change(&order, new_status)?;
        let mut updated =
            orders::update_status(order.id, change.new_order_status, change.new_payment_status, &mut tx).await?;
        if change.release_stock {
            for item in &order.items {
                products::release(item.product_id, item.quantity, &mut tx).await?;
            }
            debug!("🗃️ Released stock for {} lines of cancelled order [{order_id}]", order.items.len());
        }
        tx.commit().await?;
        updated.items = order.items;
        info!("🗃️ Order [{order_id}] moved from {} to {}", order.order_status, updated.order_status);
        Ok(updated)
    }
}

use log::trace;

use crate::{
    db_types::{Order, OrderId},
    traits::{CheckoutError, OrderManagement},
};

/// Read-side access to orders, for the customer-facing listing and lookup endpoints.
#[derive(Debug, Clone)]
pub struct OrdersApi<B> {
    db: B,
}

impl<B> OrdersApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError> {
        let orders = self.db.fetch_orders_for_customer(customer_key).await?;
        trace!("🔄️📦️ Fetched {} orders for {customer_key}", orders.len());
        Ok(orders)
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError> {
        self.db.fetch_order_by_order_id(order_id).await
    }
}

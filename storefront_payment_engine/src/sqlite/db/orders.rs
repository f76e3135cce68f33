use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatus, PaymentStatus, TransactionId},
    traits::{CheckoutError, GatewayReceipt},
};

/// Inserts a new order and its line items. The order is persisted with the status the payment method dictates
/// (Confirmed for cash, Pending for gateway) and payment status Pending.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutError> {
    let initial_status = order.initial_status();
    let mut inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_key,
                customer_name,
                recipient,
                phone,
                street,
                city,
                postal_code,
                payment_method,
                payment_status,
                order_status,
                items_subtotal,
                tax,
                delivery_charge,
                grand_total,
                transaction_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(&order.customer_key)
    .bind(&order.customer_name)
    .bind(&order.address.recipient)
    .bind(&order.address.phone)
    .bind(&order.address.street)
    .bind(&order.address.city)
    .bind(&order.address.postal_code)
    .bind(order.payment_method.to_string())
    .bind(PaymentStatus::Pending.to_string())
    .bind(initial_status.to_string())
    .bind(order.items_subtotal)
    .bind(order.tax)
    .bind(order.delivery_charge)
    .bind(order.grand_total)
    .bind(&order.transaction_id)
    .fetch_one(&mut *conn)
    .await?;
    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (order_ref, product_id, quantity, unit_price, name) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(inserted.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(&item.name)
        .execute(&mut *conn)
        .await?;
    }
    inserted.items = order.items;
    debug!("📝️ Order [{}] inserted with id {}", inserted.order_id, inserted.id);
    Ok(inserted)
}

pub async fn fetch_order_items(order_ref: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT product_id, quantity, unit_price, name FROM order_items WHERE order_ref = $1 ORDER BY id")
        .bind(order_ref)
        .fetch_all(conn)
        .await
}

/// Returns the order (with line items) for the corresponding public `order_id`.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    attach_items(order, conn).await
}

/// Returns the order (with line items) for the corresponding gateway correlation token.
pub async fn fetch_order_by_transaction_id(
    transaction_id: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE transaction_id = $1")
        .bind(transaction_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    attach_items(order, conn).await
}

async fn attach_items(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(mut order) => {
            order.items = fetch_order_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

/// All orders for a customer, newest first.
pub async fn fetch_orders_for_customer(
    customer_key: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE customer_key = $1 ORDER BY created_at DESC, id DESC")
            .bind(customer_key)
            .fetch_all(&mut *conn)
            .await?;
    for order in &mut orders {
        order.items = fetch_order_items(order.id, &mut *conn).await?;
    }
    trace!("📝️ Fetched {} orders for {customer_key}", orders.len());
    Ok(orders)
}

/// The settlement compare-and-swap. Flips the order matching `transaction_id` to Paid/Confirmed and records the
/// gateway receipt — but only while the payment is still Pending. Returns `None` when no still-pending order
/// matches, which callers disambiguate into "already paid", "already failed" or "unknown transaction".
pub async fn mark_paid_and_confirmed(
    transaction_id: &TransactionId,
    receipt: &GatewayReceipt,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders SET
                payment_status = $1,
                order_status = $2,
                gateway_transaction_code = $3,
                gateway_ref_id = $4,
                gateway_signature = $5,
                updated_at = CURRENT_TIMESTAMP
            WHERE transaction_id = $6 AND payment_status = $7
            RETURNING *;
        "#,
    )
    .bind(PaymentStatus::Paid.to_string())
    .bind(OrderStatus::Confirmed.to_string())
    .bind(&receipt.transaction_code)
    .bind(&receipt.ref_id)
    .bind(&receipt.signature)
    .bind(transaction_id.as_str())
    .bind(PaymentStatus::Pending.to_string())
    .fetch_optional(conn)
    .await
}

/// The failure counterpart of [`mark_paid_and_confirmed`]: flips a still-pending payment to Failed/Cancelled.
/// Returns `None` when the order is absent or already terminal.
pub async fn mark_failed_and_cancelled(
    transaction_id: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders SET
                payment_status = $1,
                order_status = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE transaction_id = $3 AND payment_status = $4
            RETURNING *;
        "#,
    )
    .bind(PaymentStatus::Failed.to_string())
    .bind(OrderStatus::Cancelled.to_string())
    .bind(transaction_id.as_str())
    .bind(PaymentStatus::Pending.to_string())
    .fetch_optional(conn)
    .await
}

/// Writes the result of an operator status transition. The caller has already validated the transition and decided
/// whether the payment status moves with it.
pub async fn update_status(
    id: i64,
    order_status: OrderStatus,
    payment_status: Option<PaymentStatus>,
    conn: &mut SqliteConnection,
) -> Result<Order, CheckoutError> {
    let result: Option<Order> = match payment_status {
        Some(payment_status) => {
            sqlx::query_as(
                "UPDATE orders SET order_status = $1, payment_status = $2, updated_at = CURRENT_TIMESTAMP \
                 WHERE id = $3 RETURNING *",
            )
            .bind(order_status.to_string())
            .bind(payment_status.to_string())
            .bind(id)
            .fetch_optional(conn)
            .await?
        },
        None => {
            sqlx::query_as(
                "UPDATE orders SET order_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
            )
            .bind(order_status.to_string())
            .bind(id)
            .fetch_optional(conn)
            .await?
        },
    };
    result.ok_or_else(|| CheckoutError::DatabaseError(format!("Order with internal id {id} vanished mid-update")))
}

use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod, PaymentStatus, TransactionId},
    gateway::GatewayError,
    traits::{
        data_objects::{GatewayReceipt, Settlement},
        CartManagement, InventoryManagement, OrderManagement,
    },
};

/// The write side of the order ledger. Every method is a single all-or-nothing unit of work: if any step inside it
/// fails, no state escapes and the caller sees one coherent error.
///
/// The ledger is the only component allowed to mutate an order's status fields, and the only caller of the
/// inventory reservation primitives.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: OrderManagement + CartManagement + InventoryManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Creates a cash-on-delivery order. In one unit of work: stock is reserved for every line (all-or-nothing — if
    /// any line lacks stock the whole creation aborts with no partial reservation), the order is persisted as
    /// Confirmed/Pending, and the owner's cart is cleared.
    async fn create_cash_order(&self, order: NewOrder) -> Result<Order, CheckoutError>;

    /// Creates a gateway order. The order is persisted as Pending/Pending with its correlation token; stock is
    /// **not** reserved and the cart is **not** cleared — both happen only when the payment is confirmed. This
    /// avoids holding stock for abandoned gateway sessions.
    async fn create_gateway_order(&self, order: NewOrder) -> Result<Order, CheckoutError>;

    /// Applies a verified payment confirmation to the order matching `transaction_id`. In one unit of work: the
    /// payment status is compare-and-swapped Pending→Paid (the idempotency guard — a replayed confirmation of an
    /// already-Paid order short-circuits to [`Settlement::AlreadyPaid`] without touching stock or cart), stock is
    /// reserved for every line, the cart is cleared, the order becomes Confirmed, and the gateway receipt is
    /// recorded.
    ///
    /// Callers must have verified the callback signature before invoking this.
    async fn settle_gateway_payment(
        &self,
        transaction_id: &TransactionId,
        receipt: GatewayReceipt,
    ) -> Result<Settlement, CheckoutError>;

    /// Marks the payment for `transaction_id` as Failed and the order as Cancelled. Idempotent: an order that is
    /// already terminal is returned unchanged. No stock is touched — nothing was reserved for a pending gateway
    /// order.
    async fn fail_gateway_payment(&self, transaction_id: &TransactionId) -> Result<Order, CheckoutError>;

    /// Operator-driven status transition, validated by [`plan_status_change`]. Side effects ride in the same unit
    /// of work: a delivered cash order is marked Paid, a cancellation of a still-pending payment marks it Failed,
    /// and a cancellation of an order whose stock was reserved releases that stock.
    async fn set_order_status(&self, order_id: &OrderId, new_status: OrderStatus) -> Result<Order, CheckoutError>;
}

//--------------------------------------     StatusChange      -------------------------------------------------------
/// The effects of an operator status transition, computed by [`plan_status_change`] before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub new_order_status: OrderStatus,
    pub new_payment_status: Option<PaymentStatus>,
    pub release_stock: bool,
}

/// Validates an operator transition against the order state machine and returns the full set of effects to apply.
///
/// Allowed moves are Pending→Confirmed→Delivered, and Pending/Confirmed→Cancelled. A gateway order may not be
/// manually confirmed while its payment is still pending — confirmation of gateway orders is the settlement flow's
/// job. Everything else, including no-op same-status updates, is an [`CheckoutError::InvalidStatusTransition`].
pub fn plan_status_change(order: &Order, new_status: OrderStatus) -> Result<StatusChange, CheckoutError> {
    use OrderStatus::*;
    let refused = || {
        Err(CheckoutError::InvalidStatusTransition { from: order.order_status, to: new_status })
    };
    if order.order_status == new_status {
        return refused();
    }
    match (order.order_status, new_status) {
        (Pending, Confirmed) => {
            if order.payment_method == PaymentMethod::Gateway && order.payment_status == PaymentStatus::Pending {
                return refused();
            }
            Ok(StatusChange { new_order_status: Confirmed, new_payment_status: None, release_stock: false })
        },
        (Confirmed, Delivered) => {
            let new_payment_status = (order.payment_method == PaymentMethod::CashOnDelivery
                && order.payment_status == PaymentStatus::Pending)
                .then_some(PaymentStatus::Paid);
            Ok(StatusChange { new_order_status: Delivered, new_payment_status, release_stock: false })
        },
        (Pending | Confirmed, Cancelled) => {
            let new_payment_status =
                (order.payment_status == PaymentStatus::Pending).then_some(PaymentStatus::Failed);
            // Stock was reserved at creation for cash orders, and at settlement for paid gateway orders.
            let release_stock = order.payment_method == PaymentMethod::CashOnDelivery
                || order.payment_status == PaymentStatus::Paid;
            Ok(StatusChange { new_order_status: Cancelled, new_payment_status, release_stock })
        },
        (_, _) => refused(),
    }
}

//--------------------------------------     CheckoutError     -------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No order matches transaction {0}")]
    TransactionNotFound(TransactionId),
    #[error("The cart for {0} is empty")]
    EmptyCart(String),
    #[error("Insufficient stock for product {product_id}: requested {requested}, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("Order status cannot change from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
    #[error("The callback signature is invalid")]
    InvalidSignature,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("A concurrent write prevented the update. {0}")]
    Conflict(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.message().contains("locked") || db.message().contains("busy") => {
                CheckoutError::Conflict(e.to_string())
            },
            _ => CheckoutError::DatabaseError(e.to_string()),
        }
    }
}

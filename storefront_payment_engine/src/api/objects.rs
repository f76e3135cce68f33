use sps_common::Money;

use crate::{
    db_types::{Address, Order, PaymentMethod},
    gateway::{GatewayStatus, PaymentRequestFields},
};

/// The checkout pricing policy. Tax and delivery are decided here, once, when the order is created; they are stored
/// on the order and never recomputed.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    /// Tax as a percentage of the items subtotal.
    pub tax_percent: f64,
    /// Flat delivery charge per order.
    pub delivery_charge: Money,
}

impl PricingPolicy {
    pub fn tax_for(&self, subtotal: Money) -> Money {
        let cents = (subtotal.value() as f64 * self.tax_percent / 100.0).round() as i64;
        Money::from(cents)
    }
}

/// A validated checkout request: who is ordering, where it ships, and how they pay. The items come from the
/// caller's cart, never from the request itself.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_key: String,
    pub customer_name: String,
    pub address: Address,
    pub payment_method: PaymentMethod,
}

/// What checkout produced. Cash orders come back confirmed; gateway orders come back pending, along with the
/// signed form fields the customer must be redirected to the gateway with.
#[derive(Debug, Clone)]
pub enum PlacedOrder {
    Confirmed(Order),
    AwaitingPayment { order: Order, payment: PaymentRequestFields },
}

impl PlacedOrder {
    pub fn order(&self) -> &Order {
        match self {
            PlacedOrder::Confirmed(order) => order,
            PlacedOrder::AwaitingPayment { order, .. } => order,
        }
    }
}

/// The resolution of a gateway success callback.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// The payment was verified and the order confirmed in this call.
    Confirmed(Order),
    /// A replay: the order had already been paid. Nothing changed.
    AlreadyProcessed(Order),
    /// The callback (or the status poll) reported the payment as not completed; the order was cancelled.
    Failed(Order),
    /// The gateway still reports the payment as in flight. The order was left untouched.
    Pending(Order),
}

impl CallbackOutcome {
    pub fn order(&self) -> &Order {
        match self {
            CallbackOutcome::Confirmed(order)
            | CallbackOutcome::AlreadyProcessed(order)
            | CallbackOutcome::Failed(order)
            | CallbackOutcome::Pending(order) => order,
        }
    }
}

/// The answer to a client-initiated "check my payment" poll: the (possibly just-updated) order, and what the
/// gateway said if it could be reached.
#[derive(Debug, Clone)]
pub struct PaymentStatusReport {
    pub order: Order,
    pub gateway_status: Option<GatewayStatus>,
}

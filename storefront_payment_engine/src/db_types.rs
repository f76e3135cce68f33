use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sps_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::{new_order_id, new_transaction_id};

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public identifier of an order. Generated locally at checkout time and safe to expose in URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     TransactionId     -------------------------------------------------------
/// The gateway correlation token. Generated locally when a gateway order is created, embedded in the outbound
/// payment request, and echoed back by the gateway in callbacks. Stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// The customer pays the courier; the order is confirmed (and stock reserved) at checkout time.
    CashOnDelivery,
    /// The customer is redirected to the payment gateway; the order is confirmed only once a verified callback or
    /// status poll reports the payment as complete.
    Gateway,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::CashOnDelivery => write!(f, "CashOnDelivery"),
            PaymentMethod::Gateway => write!(f, "Gateway"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CashOnDelivery" => Ok(Self::CashOnDelivery),
            "Gateway" => Ok(Self::Gateway),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment method: {value}. But this conversion cannot fail. Defaulting to CashOnDelivery");
            PaymentMethod::CashOnDelivery
        })
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No verified payment has been recorded yet.
    Pending,
    /// A verified gateway callback (or cash collection on delivery) has been recorded. One-way.
    Paid,
    /// The payment was cancelled or rejected before it was ever `Paid`. Terminal.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Pending");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------     OrderStatus       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// The order has been recorded but not confirmed. Gateway orders wait here for their callback.
    Pending,
    /// Stock has been reserved and the order is being fulfilled.
    Confirmed,
    /// The order has been handed to the customer. Terminal.
    Delivered,
    /// The order was cancelled by the customer, the gateway, or an operator. Terminal.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------       Address         -------------------------------------------------------
/// A structured delivery address. Completeness is validated before an order is created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub recipient: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal_code: Option<String>,
}

impl Address {
    /// All mandatory fields present and non-blank. The postal code is optional.
    pub fn is_complete(&self) -> bool {
        !self.recipient.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
    }
}

//--------------------------------------       Product         -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

//--------------------------------------        Cart           -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
    /// The unit price snapshotted when the item was (last) added to the cart.
    pub unit_price: Money,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub owner_key: String,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn empty(owner_key: &str) -> Self {
        Self { owner_key: owner_key.to_string(), items: Vec::new(), updated_at: Utc::now() }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.unit_price * i.quantity).sum()
    }
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// An immutable order line. The unit price is captured at order-creation time and never re-read from the product.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub name: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

impl From<CartItem> for OrderItem {
    fn from(item: CartItem) -> Self {
        Self { product_id: item.product_id, quantity: item.quantity, unit_price: item.unit_price, name: item.name }
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_key: String,
    pub customer_name: String,
    #[sqlx(flatten)]
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub items_subtotal: Money,
    pub tax: Money,
    pub delivery_charge: Money,
    pub grand_total: Money,
    pub transaction_id: Option<TransactionId>,
    pub gateway_transaction_code: Option<String>,
    pub gateway_ref_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Not a column: attached by the fetch functions from the order_items table.
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_key: String,
    pub customer_name: String,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub items_subtotal: Money,
    pub tax: Money,
    pub delivery_charge: Money,
    pub grand_total: Money,
    /// Present iff `payment_method` is `Gateway`.
    pub transaction_id: Option<TransactionId>,
}

impl NewOrder {
    /// Snapshots the cart into an immutable set of order lines and fixes the totals. The grand total is computed
    /// here, once, and is never recomputed after the order has been persisted.
    pub fn from_cart(
        customer_key: &str,
        customer_name: &str,
        address: Address,
        payment_method: PaymentMethod,
        cart: &Cart,
        tax: Money,
        delivery_charge: Money,
    ) -> Self {
        let items: Vec<OrderItem> = cart.items.iter().cloned().map(OrderItem::from).collect();
        let items_subtotal = cart.subtotal();
        let grand_total = items_subtotal + tax + delivery_charge;
        let transaction_id = match payment_method {
            PaymentMethod::Gateway => Some(new_transaction_id()),
            PaymentMethod::CashOnDelivery => None,
        };
        Self {
            order_id: new_order_id(),
            customer_key: customer_key.to_string(),
            customer_name: customer_name.to_string(),
            address,
            payment_method,
            items,
            items_subtotal,
            tax,
            delivery_charge,
            grand_total,
            transaction_id,
        }
    }

    /// The status an order carries as soon as it has been persisted. Cash orders are confirmed in the same unit of
    /// work that creates them; gateway orders wait for the callback.
    pub fn initial_status(&self) -> OrderStatus {
        match self.payment_method {
            PaymentMethod::CashOnDelivery => OrderStatus::Confirmed,
            PaymentMethod::Gateway => OrderStatus::Pending,
        }
    }
}

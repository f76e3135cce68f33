//! Storefront Payment Engine
//!
//! The engine owns the order-payment-inventory reconciliation workflow of the storefront: it moves orders through
//! their lifecycle while coordinating product stock, the shopping cart and the order record under an asynchronous,
//! untrusted payment gateway. It guarantees that stock is never oversold, that money is never marked as paid
//! without a verified signature, and that partial failures roll back to recoverable state.
//!
//! The library is divided into three main sections:
//! 1. Database management and control (the SQLite backend and the storage traits in [`mod@traits`]). You should
//!    never need to access the database directly; use the public APIs instead. The exception is the data types used
//!    in the database, which are defined in the [`mod@db_types`] module and are public.
//! 2. The payment gateway adapter ([`mod@gateway`]): stateless signing, verification, payload decoding and status
//!    polling against the external gateway.
//! 3. The public APIs ([`OrderFlowApi`], [`OrdersApi`], [`CartApi`]) consumed by the HTTP server. Specific backends
//!    implement the traits in [`mod@traits`] in order to power these APIs.

pub mod db_types;
pub mod gateway;
pub mod helpers;
pub mod traits;

mod api;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db::run_migrations, SqliteDatabase};

pub use api::{
    cart_api::CartApi,
    objects::{CallbackOutcome, CheckoutRequest, PaymentStatusReport, PlacedOrder, PricingPolicy},
    order_flow_api::OrderFlowApi,
    orders_api::OrdersApi,
};

//! # Storefront payment server
//! This crate hosts the HTTP surface of the storefront. It is responsible for:
//! * the checkout endpoint that turns a cart into an order (cash or gateway),
//! * the public gateway callback endpoints that settle or cancel gateway payments,
//! * customer-facing order listing/lookup and the payment reconciliation poll,
//! * the operator endpoint for advancing an order through its lifecycle.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! Authentication is handled upstream: the deployment fronts this service with an authenticating proxy, and
//! handlers trust the owner key presented in the path or body.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;

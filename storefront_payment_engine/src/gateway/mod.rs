//! Payment gateway adapter.
//!
//! The gateway is a third-party, asynchronous, untrusted payment processor. We only ever talk to it three ways:
//! * an outbound, signed payment request that the customer's browser is redirected with ([`build_payment_request`]),
//! * an inbound, signed callback delivered to a public redirect URL ([`decode_callback_payload`] +
//!   [`verify_callback_signature`]), and
//! * a polling status endpoint used to cross-check callbacks and reconcile payments ([`GatewayClient::poll_status`]).
//!
//! Everything here is plain data in, plain data out. The configuration is an explicit struct built once at process
//! start; there is no global state.

mod errors;
mod payload;
mod signing;
mod status;

use std::time::Duration;

use sps_common::Secret;

pub use errors::GatewayError;
pub use payload::{decode_callback_payload, CallbackPayload, PaymentRequestFields};
pub use signing::{build_payment_request, verify_callback_signature, SIGNED_FIELD_ORDER};
pub use status::{GatewayStatus, StatusCheck};

use crate::db_types::TransactionId;
use sps_common::Money;

/// Everything the adapter needs to talk to the gateway. Constructed once (from the environment, typically) and
/// passed by reference into the stateless adapter functions.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// The merchant/product code issued by the gateway.
    pub product_code: String,
    /// The shared signing secret. Always used trimmed.
    pub secret_key: Secret<String>,
    /// Base URL of the gateway API (sandbox or production).
    pub base_url: String,
    /// Where the gateway redirects the customer after a successful payment.
    pub success_url: String,
    /// Where the gateway redirects the customer after a failed or cancelled payment.
    pub failure_url: String,
    /// Upper bound on the status poll. A slow gateway must never stall a callback handler.
    pub poll_timeout: Duration,
}

/// A configured adapter instance: the config plus a reusable HTTP client for the status endpoint.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.poll_timeout)
            .build()
            .map_err(|e| GatewayError::Initialize(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// See [`build_payment_request`].
    pub fn build_payment_request(
        &self,
        amount: Money,
        tax: Money,
        delivery_charge: Money,
        transaction_id: &TransactionId,
    ) -> PaymentRequestFields {
        build_payment_request(&self.config, amount, tax, delivery_charge, transaction_id)
    }

    /// See [`verify_callback_signature`].
    pub fn verify_callback_signature(&self, payload: &CallbackPayload) -> bool {
        verify_callback_signature(&self.config, payload)
    }

    /// Polls the gateway's transaction status endpoint. The request is bounded by the configured timeout; a slow or
    /// unreachable gateway surfaces as [`GatewayError::Unreachable`] rather than blocking the caller.
    ///
    /// The `total_amount` must be the amount the payment request was signed with, rendered the same way.
    pub async fn poll_status(
        &self,
        total_amount: &str,
        transaction_id: &TransactionId,
    ) -> Result<StatusCheck, GatewayError> {
        status::poll_status(&self.http, &self.config, total_amount, transaction_id).await
    }
}

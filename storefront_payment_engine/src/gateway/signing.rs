//! Signing and verification of gateway messages.
//!
//! Both directions use the same scheme: a keyed HMAC-SHA256 over a canonical message of comma-joined `field=value`
//! pairs, base64-encoded. Outbound requests declare the field order in `signed_field_names`; inbound callbacks echo
//! a `signed_field_names` of their own, and verification reconstructs the message **in exactly that order**. The
//! callback arrives on a public redirect URL, so the declared order is untrusted but authoritative for
//! reconstruction — assuming a hardcoded order would let a forged message verify if the gateway ever changed its
//! canonicalisation. What we *do* insist on is that every field we rely on is inside the signed set.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use sps_common::Money;

use super::{CallbackPayload, GatewayConfig, PaymentRequestFields};
use crate::db_types::TransactionId;

type HmacSha256 = Hmac<Sha256>;

/// The field order declared in outbound payment requests.
pub const SIGNED_FIELD_ORDER: &str = "total_amount,transaction_uuid,product_code";

/// The fields that must be covered by a callback signature before it can be trusted.
const REQUIRED_SIGNED_FIELDS: [&str; 3] = ["total_amount", "transaction_uuid", "product_code"];

fn sign_message(secret: &str, message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    base64::encode(mac.finalize().into_bytes())
}

/// Builds the signed form fields for an outbound payment request. Deterministic: identical inputs always produce an
/// identical signature.
pub fn build_payment_request(
    config: &GatewayConfig,
    amount: Money,
    tax: Money,
    delivery_charge: Money,
    transaction_id: &TransactionId,
) -> PaymentRequestFields {
    let total = amount + tax + delivery_charge;
    let message = format!(
        "total_amount={},transaction_uuid={},product_code={}",
        total.to_wire_amount(),
        transaction_id,
        config.product_code
    );
    let signature = sign_message(config.secret_key.trimmed(), &message);
    PaymentRequestFields {
        amount: amount.to_wire_amount(),
        tax_amount: tax.to_wire_amount(),
        total_amount: total.to_wire_amount(),
        transaction_uuid: transaction_id.to_string(),
        product_code: config.product_code.clone(),
        product_service_charge: "0".to_string(),
        product_delivery_charge: delivery_charge.to_wire_amount(),
        success_url: config.success_url.clone(),
        failure_url: config.failure_url.clone(),
        signed_field_names: SIGNED_FIELD_ORDER.to_string(),
        signature,
    }
}

/// Checks the signature on a decoded callback payload.
///
/// The message is reconstructed from the payload's own values, in the order listed by the payload's own
/// `signed_field_names`. Returns `false` — never panics — when the declared list names a field we do not know, or
/// when any of [`REQUIRED_SIGNED_FIELDS`] is missing from the signed set. Comparison is exact string equality on the
/// base64 signatures.
pub fn verify_callback_signature(config: &GatewayConfig, payload: &CallbackPayload) -> bool {
    let fields: Vec<&str> = payload.signed_field_names.split(',').map(str::trim).filter(|f| !f.is_empty()).collect();
    if REQUIRED_SIGNED_FIELDS.iter().any(|required| !fields.contains(required)) {
        return false;
    }
    let mut parts = Vec::with_capacity(fields.len());
    for field in fields {
        let value = match field {
            "transaction_code" => &payload.transaction_code,
            "status" => &payload.status,
            "total_amount" => &payload.total_amount,
            "transaction_uuid" => &payload.transaction_uuid,
            "product_code" => &payload.product_code,
            "signed_field_names" => &payload.signed_field_names,
            _ => return false,
        };
        parts.push(format!("{field}={value}"));
    }
    let message = parts.join(",");
    sign_message(config.secret_key.trimmed(), &message) == payload.signature
}

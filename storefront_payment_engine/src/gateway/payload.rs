use serde::{Deserialize, Serialize};

use super::GatewayError;

/// The decoded success-callback payload. The gateway delivers this as base64-encoded JSON on a public redirect URL,
/// so every field — including the field *order* in `signed_field_names` — must be treated as attacker-supplied until
/// the signature has been verified.
///
/// Amounts are kept as the exact strings the gateway sent. Re-parsing and re-rendering them before signature
/// verification would change the signed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub transaction_code: String,
    pub status: String,
    pub total_amount: String,
    pub transaction_uuid: String,
    pub product_code: String,
    pub signed_field_names: String,
    pub signature: String,
}

/// Reverses the gateway's base64 + JSON encoding. Any malformation is a [`GatewayError::Decode`]; partial data is
/// never returned.
pub fn decode_callback_payload(encoded: &str) -> Result<CallbackPayload, GatewayError> {
    let bytes = base64::decode(encoded.trim()).map_err(|e| GatewayError::Decode(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(format!("invalid callback JSON: {e}")))
}

/// The form fields posted to the gateway to initiate a payment. All values are strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequestFields {
    pub amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub transaction_uuid: String,
    pub product_code: String,
    pub product_service_charge: String,
    pub product_delivery_charge: String,
    pub success_url: String,
    pub failure_url: String,
    pub signed_field_names: String,
    pub signature: String,
}

use std::fmt::Display;

use log::trace;
use serde::Deserialize;

use super::{GatewayConfig, GatewayError};
use crate::db_types::TransactionId;

/// The gateway's own status vocabulary, passed through verbatim. Anything the gateway invents later lands in
/// `Other` rather than failing the poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Complete,
    Pending,
    Canceled,
    NotFound,
    Other(String),
}

impl From<&str> for GatewayStatus {
    fn from(value: &str) -> Self {
        match value {
            "COMPLETE" => Self::Complete,
            "PENDING" => Self::Pending,
            "CANCELED" => Self::Canceled,
            "NOT_FOUND" => Self::NotFound,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayStatus::Complete => write!(f, "COMPLETE"),
            GatewayStatus::Pending => write!(f, "PENDING"),
            GatewayStatus::Canceled => write!(f, "CANCELED"),
            GatewayStatus::NotFound => write!(f, "NOT_FOUND"),
            GatewayStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The result of a status poll.
#[derive(Debug, Clone)]
pub struct StatusCheck {
    pub status: GatewayStatus,
    pub ref_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    ref_id: Option<String>,
}

pub(super) async fn poll_status(
    http: &reqwest::Client,
    config: &GatewayConfig,
    total_amount: &str,
    transaction_id: &TransactionId,
) -> Result<StatusCheck, GatewayError> {
    let url = format!("{}/api/transaction/status", config.base_url.trim_end_matches('/'));
    trace!("🏦️ Polling gateway status for [{transaction_id}]");
    let response = http
        .get(url)
        .query(&[
            ("product_code", config.product_code.as_str()),
            ("total_amount", total_amount),
            ("transaction_uuid", transaction_id.as_str()),
        ])
        .send()
        .await
        .map_err(|e| GatewayError::Unreachable(e.to_string()))?;
    if !response.status().is_success() {
        return Err(GatewayError::Protocol(format!("status endpoint answered {}", response.status())));
    }
    let body: StatusResponse =
        response.json().await.map_err(|e| GatewayError::Protocol(format!("unreadable status body: {e}")))?;
    trace!("🏦️ Gateway reports [{transaction_id}] as {}", body.status);
    Ok(StatusCheck { status: GatewayStatus::from(body.status.as_str()), ref_id: body.ref_id })
}

#[cfg(test)]
mod test {
    use super::GatewayStatus;

    #[test]
    fn vocabulary_passes_through_verbatim() {
        assert_eq!(GatewayStatus::from("COMPLETE"), GatewayStatus::Complete);
        assert_eq!(GatewayStatus::from("NOT_FOUND"), GatewayStatus::NotFound);
        let odd = GatewayStatus::from("FULL_REFUND");
        assert_eq!(odd, GatewayStatus::Other("FULL_REFUND".to_string()));
        assert_eq!(odd.to_string(), "FULL_REFUND");
    }
}

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not decode the callback payload. {0}")]
    Decode(String),
    #[error("The payment gateway could not be reached. {0}")]
    Unreachable(String),
    #[error("Unexpected response from the payment gateway. {0}")]
    Protocol(String),
    #[error("Could not initialise the gateway client. {0}")]
    Initialize(String),
}

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use storefront_payment_engine::{
    db_types::{Address, Order, OrderId, OrderStatus, PaymentMethod, PaymentStatus},
    gateway::PaymentRequestFields,
    PaymentStatusReport,
};

/// Body of `POST /orders/from-cart`. The items come from the caller's stored cart, never from the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutParams {
    pub customer_key: String,
    pub customer_name: String,
    pub address: Address,
    pub payment_method: PaymentMethod,
}

/// Body of `PUT /orders/{order_id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateParams {
    pub status: OrderStatus,
}

/// Body of `POST /cart/{owner_key}/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemParams {
    pub product_id: i64,
    pub quantity: i64,
}

/// The gateway success redirect carries the callback as a single base64 `data` parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackData {
    pub data: String,
}

/// The gateway failure redirect carries only the correlation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureParams {
    pub transaction_uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Response of `POST /orders/from-cart`. `payment` is present for gateway orders only: the signed form fields the
/// client redirects the customer to the gateway with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRequestFields>,
}

/// Response of the gateway callback endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

/// Response of `GET /orders/{order_id}/payment-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub order_id: OrderId,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    /// What the gateway said, verbatim, if it could be reached in this poll.
    pub gateway_status: Option<String>,
}

impl From<PaymentStatusReport> for PaymentStatusResponse {
    fn from(report: PaymentStatusReport) -> Self {
        Self {
            order_id: report.order.order_id.clone(),
            payment_method: report.order.payment_method,
            payment_status: report.order.payment_status,
            order_status: report.order.order_status,
            gateway_status: report.gateway_status.map(|s| s.to_string()),
        }
    }
}

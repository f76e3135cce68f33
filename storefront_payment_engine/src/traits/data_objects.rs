use crate::db_types::Order;

/// The external identifiers reported by the gateway for a settled payment. Recorded on the order for manual
/// reconciliation.
#[derive(Debug, Clone, Default)]
pub struct GatewayReceipt {
    pub transaction_code: Option<String>,
    pub ref_id: Option<String>,
    pub signature: Option<String>,
}

/// The outcome of applying a verified payment confirmation to an order.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The order transitioned to Paid/Confirmed in this call; stock was reserved and the cart cleared.
    Confirmed(Order),
    /// The order was already Paid. Nothing was mutated — replayed callbacks land here.
    AlreadyPaid(Order),
}

impl Settlement {
    pub fn order(&self) -> &Order {
        match self {
            Settlement::Confirmed(order) | Settlement::AlreadyPaid(order) => order,
        }
    }
}

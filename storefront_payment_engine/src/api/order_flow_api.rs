use std::fmt::Debug;

use log::*;

use crate::{
    api::objects::{CallbackOutcome, CheckoutRequest, PaymentStatusReport, PlacedOrder, PricingPolicy},
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod, PaymentStatus, TransactionId},
    gateway::{decode_callback_payload, CallbackPayload, GatewayClient, GatewayStatus},
    traits::{CheckoutDatabase, CheckoutError, GatewayReceipt, Settlement},
};

/// `OrderFlowApi` is the primary API for driving orders through their lifecycle: checkout, gateway callbacks,
/// reconciliation polls and operator status changes. It is the only component that mutates an order's status
/// fields, and it does so exclusively through the backend's atomic units of work.
pub struct OrderFlowApi<B> {
    db: B,
    gateway: GatewayClient,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, gateway: GatewayClient) -> Self {
        Self { db, gateway }
    }
}

impl<B> OrderFlowApi<B>
where B: CheckoutDatabase
{
    /// Creates an order from the caller's cart.
    ///
    /// Validation (complete address, non-empty cart) happens before anything is written. Cash orders are confirmed
    /// immediately — stock reserved and cart cleared in one unit of work. Gateway orders are recorded as pending
    /// and returned together with the signed payment-request fields for the redirect; their stock and cart are only
    /// touched when the payment is confirmed.
    pub async fn place_order(
        &self,
        request: CheckoutRequest,
        pricing: &PricingPolicy,
    ) -> Result<PlacedOrder, CheckoutError> {
        if !request.address.is_complete() {
            return Err(CheckoutError::Validation("The delivery address is incomplete".to_string()));
        }
        let cart = self.db.fetch_cart(&request.customer_key).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart(request.customer_key));
        }
        let tax = pricing.tax_for(cart.subtotal());
        let order = NewOrder::from_cart(
            &request.customer_key,
            &request.customer_name,
            request.address,
            request.payment_method,
            &cart,
            tax,
            pricing.delivery_charge,
        );
        match request.payment_method {
            PaymentMethod::CashOnDelivery => {
                let order = self.db.create_cash_order(order).await?;
                info!("🔄️📦️ Cash order [{}] created and confirmed for {}", order.order_id, order.customer_key);
                Ok(PlacedOrder::Confirmed(order))
            },
            PaymentMethod::Gateway => {
                let order = self.db.create_gateway_order(order).await?;
                let transaction_id = order.transaction_id.clone().ok_or_else(|| {
                    CheckoutError::DatabaseError(format!(
                        "Gateway order {} was stored without a transaction id",
                        order.order_id
                    ))
                })?;
                let payment = self.gateway.build_payment_request(
                    order.items_subtotal,
                    order.tax,
                    order.delivery_charge,
                    &transaction_id,
                );
                info!(
                    "🔄️📦️ Gateway order [{}] created for {}; awaiting payment under [{transaction_id}]",
                    order.order_id, order.customer_key
                );
                Ok(PlacedOrder::AwaitingPayment { order, payment })
            },
        }
    }

    /// Resolves a gateway success callback.
    ///
    /// The payload is decoded and its signature verified **before** any lookup or mutation. A verified callback is
    /// cross-checked against the gateway's status endpoint; the payment is confirmed iff the poll reports COMPLETE,
    /// or the poll is unreachable while the signed callback itself claims COMPLETE. Replayed callbacks for
    /// already-paid orders are answered idempotently with no further side effects.
    pub async fn process_success_callback(&self, encoded_data: &str) -> Result<CallbackOutcome, CheckoutError> {
        let payload = decode_callback_payload(encoded_data)?;
        if !self.gateway.verify_callback_signature(&payload) {
            warn!(
                "🔄️💰️ Callback for transaction [{}] failed signature verification. Rejecting without mutation.",
                payload.transaction_uuid
            );
            return Err(CheckoutError::InvalidSignature);
        }
        let txid = TransactionId::from(payload.transaction_uuid.clone());
        let order = self
            .db
            .fetch_order_by_transaction_id(&txid)
            .await?
            .ok_or_else(|| CheckoutError::TransactionNotFound(txid.clone()))?;
        if order.payment_status == PaymentStatus::Paid {
            info!("🔄️💰️ Duplicate callback for [{txid}]: order [{}] is already paid", order.order_id);
            return Ok(CallbackOutcome::AlreadyProcessed(order));
        }
        if payload.status != "COMPLETE" {
            info!(
                "🔄️💰️ Callback for [{txid}] reports status {}. Cancelling order [{}].",
                payload.status, order.order_id
            );
            let order = self.db.fail_gateway_payment(&txid).await?;
            return Ok(CallbackOutcome::Failed(order));
        }
        // Best-effort cross-check. The signature already proves gateway authorship, so an unreachable status
        // endpoint downgrades to trusting the signed callback rather than failing the request.
        match self.gateway.poll_status(&payload.total_amount, &txid).await {
            Ok(check) => match check.status {
                GatewayStatus::Complete => self.confirm_from_callback(&txid, &payload, check.ref_id).await,
                GatewayStatus::Canceled | GatewayStatus::NotFound => {
                    warn!(
                        "🔄️💰️ Callback for [{txid}] claims COMPLETE but the gateway reports {}. Cancelling order \
                         [{}].",
                        check.status, order.order_id
                    );
                    let order = self.db.fail_gateway_payment(&txid).await?;
                    Ok(CallbackOutcome::Failed(order))
                },
                other => {
                    info!(
                        "🔄️💰️ Gateway reports [{txid}] as {other}; leaving order [{}] pending for a later \
                         callback or poll",
                        order.order_id
                    );
                    Ok(CallbackOutcome::Pending(order))
                },
            },
            Err(e) => {
                warn!("🔄️💰️ Gateway status poll failed for [{txid}] ({e}). Trusting the signed callback.");
                self.confirm_from_callback(&txid, &payload, None).await
            },
        }
    }

    /// Resolves the failure/cancel redirect: the payment is marked Failed and the order Cancelled. Idempotent on
    /// orders that are already terminal.
    pub async fn process_failure_redirect(&self, transaction_id: &TransactionId) -> Result<Order, CheckoutError> {
        let order = self.db.fail_gateway_payment(transaction_id).await?;
        info!("🔄️💰️ Failure redirect processed for [{transaction_id}]; order [{}]", order.order_id);
        Ok(order)
    }

    /// Client-initiated reconciliation: re-polls the gateway for a pending gateway order and applies the same
    /// mapping as the callback path. Tolerant of poll failure — the last-known local state is reported rather than
    /// an error.
    pub async fn payment_status(&self, order_id: &OrderId) -> Result<PaymentStatusReport, CheckoutError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;
        let transaction_id = match (&order.payment_method, order.payment_status, &order.transaction_id) {
            (PaymentMethod::Gateway, PaymentStatus::Pending, Some(txid)) => txid.clone(),
            _ => return Ok(PaymentStatusReport { order, gateway_status: None }),
        };
        match self.gateway.poll_status(&order.grand_total.to_wire_amount(), &transaction_id).await {
            Err(e) => {
                warn!("🔄️💰️ Reconciliation poll failed for [{transaction_id}] ({e}). Reporting last-known state.");
                Ok(PaymentStatusReport { order, gateway_status: None })
            },
            Ok(check) => match check.status {
                GatewayStatus::Complete => {
                    let receipt = GatewayReceipt { ref_id: check.ref_id, ..Default::default() };
                    let order = self.db.settle_gateway_payment(&transaction_id, receipt).await?.order().clone();
                    info!("🔄️💰️ Reconciliation poll settled order [{}]", order.order_id);
                    Ok(PaymentStatusReport { order, gateway_status: Some(GatewayStatus::Complete) })
                },
                GatewayStatus::Canceled | GatewayStatus::NotFound => {
                    let status = check.status;
                    let order = self.db.fail_gateway_payment(&transaction_id).await?;
                    info!("🔄️💰️ Reconciliation poll cancelled order [{}] (gateway said {status})", order.order_id);
                    Ok(PaymentStatusReport { order, gateway_status: Some(status) })
                },
                other => Ok(PaymentStatusReport { order, gateway_status: Some(other) }),
            },
        }
    }

    /// Operator-driven status transition. Validation and side effects (cash payment collection on delivery, stock
    /// release on cancellation) are handled by the backend's unit of work.
    pub async fn set_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let order = self.db.set_order_status(order_id, new_status).await?;
        info!("🔄️📦️ Order [{order_id}] status set to {new_status} by operator");
        Ok(order)
    }

    async fn confirm_from_callback(
        &self,
        transaction_id: &TransactionId,
        payload: &CallbackPayload,
        ref_id: Option<String>,
    ) -> Result<CallbackOutcome, CheckoutError> {
        let receipt = GatewayReceipt {
            transaction_code: Some(payload.transaction_code.clone()),
            ref_id,
            signature: Some(payload.signature.clone()),
        };
        match self.db.settle_gateway_payment(transaction_id, receipt).await {
            Ok(Settlement::Confirmed(order)) => {
                info!("🔄️💰️ Payment [{transaction_id}] verified; order [{}] is Paid/Confirmed", order.order_id);
                Ok(CallbackOutcome::Confirmed(order))
            },
            Ok(Settlement::AlreadyPaid(order)) => Ok(CallbackOutcome::AlreadyProcessed(order)),
            Err(e) => {
                error!(
                    "🔄️💰️ Could not settle verified payment [{transaction_id}]: {e}. The order is left pending \
                     for manual reconciliation."
                );
                Err(e)
            },
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g.
//! I/O, database operations, etc.) is expressed as an async function, so that worker threads keep serving other
//! requests while the future is pending.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use storefront_payment_engine::{
    db_types::{OrderId, TransactionId},
    traits::{CartManagement, CheckoutDatabase, CheckoutError, OrderManagement},
    CallbackOutcome, CartApi, CheckoutRequest, OrderFlowApi, OrdersApi, PlacedOrder, PricingPolicy,
};

use crate::{
    data_objects::{
        CallbackData, CallbackResponse, CartItemParams, CheckoutParams, FailureParams, OrderCreatedResponse,
        PaymentStatusResponse, StatusUpdateParams,
    },
    errors::ServerError,
};

// Actix cannot handle generics in handlers, so routes are registered manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(place_order => Post "/orders/from-cart" impl CheckoutDatabase);
/// Creates an order from the caller's current cart.
///
/// Cash orders come back confirmed, with stock reserved and the cart cleared. Gateway orders come back pending,
/// together with the signed payment-request fields for the redirect; their stock and cart stay untouched until the
/// gateway confirms the payment.
pub async fn place_order<B: CheckoutDatabase>(
    body: web::Json<CheckoutParams>,
    api: web::Data<OrderFlowApi<B>>,
    pricing: web::Data<PricingPolicy>,
) -> Result<HttpResponse, ServerError> {
    let CheckoutParams { customer_key, customer_name, address, payment_method } = body.into_inner();
    debug!("💻️ POST order from cart for {customer_key} ({payment_method})");
    let request = CheckoutRequest { customer_key, customer_name, address, payment_method };
    let placed = api.place_order(request, pricing.get_ref()).await.map_err(|e| {
        debug!("💻️ Could not place order. {e}");
        e
    })?;
    let response = match placed {
        PlacedOrder::Confirmed(order) => OrderCreatedResponse { order, payment: None },
        PlacedOrder::AwaitingPayment { order, payment } => OrderCreatedResponse { order, payment: Some(payment) },
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Gateway callbacks  -------------------------------------------
/// The gateway's success redirect/callback. Registered for both GET and POST on `/orders/gateway/success`: the
/// gateway redirects browsers with GET and replays server-to-server with POST, both carrying the base64 `data`
/// parameter.
///
/// The signature is verified before anything is touched; replayed callbacks are answered idempotently.
pub async fn gateway_success<B: CheckoutDatabase>(
    query: web::Query<CallbackData>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received gateway success callback");
    let outcome = api.process_success_callback(&query.data).await.map_err(|e| {
        debug!("💻️ Could not process gateway callback. {e}");
        e
    })?;
    let response = match outcome {
        CallbackOutcome::Confirmed(order) => {
            CallbackResponse { success: true, message: "Payment verified. Order confirmed.".to_string(), order }
        },
        CallbackOutcome::AlreadyProcessed(order) => {
            CallbackResponse { success: true, message: "Payment was already processed.".to_string(), order }
        },
        CallbackOutcome::Failed(order) => CallbackResponse {
            success: false,
            message: "Payment was not completed. The order has been cancelled.".to_string(),
            order,
        },
        CallbackOutcome::Pending(order) => CallbackResponse {
            success: false,
            message: "The gateway still reports this payment as pending.".to_string(),
            order,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

/// The gateway's failure/cancel redirect. Marks the payment failed and the order cancelled; idempotent for orders
/// that are already terminal.
pub async fn gateway_failure<B: CheckoutDatabase>(
    query: web::Query<FailureParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let transaction_id = TransactionId::from(query.into_inner().transaction_uuid);
    debug!("💻️ Received gateway failure redirect for [{transaction_id}]");
    let order = api.process_failure_redirect(&transaction_id).await.map_err(|e| {
        debug!("💻️ Could not process gateway failure redirect. {e}");
        e
    })?;
    let response = CallbackResponse {
        success: false,
        message: "Payment failed or was cancelled.".to_string(),
        order,
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(payment_status => Get "/orders/{order_id}/payment-status" impl CheckoutDatabase);
/// Client-initiated reconciliation: "did my payment go through?". Re-polls the gateway for pending gateway orders
/// and reports the last-known local state when the gateway cannot be reached.
pub async fn payment_status<B: CheckoutDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payment status for {order_id}");
    let report = api.payment_status(&order_id).await.map_err(|e| {
        debug!("💻️ Could not check payment status. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(PaymentStatusResponse::from(report)))
}

route!(update_order_status => Put "/orders/{order_id}/status" impl CheckoutDatabase);
/// Operator-driven status transition. Invalid targets are rejected without mutation; the permitted moves and their
/// side effects (payment collection on COD delivery, stock release on cancellation) live in the engine.
pub async fn update_order_status<B: CheckoutDatabase>(
    path: web::Path<OrderId>,
    body: web::Json<StatusUpdateParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let new_status = body.into_inner().status;
    info!("💻️ PUT order status {order_id} -> {new_status}");
    let order = api.set_order_status(&order_id, new_status).await.map_err(|e| {
        debug!("💻️ Could not update order status. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_for_user => Get "/orders/user/{owner_key}" impl OrderManagement);
/// All orders belonging to a customer, newest first.
pub async fn orders_for_user<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let owner_key = path.into_inner();
    debug!("💻️ GET orders for {owner_key}");
    let orders = api.orders_for_customer(&owner_key).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id})");
    let order = api
        .order_by_id(&order_id)
        .await?
        .ok_or(ServerError::Checkout(CheckoutError::OrderNotFound(order_id)))?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart/{owner_key}" impl CartManagement);
pub async fn my_cart<B: CartManagement>(
    path: web::Path<String>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let owner_key = path.into_inner();
    debug!("💻️ GET cart for {owner_key}");
    let cart = api.cart(&owner_key).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(set_cart_item => Post "/cart/{owner_key}/items" impl CartManagement);
/// Upserts a cart line at the requested quantity (last write wins). A quantity of zero removes the line.
pub async fn set_cart_item<B: CartManagement>(
    path: web::Path<String>,
    body: web::Json<CartItemParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let owner_key = path.into_inner();
    let CartItemParams { product_id, quantity } = body.into_inner();
    debug!("💻️ POST cart item ({owner_key}, {product_id}) x{quantity}");
    let cart = api.set_item(&owner_key, product_id, quantity).await.map_err(|e| {
        debug!("💻️ Could not update cart. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(remove_cart_item => Delete "/cart/{owner_key}/items/{product_id}" impl CartManagement);
pub async fn remove_cart_item<B: CartManagement>(
    path: web::Path<(String, i64)>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (owner_key, product_id) = path.into_inner();
    debug!("💻️ DELETE cart item ({owner_key}, {product_id})");
    let cart = api.remove_item(&owner_key, product_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use storefront_payment_engine::{
    gateway::GatewayClient, run_migrations, CartApi, OrderFlowApi, OrdersApi, SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        gateway_failure, gateway_success, health, MyCartRoute, OrderByIdRoute, OrdersForUserRoute,
        PaymentStatusRoute, PlaceOrderRoute, RemoveCartItemRoute, SetCartItemRoute, UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateway =
        GatewayClient::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let pricing = config.pricing;
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), gateway.clone());
        let orders_api = OrdersApi::new(db.clone());
        let cart_api = CartApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(pricing))
            .service(health)
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            // The gateway calls back with GET (browser redirect) and POST (server-to-server replay).
            .service(
                web::resource("/orders/gateway/success")
                    .name("gateway_success")
                    .route(web::get().to(gateway_success::<SqliteDatabase>))
                    .route(web::post().to(gateway_success::<SqliteDatabase>)),
            )
            .service(
                web::resource("/orders/gateway/failure")
                    .name("gateway_failure")
                    .route(web::get().to(gateway_failure::<SqliteDatabase>))
                    .route(web::post().to(gateway_failure::<SqliteDatabase>)),
            )
            // Registration order matters: the literal segments must be tried before `{order_id}` swallows them.
            .service(OrdersForUserRoute::<SqliteDatabase>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(SetCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

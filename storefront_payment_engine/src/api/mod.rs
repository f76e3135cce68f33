pub mod cart_api;
pub mod objects;
pub mod order_flow_api;
pub mod orders_api;

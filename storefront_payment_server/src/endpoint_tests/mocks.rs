use mockall::mock;
use storefront_payment_engine::{
    db_types::{Cart, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, TransactionId},
    traits::{
        CartManagement, CheckoutDatabase, CheckoutError, GatewayReceipt, InventoryManagement, OrderManagement,
        Settlement,
    },
};

mock! {
    pub CheckoutManager {}
    impl OrderManagement for CheckoutManager {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError>;
        async fn fetch_order_by_transaction_id(&self, transaction_id: &TransactionId) -> Result<Option<Order>, CheckoutError>;
        async fn fetch_orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError>;
    }
    impl CartManagement for CheckoutManager {
        async fn fetch_cart(&self, owner_key: &str) -> Result<Cart, CheckoutError>;
        async fn upsert_cart_item(&self, owner_key: &str, product_id: i64, quantity: i64) -> Result<Cart, CheckoutError>;
        async fn remove_cart_item(&self, owner_key: &str, product_id: i64) -> Result<Cart, CheckoutError>;
        async fn clear_cart(&self, owner_key: &str) -> Result<(), CheckoutError>;
    }
    impl InventoryManagement for CheckoutManager {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CheckoutError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutError>;
    }
    impl CheckoutDatabase for CheckoutManager {
        fn url(&self) -> &str;
        async fn create_cash_order(&self, order: NewOrder) -> Result<Order, CheckoutError>;
        async fn create_gateway_order(&self, order: NewOrder) -> Result<Order, CheckoutError>;
        async fn settle_gateway_payment(&self, transaction_id: &TransactionId, receipt: GatewayReceipt) -> Result<Settlement, CheckoutError>;
        async fn fail_gateway_payment(&self, transaction_id: &TransactionId) -> Result<Order, CheckoutError>;
        async fn set_order_status(&self, order_id: &OrderId, new_status: OrderStatus) -> Result<Order, CheckoutError>;
    }
}

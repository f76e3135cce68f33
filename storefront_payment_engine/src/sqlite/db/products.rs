use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    traits::CheckoutError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CheckoutError> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (name, price, stock, image_url) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.image_url)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Atomically decrements stock if — and only if — at least `quantity` units are available. The check and the
/// decrement are a single conditional UPDATE, so two concurrent reservations can never both pass a stale
/// availability check. On failure the current availability is read back so the error can say exactly how many units
/// the caller may still request.
pub async fn try_reserve(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), CheckoutError> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND stock >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(());
    }
    match fetch_product(product_id, conn).await? {
        Some(product) => {
            Err(CheckoutError::InsufficientStock { product_id, requested: quantity, available: product.stock })
        },
        None => Err(CheckoutError::ProductNotFound(product_id)),
    }
}

/// Returns previously reserved units to stock. Used when an order is cancelled after its stock was reserved.
pub async fn release(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), CheckoutError> {
    let result =
        sqlx::query("UPDATE products SET stock = stock + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(quantity)
            .bind(product_id)
            .execute(conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(CheckoutError::ProductNotFound(product_id));
    }
    Ok(())
}

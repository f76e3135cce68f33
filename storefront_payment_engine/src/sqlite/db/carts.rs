use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{Cart, CartItem, Product};

/// Returns the owner's cart. Owners without a cart row get an empty cart back; callers never need to distinguish
/// "no cart" from "empty cart".
pub async fn fetch_cart(owner_key: &str, conn: &mut SqliteConnection) -> Result<Cart, sqlx::Error> {
    let row: Option<(i64, DateTime<Utc>)> =
        sqlx::query_as("SELECT id, updated_at FROM carts WHERE owner_key = $1")
            .bind(owner_key)
            .fetch_optional(&mut *conn)
            .await?;
    let (cart_id, updated_at) = match row {
        Some(row) => row,
        None => return Ok(Cart::empty(owner_key)),
    };
    let items: Vec<CartItem> = sqlx::query_as(
        "SELECT product_id, quantity, unit_price, name, image_url FROM cart_items WHERE cart_id = $1 ORDER BY id",
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await?;
    Ok(Cart { owner_key: owner_key.to_string(), items, updated_at })
}

/// Deletes every line in the owner's cart, keeping the cart row. Idempotent: a missing or already-empty cart is a
/// no-op.
pub async fn clear_cart(owner_key: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE owner_key = $1)")
            .bind(owner_key)
            .execute(&mut *conn)
            .await?;
    if result.rows_affected() > 0 {
        trace!("📝️ Cleared {} lines from the cart of {owner_key}", result.rows_affected());
        sqlx::query("UPDATE carts SET updated_at = CURRENT_TIMESTAMP WHERE owner_key = $1")
            .bind(owner_key)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Inserts or replaces a cart line, snapshotting the product's current price, name and image. Last write wins on
/// the (cart, product) pair. The cart row is created lazily on first use.
pub async fn upsert_item(
    owner_key: &str,
    product: &Product,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO carts (owner_key) VALUES ($1) ON CONFLICT (owner_key) DO NOTHING")
        .bind(owner_key)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, unit_price, name, image_url)
            SELECT id, $2, $3, $4, $5, $6 FROM carts WHERE owner_key = $1
            ON CONFLICT (cart_id, product_id) DO UPDATE SET
                quantity = excluded.quantity,
                unit_price = excluded.unit_price,
                name = excluded.name,
                image_url = excluded.image_url;
        "#,
    )
    .bind(owner_key)
    .bind(product.id)
    .bind(quantity)
    .bind(product.price)
    .bind(&product.name)
    .bind(&product.image_url)
    .execute(&mut *conn)
    .await?;
    sqlx::query("UPDATE carts SET updated_at = CURRENT_TIMESTAMP WHERE owner_key = $1")
        .bind(owner_key)
        .execute(conn)
        .await?;
    Ok(())
}

/// Removes a single line. A no-op when the line or the cart does not exist.
pub async fn remove_item(owner_key: &str, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "DELETE FROM cart_items WHERE product_id = $2 AND cart_id IN (SELECT id FROM carts WHERE owner_key = $1)",
    )
    .bind(owner_key)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(())
}

use sqlx::PgPool;

use crate::{error::Result, models::WishlistEntry};

pub async fn get_wishlist(pool: &PgPool, user_id: i32) -> Result<Vec<WishlistEntry>> {
    let entries = sqlx::query_as::<_, WishlistEntry>(
        "SELECT p.*, w.created_at AS added_at
         FROM wishlist_items w
         INNER JOIN products p ON p.id = w.product_id
         WHERE w.user_id = $1
         ORDER BY w.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn add_to_wishlist(pool: &PgPool, user_id: i32, product_id: i32) -> Result<()> {
    sqlx::query(
        "INSERT INTO wishlist_items (user_id, product_id)
         VALUES ($1, $2)
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove_from_wishlist(pool: &PgPool, user_id: i32, product_id: i32) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

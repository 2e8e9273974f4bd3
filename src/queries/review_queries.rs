use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Review, ReviewResponse},
};

pub async fn list_for_product(pool: &PgPool, product_id: i32) -> Result<Vec<ReviewResponse>> {
    let reviews = sqlx::query_as::<_, ReviewResponse>(
        "SELECT r.*, u.name AS user_name
         FROM reviews r
         INNER JOIN users u ON u.id = r.user_id
         WHERE r.product_id = $1
         ORDER BY r.created_at DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

pub async fn find_by_user_and_product(
    pool: &PgPool,
    user_id: i32,
    product_id: i32,
) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE user_id = $1 AND product_id = $2",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(review)
}

pub async fn create_review(
    pool: &PgPool,
    user_id: i32,
    product_id: i32,
    rating: i32,
    comment: Option<&str>,
) -> Result<Review> {
    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (product_id, user_id, rating, comment)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(product_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await?;

    Ok(review)
}

pub async fn delete_review(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

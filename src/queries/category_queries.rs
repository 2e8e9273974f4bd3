use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Category, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
};

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

/// Case-insensitive name lookup, optionally ignoring one row (for updates).
pub async fn find_by_name_ci(
    pool: &PgPool,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories
         WHERE LOWER(name) = LOWER($1) AND ($2::int IS NULL OR id != $2)",
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

pub async fn get_all_with_counts(pool: &PgPool) -> Result<Vec<CategoryResponse>> {
    let categories = sqlx::query_as::<_, CategoryResponse>(
        "SELECT c.*, COUNT(p.id) AS product_count
         FROM categories c
         LEFT JOIN products p ON p.category_id = c.id
         GROUP BY c.id
         ORDER BY c.name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn find_with_count(pool: &PgPool, id: i32) -> Result<Option<CategoryResponse>> {
    let category = sqlx::query_as::<_, CategoryResponse>(
        "SELECT c.*, COUNT(p.id) AS product_count
         FROM categories c
         LEFT JOIN products p ON p.category_id = c.id
         WHERE c.id = $1
         GROUP BY c.id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

pub async fn create_category(pool: &PgPool, req: &CreateCategoryRequest) -> Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, description, image_url)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.image_url)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

pub async fn update_category(
    pool: &PgPool,
    id: i32,
    req: &UpdateCategoryRequest,
) -> Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            image_url = COALESCE($3, image_url),
            updated_at = NOW()
         WHERE id = $4 RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.image_url)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

/// Deleting a category detaches its products instead of deleting them.
pub async fn delete_category(pool: &PgPool, id: i32) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE products SET category_id = NULL, updated_at = NOW() WHERE category_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}

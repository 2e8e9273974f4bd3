use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Result,
    models::{CreateProductRequest, Product, ProductQuery, ProductSearchResponse, SortBy, UpdateProductRequest},
};

const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 100;

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i32]) -> Result<HashMap<i32, Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub async fn find_by_name_ci(
    pool: &PgPool,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT * FROM products
         WHERE LOWER(name) = LOWER($1) AND ($2::int IS NULL OR id != $2)",
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn search_products(pool: &PgPool, params: ProductQuery) -> Result<ProductSearchResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0);

    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT *, COUNT(*) OVER() AS total_count FROM products WHERE 1=1");

    // text search
    if let Some(ref q) = params.query {
        query.push(" AND (name ILIKE ");
        query.push_bind(format!("%{}%", q));
        query.push(" OR description ILIKE ");
        query.push_bind(format!("%{}%", q));
        query.push(")");
    }

    // category
    if let Some(category_id) = params.category_id {
        query.push(" AND category_id = ");
        query.push_bind(category_id);
    }

    // price range
    if let Some(price_from) = params.price_from {
        query.push(" AND price >= ");
        query.push_bind(price_from);
    }

    if let Some(price_to) = params.price_to {
        query.push(" AND price <= ");
        query.push_bind(price_to);
    }

    // sort
    match params.sort_by {
        Some(SortBy::PriceAsc) => query.push(" ORDER BY price ASC"),
        Some(SortBy::PriceDesc) => query.push(" ORDER BY price DESC"),
        Some(SortBy::Newest) | None => query.push(" ORDER BY created_at DESC"),
    };

    query.push(" LIMIT ");
    query.push_bind(limit);
    query.push(" OFFSET ");
    query.push_bind(offset);

    #[derive(sqlx::FromRow)]
    struct SearchResult {
        #[sqlx(flatten)]
        product: Product,
        total_count: i64,
    }

    let results = query.build_query_as::<SearchResult>().fetch_all(pool).await?;

    let total = results.first().map(|r| r.total_count).unwrap_or(0);
    let products = results.into_iter().map(|r| r.product).collect();

    Ok(ProductSearchResponse {
        products,
        total,
        limit,
        offset,
    })
}

pub async fn create_product(pool: &PgPool, req: &CreateProductRequest) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, stock, image_url, category_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock.unwrap_or(0))
    .bind(&req.image_url)
    .bind(req.category_id)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    id: i32,
    req: &UpdateProductRequest,
) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            price = COALESCE($3, price),
            stock = COALESCE($4, stock),
            image_url = COALESCE($5, image_url),
            category_id = COALESCE($6, category_id),
            updated_at = NOW()
         WHERE id = $7 RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(&req.image_url)
    .bind(req.category_id)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn delete_product(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

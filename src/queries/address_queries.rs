use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Address, AddressRequest},
};

pub async fn get_user_addresses(pool: &PgPool, user_id: i32) -> Result<Vec<Address>> {
    let addresses = sqlx::query_as::<_, Address>(
        "SELECT * FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(addresses)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Address>> {
    let address = sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(address)
}

pub async fn create_address(
    pool: &PgPool,
    user_id: i32,
    req: &AddressRequest,
) -> Result<Address> {
    let is_default = req.is_default.unwrap_or(false);

    let mut tx = pool.begin().await?;

    if is_default {
        clear_default(&mut tx, user_id).await?;
    }

    let address = sqlx::query_as::<_, Address>(
        "INSERT INTO addresses (user_id, label, recipient, street, city, region, postal_code, country, phone, is_default)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING *",
    )
    .bind(user_id)
    .bind(&req.label)
    .bind(&req.recipient)
    .bind(&req.street)
    .bind(&req.city)
    .bind(&req.region)
    .bind(&req.postal_code)
    .bind(&req.country)
    .bind(&req.phone)
    .bind(is_default)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(address)
}

pub async fn update_address(pool: &PgPool, id: i32, req: &AddressRequest) -> Result<Address> {
    let mut tx = pool.begin().await?;

    if req.is_default == Some(true) {
        let (user_id,): (i32,) = sqlx::query_as("SELECT user_id FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        clear_default(&mut tx, user_id).await?;
    }

    let address = sqlx::query_as::<_, Address>(
        "UPDATE addresses SET
            label = COALESCE($1, label),
            recipient = $2,
            street = $3,
            city = $4,
            region = $5,
            postal_code = $6,
            country = $7,
            phone = $8,
            is_default = COALESCE($9, is_default),
            updated_at = NOW()
         WHERE id = $10 RETURNING *",
    )
    .bind(&req.label)
    .bind(&req.recipient)
    .bind(&req.street)
    .bind(&req.city)
    .bind(&req.region)
    .bind(&req.postal_code)
    .bind(&req.country)
    .bind(&req.phone)
    .bind(req.is_default)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(address)
}

pub async fn delete_address(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Makes this address the user's only default.
pub async fn set_default(pool: &PgPool, id: i32, user_id: i32) -> Result<Option<Address>> {
    let mut tx = pool.begin().await?;

    clear_default(&mut tx, user_id).await?;

    let address = sqlx::query_as::<_, Address>(
        "UPDATE addresses SET is_default = TRUE, updated_at = NOW()
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(address)
}

async fn clear_default(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: i32,
) -> Result<()> {
    sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

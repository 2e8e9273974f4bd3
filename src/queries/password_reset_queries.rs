use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::{error::Result, models::PasswordReset};

const TOKEN_EXPIRY_HOURS: i64 = 1;

pub async fn create_reset_token(pool: &PgPool, email: &str, token: &str) -> Result<PasswordReset> {
    let expires_at = Utc::now() + Duration::hours(TOKEN_EXPIRY_HOURS);

    // Only the most recent token should be redeemable
    sqlx::query("DELETE FROM password_resets WHERE email = $1 AND used = FALSE")
        .bind(email)
        .execute(pool)
        .await?;

    let reset = sqlx::query_as::<_, PasswordReset>(
        "INSERT INTO password_resets (email, token, expires_at)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(email)
    .bind(token)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(reset)
}

pub async fn find_valid_token(
    pool: &PgPool,
    email: &str,
    token: &str,
) -> Result<Option<PasswordReset>> {
    let reset = sqlx::query_as::<_, PasswordReset>(
        "SELECT * FROM password_resets
         WHERE email = $1 AND token = $2 AND used = FALSE AND expires_at > NOW()
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(email)
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(reset)
}

pub async fn mark_used(pool: &PgPool, id: i32) -> Result<()> {
    sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

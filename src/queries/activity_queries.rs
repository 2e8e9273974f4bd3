use sqlx::PgPool;

use crate::{
    error::Result,
    models::{ActivityLog, Notification},
};

/// Best-effort audit write. Failures are logged, never surfaced.
pub async fn record_activity(pool: &PgPool, user_id: Option<i32>, action: &str, detail: &str) {
    let result = sqlx::query("INSERT INTO activity_logs (user_id, action, detail) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(action)
        .bind(detail)
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::warn!("Failed to record activity '{}': {:?}", action, e);
    }
}

/// Best-effort notification write. Failures are logged, never surfaced.
pub async fn notify_user(pool: &PgPool, user_id: i32, title: &str, body: &str) {
    let result =
        sqlx::query("INSERT INTO notifications (user_id, title, body) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(title)
            .bind(body)
            .execute(pool)
            .await;

    if let Err(e) = result {
        tracing::warn!("Failed to create notification for user {}: {:?}", user_id, e);
    }
}

pub async fn get_user_notifications(pool: &PgPool, user_id: i32) -> Result<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT 50",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn mark_notification_read(pool: &PgPool, id: i32, user_id: i32) -> Result<u64> {
    let result =
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

pub async fn recent_activity(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLog>> {
    let entries = sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_logs ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

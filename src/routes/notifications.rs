use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::Notification,
    queries::activity_queries,
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Notification>>> {
    let user_id = extract_user_id(&claims)?;
    let notifications = activity_queries::get_user_notifications(&state.db, user_id).await?;

    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let user_id = extract_user_id(&claims)?;

    let updated = activity_queries::mark_notification_read(&state.db, id, user_id).await?;

    if updated == 0 {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(StatusCode::OK)
}

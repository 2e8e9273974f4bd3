use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AdminUserRequest, User, UserQuery, UserRole, UserSearchResponse},
    queries::{activity_queries, user_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<UserSearchResponse>> {
    let response = user_queries::search_users(&state.db, params).await?;

    Ok(Json(response))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AdminUserRequest>,
) -> Result<Json<User>> {
    if user_queries::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("User with id {} not found", id)));
    }

    let user = user_queries::update_user(&state.db, id, &payload).await?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let user = user_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

    if user.role == UserRole::Admin
        && user.is_active
        && user_queries::count_other_active_admins(&state.db, id).await? == 0
    {
        return Err(AppError::BadRequest(
            "Cannot delete the last active admin account".to_string(),
        ));
    }

    user_queries::delete_user(&state.db, id).await?;

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "user.deleted",
        &format!("User {} (id {})", user.email, user.id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

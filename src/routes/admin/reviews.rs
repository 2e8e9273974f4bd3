use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    queries::review_queries,
    utils::extractors::require_admin,
    utils::jwt::Claims,
};

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    require_admin(&claims)?;

    let deleted = review_queries::delete_review(&state.db, id).await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Review not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

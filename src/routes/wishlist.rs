use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::WishlistEntry,
    queries::{product_queries, wishlist_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn get_wishlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<WishlistEntry>>> {
    let user_id = extract_user_id(&claims)?;
    let entries = wishlist_queries::get_wishlist(&state.db, user_id).await?;

    Ok(Json(entries))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    let user_id = extract_user_id(&claims)?;

    if product_queries::find_by_id(&state.db, product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    wishlist_queries::add_to_wishlist(&state.db, user_id, product_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    let user_id = extract_user_id(&claims)?;

    let removed = wishlist_queries::remove_from_wishlist(&state.db, user_id, product_id).await?;

    if removed == 0 {
        return Err(AppError::NotFound("Product not in wishlist".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

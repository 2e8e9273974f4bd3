use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateReviewRequest, Review, ReviewResponse},
    queries::{product_queries, review_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<ReviewResponse>>> {
    if product_queries::find_by_id(&state.db, product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let reviews = review_queries::list_for_product(&state.db, product_id).await?;

    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<Json<Review>> {
    let user_id = extract_user_id(&claims)?;

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".to_string()));
    }

    if product_queries::find_by_id(&state.db, payload.product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    if review_queries::find_by_user_and_product(&state.db, user_id, payload.product_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You have already reviewed this product".to_string(),
        ));
    }

    let review = review_queries::create_review(
        &state.db,
        user_id,
        payload.product_id,
        payload.rating,
        payload.comment.as_deref(),
    )
    .await?;

    Ok(Json(review))
}

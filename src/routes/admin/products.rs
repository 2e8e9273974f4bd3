use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductRequest, Product, ProductQuery, ProductSearchResponse, UpdateProductRequest},
    queries::{activity_queries, category_queries, product_queries},
    utils::extractors::{extract_user_id, require_admin},
    utils::jwt::Claims,
};

pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<ProductSearchResponse>> {
    let response = product_queries::search_products(&state.db, params).await?;

    Ok(Json(response))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<Product>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    if payload.price.is_sign_negative() {
        return Err(AppError::BadRequest("Price cannot be negative".to_string()));
    }

    if payload.stock.unwrap_or(0) < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative".to_string()));
    }

    if product_queries::find_by_name_ci(&state.db, &payload.name, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Product named '{}' already exists",
            payload.name
        )));
    }

    if let Some(category_id) = payload.category_id {
        if category_queries::find_by_id(&state.db, category_id).await?.is_none() {
            return Err(AppError::BadRequest("Category does not exist".to_string()));
        }
    }

    let product = product_queries::create_product(&state.db, &payload).await?;

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "product.created",
        &format!("Product '{}' (id {})", product.name, product.id),
    )
    .await;

    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if product_queries::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Product with id {} not found", id)));
    }

    if let Some(ref name) = payload.name {
        if product_queries::find_by_name_ci(&state.db, name, Some(id))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Product named '{}' already exists",
                name
            )));
        }
    }

    if let Some(category_id) = payload.category_id {
        if category_queries::find_by_id(&state.db, category_id).await?.is_none() {
            return Err(AppError::BadRequest("Category does not exist".to_string()));
        }
    }

    let product = product_queries::update_product(&state.db, id, &payload).await?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    require_admin(&claims)?;

    let deleted = product_queries::delete_product(&state.db, id).await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "product.deleted",
        &format!("Product id {}", id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

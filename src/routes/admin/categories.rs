use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Category, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
    queries::{activity_queries, category_queries},
    utils::extractors::{extract_user_id, require_admin},
    utils::jwt::Claims,
};

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>> {
    let categories = category_queries::get_all_with_counts(&state.db).await?;

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<Category>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    if category_queries::find_by_name_ci(&state.db, &payload.name, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Category named '{}' already exists",
            payload.name
        )));
    }

    let category = category_queries::create_category(&state.db, &payload).await?;

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "category.created",
        &format!("Category '{}' (id {})", category.name, category.id),
    )
    .await;

    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    if category_queries::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Category with id {} not found", id)));
    }

    if let Some(ref name) = payload.name {
        if category_queries::find_by_name_ci(&state.db, name, Some(id))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Category named '{}' already exists",
                name
            )));
        }
    }

    let category = category_queries::update_category(&state.db, id, &payload).await?;

    Ok(Json(category))
}

/// Products under the category are detached, not deleted.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    require_admin(&claims)?;

    let deleted = category_queries::delete_category(&state.db, id).await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "category.deleted",
        &format!("Category id {}", id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

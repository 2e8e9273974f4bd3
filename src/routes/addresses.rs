use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Address, AddressRequest},
    queries::address_queries,
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Address>>> {
    let user_id = extract_user_id(&claims)?;
    let addresses = address_queries::get_user_addresses(&state.db, user_id).await?;

    Ok(Json(addresses))
}

pub async fn add_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddressRequest>,
) -> Result<Json<Address>> {
    let user_id = extract_user_id(&claims)?;
    let address = address_queries::create_address(&state.db, user_id, &payload).await?;

    Ok(Json(address))
}

pub async fn update_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<AddressRequest>,
) -> Result<Json<Address>> {
    let user_id = extract_user_id(&claims)?;
    fetch_owned(&state, id, user_id).await?;

    let address = address_queries::update_address(&state.db, id, &payload).await?;

    Ok(Json(address))
}

pub async fn delete_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let user_id = extract_user_id(&claims)?;
    fetch_owned(&state, id, user_id).await?;

    address_queries::delete_address(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_default_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Address>> {
    let user_id = extract_user_id(&claims)?;

    let address = address_queries::set_default(&state.db, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;

    Ok(Json(address))
}

async fn fetch_owned(state: &AppState, id: i32, user_id: i32) -> Result<Address> {
    let address = address_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;

    if address.user_id != user_id {
        return Err(AppError::Forbidden("Not your address".to_string()));
    }

    Ok(address)
}

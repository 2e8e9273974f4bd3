use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AvatarResponse, ChangePasswordRequest, ProfileResponse, UpdatePreferencesRequest,
        UpdateProfileRequest, User, UserPreferences,
    },
    queries::{activity_queries, order_queries, user_queries},
    services::avatar_service,
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>> {
    let user_id = extract_user_id(&claims)?;

    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let (order_count, total_spent) = order_queries::stats_for_user(&state.db, user_id).await?;

    Ok(Json(ProfileResponse {
        user,
        order_count,
        total_spent,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let user_id = extract_user_id(&claims)?;

    if let Some(ref name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".to_string()));
        }
    }

    let user = user_queries::update_profile(
        &state.db,
        user_id,
        payload.name.as_deref().map(str::trim),
        payload.phone.as_deref(),
    )
    .await?;

    Ok(Json(user))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    let user_id = extract_user_id(&claims)?;

    if payload.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let password_hash = user.password.as_ref().ok_or_else(|| {
        AppError::BadRequest("Federated accounts have no password".to_string())
    })?;

    let current_valid = bcrypt::verify(&payload.current_password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !current_valid {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
    }

    if payload.new_password == payload.current_password {
        return Err(AppError::BadRequest(
            "New password must be different from the current password".to_string(),
        ));
    }

    let new_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    user_queries::update_password(&state.db, user_id, &new_hash).await?;

    tracing::info!("Password changed for user {}", user_id);

    Ok(StatusCode::OK)
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserPreferences>> {
    let user_id = extract_user_id(&claims)?;

    match user_queries::get_preferences(&state.db, user_id).await? {
        Some(preferences) => Ok(Json(preferences)),
        None => {
            // First read materializes the default row
            let defaults = UpdatePreferencesRequest {
                newsletter: None,
                order_updates: None,
                promotions: None,
            };
            let preferences = user_queries::upsert_preferences(&state.db, user_id, &defaults).await?;
            Ok(Json(preferences))
        }
    }
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<Json<UserPreferences>> {
    let user_id = extract_user_id(&claims)?;

    let preferences = user_queries::upsert_preferences(&state.db, user_id, &payload).await?;

    Ok(Json(preferences))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>> {
    let user_id = extract_user_id(&claims)?;

    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
        .ok_or_else(|| AppError::BadRequest("Avatar file is required".to_string()))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| AppError::BadRequest("Avatar content type is required".to_string()))?
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read avatar: {}", e)))?;

    let extension = avatar_service::validate_avatar(&content_type, data.len())?;

    let key = avatar_service::avatar_key(user_id, chrono::Utc::now().timestamp(), extension);
    avatar_service::save_avatar(&state.uploads_dir, &key, &data).await?;

    if let Some(ref old_url) = user.avatar_url {
        avatar_service::delete_avatar_by_url(&state.uploads_dir, old_url).await;
    }

    let avatar_url = format!("{}/uploads/{}", state.public_base_url, key);
    user_queries::update_avatar_url(&state.db, user_id, &avatar_url).await?;

    Ok(Json(AvatarResponse { avatar_url }))
}

pub async fn deactivate_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    let user_id = extract_user_id(&claims)?;

    user_queries::set_active(&state.db, user_id, false).await?;

    activity_queries::record_activity(
        &state.db,
        Some(user_id),
        "user.deactivated",
        "Account deactivated by owner",
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

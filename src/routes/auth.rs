use axum::{Json, extract::State};
use google_oauth::AsyncClient;
use rand::Rng;
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AuthResponse, ForgotPasswordRequest, GoogleAuthRequest, LoginRequest, RegisterRequest,
        ResetPasswordRequest,
    },
    queries::{activity_queries, password_reset_queries, user_queries},
    services::email_service,
    utils::jwt,
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    validate_registration(&payload)?;

    if user_queries::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    let user = user_queries::create_user(
        &state.db,
        payload.name.trim(),
        &payload.email,
        &password_hash,
        payload.phone.as_deref(),
    )
    .await?;

    activity_queries::record_activity(
        &state.db,
        Some(user.id),
        "user.registered",
        &format!("New account for {}", user.email),
    )
    .await;

    let token = jwt::generate_token(&user)?;

    Ok(Json(AuthResponse { token }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = user_queries::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".to_string()));
    }

    let password_hash = user
        .password
        .as_ref()
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let is_valid = bcrypt::verify(&payload.password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !is_valid {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    let token = jwt::generate_token(&user)?;

    Ok(Json(AuthResponse { token }))
}

pub async fn google_auth(
    State(state): State<AppState>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>> {
    let google_client_id = std::env::var("GOOGLE_CLIENT_ID")
        .map_err(|_| AppError::ConfigError("GOOGLE_CLIENT_ID not set".to_string()))?;

    let client = AsyncClient::new(&google_client_id);

    let token_payload = client
        .validate_id_token(&payload.id_token)
        .await
        .map_err(|e| AppError::Unauthorized(format!("Invalid Google token: {}", e)))?;

    let email = token_payload
        .email
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Email not provided by Google".to_string()))?;
    let name = token_payload
        .name
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Name not provided by Google".to_string()))?;

    let user = match user_queries::find_by_email(&state.db, email).await? {
        Some(existing) => {
            if !existing.is_active {
                return Err(AppError::Unauthorized("Account is deactivated".to_string()));
            }

            if existing.password.is_some() {
                // Local account logging in through Google becomes federated
                user_queries::upgrade_to_google(&state.db, existing.id).await?
            } else {
                existing
            }
        }
        None => {
            let user = user_queries::create_google_user(&state.db, name, email).await?;

            activity_queries::record_activity(
                &state.db,
                Some(user.id),
                "user.registered",
                &format!("New Google account for {}", user.email),
            )
            .await;

            user
        }
    };

    let token = jwt::generate_token(&user)?;

    Ok(Json(AuthResponse { token }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    validate_email(&payload.email)?;

    // Same response whether or not the account exists
    let response = Json(json!({
        "message": "If that email is registered, a reset link has been sent"
    }));

    let Some(user) = user_queries::find_by_email(&state.db, &payload.email).await? else {
        return Ok(response);
    };

    if user.password.is_none() {
        // Federated accounts have no password to reset
        return Ok(response);
    }

    let token = generate_reset_token();
    password_reset_queries::create_reset_token(&state.db, &user.email, &token).await?;

    let reset_url = format!(
        "{}/reset-password?email={}&token={}",
        state.frontend_url, user.email, token
    );

    email_service::send_password_reset_email(&state.ses, &user.email, &reset_url, &state.email_sender)
        .await?;

    tracing::info!("Password reset email sent to {}", user.email);

    Ok(response)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    if payload.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let reset = password_reset_queries::find_valid_token(&state.db, &payload.email, &payload.token)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    let user = user_queries::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    let password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    user_queries::update_password(&state.db, user.id, &password_hash).await?;
    password_reset_queries::mark_used(&state.db, reset.id).await?;

    tracing::info!("Password reset completed for {}", user.email);

    Ok(Json(json!({ "message": "Password has been reset" })))
}

fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    (0..32).map(|_| format!("{:02x}", rng.random::<u8>())).collect()
}

fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    validate_email(&payload.email)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(validate_registration(&request("Nino", "nino@example.com", "s3cret-pass")).is_ok());
    }

    #[test]
    fn rejects_bad_email() {
        assert!(validate_registration(&request("Nino", "not-an-email", "s3cret-pass")).is_err());
        assert!(validate_registration(&request("Nino", "", "s3cret-pass")).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(validate_registration(&request("   ", "nino@example.com", "s3cret-pass")).is_err());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_registration(&request("Nino", "nino@example.com", "short")).is_err());
    }

    #[test]
    fn reset_tokens_are_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn reset_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }
}

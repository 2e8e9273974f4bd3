use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    error::{AppError, Result},
    models::{AuthProvider, User, UserRole},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub provider: AuthProvider,
    pub exp: usize,
}

pub fn generate_token(user: &User) -> Result<String> {
    let jwt_secret = env::var("JWT_SECRET")
        .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?;

    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(30))
        .ok_or_else(|| AppError::InternalError("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        provider: user.provider,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
}

pub fn verify_token(token: &str) -> Result<Claims> {
    let jwt_secret = env::var("JWT_SECRET")
        .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: 42,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: None,
            phone: None,
            role: UserRole::Customer,
            provider: AuthProvider::Local,
            avatar_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        std::env::set_var("JWT_SECRET", "test-secret");

        let user = test_user();
        let token = generate_token(&user).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, UserRole::Customer);
        assert_eq!(claims.provider, AuthProvider::Local);
    }

    #[test]
    fn tampered_token_is_rejected() {
        std::env::set_var("JWT_SECRET", "test-secret");

        let user = test_user();
        let mut token = generate_token(&user).unwrap();
        token.push('x');

        assert!(verify_token(&token).is_err());
    }
}

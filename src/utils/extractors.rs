use crate::{
    error::{AppError, Result},
    models::UserRole,
    utils::jwt::Claims,
};

pub fn extract_user_id(claims: &Claims) -> Result<i32> {
    claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))
}

/// Guard for staff endpoints whose destructive variants are admin-only.
pub fn require_admin(claims: &Claims) -> Result<()> {
    if claims.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

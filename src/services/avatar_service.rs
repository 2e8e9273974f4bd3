use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Maps an accepted avatar MIME type to its file extension.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn validate_avatar(content_type: &str, size: usize) -> Result<&'static str> {
    let extension = extension_for_content_type(content_type).ok_or_else(|| {
        AppError::BadRequest("Avatar must be a JPEG, PNG or WEBP image".to_string())
    })?;

    if size > MAX_AVATAR_BYTES {
        return Err(AppError::BadRequest(
            "Avatar must be at most 5 MB".to_string(),
        ));
    }

    Ok(extension)
}

/// Relative storage path for a user's avatar, unique per upload.
pub fn avatar_key(user_id: i32, timestamp: i64, extension: &str) -> String {
    format!("avatars/{}_{}.{}", user_id, timestamp, extension)
}

pub async fn save_avatar(uploads_dir: &str, key: &str, data: &[u8]) -> Result<()> {
    let path = PathBuf::from(uploads_dir).join(key);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {}", e)))?;
    }

    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to write avatar: {}", e)))?;

    Ok(())
}

/// Best-effort removal of a previously stored avatar. The URL stored on the
/// user record is `{public_base}/uploads/{key}`; anything not under the
/// uploads dir is ignored.
pub async fn delete_avatar_by_url(uploads_dir: &str, avatar_url: &str) {
    let Some(key) = avatar_url.split("/uploads/").nth(1) else {
        return;
    };

    if key.contains("..") {
        return;
    }

    let path = Path::new(uploads_dir).join(key);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Failed to delete old avatar {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_image_types() {
        assert_eq!(validate_avatar("image/jpeg", 1024).unwrap(), "jpg");
        assert_eq!(validate_avatar("image/png", 1024).unwrap(), "png");
        assert_eq!(validate_avatar("image/webp", 1024).unwrap(), "webp");
    }

    #[test]
    fn rejects_unsupported_image_types() {
        assert!(validate_avatar("image/gif", 1024).is_err());
        assert!(validate_avatar("application/pdf", 1024).is_err());
        assert!(validate_avatar("", 1024).is_err());
    }

    #[test]
    fn rejects_oversized_uploads() {
        assert!(validate_avatar("image/png", MAX_AVATAR_BYTES + 1).is_err());
        assert!(validate_avatar("image/png", MAX_AVATAR_BYTES).is_ok());
    }

    #[test]
    fn avatar_key_embeds_user_and_timestamp() {
        assert_eq!(avatar_key(7, 1700000000, "png"), "avatars/7_1700000000.png");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review joined with the reviewer's display name.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ReviewResponse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub user_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Product;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct WishlistEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

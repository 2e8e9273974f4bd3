use sqlx::PgPool;

use crate::{
    error::Result,
    models::{AdminUserRequest, UpdatePreferencesRequest, User, UserPreferences, UserQuery, UserSearchResponse},
};

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, password, phone) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(phone)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn create_google_user(pool: &PgPool, name: &str, email: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, provider) VALUES ($1, $2, 'google') RETURNING *",
    )
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Converts a local account to a federated one, dropping its password hash.
pub async fn upgrade_to_google(pool: &PgPool, id: i32) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET provider = 'google', password = NULL, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn update_password(pool: &PgPool, id: i32, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn update_profile(
    pool: &PgPool,
    id: i32,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET
            name = COALESCE($1, name),
            phone = COALESCE($2, phone),
            updated_at = NOW()
         WHERE id = $3 RETURNING *",
    )
    .bind(name)
    .bind(phone)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn update_avatar_url(pool: &PgPool, id: i32, avatar_url: &str) -> Result<()> {
    sqlx::query("UPDATE users SET avatar_url = $1, updated_at = NOW() WHERE id = $2")
        .bind(avatar_url)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_active(pool: &PgPool, id: i32, is_active: bool) -> Result<()> {
    sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

// Preferences

pub async fn get_preferences(pool: &PgPool, user_id: i32) -> Result<Option<UserPreferences>> {
    let preferences = sqlx::query_as::<_, UserPreferences>(
        "SELECT * FROM user_preferences WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(preferences)
}

pub async fn upsert_preferences(
    pool: &PgPool,
    user_id: i32,
    req: &UpdatePreferencesRequest,
) -> Result<UserPreferences> {
    let preferences = sqlx::query_as::<_, UserPreferences>(
        "INSERT INTO user_preferences (user_id, newsletter, order_updates, promotions)
         VALUES ($1, COALESCE($2, TRUE), COALESCE($3, TRUE), COALESCE($4, TRUE))
         ON CONFLICT (user_id) DO UPDATE SET
            newsletter = COALESCE($2, user_preferences.newsletter),
            order_updates = COALESCE($3, user_preferences.order_updates),
            promotions = COALESCE($4, user_preferences.promotions),
            updated_at = NOW()
         RETURNING *",
    )
    .bind(user_id)
    .bind(req.newsletter)
    .bind(req.order_updates)
    .bind(req.promotions)
    .fetch_one(pool)
    .await?;

    Ok(preferences)
}

// Admin user management

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

pub async fn search_users(pool: &PgPool, params: UserQuery) -> Result<UserSearchResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0);

    let mut query_builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
        "SELECT *, COUNT(*) OVER() AS total_count FROM users WHERE 1=1",
    );

    if let Some(id) = params.id {
        query_builder.push(" AND id = ");
        query_builder.push_bind(id);
    }

    if let Some(ref email) = params.email {
        query_builder.push(" AND email ILIKE ");
        query_builder.push_bind(format!("%{}%", email));
    }

    if let Some(role) = params.role {
        query_builder.push(" AND role = ");
        query_builder.push_bind(role);
    }

    query_builder.push(" ORDER BY created_at DESC");
    query_builder.push(" LIMIT ");
    query_builder.push_bind(limit);
    query_builder.push(" OFFSET ");
    query_builder.push_bind(offset);

    #[derive(sqlx::FromRow)]
    struct SearchResult {
        #[sqlx(flatten)]
        user: User,
        total_count: i64,
    }

    let results = query_builder
        .build_query_as::<SearchResult>()
        .fetch_all(pool)
        .await?;

    let total = results.first().map(|r| r.total_count).unwrap_or(0);
    let users = results.into_iter().map(|r| r.user).collect();

    Ok(UserSearchResponse {
        users,
        total,
        limit,
        offset,
    })
}

pub async fn update_user(pool: &PgPool, id: i32, req: &AdminUserRequest) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET
            name = COALESCE($1, name),
            role = COALESCE($2, role),
            is_active = COALESCE($3, is_active),
            updated_at = NOW()
         WHERE id = $4 RETURNING *",
    )
    .bind(req.name.as_deref())
    .bind(req.role)
    .bind(req.is_active)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn delete_user(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Number of active admin accounts other than the given user.
pub async fn count_other_active_admins(pool: &PgPool, id: i32) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = TRUE AND id != $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

use aws_sdk_sesv2::Client as SesClient;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{config, config::AppConfig, database, error::Result, routes};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub ses: SesClient,
    pub uploads_dir: String,
    pub public_base_url: String,
    pub frontend_url: String,
    pub email_sender: String,
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    let ses = config::load_ses_client().await?;

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .map_err(|e| {
            crate::error::AppError::ConfigError(format!("Failed to create uploads dir: {}", e))
        })?;

    let state = AppState {
        db: pool,
        ses,
        uploads_dir: config.uploads.dir.clone(),
        public_base_url: config.uploads.public_base_url.clone(),
        frontend_url: config.email.frontend_url.clone(),
        email_sender: config.email.sender.clone(),
    };

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                crate::error::AppError::ConfigError(format!("Invalid CORS origin: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = routes::create_router()
        .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors)
        .with_state(state);

    Ok(app)
}

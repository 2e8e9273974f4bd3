mod app_config;
mod ses_config;

pub use app_config::{
    AppConfig, CorsConfig, DatabaseConfig, EmailConfig, ServerConfig, UploadsConfig,
};
pub use ses_config::*;

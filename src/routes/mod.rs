mod account;
mod addresses;
pub mod admin;
mod auth;
mod categories;
mod health;
mod notifications;
pub mod orders;
mod products;
mod reviews;
mod wishlist;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", post(auth::google_auth))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories/{id}", get(categories::get_category))
        .route("/api/products", get(products::search_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/products/{id}/reviews", get(reviews::list_reviews));

    let customer = Router::new()
        .route("/api/orders", post(orders::create_order).get(orders::list_orders))
        .route("/api/orders/{id}", get(orders::get_order).put(orders::update_order))
        .route(
            "/api/account",
            get(account::get_profile)
                .put(account::update_profile)
                .delete(account::deactivate_account),
        )
        .route("/api/account/password", put(account::change_password))
        .route(
            "/api/account/preferences",
            get(account::get_preferences).put(account::update_preferences),
        )
        .route("/api/account/avatar", post(account::upload_avatar))
        .route("/api/addresses", get(addresses::list_addresses).post(addresses::add_address))
        .route(
            "/api/addresses/{id}",
            put(addresses::update_address).delete(addresses::delete_address),
        )
        .route("/api/addresses/{id}/default", post(addresses::set_default_address))
        .route("/api/wishlist", get(wishlist::get_wishlist))
        .route(
            "/api/wishlist/{product_id}",
            post(wishlist::add_to_wishlist).delete(wishlist::remove_from_wishlist),
        )
        .route("/api/reviews", post(reviews::create_review))
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/{id}/read", post(notifications::mark_read))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    // Deletes inside this namespace additionally require the admin role
    let staff = Router::new()
        .route(
            "/api/admin/products",
            get(admin::products::search_products).post(admin::products::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            put(admin::products::update_product).delete(admin::products::delete_product),
        )
        .route(
            "/api/admin/categories",
            get(admin::categories::list_categories).post(admin::categories::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            put(admin::categories::update_category).delete(admin::categories::delete_category),
        )
        .route("/api/admin/orders", get(admin::orders::search_orders))
        .route(
            "/api/admin/orders/{id}",
            get(admin::orders::get_order).put(admin::orders::edit_order),
        )
        .route("/api/admin/orders/{id}/status", put(admin::orders::update_status))
        .route("/api/admin/orders/{id}/cancel", post(admin::orders::cancel_order))
        .route("/api/admin/reviews/{id}", delete(admin::reviews::delete_review))
        .route("/api/admin/stats/dashboard", get(admin::stats::dashboard))
        .route("/api/admin/stats/sales-chart", get(admin::stats::sales_chart))
        .route("/api/admin/activity", get(admin::stats::recent_activity))
        .route_layer(middleware::from_fn(crate::middleware::staff_middleware));

    // User management is not exposed to employees at all
    let admin_only = Router::new()
        .route("/api/admin/users", get(admin::users::search_users))
        .route(
            "/api/admin/users/{id}",
            put(admin::users::update_user).delete(admin::users::delete_user),
        )
        .route_layer(middleware::from_fn(crate::middleware::admin_middleware));

    public.merge(customer).merge(staff).merge(admin_only)
}

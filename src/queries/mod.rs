pub mod activity_queries;
pub mod address_queries;
pub mod category_queries;
pub mod order_queries;
pub mod password_reset_queries;
pub mod product_queries;
pub mod review_queries;
pub mod stats_queries;
pub mod user_queries;
pub mod wishlist_queries;

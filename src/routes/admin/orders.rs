use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        CancelOrderRequest, Order, OrderDetailResponse, OrderQuery, OrderSearchResponse,
        OrderStatus, UpdateOrderRequest, UpdateOrderStatusRequest,
    },
    queries::{activity_queries, order_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn search_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderQuery>,
) -> Result<Json<OrderSearchResponse>> {
    let response = order_queries::search_orders(&state.db, params).await?;

    Ok(Json(response))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetailResponse>> {
    let order = order_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let items = order_queries::get_items(&state.db, order.id).await?;
    let history = order_queries::get_history(&state.db, order.id).await?;
    let shipping_address = order_queries::get_shipping_address(&state.db, order.id).await?;

    Ok(Json(OrderDetailResponse {
        order,
        items,
        history,
        shipping_address,
    }))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{}'", payload.status)))?;

    match status {
        OrderStatus::Pending => {
            return Err(AppError::BadRequest(
                "Orders cannot be moved back to pending".to_string(),
            ));
        }
        OrderStatus::Cancelled => {
            return Err(AppError::BadRequest(
                "Use the cancel endpoint to cancel an order".to_string(),
            ));
        }
        _ => {}
    }

    let order = order_queries::update_status(
        &state.db,
        id,
        status,
        payload.note.as_deref(),
        payload.tracking_number.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "order.status_changed",
        &format!("Order {} moved to {}", order.reference, order.status),
    )
    .await;

    activity_queries::notify_user(
        &state.db,
        order.user_id,
        "Order update",
        &format!("Your order {} is now {}", order.reference, order.status),
    )
    .await;

    Ok(Json(order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<CancelOrderRequest>,
) -> Result<Json<Order>> {
    let order = order_queries::cancel_order(&state.db, id, payload.reason.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    activity_queries::record_activity(
        &state.db,
        extract_user_id(&claims).ok(),
        "order.cancelled",
        &format!("Order {} cancelled", order.reference),
    )
    .await;

    activity_queries::notify_user(
        &state.db,
        order.user_id,
        "Order cancelled",
        &format!("Your order {} has been cancelled", order.reference),
    )
    .await;

    Ok(Json(order))
}

pub async fn edit_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    let order = order_queries::update_pending(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

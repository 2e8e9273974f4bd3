use axum::{Extension, Json, extract::{Path, State}};
use rust_decimal::{Decimal, dec};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        CreateOrderRequest, Order, OrderDetailResponse, OrderItemData, OrderResponse,
        UpdateOrderRequest,
    },
    queries::{activity_queries, order_queries, product_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub const TAX_RATE: Decimal = dec!(0.10);
pub const SHIPPING_FEE: Decimal = dec!(5);

#[derive(Debug, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Order arithmetic over (unit price, quantity) lines.
pub fn compute_totals(lines: &[(Decimal, i32)]) -> OrderTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|(price, quantity)| *price * Decimal::from(*quantity))
        .sum();

    let tax = (subtotal * TAX_RATE).round_dp(2);
    let shipping = SHIPPING_FEE;
    let total = subtotal + tax + shipping;

    OrderTotals {
        subtotal,
        tax,
        shipping,
        total,
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>> {
    let user_id = extract_user_id(&claims)?;

    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    if payload.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest("Payment method is required".to_string()));
    }

    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }
    }

    let requested_ids: Vec<i32> = payload.items.iter().map(|i| i.product_id).collect();
    let products = product_queries::find_by_ids(&state.db, &requested_ids).await?;

    let mut lines = Vec::with_capacity(payload.items.len());
    let mut order_items = Vec::with_capacity(payload.items.len());

    for item in &payload.items {
        let product = products.get(&item.product_id).ok_or_else(|| {
            AppError::NotFound(format!("Product {} not found", item.product_id))
        })?;

        let subtotal = product.price * Decimal::from(item.quantity);

        lines.push((product.price, item.quantity));
        order_items.push(OrderItemData {
            product_id: product.id,
            product_name: product.name.clone(),
            product_image: product.image_url.clone(),
            price: product.price,
            quantity: item.quantity,
            subtotal,
        });
    }

    let totals = compute_totals(&lines);
    let reference = format!("VST-{}", Uuid::new_v4());

    let order = order_queries::create_order_with_items(
        &state.db,
        order_queries::NewOrder {
            user_id,
            reference: &reference,
            customer_name: &claims.name,
            customer_email: &claims.email,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            payment_method: &payload.payment_method,
            notes: payload.notes.as_deref(),
        },
        &order_items,
        payload.shipping_address.as_ref(),
    )
    .await?;

    activity_queries::record_activity(
        &state.db,
        Some(user_id),
        "order.created",
        &format!("Order {} for {}", order.reference, order.total),
    )
    .await;

    activity_queries::notify_user(
        &state.db,
        user_id,
        "Order placed",
        &format!("Your order {} has been received", order.reference),
    )
    .await;

    let items = order_queries::get_items(&state.db, order.id).await?;

    Ok(Json(OrderResponse { order, items }))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderResponse>>> {
    let user_id = extract_user_id(&claims)?;
    let orders = order_queries::get_user_orders(&state.db, user_id).await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let all_items = order_queries::get_items_for_orders(&state.db, &order_ids).await?;

    let mut items_map: std::collections::HashMap<i32, Vec<_>> = std::collections::HashMap::new();
    for item in all_items {
        items_map.entry(item.order_id).or_default().push(item);
    }

    let response = orders
        .into_iter()
        .map(|order| {
            let items = items_map.remove(&order.id).unwrap_or_default();
            OrderResponse { order, items }
        })
        .collect();

    Ok(Json(response))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetailResponse>> {
    let user_id = extract_user_id(&claims)?;
    let order = fetch_owned_order(&state, id, user_id).await?;

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

pub async fn update_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    let user_id = extract_user_id(&claims)?;
    fetch_owned_order(&state, id, user_id).await?;

    let order = order_queries::update_pending(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

async fn fetch_owned_order(state: &AppState, id: i32, user_id: i32) -> Result<Order> {
    let order = order_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user_id {
        return Err(AppError::Forbidden("Not your order".to_string()));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_subtotal_plus_tax_plus_shipping() {
        let totals = compute_totals(&[(dec!(19.99), 3), (dec!(4.50), 2)]);

        assert_eq!(totals.subtotal, dec!(68.97));
        assert_eq!(totals.total, totals.subtotal + totals.tax + totals.shipping);
    }

    #[test]
    fn worked_example_two_items() {
        // qty 2 @ $10 and qty 1 @ $5: subtotal $25, 10% tax $2.50
        let totals = compute_totals(&[(dec!(10), 2), (dec!(5), 1)]);

        assert_eq!(totals.subtotal, dec!(25));
        assert_eq!(totals.tax, dec!(2.50));
        assert_eq!(totals.shipping, SHIPPING_FEE);
        assert_eq!(totals.total, dec!(25) + dec!(2.50) + SHIPPING_FEE);
    }

    #[test]
    fn empty_cart_totals_are_shipping_only() {
        let totals = compute_totals(&[]);

        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, SHIPPING_FEE);
    }

    #[test]
    fn tax_rounds_to_cents() {
        let totals = compute_totals(&[(dec!(0.33), 1)]);

        assert_eq!(totals.tax, dec!(0.03));
    }
}

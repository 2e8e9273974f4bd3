use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{
        Order, OrderItem, OrderItemData, OrderQuery, OrderResponse, OrderSearchResponse,
        OrderShippingAddress, OrderStatus, OrderStatusHistory, ShippingAddressInput,
        UpdateOrderRequest,
    },
};

pub struct NewOrder<'a> {
    pub user_id: i32,
    pub reference: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub payment_method: &'a str,
    pub notes: Option<&'a str>,
}

/// Creates the order, its items, the initial history entry and the optional
/// shipping address, and decrements stock in one transaction. Fails the
/// whole order when any line has insufficient stock.
pub async fn create_order_with_items(
    pool: &PgPool,
    new_order: NewOrder<'_>,
    items: &[OrderItemData],
    shipping_address: Option<&ShippingAddressInput>,
) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (reference, user_id, customer_name, customer_email,
         subtotal, tax, shipping, total, payment_method, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING *",
    )
    .bind(new_order.reference)
    .bind(new_order.user_id)
    .bind(new_order.customer_name)
    .bind(new_order.customer_email)
    .bind(new_order.subtotal)
    .bind(new_order.tax)
    .bind(new_order.shipping)
    .bind(new_order.total)
    .bind(new_order.payment_method)
    .bind(new_order.notes)
    .fetch_one(&mut *tx)
    .await?;

    let product_ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
    let product_names: Vec<&str> = items.iter().map(|i| i.product_name.as_str()).collect();
    let product_images: Vec<Option<String>> =
        items.iter().map(|i| i.product_image.clone()).collect();
    let prices: Vec<Decimal> = items.iter().map(|i| i.price).collect();
    let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
    let subtotals: Vec<Decimal> = items.iter().map(|i| i.subtotal).collect();

    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, product_name, product_image, price, quantity, subtotal)
         SELECT $1, unnest($2::int[]), unnest($3::varchar[]), unnest($4::text[]), unnest($5::decimal[]), unnest($6::int[]), unnest($7::decimal[])",
    )
    .bind(order.id)
    .bind(&product_ids)
    .bind(&product_names)
    .bind(&product_images)
    .bind(&prices)
    .bind(&quantities)
    .bind(&subtotals)
    .execute(&mut *tx)
    .await?;

    for item in items {
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $1, updated_at = NOW()
             WHERE id = $2 AND stock >= $1",
        )
        .bind(item.quantity)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                item.product_name
            )));
        }
    }

    sqlx::query(
        "INSERT INTO order_status_history (order_id, status, note)
         VALUES ($1, 'pending', 'Order placed')",
    )
    .bind(order.id)
    .execute(&mut *tx)
    .await?;

    if let Some(address) = shipping_address {
        insert_shipping_address(&mut tx, order.id, address).await?;
    }

    tx.commit().await?;

    Ok(order)
}

async fn insert_shipping_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: i32,
    address: &ShippingAddressInput,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO order_shipping_addresses (order_id, recipient, street, city, region, postal_code, country, phone)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (order_id) DO UPDATE SET
            recipient = EXCLUDED.recipient,
            street = EXCLUDED.street,
            city = EXCLUDED.city,
            region = EXCLUDED.region,
            postal_code = EXCLUDED.postal_code,
            country = EXCLUDED.country,
            phone = EXCLUDED.phone",
    )
    .bind(order_id)
    .bind(&address.recipient)
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.region)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(&address.phone)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(order)
}

pub async fn get_items(pool: &PgPool, order_id: i32) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

pub async fn get_items_for_orders(pool: &PgPool, order_ids: &[i32]) -> Result<Vec<OrderItem>> {
    let items =
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ANY($1)")
            .bind(order_ids)
            .fetch_all(pool)
            .await?;

    Ok(items)
}

pub async fn get_history(pool: &PgPool, order_id: i32) -> Result<Vec<OrderStatusHistory>> {
    let history = sqlx::query_as::<_, OrderStatusHistory>(
        "SELECT * FROM order_status_history WHERE order_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(history)
}

pub async fn get_shipping_address(
    pool: &PgPool,
    order_id: i32,
) -> Result<Option<OrderShippingAddress>> {
    let address = sqlx::query_as::<_, OrderShippingAddress>(
        "SELECT * FROM order_shipping_addresses WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    Ok(address)
}

pub async fn get_user_orders(pool: &PgPool, user_id: i32) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

/// Order count and lifetime spend (cancelled orders excluded from spend).
pub async fn stats_for_user(pool: &PgPool, user_id: i32) -> Result<(i64, Decimal)> {
    let stats: (i64, Decimal) = sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(SUM(total) FILTER (WHERE status != 'cancelled'), 0)
         FROM orders WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

pub async fn search_orders(pool: &PgPool, params: OrderQuery) -> Result<OrderSearchResponse> {
    const DEFAULT_PAGE_SIZE: i64 = 20;
    const MAX_PAGE_SIZE: i64 = 100;

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0);

    let mut query_builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
        "SELECT *, COUNT(*) OVER() AS total_count FROM orders WHERE 1=1",
    );

    if let Some(id) = params.id {
        query_builder.push(" AND id = ");
        query_builder.push_bind(id);
    }

    if let Some(user_id) = params.user_id {
        query_builder.push(" AND user_id = ");
        query_builder.push_bind(user_id);
    }

    if let Some(ref status) = params.status {
        query_builder.push(" AND status = ");
        query_builder.push_bind(status);
    }

    if let Some(ref email) = params.email {
        query_builder.push(" AND customer_email ILIKE ");
        query_builder.push_bind(format!("%{}%", email));
    }

    query_builder.push(" ORDER BY created_at DESC");
    query_builder.push(" LIMIT ");
    query_builder.push_bind(limit);
    query_builder.push(" OFFSET ");
    query_builder.push_bind(offset);

    #[derive(sqlx::FromRow)]
    struct SearchResult {
        #[sqlx(flatten)]
        order: Order,
        total_count: i64,
    }

    let results = query_builder
        .build_query_as::<SearchResult>()
        .fetch_all(pool)
        .await?;

    let total = results.first().map(|r| r.total_count).unwrap_or(0);
    let orders: Vec<Order> = results.into_iter().map(|r| r.order).collect();

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let all_items = get_items_for_orders(pool, &order_ids).await?;

    let mut items_map: std::collections::HashMap<i32, Vec<_>> = std::collections::HashMap::new();
    for item in all_items {
        items_map.entry(item.order_id).or_default().push(item);
    }

    let orders = orders
        .into_iter()
        .map(|order| {
            let items = items_map.remove(&order.id).unwrap_or_default();
            OrderResponse { order, items }
        })
        .collect();

    Ok(OrderSearchResponse {
        orders,
        total,
        limit,
        offset,
    })
}

/// Moves the order to a new status and appends a history entry. Terminal
/// orders are never updated.
pub async fn update_status(
    pool: &PgPool,
    id: i32,
    status: OrderStatus,
    note: Option<&str>,
    tracking_number: Option<&str>,
) -> Result<Option<Order>> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let order = match order {
        Some(o) => o,
        None => return Ok(None),
    };

    if let Some(current) = OrderStatus::parse(&order.status) {
        if current.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "Cannot update a {} order",
                order.status
            )));
        }
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET
            status = $1,
            tracking_number = COALESCE($2, tracking_number),
            updated_at = NOW()
         WHERE id = $3 RETURNING *",
    )
    .bind(status.as_str())
    .bind(tracking_number)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO order_status_history (order_id, status, note) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(status.as_str())
        .bind(note)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(order))
}

/// Cancels the order and puts each line's quantity back into product stock.
pub async fn cancel_order(pool: &PgPool, id: i32, reason: Option<&str>) -> Result<Option<Order>> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let order = match order {
        Some(o) => o,
        None => return Ok(None),
    };

    if let Some(current) = OrderStatus::parse(&order.status) {
        if current.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "Cannot cancel a {} order",
                order.status
            )));
        }
    }

    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

    for item in &items {
        // The product may have been deleted since the order was placed
        sqlx::query(
            "UPDATE products SET stock = stock + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(item.quantity)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = 'cancelled', updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO order_status_history (order_id, status, note) VALUES ($1, 'cancelled', $2)")
        .bind(id)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(order))
}

/// Shipping address and notes are editable only while the order is pending.
pub async fn update_pending(
    pool: &PgPool,
    id: i32,
    req: &UpdateOrderRequest,
) -> Result<Option<Order>> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let order = match order {
        Some(o) => o,
        None => return Ok(None),
    };

    if order.status != "pending" {
        return Err(AppError::BadRequest(
            "Only pending orders can be edited".to_string(),
        ));
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET notes = COALESCE($1, notes), updated_at = NOW()
         WHERE id = $2 RETURNING *",
    )
    .bind(req.notes.as_deref())
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(ref address) = req.shipping_address {
        insert_shipping_address(&mut tx, id, address).await?;
    }

    tx.commit().await?;

    Ok(Some(order))
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{CountStat, DashboardStats, RevenueStat, SalesChartPoint},
};

/// Share of all-time activity that happened in the last 30 days, as a
/// percentage rounded to two decimals.
pub fn trend_pct(recent: Decimal, all_time: Decimal) -> Decimal {
    if all_time.is_zero() {
        return Decimal::ZERO;
    }

    (recent / all_time * Decimal::from(100)).round_dp(2)
}

pub async fn dashboard(pool: &PgPool) -> Result<DashboardStats> {
    let (order_total, order_recent, revenue_total, revenue_recent): (i64, i64, Decimal, Decimal) =
        sqlx::query_as(
            "SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE created_at > NOW() - INTERVAL '30 days'),
                COALESCE(SUM(total) FILTER (WHERE status != 'cancelled'), 0),
                COALESCE(SUM(total) FILTER (WHERE status != 'cancelled'
                    AND created_at > NOW() - INTERVAL '30 days'), 0)
             FROM orders",
        )
        .fetch_one(pool)
        .await?;

    let (customer_total, customer_recent): (i64, i64) = sqlx::query_as(
        "SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE created_at > NOW() - INTERVAL '30 days')
         FROM users WHERE role = 'customer'",
    )
    .fetch_one(pool)
    .await?;

    let (product_total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        orders: CountStat {
            total: order_total,
            last_30_days: order_recent,
            trend: trend_pct(Decimal::from(order_recent), Decimal::from(order_total)),
        },
        revenue: RevenueStat {
            total: revenue_total,
            last_30_days: revenue_recent,
            trend: trend_pct(revenue_recent, revenue_total),
        },
        customers: CountStat {
            total: customer_total,
            last_30_days: customer_recent,
            trend: trend_pct(Decimal::from(customer_recent), Decimal::from(customer_total)),
        },
        products: product_total,
    })
}

/// Monthly order counts and revenue for the trailing twelve months.
pub async fn sales_chart(pool: &PgPool) -> Result<Vec<SalesChartPoint>> {
    let rows: Vec<(DateTime<Utc>, i64, Decimal)> = sqlx::query_as(
        "SELECT
            date_trunc('month', created_at) AS month,
            COUNT(*),
            COALESCE(SUM(total) FILTER (WHERE status != 'cancelled'), 0)
         FROM orders
         WHERE created_at > NOW() - INTERVAL '12 months'
         GROUP BY month
         ORDER BY month ASC",
    )
    .fetch_all(pool)
    .await?;

    let points = rows
        .into_iter()
        .map(|(month, orders, revenue)| SalesChartPoint {
            month: month.format("%Y-%m").to_string(),
            orders,
            revenue,
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn trend_is_recent_share_of_all_time() {
        assert_eq!(trend_pct(dec!(30), dec!(120)), dec!(25.00));
        assert_eq!(trend_pct(dec!(120), dec!(120)), dec!(100.00));
    }

    #[test]
    fn trend_with_no_history_is_zero() {
        assert_eq!(trend_pct(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn trend_rounds_to_two_decimals() {
        assert_eq!(trend_pct(dec!(1), dec!(3)), dec!(33.33));
    }
}

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CountStat {
    pub total: i64,
    pub last_30_days: i64,
    pub trend: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RevenueStat {
    pub total: Decimal,
    pub last_30_days: Decimal,
    pub trend: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub orders: CountStat,
    pub revenue: RevenueStat,
    pub customers: CountStat,
    pub products: i64,
}

#[derive(Debug, Serialize)]
pub struct SalesChartPoint {
    pub month: String,
    pub orders: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SalesChartResponse {
    pub points: Vec<SalesChartPoint>,
}

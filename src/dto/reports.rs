use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub total_purchases: i64,
    pub total_sales: i64,
    pub total_purchase_amount: Decimal,
    pub total_sales_amount: Decimal,
    pub profit: Decimal,
    pub transaction_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyReport {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub vehicles_bought: i64,
    pub vehicles_sold: i64,
    pub total_profit: Decimal,
    pub best_performing_vehicle: Option<String>,
    pub total_repair_costs: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub revenue: Decimal,
    pub costs: Decimal,
    pub profit: Decimal,
    pub vehicles_sold: i64,
    pub customer_acquisition: i64,
    pub mechanic_productivity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessOverview {
    pub total_vehicles_in_stock: i64,
    pub total_vehicles_sold: i64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub average_profit_margin: Decimal,
    pub pending_repairs: i64,
    pub low_stock_parts: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct VehicleProfitability {
    pub id: Uuid,
    pub vehicle_code: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub purchase_price: Decimal,
    pub total_repair_cost: Decimal,
    pub final_selling_price: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub profit_margin_percentage: Decimal,
    pub purchased_at: Option<DateTime<Utc>>,
    pub sold_at: Option<DateTime<Utc>>,
    pub days_to_sell: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleProfitabilityList {
    pub items: Vec<VehicleProfitability>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TopPerformingModel {
    pub brand: String,
    pub model: String,
    pub vehicles_sold: i64,
    pub total_profit: Decimal,
    pub average_profit: Decimal,
    pub average_days_to_sell: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopPerformingModelList {
    pub items: Vec<TopPerformingModel>,
}

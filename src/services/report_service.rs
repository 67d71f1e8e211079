use chrono::{Datelike, Duration, Month, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    db::DbPool,
    dto::reports::{
        BusinessOverview, DailyReport, MonthlyReport, TopPerformingModel, TopPerformingModelList,
        VehicleProfitability, VehicleProfitabilityList, WeeklyReport,
    },
    entity::sea_orm_active_enums::Role,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_role},
    response::{ApiResponse, Meta},
    routes::params::{
        DailyReportQuery, MonthlyReportQuery, SortOrder, TopModelsQuery, VehicleProfitabilityQuery,
        WeeklyReportQuery,
    },
    state::AppState,
};

const SUMMARY_ROLES: &[Role] = &[Role::Admin, Role::Cashier];

/// Profit of a sold vehicle; a missing purchase price counts as zero.
const PROFIT_SQL: &str =
    "(final_selling_price - COALESCE(purchase_price, 0) - total_repair_cost)";
const COST_SQL: &str = "(COALESCE(purchase_price, 0) + total_repair_cost)";

async fn count_and_sum(
    pool: &DbPool,
    sql: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<(i64, Decimal)> {
    let row: (i64, Decimal) = sqlx::query_as(sql)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

const PURCHASES_BETWEEN: &str = r#"
    SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
    FROM purchase_transactions
    WHERE transaction_date::date BETWEEN $1 AND $2 AND status = 'completed'
"#;

const SALES_BETWEEN: &str = r#"
    SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
    FROM sales_transactions
    WHERE transaction_date::date BETWEEN $1 AND $2 AND status = 'completed'
"#;

const COMPLETED_REPAIRS_BETWEEN: &str = r#"
    SELECT COUNT(*), COALESCE(SUM(total_cost), 0)
    FROM repairs
    WHERE completed_at::date BETWEEN $1 AND $2 AND status = 'completed'
"#;

pub async fn daily_report(
    state: &AppState,
    user: &AuthUser,
    query: DailyReportQuery,
) -> AppResult<ApiResponse<DailyReport>> {
    ensure_role(user, SUMMARY_ROLES)?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let (purchase_count, purchase_amount) =
        count_and_sum(&state.pool, PURCHASES_BETWEEN, date, date).await?;
    let (sales_count, sales_amount) =
        count_and_sum(&state.pool, SALES_BETWEEN, date, date).await?;

    let report = DailyReport {
        date,
        total_purchases: purchase_count,
        total_sales: sales_count,
        total_purchase_amount: purchase_amount,
        total_sales_amount: sales_amount,
        profit: sales_amount - purchase_amount,
        transaction_count: purchase_count + sales_count,
    };
    Ok(ApiResponse::success("Ok", report, Some(Meta::empty())))
}

pub async fn weekly_report(
    state: &AppState,
    user: &AuthUser,
    query: WeeklyReportQuery,
) -> AppResult<ApiResponse<WeeklyReport>> {
    ensure_admin(user)?;
    let week_start = query
        .week_start
        .unwrap_or_else(|| Utc::now().date_naive() - Duration::days(7));
    let week_end = week_start + Duration::days(6);

    let (vehicles_bought, _) =
        count_and_sum(&state.pool, PURCHASES_BETWEEN, week_start, week_end).await?;
    let (vehicles_sold, _) =
        count_and_sum(&state.pool, SALES_BETWEEN, week_start, week_end).await?;
    let (_, total_repair_costs) =
        count_and_sum(&state.pool, COMPLETED_REPAIRS_BETWEEN, week_start, week_end).await?;

    let sold_filter = "sold_at::date BETWEEN $1 AND $2 \
                       AND status = 'sold' AND final_selling_price IS NOT NULL";

    let (total_profit,): (Decimal,) = sqlx::query_as(&format!(
        "SELECT COALESCE(SUM({PROFIT_SQL}), 0) FROM vehicles WHERE {sold_filter}"
    ))
    .bind(week_start)
    .bind(week_end)
    .fetch_one(&state.pool)
    .await?;

    let best: Option<(String,)> = sqlx::query_as(&format!(
        "SELECT CONCAT(brand, ' ', model, ' (', vehicle_code, ')') FROM vehicles \
         WHERE {sold_filter} ORDER BY {PROFIT_SQL} DESC LIMIT 1"
    ))
    .bind(week_start)
    .bind(week_end)
    .fetch_optional(&state.pool)
    .await?;

    let report = WeeklyReport {
        week_start,
        week_end,
        vehicles_bought,
        vehicles_sold,
        total_profit,
        best_performing_vehicle: best.map(|(label,)| label),
        total_repair_costs,
    };
    Ok(ApiResponse::success("Ok", report, Some(Meta::empty())))
}

pub async fn monthly_report(
    state: &AppState,
    user: &AuthUser,
    query: MonthlyReportQuery,
) -> AppResult<ApiResponse<MonthlyReport>> {
    ensure_admin(user)?;
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let month_name = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .ok_or_else(|| AppError::InvalidArgument("Month must be between 1 and 12".into()))?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::InvalidArgument("Invalid year or month".into()))?;
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::InvalidArgument("Invalid year or month".into()))?;

    let (vehicles_sold, revenue) = count_and_sum(&state.pool, SALES_BETWEEN, first, last).await?;
    let (_, purchase_costs) = count_and_sum(&state.pool, PURCHASES_BETWEEN, first, last).await?;
    let (mechanic_productivity, repair_costs) =
        count_and_sum(&state.pool, COMPLETED_REPAIRS_BETWEEN, first, last).await?;

    let (customer_acquisition,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM customers WHERE created_at::date BETWEEN $1 AND $2",
    )
    .bind(first)
    .bind(last)
    .fetch_one(&state.pool)
    .await?;

    let costs = purchase_costs + repair_costs;
    let report = MonthlyReport {
        year,
        month,
        month_name,
        revenue,
        costs,
        profit: revenue - costs,
        vehicles_sold,
        customer_acquisition,
        mechanic_productivity,
    };
    Ok(ApiResponse::success("Ok", report, Some(Meta::empty())))
}

pub async fn business_overview(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BusinessOverview>> {
    ensure_role(user, SUMMARY_ROLES)?;

    let (total_vehicles_in_stock, total_vehicles_sold): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status IN ('purchased', 'in_repair', 'ready_to_sell', 'reserved')),
            COUNT(*) FILTER (WHERE status = 'sold')
        FROM vehicles
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let (total_revenue,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_amount), 0) FROM sales_transactions WHERE status = 'completed'",
    )
    .fetch_one(&state.pool)
    .await?;

    let (total_profit, average_profit_margin): (Decimal, Decimal) = sqlx::query_as(&format!(
        r#"
        SELECT
            COALESCE(SUM({PROFIT_SQL}), 0),
            COALESCE(ROUND(AVG(
                CASE WHEN {COST_SQL} > 0 THEN {PROFIT_SQL} / {COST_SQL} * 100 ELSE 0 END
            ), 2), 0)
        FROM vehicles
        WHERE status = 'sold' AND final_selling_price IS NOT NULL
        "#
    ))
    .fetch_one(&state.pool)
    .await?;

    let (pending_repairs,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM repairs WHERE status IN ('pending', 'in_progress')",
    )
    .fetch_one(&state.pool)
    .await?;

    let (low_stock_parts,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM spare_parts WHERE is_active AND stock_quantity <= min_stock_level",
    )
    .fetch_one(&state.pool)
    .await?;

    let overview = BusinessOverview {
        total_vehicles_in_stock,
        total_vehicles_sold,
        total_revenue,
        total_profit,
        average_profit_margin,
        pending_repairs,
        low_stock_parts,
    };
    Ok(ApiResponse::success("Ok", overview, Some(Meta::empty())))
}

pub async fn vehicle_profitability(
    state: &AppState,
    user: &AuthUser,
    query: VehicleProfitabilityQuery,
) -> AppResult<ApiResponse<VehicleProfitabilityList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let sort_by = query.sort_by.unwrap_or_default();
    let order = query.order.unwrap_or(SortOrder::Desc);

    // sort column and direction come from closed enums, never from raw input
    let sql = format!(
        r#"
        SELECT
            id, vehicle_code, brand, model, year,
            COALESCE(purchase_price, 0) AS purchase_price,
            total_repair_cost,
            final_selling_price,
            {COST_SQL} AS total_cost,
            {PROFIT_SQL} AS profit,
            ROUND(CASE WHEN {COST_SQL} > 0 THEN {PROFIT_SQL} / {COST_SQL} * 100 ELSE 0 END, 2)
                AS profit_margin_percentage,
            purchased_at,
            sold_at,
            CASE WHEN sold_at IS NOT NULL AND purchased_at IS NOT NULL
                THEN EXTRACT(DAY FROM (sold_at - purchased_at))::int
            END AS days_to_sell
        FROM vehicles
        WHERE status = 'sold' AND final_selling_price IS NOT NULL
        ORDER BY {} {} NULLS LAST
        LIMIT $1 OFFSET $2
        "#,
        sort_by.as_sql(),
        order.as_sql(),
    );
    let items = sqlx::query_as::<_, VehicleProfitability>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let (total,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM vehicles WHERE status = 'sold' AND final_selling_price IS NOT NULL",
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Ok",
        VehicleProfitabilityList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn top_performing_models(
    state: &AppState,
    user: &AuthUser,
    query: TopModelsQuery,
) -> AppResult<ApiResponse<TopPerformingModelList>> {
    ensure_admin(user)?;
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let items = sqlx::query_as::<_, TopPerformingModel>(&format!(
        r#"
        SELECT
            brand,
            model,
            COUNT(*) AS vehicles_sold,
            SUM({PROFIT_SQL}) AS total_profit,
            ROUND(AVG({PROFIT_SQL}), 2) AS average_profit,
            ROUND(AVG(EXTRACT(DAY FROM (sold_at - purchased_at)))::numeric, 2)
                AS average_days_to_sell
        FROM vehicles
        WHERE status = 'sold' AND final_selling_price IS NOT NULL
        GROUP BY brand, model
        ORDER BY SUM({PROFIT_SQL}) DESC, COUNT(*) DESC
        LIMIT $1
        "#
    ))
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Ok",
        TopPerformingModelList { items },
        Some(Meta::total(total)),
    ))
}

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::{CustomerType, RepairStatus, Role, VehicleStatus};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// `(page, limit, offset)` with page >= 1 and limit clamped to 1..=100.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);
        (page, limit, offset)
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub customer_type: Option<CustomerType>,
    pub search: Option<String>,
}

impl CustomerListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VehicleListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<VehicleStatus>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

impl VehicleListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RepairListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<RepairStatus>,
    pub vehicle_id: Option<Uuid>,
    pub mechanic_id: Option<Uuid>,
}

impl RepairListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SparePartListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub brand: Option<String>,
    pub low_stock: Option<bool>,
}

impl SparePartListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// Date bounds are inclusive calendar days.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub cashier_id: Option<Uuid>,
}

impl TransactionListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyReportQuery {
    pub week_start: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthlyReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProfitabilitySortBy {
    #[default]
    Profit,
    ProfitMarginPercentage,
    DaysToSell,
    SoldAt,
    TotalCost,
}

impl ProfitabilitySortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ProfitabilitySortBy::Profit => "profit",
            ProfitabilitySortBy::ProfitMarginPercentage => "profit_margin_percentage",
            ProfitabilitySortBy::DaysToSell => "days_to_sell",
            ProfitabilitySortBy::SoldAt => "sold_at",
            ProfitabilitySortBy::TotalCost => "total_cost",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VehicleProfitabilityQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<ProfitabilitySortBy>,
    pub order: Option<SortOrder>,
}

impl VehicleProfitabilityQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopModelsQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 50, 0));
        assert_eq!(Pagination::new(Some(3), Some(20)).normalize(), (3, 20, 40));
        assert_eq!(Pagination::new(Some(0), Some(500)).normalize(), (1, 100, 0));
        assert_eq!(Pagination::new(Some(-2), Some(0)).normalize(), (1, 1, 0));
    }

    #[test]
    fn huge_page_numbers_do_not_overflow_the_offset() {
        let (page, limit, offset) = Pagination::new(Some(i64::MAX), Some(100)).normalize();
        assert_eq!((page, limit), (i64::MAX, 100));
        assert_eq!(offset, i64::MAX);

        let (_, _, offset) = Pagination::new(Some(i64::MAX / 2), Some(i64::MAX)).normalize();
        assert!(offset >= 0);
    }
}

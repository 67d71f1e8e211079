use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, LikeExpr, extension::postgres::PgExpr},
};

use crate::error::{AppError, AppResult};

pub mod auth_service;
pub mod customer_service;
pub mod repair_service;
pub mod report_service;
pub mod spare_part_service;
pub mod transaction_service;
pub mod vehicle_service;

/// Largest value a `NUMERIC(14, 2)` money column can hold: 999999999999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Rejects negative amounts and amounts that do not fit a money column.
pub(crate) fn ensure_amount(value: Decimal, field: &str) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::InvalidArgument(format!(
            "{field} cannot be negative"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::InvalidArgument(format!(
            "{field} exceeds the maximum amount of {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Escapes `\`, `%` and `_` so user input matches literally inside a LIKE pattern.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match of `term` against any of `columns`.
pub(crate) fn search_condition<C>(columns: &[C], term: &str) -> Condition
where
    C: ColumnTrait + Copy,
{
    let pattern = format!("%{}%", escape_like(term.trim()));
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(Expr::col(*col).ilike(LikeExpr::new(pattern.as_str()).escape('\\')))
    })
}

/// Trimmed, non-empty search term, if any.
pub(crate) fn search_term(term: &Option<String>) -> Option<&str> {
    term.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::*;
    use crate::entity::customers;

    #[test]
    fn max_amount_is_the_money_column_ceiling() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert!(ensure_amount(MAX_AMOUNT, "price").is_ok());
        assert!(ensure_amount(Decimal::ZERO, "price").is_ok());
    }

    #[test]
    fn amounts_outside_the_column_range_are_rejected() {
        let err = ensure_amount(dec!(1000000000000), "price").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(err.to_string().contains("price"));

        let err = ensure_amount(dec!(-0.01), "labor_cost").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
    }

    #[test]
    fn search_condition_matches_wildcards_literally() {
        let sql = customers::Entity::find()
            .filter(search_condition(&[customers::Column::Name], " 50%_off "))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("ILIKE"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(!sql.contains("'%50%_off%'"), "{sql}");
    }
}

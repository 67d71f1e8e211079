//! Human-facing document codes.
//!
//! Each code carries a type prefix and a random suffix taken from a fresh v4 UUID;
//! the unique indexes on the backing columns catch the (unlikely) collision.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::CustomerType;

fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

pub fn customer_code(kind: CustomerType) -> String {
    format!("{}{}", kind.code_prefix(), short_suffix())
}

pub fn vehicle_code() -> String {
    format!("VEH{}", short_suffix())
}

pub fn part_code() -> String {
    format!("SP{}", short_suffix())
}

pub fn repair_number(now: DateTime<Utc>) -> String {
    format!("REP-{}-{}", now.format("%Y%m%d"), short_suffix())
}

/// Transaction number and its invoice number share the same date and suffix.
pub fn transaction_numbers(prefix: &str, now: DateTime<Utc>) -> (String, String) {
    let stem = format!("{}-{}", now.format("%Y%m%d"), short_suffix());
    (format!("{prefix}-{stem}"), format!("INV-{prefix}-{stem}"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn customer_codes_carry_type_prefix() {
        let individual = customer_code(CustomerType::Individual);
        let corporate = customer_code(CustomerType::Corporate);
        assert!(individual.starts_with("IND"));
        assert!(corporate.starts_with("COR"));
        assert_eq!(individual.len(), 11);
        assert_ne!(individual[3..], corporate[3..]);
    }

    #[test]
    fn transaction_and_invoice_numbers_share_stem() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap();
        let (number, invoice) = transaction_numbers("SAL", now);
        assert!(number.starts_with("SAL-20250309-"));
        assert_eq!(invoice, format!("INV-{number}"));
    }

    #[test]
    fn repair_numbers_are_dated() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        let number = repair_number(now);
        assert!(number.starts_with("REP-20241231-"));
        assert_eq!(number.len(), "REP-20241231-".len() + 8);
    }
}

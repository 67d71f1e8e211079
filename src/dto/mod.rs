pub mod auth;
pub mod customers;
pub mod reports;
pub mod repairs;
pub mod spare_parts;
pub mod transactions;
pub mod vehicles;

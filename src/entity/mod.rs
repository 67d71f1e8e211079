pub mod audit_logs;
pub mod customers;
pub mod purchase_transactions;
pub mod repair_parts;
pub mod repairs;
pub mod sales_transactions;
pub mod sea_orm_active_enums;
pub mod spare_parts;
pub mod stock_movements;
pub mod user_sessions;
pub mod users;
pub mod vehicle_images;
pub mod vehicles;

pub use audit_logs::Entity as AuditLogs;
pub use customers::Entity as Customers;
pub use purchase_transactions::Entity as PurchaseTransactions;
pub use repair_parts::Entity as RepairParts;
pub use repairs::Entity as Repairs;
pub use sales_transactions::Entity as SalesTransactions;
pub use spare_parts::Entity as SpareParts;
pub use stock_movements::Entity as StockMovements;
pub use user_sessions::Entity as UserSessions;
pub use users::Entity as Users;
pub use vehicle_images::Entity as VehicleImages;
pub use vehicles::Entity as Vehicles;

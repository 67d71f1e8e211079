use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth as auth_dto, customers as customer_dto, repairs as repair_dto, reports as report_dto,
        spare_parts as spare_part_dto, transactions as transaction_dto, vehicles as vehicle_dto,
    },
    entity::sea_orm_active_enums::{
        CustomerType, FuelType, ImageType, MovementType, PaymentMethod, ReferenceType,
        RepairStatus, Role, TransactionStatus, Transmission, VehicleStatus,
    },
    models::{
        Customer, PurchaseTransaction, Repair, RepairPart, SalesTransaction, SparePart,
        StockMovement, User, Vehicle, VehicleImage,
    },
    response::Meta,
    routes::{auth, customers, health, params, repairs, reports, spare_parts, transactions, vehicles},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("Session token")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::me,
        auth::create_user,
        auth::list_users,
        auth::get_user,
        auth::update_user,
        customers::create_customer,
        customers::list_customers,
        customers::get_customer,
        customers::update_customer,
        vehicles::create_vehicle,
        vehicles::list_vehicles,
        vehicles::get_vehicle,
        vehicles::update_vehicle,
        vehicles::upload_image,
        repairs::create_repair,
        repairs::list_repairs,
        repairs::get_repair,
        repairs::update_repair,
        repairs::add_repair_part,
        spare_parts::create_spare_part,
        spare_parts::list_spare_parts,
        spare_parts::low_stock_alerts,
        spare_parts::get_spare_part,
        spare_parts::update_spare_part,
        spare_parts::adjust_stock,
        spare_parts::list_movements,
        transactions::create_purchase,
        transactions::list_purchases,
        transactions::purchase_invoice,
        transactions::create_sale,
        transactions::list_sales,
        transactions::sales_invoice,
        reports::daily_report,
        reports::weekly_report,
        reports::monthly_report,
        reports::business_overview,
        reports::vehicle_profitability,
        reports::top_performing_models
    ),
    components(
        schemas(
            Role,
            CustomerType,
            VehicleStatus,
            FuelType,
            Transmission,
            ImageType,
            RepairStatus,
            MovementType,
            ReferenceType,
            PaymentMethod,
            TransactionStatus,
            User,
            Customer,
            Vehicle,
            VehicleImage,
            Repair,
            RepairPart,
            SparePart,
            StockMovement,
            PurchaseTransaction,
            SalesTransaction,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            auth_dto::CreateUserRequest,
            auth_dto::UpdateUserRequest,
            auth_dto::UserList,
            customer_dto::CreateCustomerRequest,
            customer_dto::UpdateCustomerRequest,
            customer_dto::CustomerList,
            vehicle_dto::CreateVehicleRequest,
            vehicle_dto::UpdateVehicleRequest,
            vehicle_dto::UploadImageRequest,
            vehicle_dto::VehicleWithImages,
            vehicle_dto::VehicleList,
            repair_dto::CreateRepairRequest,
            repair_dto::UpdateRepairRequest,
            repair_dto::AddRepairPartRequest,
            repair_dto::AddRepairPartResponse,
            repair_dto::RepairPartDetail,
            repair_dto::RepairWithParts,
            repair_dto::RepairList,
            spare_part_dto::CreateSparePartRequest,
            spare_part_dto::UpdateSparePartRequest,
            spare_part_dto::StockAdjustmentRequest,
            spare_part_dto::SparePartList,
            spare_part_dto::LowStockAlert,
            spare_part_dto::LowStockAlertList,
            spare_part_dto::StockMovementList,
            transaction_dto::CreatePurchaseTransactionRequest,
            transaction_dto::CreateSalesTransactionRequest,
            transaction_dto::PurchaseTransactionList,
            transaction_dto::SalesTransactionList,
            transaction_dto::PurchaseInvoice,
            transaction_dto::SalesInvoice,
            transaction_dto::InvoiceDetails,
            report_dto::DailyReport,
            report_dto::WeeklyReport,
            report_dto::MonthlyReport,
            report_dto::BusinessOverview,
            report_dto::VehicleProfitability,
            report_dto::VehicleProfitabilityList,
            report_dto::TopPerformingModel,
            report_dto::TopPerformingModelList,
            params::Pagination,
            params::SortOrder,
            params::ProfitabilitySortBy,
            Meta
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sessions and user management"),
        (name = "Customers", description = "Customer endpoints"),
        (name = "Vehicles", description = "Vehicle inventory endpoints"),
        (name = "Repairs", description = "Repair workflow endpoints"),
        (name = "Spare Parts", description = "Spare part catalogue and stock ledger"),
        (name = "Transactions", description = "Purchase and sales transactions"),
        (name = "Reports", description = "Business reporting endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

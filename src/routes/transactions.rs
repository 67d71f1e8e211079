use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::transactions::{
        CreatePurchaseTransactionRequest, CreateSalesTransactionRequest, PurchaseInvoice,
        PurchaseTransactionList, SalesInvoice, SalesTransactionList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{PurchaseTransaction, SalesTransaction},
    response::ApiResponse,
    routes::params::TransactionListQuery,
    services::transaction_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/purchases", post(create_purchase).get(list_purchases))
        .route("/purchases/{id}/invoice", get(purchase_invoice))
        .route("/sales", post(create_sale).get(list_sales))
        .route("/sales/{id}/invoice", get(sales_invoice))
}

#[utoipa::path(
    post,
    path = "/api/transactions/purchases",
    request_body = CreatePurchaseTransactionRequest,
    responses(
        (status = 201, description = "Vehicle bought from customer", body = ApiResponse<PurchaseTransaction>),
        (status = 400, description = "Vehicle already purchased")
    ),
    tag = "Transactions"
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePurchaseTransactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PurchaseTransaction>>)> {
    let resp = transaction_service::create_purchase(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/purchases",
    params(TransactionListQuery),
    responses((status = 200, description = "List purchase transactions", body = ApiResponse<PurchaseTransactionList>)),
    tag = "Transactions"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<ApiResponse<PurchaseTransactionList>>> {
    let resp = transaction_service::list_purchases(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions/purchases/{id}/invoice",
    params(("id" = Uuid, Path, description = "Purchase transaction ID")),
    responses(
        (status = 200, description = "Purchase invoice", body = ApiResponse<PurchaseInvoice>),
        (status = 404, description = "Transaction not found")
    ),
    tag = "Transactions"
)]
pub async fn purchase_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PurchaseInvoice>>> {
    let resp = transaction_service::purchase_invoice(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/transactions/sales",
    request_body = CreateSalesTransactionRequest,
    responses(
        (status = 201, description = "Vehicle sold to customer", body = ApiResponse<SalesTransaction>),
        (status = 400, description = "Vehicle is not ready for sale")
    ),
    tag = "Transactions"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSalesTransactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SalesTransaction>>)> {
    let resp = transaction_service::create_sale(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/sales",
    params(TransactionListQuery),
    responses((status = 200, description = "List sales transactions", body = ApiResponse<SalesTransactionList>)),
    tag = "Transactions"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<ApiResponse<SalesTransactionList>>> {
    let resp = transaction_service::list_sales(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions/sales/{id}/invoice",
    params(("id" = Uuid, Path, description = "Sales transaction ID")),
    responses(
        (status = 200, description = "Sales invoice", body = ApiResponse<SalesInvoice>),
        (status = 404, description = "Transaction not found")
    ),
    tag = "Transactions"
)]
pub async fn sales_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SalesInvoice>>> {
    let resp = transaction_service::sales_invoice(&state, &user, id).await?;
    Ok(Json(resp))
}

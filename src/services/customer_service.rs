use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
    entity::{
        Customers,
        customers::{ActiveModel as CustomerActive, Column as CustomerCol},
        sea_orm_active_enums::Role,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Customer,
    numbering,
    response::{ApiResponse, Meta},
    routes::params::CustomerListQuery,
    services::{search_condition, search_term},
    state::AppState,
};

const CUSTOMER_ROLES: &[Role] = &[Role::Admin, Role::Cashier];

pub async fn create_customer(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    ensure_role(user, CUSTOMER_ROLES)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("Customer name is required".into()));
    }

    let created = CustomerActive {
        id: Set(Uuid::new_v4()),
        customer_code: Set(numbering::customer_code(payload.customer_type)),
        name: Set(name),
        phone: Set(payload.phone),
        email: Set(payload.email),
        address: Set(payload.address),
        id_card_number: Set(payload.id_card_number),
        customer_type: Set(payload.customer_type),
        created_by: Set(Some(user.user_id)),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_conflict(e, "Customer code already exists"))?;

    audit::record(
        &state.pool,
        user.user_id,
        "create_customer",
        "customers",
        created.id,
        json!({ "customer_code": created.customer_code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer created",
        created.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: CustomerListQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_role(user, CUSTOMER_ROLES)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(CustomerCol::IsActive.eq(true));
    if let Some(kind) = query.customer_type {
        condition = condition.add(CustomerCol::CustomerType.eq(kind));
    }
    if let Some(term) = search_term(&query.search) {
        condition = condition.add(search_condition(
            &[CustomerCol::Name, CustomerCol::Phone, CustomerCol::CustomerCode],
            term,
        ));
    }

    let finder = Customers::find()
        .filter(condition)
        .order_by_desc(CustomerCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Customer::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        CustomerList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    ensure_role(user, CUSTOMER_ROLES)?;
    let found = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Customer"))?;
    Ok(ApiResponse::success("Ok", found.into(), Some(Meta::empty())))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    ensure_role(user, CUSTOMER_ROLES)?;
    if payload.is_empty() {
        return Err(AppError::InvalidArgument("No fields to update".into()));
    }

    let existing = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Customer"))?;

    let mut active: CustomerActive = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidArgument("Customer name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(id_card_number) = payload.id_card_number {
        active.id_card_number = Set(Some(id_card_number));
    }
    if let Some(kind) = payload.customer_type {
        active.customer_type = Set(kind);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "update_customer",
        "customers",
        updated.id,
        json!({ "customer_code": updated.customer_code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer updated",
        updated.into(),
        Some(Meta::empty()),
    ))
}

mod common;

use dealership_api::{
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    entity::sea_orm_active_enums::{CustomerType, Role},
    error::AppError,
    routes::params::CustomerListQuery,
    services::customer_service,
};

#[tokio::test]
async fn create_search_and_deactivate_customer() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let cashier = common::create_user(&state, Role::Cashier, "cashier123").await?;
    let mechanic = common::create_user(&state, Role::Mechanic, "mech123").await?;
    let name = common::unique("PT Maju");

    let request = || CreateCustomerRequest {
        name: name.clone(),
        phone: Some("021555000".into()),
        email: Some("fleet@maju.test".into()),
        address: None,
        id_card_number: None,
        customer_type: CustomerType::Corporate,
    };

    let denied = customer_service::create_customer(&state, &mechanic, request()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let customer = customer_service::create_customer(&state, &cashier, request())
        .await?
        .data
        .expect("customer");
    assert!(customer.customer_code.starts_with("COR"));
    assert_eq!(customer.created_by, Some(cashier.user_id));
    assert!(customer.is_active);

    let found = customer_service::list_customers(
        &state,
        &cashier,
        CustomerListQuery {
            search: Some(name.to_lowercase()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("customer list");
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].id, customer.id);

    let empty = customer_service::update_customer(
        &state,
        &cashier,
        customer.id,
        UpdateCustomerRequest::default(),
    )
    .await;
    assert!(matches!(empty, Err(AppError::InvalidArgument(_))));

    customer_service::update_customer(
        &state,
        &cashier,
        customer.id,
        UpdateCustomerRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let hidden = customer_service::list_customers(
        &state,
        &cashier,
        CustomerListQuery {
            search: Some(name.clone()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("customer list");
    assert!(hidden.items.is_empty());

    Ok(())
}

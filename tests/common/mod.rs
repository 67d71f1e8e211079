#![allow(dead_code)]

use dealership_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::customers::CreateCustomerRequest,
    entity::{
        sea_orm_active_enums::{CustomerType, Role},
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    services::{auth_service::hash_password, customer_service},
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use uuid::Uuid;

/// Connect to the test database, or `None` when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        max_connections: 5,
        session_ttl_hours: 24,
    };
    let pool = create_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::new(pool, &config)))
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", &Uuid::new_v4().simple().to_string()[..10])
}

/// Insert an active user with the given role and password, returning the caller identity.
pub async fn create_user(state: &AppState, role: Role, password: &str) -> anyhow::Result<AuthUser> {
    let username = unique(role.as_str());
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.clone()),
        email: Set(format!("{username}@test.local")),
        password_hash: Set(hash_password(password)?),
        full_name: Set(format!("Test {}", role.as_str())),
        phone: Set(None),
        role: Set(role),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        role,
        session_id: Uuid::new_v4(),
    })
}

pub async fn create_customer(state: &AppState, cashier: &AuthUser) -> anyhow::Result<Uuid> {
    let resp = customer_service::create_customer(
        state,
        cashier,
        CreateCustomerRequest {
            name: unique("Customer"),
            phone: Some("0812000000".into()),
            email: None,
            address: None,
            id_card_number: None,
            customer_type: CustomerType::Individual,
        },
    )
    .await?;
    resp.data
        .map(|c| c.id)
        .ok_or_else(|| anyhow::anyhow!("customer missing"))
}

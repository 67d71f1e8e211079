mod common;

use dealership_api::{
    dto::auth::{CreateUserRequest, LoginRequest, UpdateUserRequest},
    entity::sea_orm_active_enums::Role,
    error::AppError,
    middleware::auth::authenticate,
    routes::params::UserListQuery,
    services::auth_service,
};

// Login opens a session that authenticates until logout closes it.
#[tokio::test]
async fn login_authenticate_and_logout() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let cashier = common::create_user(&state, Role::Cashier, "secret123").await?;

    let wrong = auth_service::login(
        &state,
        LoginRequest {
            username: cashier.username.clone(),
            password: "not-it".into(),
        },
        None,
    )
    .await;
    assert!(matches!(wrong, Err(AppError::Unauthenticated(_))));

    let login = auth_service::login(
        &state,
        LoginRequest {
            username: cashier.username.clone(),
            password: "secret123".into(),
        },
        Some("10.0.0.7".into()),
    )
    .await?
    .data
    .expect("login data");
    assert_eq!(login.user.id, cashier.user_id);
    assert_eq!(login.session_token.len(), 64);

    let session_user = authenticate(&state, &login.session_token).await?;
    assert_eq!(session_user.user_id, cashier.user_id);
    assert_eq!(session_user.role, Role::Cashier);

    auth_service::logout(&state, &session_user).await?;
    let after_logout = authenticate(&state, &login.session_token).await;
    assert!(matches!(after_logout, Err(AppError::Unauthenticated(_))));

    Ok(())
}

#[tokio::test]
async fn admin_manages_users() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, Role::Admin, "admin123").await?;
    let mechanic = common::create_user(&state, Role::Mechanic, "mech123").await?;

    let username = common::unique("newcashier");
    let request = || CreateUserRequest {
        username: username.clone(),
        email: format!("{username}@test.local"),
        password: "cashier123".into(),
        full_name: "New Cashier".into(),
        phone: None,
        role: Role::Cashier,
    };

    let denied = auth_service::create_user(&state, &mechanic, request()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let created = auth_service::create_user(&state, &admin, request())
        .await?
        .data
        .expect("created user");
    assert_eq!(created.role, Role::Cashier);

    let duplicate = auth_service::create_user(&state, &admin, request()).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let empty =
        auth_service::update_user(&state, &admin, created.id, UpdateUserRequest::default()).await;
    assert!(matches!(empty, Err(AppError::InvalidArgument(_))));

    let deactivated = auth_service::update_user(
        &state,
        &admin,
        created.id,
        UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("updated user");
    assert!(!deactivated.is_active);

    let login = auth_service::login(
        &state,
        LoginRequest {
            username: username.clone(),
            password: "cashier123".into(),
        },
        None,
    )
    .await;
    assert!(matches!(login, Err(AppError::Unauthenticated(_))));

    let cashiers = auth_service::list_users(
        &state,
        &admin,
        UserListQuery {
            role: Some(Role::Cashier),
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("user list");
    assert!(cashiers.items.iter().any(|u| u.id == created.id));
    assert!(cashiers.items.iter().all(|u| u.role == Role::Cashier));

    Ok(())
}

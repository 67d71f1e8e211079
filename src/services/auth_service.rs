use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserList},
    entity::{
        UserSessions, Users,
        user_sessions::{ActiveModel as SessionActive, Column as SessionCol},
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, generate_session_token, hash_session_token},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::UserListQuery,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
    ip_address: Option<String>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let invalid = || AppError::Unauthenticated("Invalid username or password".into());

    let user = Users::find()
        .filter(
            Condition::all()
                .add(UserCol::Username.eq(username.as_str()))
                .add(UserCol::IsActive.eq(true)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }

    let session_token = generate_session_token();
    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        token_hash: Set(hash_session_token(&session_token)),
        login_at: NotSet,
        logout_at: Set(None),
        ip_address: Set(ip_address),
        is_active: Set(true),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "user logged in");
    audit::record(
        &state.pool,
        user.id,
        "login",
        "user_sessions",
        session.id,
        json!({ "username": user.username }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            user: user.into(),
            session_token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn logout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<()>> {
    UserSessions::update_many()
        .col_expr(SessionCol::IsActive, false.into())
        .col_expr(SessionCol::LogoutAt, Utc::now().fixed_offset().into())
        .filter(SessionCol::Id.eq(user.session_id))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "logout",
        "user_sessions",
        user.session_id,
        json!({ "username": user.username }),
    )
    .await;

    Ok(ApiResponse::success("Logged out", (), Some(Meta::empty())))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success("Ok", found.into(), Some(Meta::empty())))
}

pub async fn create_user(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(admin)?;

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();
    if username.is_empty() || email.is_empty() || payload.full_name.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "username, email and full_name are required".into(),
        ));
    }
    if payload.password.len() < 6 {
        return Err(AppError::InvalidArgument(
            "Password must be at least 6 characters".into(),
        ));
    }

    let exists = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Username.eq(username.as_str()))
                .add(UserCol::Email.eq(email.as_str())),
        )
        .count(&state.orm)
        .await?;
    if exists > 0 {
        return Err(AppError::AlreadyExists(
            "Username or email already exists".into(),
        ));
    }

    let created = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        full_name: Set(payload.full_name),
        phone: Set(payload.phone),
        role: Set(payload.role),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_conflict(e, "Username or email already exists"))?;

    audit::record(
        &state.pool,
        admin.user_id,
        "create_user",
        "users",
        created.id,
        json!({ "username": created.username, "role": created.role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        created.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    admin: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(admin)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role {
        condition = condition.add(UserCol::Role.eq(role));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(UserCol::IsActive.eq(is_active));
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(admin)?;
    let found = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success("Ok", found.into(), Some(Meta::empty())))
}

pub async fn update_user(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(admin)?;
    if payload.is_empty() {
        return Err(AppError::InvalidArgument("No fields to update".into()));
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let mut active: UserActive = existing.into();
    if let Some(full_name) = payload.full_name {
        active.full_name = Set(full_name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.orm).await?;

    // A deactivated account loses its open sessions.
    if !updated.is_active {
        UserSessions::update_many()
            .col_expr(SessionCol::IsActive, false.into())
            .col_expr(SessionCol::LogoutAt, Utc::now().fixed_offset().into())
            .filter(
                Condition::all()
                    .add(SessionCol::UserId.eq(updated.id))
                    .add(SessionCol::IsActive.eq(true)),
            )
            .exec(&state.orm)
            .await?;
    }

    audit::record(
        &state.pool,
        admin.user_id,
        "update_user",
        "users",
        updated.id,
        json!({ "role": updated.role.as_str(), "is_active": updated.is_active }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        updated.into(),
        Some(Meta::empty()),
    ))
}

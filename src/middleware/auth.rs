use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    entity::{
        UserSessions, Users,
        sea_orm_active_enums::Role,
        user_sessions::Column as SessionCol,
    },
    error::{AppError, AppResult},
    state::AppState,
};

/// The caller behind a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub session_id: Uuid,
}

pub fn ensure_role(user: &AuthUser, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(AppError::Forbidden(format!(
        "Access denied. Required roles: {}",
        names.join(", ")
    )))
}

pub fn ensure_admin(user: &AuthUser) -> AppResult<()> {
    ensure_role(user, &[Role::Admin])
}

/// 32 random bytes, hex encoded. Only the SHA-256 of it is persisted.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Resolve a raw bearer token to its user. The session must be active, not logged out,
/// younger than the configured TTL, and belong to an active user.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let invalid = || AppError::Unauthenticated("Invalid or expired session".into());

    let found = UserSessions::find()
        .filter(
            Condition::all()
                .add(SessionCol::TokenHash.eq(hash_session_token(token)))
                .add(SessionCol::IsActive.eq(true))
                .add(SessionCol::LogoutAt.is_null())
                .add(SessionCol::LoginAt.gt(Utc::now() - state.session_ttl)),
        )
        .find_also_related(Users)
        .one(&state.orm)
        .await?;

    let (session, user) = match found {
        Some((session, Some(user))) if user.is_active => (session, user),
        _ => return Err(invalid()),
    };

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
        session_id: session.id,
    })
}

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Invalid Authorization scheme".into()))?;
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        authenticate(state, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: "tester".into(),
            role,
            session_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn ensure_role_lists_required_roles() {
        let err = ensure_role(&user(Role::Mechanic), &[Role::Admin, Role::Cashier])
            .expect_err("mechanic is not allowed");
        assert_eq!(
            err.to_string(),
            "Access denied. Required roles: admin, cashier"
        );
        assert!(ensure_role(&user(Role::Cashier), &[Role::Admin, Role::Cashier]).is_ok());
        assert!(ensure_admin(&user(Role::Admin)).is_ok());
    }

    #[test]
    fn session_tokens_are_random_and_hashed() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_session_token(&a), hash_session_token(&a));
        assert_ne!(hash_session_token(&a), a);
    }
}

use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};

use crate::{
    dto::auth::TokenType,
    error::AppError,
    services::auth_service::decode_claims,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub is_staff: bool,
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff {
        return Err(AppError::Forbidden("staff only".into()));
    }
    Ok(())
}

/// Course content may be changed by its author or by staff.
pub fn ensure_author_or_staff(user: &AuthUser, author_id: i64) -> Result<(), AppError> {
    if user.is_staff || user.user_id == author_id {
        return Ok(());
    }
    Err(AppError::Forbidden("only the course author can change it".into()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        };

        let claims = decode_claims(&state.config.jwt_secret, token.trim(), TokenType::Access)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            is_staff: claims.is_staff,
        })
    }
}

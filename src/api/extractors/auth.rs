use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::{Claims, Role, Session};
use crate::error::AppError;
use std::sync::Arc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{warn, Span};

/// Any authenticated caller.
pub struct AuthSession(pub Session);

/// An authenticated caller holding the admin role.
pub struct AdminSession(pub Session);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

pub fn verify_token(token: &str, state: &AppState) -> Result<Session, AppError> {
    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[state.config.auth_issuer.as_str()]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AppError::Unauthorized
    })?;

    let role: Role = token_data.claims.role.parse().map_err(|_| AppError::Unauthorized)?;

    Ok(Session { user_id: token_data.claims.sub, role })
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let session = verify_token(bearer_token(parts)?, &app_state)?;

        Span::current().record("user_id", session.user_id.as_str());

        Ok(AuthSession(session))
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthSession(session) = AuthSession::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(AdminSession(session))
    }
}

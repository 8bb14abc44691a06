use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::photo::CallerContext;
use crate::routes::AppState;

/// Claims of tokens issued by the external auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    #[serde(default)]
    pub role: String,
}

pub fn decode_caller(token: &str, secret: &str) -> Result<CallerContext, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT decode error");
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    Ok(CallerContext {
        caller_id: token_data.claims.sub,
        is_admin: token_data.claims.role.eq_ignore_ascii_case("admin"),
    })
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let caller = decode_caller(token, &state.jwt_secret)?;

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

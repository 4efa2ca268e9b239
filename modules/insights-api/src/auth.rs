use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::jwt::{parse_bearer, Claims, JwtService};
use crate::AppState;

/// Authenticated caller. Extract this in handlers that always require a token.
pub struct BearerUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for BearerUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(BearerUser(claims.clone()));
        }
        authenticate(&parts.headers, &state.jwt).map(BearerUser)
    }
}

/// Gate for the data routes. Only enforced when the deployment turns
/// `REQUIRE_AUTH` on; verified claims are left in the request extensions.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.require_auth {
        let claims = authenticate(request.headers(), &state.jwt)?;
        request.extensions_mut().insert(claims);
    }
    Ok(next.run(request).await)
}

fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<Claims, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    jwt.verify_token(token)
        .map_err(|_| ApiError::Unauthorized("Not authorized, token failed".to_string()))
}

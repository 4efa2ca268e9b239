use std::sync::{Arc, LazyLock};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use regex::Regex;
use tracing::info;

use insights_common::wire::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};
use insights_store::{NewUser, User};

use crate::auth::BearerUser;
use crate::error::ApiError;
use crate::password::{hash_password, verify_password};
use crate::rest::parse_body;
use crate::AppState;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.name.trim().chars().count() < MIN_NAME_CHARS {
        return Err(ApiError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    if !EMAIL_RE.is_match(req.email.trim()) {
        return Err(ApiError::Validation("Email is invalid".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let token = state.jwt.create_token(user)?;
    Ok(AuthResponse {
        success: true,
        data: AuthUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            token: Some(token),
        },
    })
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: RegisterRequest = serde_json::from_value(parse_body(&body)?)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validate_registration(&req)?;

    let user = state
        .users
        .create(NewUser {
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash: hash_password(&req.password),
        })
        .await?
        .ok_or_else(|| ApiError::Validation("User already exists".to_string()))?;
    info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AuthResponse>, ApiError> {
    let req: LoginRequest = serde_json::from_value(parse_body(&body)?)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());
    let user = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }
    info!(user_id = %user.id, "User logged in");

    Ok(Json(auth_response(&state, &user)?))
}

/// `GET /api/auth/me`
pub async fn me(BearerUser(claims): BearerUser) -> Result<Json<AuthResponse>, ApiError> {
    let id = claims
        .user_id()
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, token failed".to_string()))?;
    Ok(Json(AuthResponse {
        success: true,
        data: AuthUser {
            id,
            name: claims.name,
            email: claims.email,
            token: None,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_a_reasonable_registration() {
        assert!(validate_registration(&req("Ada", "ada@example.com", "secret1")).is_ok());
    }

    #[test]
    fn rejects_short_names_bad_emails_and_short_passwords() {
        assert!(validate_registration(&req("A", "ada@example.com", "secret1")).is_err());
        assert!(validate_registration(&req("Ada", "ada.example.com", "secret1")).is_err());
        assert!(validate_registration(&req("Ada", "ada@example", "secret1")).is_err());
        assert!(validate_registration(&req("Ada", "ada@example.com", "12345")).is_err());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}

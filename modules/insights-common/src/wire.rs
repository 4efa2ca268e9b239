//! JSON envelopes exchanged between the API and the dashboard client.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::facets::FacetLists;
use crate::types::Record;

/// `GET /data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Record>,
}

/// `POST /data`, `PUT /data/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub data: Record,
}

/// `GET /filters`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersResponse {
    pub success: bool,
    #[serde(flatten)]
    pub lists: FacetLists,
}

/// `DELETE /data/{id}` and any failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `POST /auth/register`, `POST /auth/login`, `GET /auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub data: AuthUser,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub mod auth;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use insights_common::wire::{FiltersResponse, MessageResponse, RecordListResponse, RecordResponse};
use insights_common::{RecordFields, RecordFilter, RecordPatch};
use insights_store::enumerate_facets;

use crate::error::ApiError;
use crate::AppState;

// --- Helpers ---

/// Decode a JSON request body. An empty body is treated as `{}`.
pub(crate) fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("Invalid JSON body: {e}")))
}

/// Unparseable ids cannot name a record, so they are reported as not found.
fn parse_record_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::record_not_found())
}

// --- Handlers ---

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Welcome to the Insights Dashboard API" }))
}

/// `GET /api/data?{facet}={value}&...`
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<RecordListResponse>, ApiError> {
    let filter = RecordFilter::from_query_pairs(params);
    let data = state.records.find(&filter).await?;

    Ok(Json(RecordListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

/// `GET /api/filters`
pub async fn get_filters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FiltersResponse>, ApiError> {
    let lists = enumerate_facets(state.records.as_ref()).await?;
    Ok(Json(FiltersResponse {
        success: true,
        lists,
    }))
}

/// `POST /api/data`
pub async fn create_data(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let fields = RecordFields::from_json(parse_body(&body)?)?;
    fields.validate()?;

    let created = state.records.insert(fields).await?;
    info!(id = %created.id, topic = %created.topic, "Record created");

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            success: true,
            data: created,
        }),
    ))
}

/// `PUT /api/data/{id}`
pub async fn update_data(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<RecordResponse>, ApiError> {
    let id = parse_record_id(&id)?;
    let patch = RecordPatch::from_json(parse_body(&body)?)?;

    let updated = state
        .records
        .update(id, &patch)
        .await?
        .ok_or_else(ApiError::record_not_found)?;
    info!(id = %id, "Record updated");

    Ok(Json(RecordResponse {
        success: true,
        data: updated,
    }))
}

/// `DELETE /api/data/{id}`
pub async fn delete_data(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_record_id(&id)?;

    state
        .records
        .delete(id)
        .await?
        .ok_or_else(ApiError::record_not_found)?;
    info!(id = %id, "Record deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Record deleted".to_string(),
        error: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(
            parse_body(&Bytes::from_static(b"")).unwrap(),
            serde_json::json!({})
        );
        assert_eq!(
            parse_body(&Bytes::from_static(b" \n")).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        let err = parse_body(&Bytes::from_static(b"{title:")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn bad_ids_are_not_found() {
        assert!(matches!(
            parse_record_id("not-a-uuid"),
            Err(ApiError::NotFound(_))
        ));
    }
}

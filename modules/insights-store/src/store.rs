use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use insights_common::{Facet, Record, RecordFields, RecordFilter, RecordPatch};

/// Document-store access for dashboard records.
///
/// Every operation is an independent pass-through: no transactions span
/// calls and concurrent updates to one id are last-write-wins. "Not found"
/// is `Ok(None)`, never an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records matching `filter`, in insertion order. No pagination.
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<Record>>;

    /// Unique raw values of one facet across the whole store. Records that
    /// lack the field may contribute `Value::Null`.
    async fn distinct(&self, facet: Facet) -> Result<Vec<Value>>;

    /// Persist a new record and return it with its assigned id.
    async fn insert(&self, fields: RecordFields) -> Result<Record>;

    /// Bulk insert for seeding. Returns how many records were written.
    async fn insert_many(&self, batch: Vec<RecordFields>) -> Result<usize>;

    /// Apply a partial update and return the post-update record.
    async fn update(&self, id: Uuid, patch: &RecordPatch) -> Result<Option<Record>>;

    /// Remove a record, returning what was removed.
    async fn delete(&self, id: Uuid) -> Result<Option<Record>>;

    /// Remove every record. Returns how many were removed.
    async fn clear(&self) -> Result<u64>;
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use insights_common::{Facet, Record, RecordFields, RecordFilter, RecordPatch};

use crate::store::RecordStore;

/// In-process record store. Used by tests and by `STORE=memory` local runs.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(batch: Vec<RecordFields>) -> Self {
        Self {
            records: RwLock::new(batch.into_iter().map(Record::new).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| filter.matches(&r.fields))
            .cloned()
            .collect())
    }

    async fn distinct(&self, facet: Facet) -> Result<Vec<Value>> {
        let records = self.records.read().await;
        let mut seen: Vec<&str> = Vec::new();
        for record in records.iter() {
            let value = record.fields.facet_value(facet);
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        Ok(seen.into_iter().map(|v| Value::String(v.to_string())).collect())
    }

    async fn insert(&self, fields: RecordFields) -> Result<Record> {
        let record = Record::new(fields);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn insert_many(&self, batch: Vec<RecordFields>) -> Result<usize> {
        let count = batch.len();
        self.records
            .write()
            .await
            .extend(batch.into_iter().map(Record::new));
        Ok(count)
    }

    async fn update(&self, id: Uuid, patch: &RecordPatch) -> Result<Option<Record>> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        patch.apply(&mut record.fields);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Record>> {
        let mut records = self.records.write().await;
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        Ok(Some(records.remove(pos)))
    }

    async fn clear(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

//! Postgres-backed record store.
//!
//! Each record is one JSONB document in `records.doc`. Equality filters
//! become a containment check (`doc @> filter`), which the GIN index on
//! `doc` serves directly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use insights_common::{Facet, Record, RecordFields, RecordFilter, RecordPatch};

use crate::store::RecordStore;

/// Run pending schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("running migrations")?;
    Ok(())
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, doc, created_at, updated_at
            FROM records
            WHERE doc @> $1
            ORDER BY seq ASC
            "#,
        )
        .bind(filter.to_document())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    async fn distinct(&self, facet: Facet) -> Result<Vec<Value>> {
        let values = sqlx::query_scalar::<_, Option<Value>>(
            r#"
            SELECT DISTINCT doc -> $1::text
            FROM records
            "#,
        )
        .bind(facet.field())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("distinct {facet}"))?;

        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(Value::Null))
            .collect())
    }

    async fn insert(&self, fields: RecordFields) -> Result<Record> {
        let record = Record::new(fields);
        sqlx::query(
            r#"
            INSERT INTO records (id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(record.fields.to_document())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_many(&self, batch: Vec<RecordFields>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let count = batch.len();

        for fields in batch {
            let record = Record::new(fields);
            sqlx::query(
                r#"
                INSERT INTO records (id, doc, created_at, updated_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(record.id)
            .bind(record.fields.to_document())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(count, "Inserted record batch");
        Ok(count)
    }

    async fn update(&self, id: Uuid, patch: &RecordPatch) -> Result<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE records
            SET doc = doc || $2, updated_at = now()
            WHERE id = $1
            RETURNING id, doc, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.to_document())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RecordRow::into_record).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            DELETE FROM records
            WHERE id = $1
            RETURNING id, doc, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RecordRow::into_record).transpose()
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM records")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

struct RecordRow {
    id: Uuid,
    doc: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecordRow {
    fn into_record(self) -> Result<Record> {
        let fields: RecordFields = serde_json::from_value(self.doc)
            .with_context(|| format!("decoding record {}", self.id))?;
        Ok(Record {
            id: self.id,
            fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for RecordRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(RecordRow {
            id: row.try_get("id")?,
            doc: row.try_get("doc")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

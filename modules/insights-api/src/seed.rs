//! Bulk import of a JSON array of records, as exported from the source dataset.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

use insights_common::RecordFields;
use insights_store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub cleared: u64,
    pub imported: usize,
}

/// Parse `json` (a top-level array of record objects) and write it to the
/// store, clearing existing records first unless `keep_existing` is set.
///
/// Rows are imported as-is: the create-time title/topic requirement does not
/// apply to seed data.
pub async fn import_records(
    store: &dyn RecordStore,
    json: &str,
    keep_existing: bool,
) -> Result<ImportSummary> {
    let value: Value = serde_json::from_str(json).context("seed file is not valid JSON")?;
    let Value::Array(rows) = value else {
        bail!("seed file must contain a JSON array of records");
    };

    let batch = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value::<RecordFields>(row).with_context(|| format!("record #{i}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let cleared = if keep_existing {
        0
    } else {
        let cleared = store.clear().await?;
        info!(cleared, "Data cleared");
        cleared
    };

    let imported = store.insert_many(batch).await?;
    info!(imported, "Records imported");

    Ok(ImportSummary { cleared, imported })
}

pub async fn import_file(
    store: &dyn RecordStore,
    path: &Path,
    keep_existing: bool,
) -> Result<ImportSummary> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    import_records(store, &json, keep_existing).await
}

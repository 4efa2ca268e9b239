use anyhow::Result;
use futures::future::try_join_all;
use tracing::debug;

use insights_common::{sanitize_facet_values, Facet, FacetLists};

use crate::store::RecordStore;

/// Build every dropdown list from the unfiltered store.
///
/// One distinct query per facet, issued concurrently. If any of them fails
/// the whole call fails; there are no partial facet results.
pub async fn enumerate_facets(store: &dyn RecordStore) -> Result<FacetLists> {
    let raw = try_join_all(Facet::ALL.iter().map(|facet| store.distinct(*facet))).await?;

    let mut lists = FacetLists::default();
    for (facet, values) in Facet::ALL.into_iter().zip(raw) {
        let values = sanitize_facet_values(values);
        debug!(facet = %facet, count = values.len(), "Enumerated facet");
        lists.set(facet, values);
    }
    Ok(lists)
}

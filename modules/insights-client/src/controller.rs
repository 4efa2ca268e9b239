//! Loading and filtering state behind the dashboard view.
//!
//! Every fetch is stamped with a generation from a monotonically increasing
//! counter. A response is applied only if no newer fetch has started since,
//! so a slow response for an old filter can never overwrite the records of
//! a newer one. In-flight requests are not cancelled; their results are
//! dropped on arrival.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use insights_common::{FacetLists, Record};

use crate::aggregate::DashboardCharts;
use crate::api::DashboardApi;
use crate::query::FilterSelection;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Error(String),
}

/// Snapshot of what the view renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub load: LoadState,
    pub records: Vec<Record>,
    pub facets: FacetLists,
    pub selection: FilterSelection,
}

pub struct DashboardController<A: DashboardApi + ?Sized> {
    api: Arc<A>,
    state: Mutex<DashboardState>,
    generation: AtomicU64,
}

impl<A: DashboardApi + ?Sized> DashboardController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(DashboardState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Claim the next generation. Callers hold the state lock, so generation
    /// order matches the order of the state writes made under it.
    fn begin(&self, _state: &mut DashboardState) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Initial entry: unfiltered records and facet lists, fetched together.
    /// If either fails, both are left empty and the state is `Error`.
    pub async fn load(&self) -> LoadState {
        let generation = {
            let mut state = self.state.lock().await;
            state.load = LoadState::Loading;
            self.begin(&mut state)
        };

        let everything = FilterSelection::new();
        let (records, facets) = tokio::join!(
            self.api.fetch_records(&everything),
            self.api.fetch_facets()
        );

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            // A filter change started meanwhile and owns the records, but it
            // never fetches facets, so keep them if they arrived.
            if let Ok(facets) = facets {
                state.facets = facets;
            }
            debug!(generation, "Dropping superseded initial load");
            return state.load.clone();
        }

        match (records, facets) {
            (Ok(records), Ok(facets)) => {
                debug!(records = records.len(), "Dashboard loaded");
                state.records = records;
                state.facets = facets;
                state.load = LoadState::Ready;
            }
            (records, facets) => {
                let message = records
                    .err()
                    .or(facets.err())
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                warn!(error = %message, "Error loading dashboard data");
                state.records.clear();
                state.facets = FacetLists::default();
                state.load = LoadState::Error(message);
            }
        }
        state.load.clone()
    }

    /// Fetch the records for `selection`. Facet lists are not refreshed.
    pub async fn apply_filters(&self, selection: FilterSelection) -> LoadState {
        let generation = {
            let mut state = self.state.lock().await;
            state.selection = selection.clone();
            state.load = LoadState::Loading;
            self.begin(&mut state)
        };

        let result = self.api.fetch_records(&selection).await;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            debug!(generation, "Dropping stale filter response");
            return state.load.clone();
        }

        match result {
            Ok(records) => {
                debug!(records = records.len(), "Filtered records received");
                state.records = records;
                state.load = LoadState::Ready;
            }
            Err(e) => {
                warn!(error = %e, "Error fetching filtered data");
                state.records.clear();
                state.load = LoadState::Error(e.to_string());
            }
        }
        state.load.clone()
    }

    pub async fn reset_filters(&self) -> LoadState {
        self.apply_filters(FilterSelection::new()).await
    }

    pub async fn state(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn charts(&self) -> DashboardCharts {
        DashboardCharts::from_records(&self.state.lock().await.records)
    }
}

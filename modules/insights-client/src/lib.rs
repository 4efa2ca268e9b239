//! Dashboard-side counterpart of the insights API: query building, a typed
//! HTTP client, chart aggregation and the view controller that ties them
//! together.

pub mod aggregate;
pub mod api;
pub mod controller;
pub mod error;
pub mod query;

pub use aggregate::{DashboardCharts, KpiSummary, Series};
pub use api::{Credentials, DashboardApi, HttpDashboardApi};
pub use controller::{DashboardController, DashboardState, LoadState};
pub use error::{ClientError, Result};
pub use query::{FilterSelection, Selection};

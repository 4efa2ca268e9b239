pub mod types;
pub mod facets;
pub mod filter;
pub mod config;
pub mod error;
pub mod wire;

pub use types::*;
pub use facets::{sanitize_facet_values, FacetLists};
pub use filter::RecordFilter;
pub use config::{Config, StoreBackend};
pub use error::DashboardError;

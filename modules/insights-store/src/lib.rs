//! Record and account persistence for the insights dashboard.
//!
//! `RecordStore` is the seam the API talks to. `PgRecordStore` keeps each
//! record as a JSONB document; `MemoryRecordStore` holds them in process.

pub mod facets;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod users;

pub use facets::enumerate_facets;
pub use memory::MemoryRecordStore;
pub use postgres::{migrate, PgRecordStore};
pub use store::RecordStore;
pub use users::{MemoryUserStore, NewUser, PgUserStore, User, UserStore};

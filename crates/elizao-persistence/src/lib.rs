//! Persistence layer for Elizao business records.
//!
//! The agents write briefs and update leads through the [`Persistence`]
//! capability. Two backends are provided:
//!
//! - [`JsonRecordStore`]: JSON files written atomically (temp file, then rename)
//! - [`InMemoryRecordStore`]: process-local store for tests and dry runs
//!
//! # Example
//!
//! ```no_run
//! use elizao_persistence::{JsonRecordStore, Persistence};
//! use elizao_models::LeadRecord;
//!
//! # async fn example() -> elizao_persistence::Result<()> {
//! let store = JsonRecordStore::new("/home/user/.elizao/data");
//!
//! store.append_lead(LeadRecord::new("Acme chat", "Jane")).await?;
//! let due = store.query_due_follow_ups().await?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod error;
pub mod json_store;
pub mod memory_store;
pub mod store;

pub use error::{PersistenceError, Result};
pub use json_store::JsonRecordStore;
pub use memory_store::InMemoryRecordStore;
pub use store::Persistence;

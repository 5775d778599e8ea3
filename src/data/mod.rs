//! Reference data subsystem.
//!
//! # Data Flow
//! ```text
//! First main-endpoint request
//!     → store.rs (one-time load barrier)
//!     → source.rs (read countries.json, democracies.json)
//!     → types.rs (CountryNameIndex, Vec<DemocracyRecord>)
//!     → held in memory for the life of the process
//!
//! Later requests:
//!     → store.rs returns the cached outcome (tables or the original error)
//! ```
//!
//! # Design Decisions
//! - Load runs at most once; concurrent callers await the same result
//! - A failed load is permanent until restart (no retry storms)
//! - Democracy records are scanned linearly; first match wins

pub mod source;
pub mod store;
pub mod types;

pub use source::{FileSource, ReferenceSource, Table};
pub use store::{LoadError, LoadErrorKind, ReferenceStore, StoreState};
pub use types::{CountryNameIndex, DemocracyRecord, ReferenceData};

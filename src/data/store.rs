//! Lazily loaded reference data store.
//!
//! The first caller of [`ReferenceStore::ensure_loaded`] runs the load; every
//! concurrent caller awaits that same load, and every later caller sees its
//! outcome. A failed load is never retried for the life of the store.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::data::source::{ReferenceSource, Table};
use crate::data::types::{CountryNameIndex, DemocracyRecord, ReferenceData};
use crate::observability::metrics;

/// What went wrong while loading a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The table could not be read.
    Read,
    /// The table was read but is not valid JSON of the expected shape.
    Parse,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadErrorKind::Read => f.write_str("load"),
            LoadErrorKind::Parse => f.write_str("parse"),
        }
    }
}

/// A failed one-time load. Cloned out to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not {kind} {stage} data: {cause}")]
pub struct LoadError {
    pub stage: Table,
    pub kind: LoadErrorKind,
    pub cause: String,
}

impl LoadError {
    fn read(stage: Table, err: std::io::Error) -> Self {
        Self { stage, kind: LoadErrorKind::Read, cause: err.to_string() }
    }

    fn parse(stage: Table, err: serde_json::Error) -> Self {
        Self { stage, kind: LoadErrorKind::Parse, cause: err.to_string() }
    }
}

/// Snapshot of the store for logging and introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    Unloaded,
    Loaded { countries: usize, democracies: usize },
    Failed(LoadError),
}

/// Holds the reference tables behind a single-execution load barrier.
#[derive(Debug)]
pub struct ReferenceStore {
    source: Arc<dyn ReferenceSource>,
    cell: OnceCell<Result<ReferenceData, LoadError>>,
    loads: AtomicUsize,
}

impl ReferenceStore {
    /// Create an empty store that will load from `source` on first use.
    pub fn new(source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Create a store that is already loaded. Nothing is ever read.
    pub fn preloaded(data: ReferenceData) -> Self {
        Self {
            source: Arc::new(NoSource),
            cell: OnceCell::new_with(Some(Ok(data))),
            loads: AtomicUsize::new(0),
        }
    }

    /// Load the tables if no load has happened yet, and return the outcome.
    pub async fn ensure_loaded(&self) -> Result<&ReferenceData, LoadError> {
        self.cell
            .get_or_init(|| async { self.load() })
            .await
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Number of times the load body has run (0 or 1).
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Current state without triggering a load.
    pub fn state(&self) -> StoreState {
        match self.cell.get() {
            None => StoreState::Unloaded,
            Some(Ok(data)) => StoreState::Loaded {
                countries: data.countries.len(),
                democracies: data.democracies.len(),
            },
            Some(Err(e)) => StoreState::Failed(e.clone()),
        }
    }

    fn load(&self) -> Result<ReferenceData, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        let result = self.load_tables();
        match &result {
            Ok(data) => {
                tracing::info!(
                    countries = data.countries.len(),
                    democracies = data.democracies.len(),
                    "Reference data loaded"
                );
                metrics::record_load("success");
            }
            Err(e) => {
                tracing::error!(stage = %e.stage, error = %e, "{}", e);
                metrics::record_load("failure");
            }
        }
        result
    }

    fn load_tables(&self) -> Result<ReferenceData, LoadError> {
        tracing::info!("Loading country data");
        let raw = self
            .source
            .read(Table::Countries)
            .map_err(|e| LoadError::read(Table::Countries, e))?;
        let countries: CountryNameIndex = serde_json::from_slice::<HashMap<String, String>>(&raw)
            .map_err(|e| LoadError::parse(Table::Countries, e))?;

        tracing::info!("Loading democracy data");
        let raw = self
            .source
            .read(Table::Democracies)
            .map_err(|e| LoadError::read(Table::Democracies, e))?;
        let democracies: Vec<DemocracyRecord> = serde_json::from_slice(&raw)
            .map_err(|e| LoadError::parse(Table::Democracies, e))?;

        Ok(ReferenceData { countries, democracies })
    }
}

#[derive(Debug)]
struct NoSource;

impl ReferenceSource for NoSource {
    fn read(&self, _table: Table) -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no reference source"))
    }
}

//! Where the reference tables come from.

use std::fmt;
use std::path::PathBuf;

use crate::config::DataConfig;

/// The two reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Countries,
    Democracies,
}

impl Table {
    /// Short label for logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Countries => "country",
            Table::Democracies => "democracy",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplies the raw bytes of each table.
pub trait ReferenceSource: Send + Sync + fmt::Debug {
    /// Read the raw JSON of `table`.
    fn read(&self, table: Table) -> std::io::Result<Vec<u8>>;
}

/// Reads tables from JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    countries: PathBuf,
    democracies: PathBuf,
}

impl FileSource {
    /// Files `countries.json` and `democracies.json` under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            countries: dir.join("countries.json"),
            democracies: dir.join("democracies.json"),
        }
    }

    /// File names taken from the data config, rooted at `dir`.
    pub fn from_config(dir: impl Into<PathBuf>, config: &DataConfig) -> Self {
        let dir = dir.into();
        Self {
            countries: dir.join(&config.countries_file),
            democracies: dir.join(&config.democracies_file),
        }
    }

    /// Path backing `table`.
    pub fn path(&self, table: Table) -> &PathBuf {
        match table {
            Table::Countries => &self.countries,
            Table::Democracies => &self.democracies,
        }
    }
}

impl ReferenceSource for FileSource {
    fn read(&self, table: Table) -> std::io::Result<Vec<u8>> {
        let path = self.path(table);
        tracing::debug!(table = %table, path = %path.display(), "Reading reference table");
        std::fs::read(path)
    }
}

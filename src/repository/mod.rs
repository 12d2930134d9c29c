use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::row::{PRODUCT_COLUMNS, Row, Table, VARIANT_COLUMNS};

pub mod csv;

pub use self::csv::CsvRepository;

/// Errors raised by dataset storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },
    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },
}

/// Convenient alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;

/// The two datasets produced from storefront feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Products,
    Variants,
}

impl Dataset {
    /// Fixed header written when the dataset file is created.
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Products => &PRODUCT_COLUMNS,
            Self::Variants => &VARIANT_COLUMNS,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Variants => "variants",
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only sink for mapped rows.
pub trait DatasetWriter {
    /// Appends `rows` to the dataset, returning how many were written.
    fn append_rows(&self, dataset: Dataset, rows: &[Row]) -> StorageResult<usize>;
}

/// Reads a dataset back in full.
pub trait DatasetReader {
    fn load_table(&self, dataset: Dataset) -> StorageResult<Table>;
}

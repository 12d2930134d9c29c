use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::domain::row::{Row, Table};
use crate::repository::{Dataset, DatasetReader, DatasetWriter, StorageError, StorageResult};

/// Dataset store backed by two append-only CSV files.
#[derive(Debug, Clone)]
pub struct CsvRepository {
    products_path: PathBuf,
    variants_path: PathBuf,
}

impl CsvRepository {
    pub fn new(products_path: impl Into<PathBuf>, variants_path: impl Into<PathBuf>) -> Self {
        Self {
            products_path: products_path.into(),
            variants_path: variants_path.into(),
        }
    }

    pub fn path(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Products => &self.products_path,
            Dataset::Variants => &self.variants_path,
        }
    }
}

impl DatasetWriter for CsvRepository {
    fn append_rows(&self, dataset: Dataset, rows: &[Row]) -> StorageResult<usize> {
        append_rows(self.path(dataset), dataset.columns(), rows)
    }
}

impl DatasetReader for CsvRepository {
    fn load_table(&self, dataset: Dataset) -> StorageResult<Table> {
        load_table(self.path(dataset))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> StorageError + '_ {
    move |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Appends `rows` to the CSV file at `path`.
///
/// The file and its parent directories are created when missing. The header
/// is written only if the file was empty before this call.
pub fn append_rows(path: &Path, columns: &[&str], rows: &[Row]) -> StorageResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error(path))?;
    let was_empty = file.metadata().map_err(io_error(path))?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if was_empty {
        writer.write_record(columns).map_err(csv_error(path))?;
    }
    for row in rows {
        writer.write_record(row.cells()).map_err(csv_error(path))?;
    }
    writer.flush().map_err(io_error(path))?;

    Ok(rows.len())
}

/// Loads the full contents of the CSV file at `path`.
///
/// Short records are padded with empty cells up to the header width.
pub fn load_table(path: &Path) -> StorageResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error(path))?;

    let headers = reader
        .headers()
        .map_err(csv_error(path))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.is_empty() {
        return Err(StorageError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error(path))?;
        let mut cells = record.iter().map(str::to_string).collect::<Vec<_>>();
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }
        rows.push(Row::new(cells));
    }

    Ok(Table::new(headers, rows))
}

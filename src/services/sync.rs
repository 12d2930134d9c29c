//! Mirroring of the CSV datasets into spreadsheet tabs.

use chrono::FixedOffset;

use crate::domain::row::Table;
use crate::models::config::{Destination, SpreadsheetLocator, SyncTarget};
use crate::repository::{Dataset, DatasetReader};
use crate::services::errors::PipelineResult;
use crate::services::timezone::{PRODUCT_TIMESTAMPS, VARIANT_TIMESTAMPS, localize_table};
use crate::sheets::credentials::ServiceAccountKey;
use crate::sheets::{CellRange, CellRef, SheetWriter, SheetsResult, Worksheet};

/// A tab that received a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedTab {
    pub dataset: Dataset,
    pub worksheet: Worksheet,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The credential file was absent; nothing was sent.
    Skipped { credentials: String },
    Completed { tabs: Vec<SyncedTab> },
}

/// Loads both datasets, prepared for `target`.
pub fn load_tables<R>(
    reader: &R,
    target: &SyncTarget,
    offset: FixedOffset,
) -> PipelineResult<(Table, Table)>
where
    R: DatasetReader,
{
    let mut products = reader.load_table(Dataset::Products)?;
    let mut variants = reader.load_table(Dataset::Variants)?;
    if target.convert_timezone {
        localize_table(&mut products, &PRODUCT_TIMESTAMPS, offset);
        localize_table(&mut variants, &VARIANT_TIMESTAMPS, offset);
    }
    Ok((products, variants))
}

/// Runs one synchronization target.
///
/// `connect` is only called once credentials were loaded successfully, so a
/// missing or malformed key never reaches the remote service.
pub fn synchronize<R, S, C>(
    reader: &R,
    target: &SyncTarget,
    offset: FixedOffset,
    connect: C,
) -> PipelineResult<SyncOutcome>
where
    R: DatasetReader,
    S: SheetWriter,
    C: FnOnce(&ServiceAccountKey) -> SheetsResult<S>,
{
    let (products, variants) = load_tables(reader, target, offset)?;

    let Some(key) = target.credentials.load()? else {
        log::warn!(
            "Credentials file {} not found, skipping sync target {}",
            target.credentials.describe(),
            target.name
        );
        return Ok(SyncOutcome::Skipped {
            credentials: target.credentials.describe(),
        });
    };
    let sheets = connect(&key)?;

    let tabs = vec![
        push_table(
            &sheets,
            Dataset::Products,
            &products,
            &target.products,
            target.include_header,
        )?,
        push_table(
            &sheets,
            Dataset::Variants,
            &variants,
            &target.variants,
            target.include_header,
        )?,
    ];
    Ok(SyncOutcome::Completed { tabs })
}

/// Overwrites the destination tab with `table`.
pub fn push_table<S>(
    sheets: &S,
    dataset: Dataset,
    table: &Table,
    destination: &Destination,
    include_header: bool,
) -> SheetsResult<SyncedTab>
where
    S: SheetWriter + ?Sized,
{
    let spreadsheet_id = match &destination.spreadsheet {
        SpreadsheetLocator::Title(title) => sheets.resolve_spreadsheet(title)?,
        SpreadsheetLocator::Id(id) => id.clone(),
    };
    let worksheet = Worksheet::new(spreadsheet_id, &destination.tab);
    let rows = table.row_count();
    let columns = table.column_count();

    sheets.ensure_grid(&worksheet, rows + 1, columns)?;

    let first_row = sheets.read_row(&worksheet, 1)?;
    if first_row.iter().all(|cell| cell.trim().is_empty()) {
        log::info!("Writing header to empty tab '{}'", worksheet.tab);
        sheets.write(&worksheet, CellRef::TOP_LEFT, &[table.headers.clone()])?;
    }

    if let Some(range) = CellRange::data_region(rows, columns) {
        sheets.clear(&worksheet, &range)?;
    }

    if include_header {
        sheets.write(&worksheet, CellRef::TOP_LEFT, &table.to_values())?;
    } else if rows > 0 {
        let values: Vec<Vec<String>> = table.rows.iter().map(|row| row.cells().to_vec()).collect();
        sheets.write(&worksheet, CellRef::new(1, 2), &values)?;
    }

    log::info!(
        "Synced {rows} {dataset} rows to '{}' in {}",
        worksheet.tab,
        worksheet.spreadsheet_id
    );
    Ok(SyncedTab {
        dataset,
        worksheet,
        rows,
    })
}

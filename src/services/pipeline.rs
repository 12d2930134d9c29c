//! The two-phase run: fetch-and-append for every source, then synchronize.

use reqwest::blocking::Client;

use crate::domain::product::Product;
use crate::domain::row::Row;
use crate::domain::types::StorefrontUrl;
use crate::models::config::{PipelineConfig, SyncTarget};
use crate::repository::{CsvRepository, Dataset, DatasetReader, DatasetWriter};
use crate::services::errors::{PipelineError, PipelineResult};
use crate::services::fetch::{FeedFetcher, HttpFeedFetcher};
use crate::services::sync::{SyncOutcome, synchronize};
use crate::sheets::credentials::ServiceAccountKey;
use crate::sheets::google::GoogleSheetsClient;
use crate::sheets::{SheetWriter, SheetsResult};

/// Rows appended for one storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub url: StorefrontUrl,
    pub products: usize,
    pub variants: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub sources: Vec<SourceReport>,
}

impl FetchReport {
    pub fn total_products(&self) -> usize {
        self.sources.iter().map(|s| s.products).sum()
    }

    pub fn total_variants(&self) -> usize {
        self.sources.iter().map(|s| s.variants).sum()
    }
}

/// Which phases a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub fetch: bool,
    pub sync: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fetch: true,
            sync: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub fetch: Option<FetchReport>,
    /// One entry per sync target, in configuration order.
    pub sync: Vec<(String, SyncOutcome)>,
}

/// Maps every record of a feed before anything is written.
fn map_feed(
    url: &StorefrontUrl,
    records: &[serde_json::Value],
) -> PipelineResult<(Vec<Row>, Vec<Row>)> {
    let mut product_rows = Vec::with_capacity(records.len());
    let mut variant_rows = Vec::new();
    for record in records {
        let product = Product::from_value(record).map_err(|source| PipelineError::Record {
            url: url.to_string(),
            source,
        })?;
        product_rows.push(product.to_row());
        variant_rows.extend(product.variant_rows());
    }
    Ok((product_rows, variant_rows))
}

/// Fetches each source in order and appends its rows.
///
/// The first failing source aborts the run; rows of earlier sources stay
/// appended.
pub fn fetch_and_append<F, W>(
    sources: &[StorefrontUrl],
    fetcher: &F,
    writer: &W,
) -> PipelineResult<FetchReport>
where
    F: FeedFetcher + ?Sized,
    W: DatasetWriter + ?Sized,
{
    let mut report = FetchReport::default();
    for url in sources {
        log::info!("Fetching {url}");
        let records = fetcher.fetch_products(url)?;
        let (product_rows, variant_rows) = map_feed(url, &records)?;

        let products = writer.append_rows(Dataset::Products, &product_rows)?;
        let variants = writer.append_rows(Dataset::Variants, &variant_rows)?;
        log::info!("Appended {products} products and {variants} variants from {url}");

        report.sources.push(SourceReport {
            url: url.clone(),
            products,
            variants,
        });
    }
    Ok(report)
}

/// Runs every sync target in configuration order.
///
/// `connect` opens a spreadsheet session for one target once its key is
/// loaded.
pub fn sync_targets<R, S, C>(
    config: &PipelineConfig,
    reader: &R,
    mut connect: C,
) -> PipelineResult<Vec<(String, SyncOutcome)>>
where
    R: DatasetReader,
    S: SheetWriter,
    C: FnMut(&SyncTarget, &ServiceAccountKey) -> SheetsResult<S>,
{
    let mut outcomes = Vec::with_capacity(config.sync.len());
    for target in &config.sync {
        log::info!("Running sync target {}", target.name);
        let outcome = synchronize(reader, target, config.timezone, |key| connect(target, key))?;
        outcomes.push((target.name.clone(), outcome));
    }
    Ok(outcomes)
}

/// Runs every sync target against the Google Sheets API.
pub fn sync_all<R>(
    config: &PipelineConfig,
    reader: &R,
    client: &Client,
) -> PipelineResult<Vec<(String, SyncOutcome)>>
where
    R: DatasetReader,
{
    sync_targets(config, reader, |target, key| {
        GoogleSheetsClient::connect(key, client.clone(), target.value_input)
    })
}

/// Entry point used by the binary.
pub fn run(config: &PipelineConfig, options: RunOptions) -> PipelineResult<RunReport> {
    let fetcher = HttpFeedFetcher::new(&config.user_agent, config.timeout)?;
    let repo = CsvRepository::new(&config.products_csv, &config.variants_csv);
    let mut report = RunReport::default();

    if options.fetch {
        report.fetch = Some(fetch_and_append(&config.sources, &fetcher, &repo)?);
    }
    if options.sync {
        report.sync = sync_all(config, &repo, fetcher.client())?;
    }
    Ok(report)
}

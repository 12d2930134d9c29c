use thiserror::Error;

use crate::domain::record::RecordError;
use crate::models::config::SettingsError;
use crate::repository::StorageError;
use crate::services::fetch::FetchError;
use crate::sheets::SheetsError;
use crate::sheets::credentials::CredentialsError;

/// Any failure that aborts a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A feed record could not be mapped into a row.
    #[error("bad record in feed {url}: {source}")]
    Record {
        url: String,
        #[source]
        source: RecordError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

/// Convenient alias for results returned from pipeline functions.
pub type PipelineResult<T> = Result<T, PipelineError>;

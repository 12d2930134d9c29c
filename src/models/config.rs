//! Run configuration.
//!
//! [`AppConfig`] is the raw shape read from `config/default.yaml` and
//! `STOREFRONT__*` environment variables. It is validated and converted into
//! a [`PipelineConfig`] before anything runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{StorefrontUrl, TypeConstraintError};
use crate::services::timezone::parse_offset;
use crate::sheets::credentials::CredentialSource;
use crate::sheets::google::ValueInputOption;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";
const ENV_PREFIX: &str = "STOREFRONT";
const DEFAULT_USER_AGENT: &str = concat!("storefront-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("configuration validation failed: {0}")]
    Validation(String),
    #[error("configuration contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("invalid time zone offset '{0}', expected e.g. +05:30")]
    Timezone(String),
    #[error("destination tab '{0}' needs exactly one of `spreadsheet` or `spreadsheet_id`")]
    Destination(String),
}

impl From<ValidationErrors> for SettingsError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SettingsError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub sources: Vec<String>,
    #[validate(nested)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    #[validate(nested)]
    pub sync: Vec<SyncTargetConfig>,
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OutputConfig {
    #[validate(length(min = 1))]
    pub products_csv: String,
    #[validate(length(min = 1))]
    pub variants_csv: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds; no timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SyncTargetConfig {
    #[validate(length(min = 1))]
    pub name: String,
    pub credentials: CredentialSource,
    #[serde(default)]
    pub convert_timezone: bool,
    #[serde(default = "default_true")]
    pub include_header: bool,
    #[serde(default)]
    pub value_input: ValueInputOption,
    #[validate(nested)]
    pub products: DestinationConfig,
    #[validate(nested)]
    pub variants: DestinationConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DestinationConfig {
    #[serde(default)]
    pub spreadsheet: Option<String>,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[validate(length(min = 1))]
    pub tab: String,
}

impl AppConfig {
    /// Loads `path` (optional) layered under `STOREFRONT__*` variables.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sources")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// How a destination names its spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetLocator {
    /// Looked up by title through the file listing.
    Title(String),
    Id(String),
}

/// A spreadsheet tab receiving one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub spreadsheet: SpreadsheetLocator,
    pub tab: String,
}

impl TryFrom<DestinationConfig> for Destination {
    type Error = SettingsError;

    fn try_from(value: DestinationConfig) -> Result<Self, Self::Error> {
        let non_empty = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let spreadsheet = match (non_empty(value.spreadsheet), non_empty(value.spreadsheet_id)) {
            (Some(title), None) => SpreadsheetLocator::Title(title),
            (None, Some(id)) => SpreadsheetLocator::Id(id),
            _ => return Err(SettingsError::Destination(value.tab)),
        };
        Ok(Self {
            spreadsheet,
            tab: value.tab,
        })
    }
}

/// One synchronization pass: a credential source and two destinations.
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub name: String,
    pub credentials: CredentialSource,
    pub convert_timezone: bool,
    pub include_header: bool,
    pub value_input: ValueInputOption,
    pub products: Destination,
    pub variants: Destination,
}

impl TryFrom<SyncTargetConfig> for SyncTarget {
    type Error = SettingsError;

    fn try_from(value: SyncTargetConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            credentials: value.credentials,
            convert_timezone: value.convert_timezone,
            include_header: value.include_header,
            value_input: value.value_input,
            products: value.products.try_into()?,
            variants: value.variants.try_into()?,
        })
    }
}

/// Validated configuration passed to the pipeline entry point.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources: Vec<StorefrontUrl>,
    pub products_csv: PathBuf,
    pub variants_csv: PathBuf,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub timezone: FixedOffset,
    pub sync: Vec<SyncTarget>,
}

impl TryFrom<AppConfig> for PipelineConfig {
    type Error = SettingsError;

    fn try_from(value: AppConfig) -> Result<Self, Self::Error> {
        value.validate()?;

        let sources = value
            .sources
            .into_iter()
            .map(StorefrontUrl::new)
            .collect::<Result<Vec<_>, _>>()?;
        let timezone =
            parse_offset(&value.timezone).ok_or(SettingsError::Timezone(value.timezone))?;
        let sync = value
            .sync
            .into_iter()
            .map(SyncTarget::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            sources,
            products_csv: PathBuf::from(value.output.products_csv),
            variants_csv: PathBuf::from(value.output.variants_csv),
            user_agent: value.http.user_agent,
            timeout: value.http.timeout_secs.map(Duration::from_secs),
            timezone,
            sync,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfig {
        AppConfig {
            sources: vec!["https://roaster.example/products.json".into()],
            output: OutputConfig {
                products_csv: "dataset/products.csv".into(),
                variants_csv: "dataset/variants.csv".into(),
            },
            http: HttpConfig::default(),
            timezone: "+05:30".into(),
            sync: vec![SyncTargetConfig {
                name: "local".into(),
                credentials: CredentialSource::Env { var: "KEY".into() },
                convert_timezone: true,
                include_header: true,
                value_input: ValueInputOption::default(),
                products: DestinationConfig {
                    spreadsheet: Some("Coffee Products".into()),
                    spreadsheet_id: None,
                    tab: "Sheet1".into(),
                },
                variants: DestinationConfig {
                    spreadsheet: None,
                    spreadsheet_id: Some("1AbC".into()),
                    tab: "Sheet1".into(),
                },
            }],
        }
    }

    #[test]
    fn converts_valid_config() {
        let config = PipelineConfig::try_from(base()).unwrap();
        assert_eq!(config.sources[0], "https://roaster.example/products.json");
        assert_eq!(config.timezone.local_minus_utc(), 19_800);
        assert_eq!(config.timeout, None);
        assert_eq!(
            config.sync[0].products.spreadsheet,
            SpreadsheetLocator::Title("Coffee Products".into())
        );
        assert_eq!(
            config.sync[0].variants.spreadsheet,
            SpreadsheetLocator::Id("1AbC".into())
        );
    }

    #[test]
    fn requires_a_source() {
        let mut raw = base();
        raw.sources.clear();
        assert!(matches!(
            PipelineConfig::try_from(raw),
            Err(SettingsError::Validation(_))
        ));
    }

    #[test]
    fn rejects_invalid_source_url() {
        let mut raw = base();
        raw.sources.push("not a url".into());
        assert!(matches!(
            PipelineConfig::try_from(raw),
            Err(SettingsError::TypeConstraint(_))
        ));
    }

    #[test]
    fn rejects_named_time_zones() {
        let mut raw = base();
        raw.timezone = "Asia/Kolkata".into();
        assert!(matches!(
            PipelineConfig::try_from(raw),
            Err(SettingsError::Timezone(tz)) if tz == "Asia/Kolkata"
        ));
    }

    #[test]
    fn destination_needs_exactly_one_locator() {
        let mut raw = base();
        raw.sync[0].products.spreadsheet_id = Some("1XyZ".into());
        assert!(matches!(
            PipelineConfig::try_from(raw),
            Err(SettingsError::Destination(_))
        ));

        let mut raw = base();
        raw.sync[0].variants.spreadsheet_id = Some("  ".into());
        assert!(matches!(
            PipelineConfig::try_from(raw),
            Err(SettingsError::Destination(_))
        ));
    }

    #[test]
    fn empty_tab_fails_validation() {
        let mut raw = base();
        raw.sync[0].variants.tab = String::new();
        assert!(matches!(
            PipelineConfig::try_from(raw),
            Err(SettingsError::Validation(_))
        ));
    }
}

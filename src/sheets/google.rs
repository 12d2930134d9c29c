//! Google Sheets v4 / Drive v3 implementation of [`SheetWriter`].

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::record::render_scalar;
use crate::sheets::credentials::ServiceAccountKey;
use crate::sheets::{CellRange, CellRef, SheetWriter, SheetsError, SheetsResult, Worksheet};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// How the service interprets written cell values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueInputOption {
    /// Values are stored verbatim as strings.
    Raw,
    /// Values are parsed as if typed into the UI (numbers, dates).
    #[default]
    UserEntered,
}

impl ValueInputOption {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

/// Authenticated client for one sync run.
pub struct GoogleSheetsClient {
    http: Client,
    access_token: String,
    value_input: ValueInputOption,
}

impl GoogleSheetsClient {
    /// Exchanges a signed service-account assertion for an access token.
    pub fn connect(
        key: &ServiceAccountKey,
        http: Client,
        value_input: ValueInputOption,
    ) -> SheetsResult<Self> {
        let assertion = sign_assertion(key)?;
        let response = http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SheetsError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        let token: TokenResponse = response.json()?;
        log::info!("Authenticated as {}", key.client_email);

        Ok(Self {
            http,
            access_token: token.access_token,
            value_input,
        })
    }

    fn values_url(&self, sheet: &Worksheet, range: &str) -> SheetsResult<Url> {
        endpoint(SHEETS_API, &[&sheet.spreadsheet_id, "values", range])
    }

    fn check(operation: &'static str, response: Response) -> SheetsResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SheetsError::Auth(body));
        }
        Err(SheetsError::Remote {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    fn sheet_properties(&self, sheet: &Worksheet) -> SheetsResult<SheetProperties> {
        let mut url = endpoint(SHEETS_API, &[&sheet.spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?;
        let meta: SpreadsheetMeta = Self::check("spreadsheet lookup", response)?.json()?;

        meta.sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == sheet.tab)
            .ok_or_else(|| {
                SheetsError::NotFound(format!(
                    "tab '{}' in spreadsheet {}",
                    sheet.tab, sheet.spreadsheet_id
                ))
            })
    }
}

impl SheetWriter for GoogleSheetsClient {
    fn resolve_spreadsheet(&self, title: &str) -> SheetsResult<String> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            title.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let response = self
            .http
            .get(DRIVE_FILES_API)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()?;
        let list: FileList = Self::check("spreadsheet search", response)?.json()?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| SheetsError::NotFound(format!("spreadsheet '{title}'")))
    }

    fn read_row(&self, sheet: &Worksheet, row: usize) -> SheetsResult<Vec<String>> {
        let url = self.values_url(sheet, &sheet.qualify(&format!("{row}:{row}")))?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?;
        let range: ValueRange = Self::check("row read", response)?.json()?;

        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .iter()
            .map(|value| render_scalar(value).unwrap_or_else(|| value.to_string()))
            .collect())
    }

    fn ensure_grid(&self, sheet: &Worksheet, rows: usize, columns: usize) -> SheetsResult<()> {
        let properties = self.sheet_properties(sheet)?;
        let grid = &properties.grid_properties;
        if grid.row_count >= rows && grid.column_count >= columns {
            return Ok(());
        }

        let row_count = grid.row_count.max(rows);
        let column_count = grid.column_count.max(columns);
        log::info!(
            "Resizing '{}' to {row_count} rows x {column_count} columns",
            sheet.tab
        );
        let url = endpoint(SHEETS_API, &[&format!("{}:batchUpdate", sheet.spreadsheet_id)])?;
        let body = json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": properties.sheet_id,
                        "gridProperties": {
                            "rowCount": row_count,
                            "columnCount": column_count,
                        },
                    },
                    "fields": "gridProperties(rowCount,columnCount)",
                },
            }],
        });
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?;
        Self::check("grid resize", response)?;
        Ok(())
    }

    fn clear(&self, sheet: &Worksheet, range: &CellRange) -> SheetsResult<()> {
        let target = sheet.qualify(&range.to_string());
        let url = self.values_url(sheet, &format!("{target}:clear"))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()?;
        Self::check("range clear", response)?;
        Ok(())
    }

    fn write(
        &self,
        sheet: &Worksheet,
        start: CellRef,
        values: &[Vec<String>],
    ) -> SheetsResult<()> {
        let Some(range) = CellRange::covering(start, values) else {
            return Ok(());
        };
        let target = sheet.qualify(&range.to_string());
        let mut url = self.values_url(sheet, &target)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", self.value_input.as_str());

        let cells: Vec<Vec<String>> = match self.value_input {
            ValueInputOption::Raw => values.to_vec(),
            ValueInputOption::UserEntered => values
                .iter()
                .map(|row| row.iter().map(|cell| escape_formula(cell)).collect())
                .collect(),
        };
        let body = json!({
            "range": target,
            "majorDimension": "ROWS",
            "values": cells,
        });
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?;
        Self::check("range write", response)?;
        Ok(())
    }
}

fn sign_assertion(key: &ServiceAccountKey) -> SheetsResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: &key.token_uri,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetsError::Auth(format!("invalid private key: {e}")))?;
    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {e}")))
}

fn endpoint(base: &str, segments: &[&str]) -> SheetsResult<Url> {
    let mut url = Url::parse(base).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::InvalidUrl(base.to_string()))?
        .extend(segments);
    Ok(url)
}

/// Prefixes cells the service would evaluate as formulas with `'`.
fn escape_formula(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '@') => format!("'{value}"),
        Some('+' | '-') if value.parse::<f64>().is_err() => format!("'{value}"),
        _ => value.to_string(),
    }
}

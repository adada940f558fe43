//! Google Sheets v4 REST backend.
//!
//! Authenticates as a service account: a short-lived RS256 JWT assertion is
//! exchanged at the key's `token_uri` for a bearer token, which is cached
//! until shortly before it expires. Worksheet titles map to numeric sheet ids
//! (needed for row deletion and column growth); the mapping is fetched once
//! and refreshed whenever a title is missing from it.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use cohort_core::types::RowNumber;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::backend::{column_letter, SheetBackend};
use crate::error::{SheetError, SheetResult};

/// Base URL of the Sheets REST API.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// OAuth scope granting read/write access to spreadsheets.
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Lifetime requested for each JWT assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh the bearer token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The fields of a service-account key file the backend uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Undo the `\n` escaping secrets stores apply to PEM keys.
    pub fn normalized(mut self) -> Self {
        self.private_key = self.private_key.replace("\\n", "\n");
        self
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Extract the spreadsheet id from a `.../spreadsheets/d/<id>/...` URL.
///
/// A bare id (no slashes) is accepted as-is.
pub fn spreadsheet_id_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if !trimmed.is_empty() && !trimmed.contains('/') {
        return Some(trimmed.to_string());
    }
    let rest = trimmed.split("/spreadsheets/d/").nth(1)?;
    let id = rest.split(['/', '?', '#']).next()?;
    (!id.is_empty()).then(|| id.to_string())
}

// ---------------------------------------------------------------------------
// GoogleSheetsBackend
// ---------------------------------------------------------------------------

pub struct GoogleSheetsBackend {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    spreadsheet_id: String,
    token: Mutex<Option<CachedToken>>,
    sheet_ids: Mutex<HashMap<String, i64>>,
}

impl GoogleSheetsBackend {
    /// Build a backend for the spreadsheet at `sheet_url`.
    ///
    /// Fails fast if the URL carries no spreadsheet id or the private key is
    /// not a valid RSA PEM; no network call is made until first use.
    pub fn new(key: ServiceAccountKey, sheet_url: &str) -> SheetResult<Self> {
        let key = key.normalized();
        let spreadsheet_id = spreadsheet_id_from_url(sheet_url).ok_or_else(|| {
            SheetError::Auth(format!("Cannot find a spreadsheet id in '{sheet_url}'"))
        })?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::Auth(format!("Invalid service account private key: {e}")))?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            key,
            encoding_key,
            spreadsheet_id,
            token: Mutex::new(None),
            sheet_ids: Mutex::new(HashMap::new()),
        })
    }

    /// Return a valid bearer token, exchanging a new assertion if needed.
    async fn access_token(&self) -> SheetResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + TOKEN_EXPIRY_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let assertion = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SheetError::Auth(format!("Failed to sign assertion: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!(
                "Token exchange returned HTTP {status}: {body}"
            )));
        }
        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Obtained spreadsheet access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    /// URL of the spreadsheet with extra path segments appended.
    fn url(&self, segments: &[&str]) -> SheetResult<Url> {
        let mut url = Url::parse(SHEETS_API_BASE)
            .map_err(|e| SheetError::Auth(format!("Invalid API base URL: {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SheetError::Auth("API base URL cannot be a base".into()))?;
            path.push(&self.spreadsheet_id);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Issue an authenticated request and decode the JSON response.
    async fn call(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<Value>,
        worksheet: Option<&str>,
    ) -> SheetResult<Value> {
        let token = self.access_token().await?;
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| SheetError::Api {
                status: status.as_u16(),
                message: format!("Malformed response body: {e}"),
            });
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_default();
        Err(classify_failure(status, message, worksheet))
    }

    /// `'Title'` quoting for A1 ranges.
    fn range(name: &str, cells: Option<&str>) -> String {
        let quoted = format!("'{}'", name.replace('\'', "''"));
        match cells {
            Some(cells) => format!("{quoted}!{cells}"),
            None => quoted,
        }
    }

    async fn batch_update(&self, requests: Value, worksheet: Option<&str>) -> SheetResult<()> {
        let url = self.url(&[])?;
        let mut url = url;
        // `:batchUpdate` is a suffix of the id segment, not a new segment.
        let path = format!("{}:batchUpdate", url.path());
        url.set_path(&path);
        self.call(
            Method::POST,
            url,
            &[],
            Some(json!({ "requests": requests })),
            worksheet,
        )
        .await?;
        Ok(())
    }

    async fn load_sheet_ids(&self) -> SheetResult<HashMap<String, i64>> {
        let url = self.url(&[])?;
        let meta = self
            .call(
                Method::GET,
                url,
                &[("fields", "sheets.properties(sheetId,title)")],
                None,
                None,
            )
            .await?;
        let ids = meta["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| {
                        let props = &s["properties"];
                        Some((props["title"].as_str()?.to_string(), props["sheetId"].as_i64()?))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    async fn sheet_id(&self, name: &str) -> SheetResult<i64> {
        let mut ids = self.sheet_ids.lock().await;
        if let Some(id) = ids.get(name) {
            return Ok(*id);
        }
        *ids = self.load_sheet_ids().await?;
        ids.get(name)
            .copied()
            .ok_or_else(|| SheetError::WorksheetNotFound(name.to_string()))
    }

    async fn values_call(
        &self,
        method: Method,
        range: &str,
        suffix: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        worksheet: &str,
    ) -> SheetResult<Value> {
        let segment = format!("{range}{suffix}");
        let url = self.url(&["values", &segment])?;
        self.call(method, url, query, body, Some(worksheet)).await
    }
}

/// Map a failed response onto [`SheetError`].
fn classify_failure(status: StatusCode, message: String, worksheet: Option<&str>) -> SheetError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return SheetError::RateLimited;
    }
    if let Some(name) = worksheet {
        if status == StatusCode::BAD_REQUEST && message.contains("Unable to parse range") {
            return SheetError::WorksheetNotFound(name.to_string());
        }
    }
    SheetError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Encode one row for a RAW write. `TRUE`/`FALSE` go out as JSON booleans so
/// checkbox answers land as typed cells; all other values stay literal text.
fn typed_cells(values: &[String]) -> Vec<Value> {
    values
        .iter()
        .map(|v| match v.as_str() {
            "TRUE" => Value::Bool(true),
            "FALSE" => Value::Bool(false),
            _ => Value::String(v.clone()),
        })
        .collect()
}

/// Decode a `values` payload into rows of strings.
fn rows_from_values(payload: &Value) -> Vec<Vec<String>> {
    payload["values"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|c| match c {
                                    Value::String(s) => s.clone(),
                                    Value::Null => String::new(),
                                    other => other.to_string(),
                                })
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SheetBackend for GoogleSheetsBackend {
    async fn worksheet_names(&self) -> SheetResult<Vec<String>> {
        let ids = self.load_sheet_ids().await?;
        let names = ids.keys().cloned().collect();
        *self.sheet_ids.lock().await = ids;
        Ok(names)
    }

    async fn add_worksheet(&self, name: &str, columns: usize) -> SheetResult<()> {
        self.batch_update(
            json!([{
                "addSheet": {
                    "properties": {
                        "title": name,
                        "gridProperties": { "rowCount": 1, "columnCount": columns.max(1) }
                    }
                }
            }]),
            None,
        )
        .await?;
        tracing::info!(worksheet = name, columns, "Created worksheet");
        self.sheet_ids.lock().await.clear();
        Ok(())
    }

    async fn read_all(&self, name: &str) -> SheetResult<Vec<Vec<String>>> {
        let range = Self::range(name, None);
        let payload = self
            .values_call(
                Method::GET,
                &range,
                "",
                &[("majorDimension", "ROWS")],
                None,
                name,
            )
            .await?;
        Ok(rows_from_values(&payload))
    }

    async fn header_row(&self, name: &str) -> SheetResult<Vec<String>> {
        let range = Self::range(name, Some("1:1"));
        let payload = self
            .values_call(
                Method::GET,
                &range,
                "",
                &[("majorDimension", "ROWS")],
                None,
                name,
            )
            .await?;
        Ok(rows_from_values(&payload).into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, name: &str, values: &[String]) -> SheetResult<()> {
        let range = Self::range(name, Some("A1"));
        self.values_call(
            Method::POST,
            &range,
            ":append",
            &[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ],
            Some(json!({ "values": [typed_cells(values)] })),
            name,
        )
        .await?;
        Ok(())
    }

    async fn update_cells(
        &self,
        name: &str,
        row: RowNumber,
        first_column: usize,
        values: &[String],
    ) -> SheetResult<()> {
        let start = format!("{}{row}", column_letter(first_column));
        let range = Self::range(name, Some(&start));
        self.values_call(
            Method::PUT,
            &range,
            "",
            &[("valueInputOption", "RAW")],
            Some(json!({ "majorDimension": "ROWS", "values": [typed_cells(values)] })),
            name,
        )
        .await?;
        Ok(())
    }

    async fn delete_row(&self, name: &str, row: RowNumber) -> SheetResult<()> {
        let sheet_id = self.sheet_id(name).await?;
        self.batch_update(
            json!([{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row.saturating_sub(1),
                        "endIndex": row
                    }
                }
            }]),
            Some(name),
        )
        .await
    }

    async fn clear(&self, name: &str) -> SheetResult<()> {
        let range = Self::range(name, None);
        self.values_call(Method::POST, &range, ":clear", &[], Some(json!({})), name)
            .await?;
        Ok(())
    }

    async fn add_columns(&self, name: &str, count: usize) -> SheetResult<()> {
        let sheet_id = self.sheet_id(name).await?;
        self.batch_update(
            json!([{
                "appendDimension": {
                    "sheetId": sheet_id,
                    "dimension": "COLUMNS",
                    "length": count
                }
            }]),
            Some(name),
        )
        .await
    }
}

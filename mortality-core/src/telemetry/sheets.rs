//! Spreadsheet capability and the Google Sheets v4 client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::credentials::ServiceAccountKey;
use crate::constants::SHEETS_SCOPE;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SheetsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

// ============================================================================
// CAPABILITY
// ============================================================================

/// Bearer token returned by authorization
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpreadsheetInfo {
    pub title: String,
    /// Worksheet titles in listing order
    pub worksheets: Vec<String>,
}

/// Operations the sink needs from a remote spreadsheet store
#[async_trait]
pub trait SpreadsheetApi: Send + Sync {
    async fn authorize(&self, key: &ServiceAccountKey) -> Result<AccessToken, SheetsError>;

    async fn open(&self, token: &AccessToken, spreadsheet_id: &str) -> Result<SpreadsheetInfo, SheetsError>;

    async fn read_rows(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError>;

    async fn append_row(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        worksheet: &str,
        row: &[String],
    ) -> Result<(), SheetsError>;
}

// ============================================================================
// GOOGLE SHEETS CLIENT
// ============================================================================

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    properties: Option<TitleProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: Option<TitleProperties>,
}

#[derive(Debug, Deserialize)]
struct TitleProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

/// Google Sheets REST client (service-account JWT bearer flow)
pub struct GoogleSheetsClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleSheetsClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, SheetsError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: api_base.into(),
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| SheetsError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(format!("{} cannot be a base", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn assertion(key: &ServiceAccountKey) -> Result<String, SheetsError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SHEETS_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::InvalidKey(e.to_string()))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| SheetsError::InvalidKey(e.to_string()))
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(request: reqwest::RequestBuilder) -> Result<T, SheetsError> {
        let response = request
            .send()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        if response.status().is_success() {
            response.json().await
                .map_err(|e| SheetsError::Parse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(SheetsError::Server { status, body })
        }
    }
}

/// A1 range covering a whole worksheet
fn sheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SpreadsheetApi for GoogleSheetsClient {
    async fn authorize(&self, key: &ServiceAccountKey) -> Result<AccessToken, SheetsError> {
        let assertion = Self::assertion(key)?;
        let request = self.http_client.post(&key.token_uri).form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ]);

        let token: TokenResponse = Self::send_json(request).await?;
        Ok(AccessToken(token.access_token))
    }

    async fn open(&self, token: &AccessToken, spreadsheet_id: &str) -> Result<SpreadsheetInfo, SheetsError> {
        let url = self.url(
            &["spreadsheets", spreadsheet_id],
            &[("fields", "properties.title,sheets.properties.title")],
        )?;
        let response: SpreadsheetResponse =
            Self::send_json(self.http_client.get(url).bearer_auth(token.secret())).await?;

        Ok(SpreadsheetInfo {
            title: response.properties.map(|p| p.title).unwrap_or_default(),
            worksheets: response
                .sheets
                .into_iter()
                .filter_map(|s| s.properties.map(|p| p.title))
                .collect(),
        })
    }

    async fn read_rows(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = sheet_range(worksheet);
        let url = self.url(&["spreadsheets", spreadsheet_id, "values", &range], &[])?;
        let response: ValueRange =
            Self::send_json(self.http_client.get(url).bearer_auth(token.secret())).await?;

        Ok(response
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        worksheet: &str,
        row: &[String],
    ) -> Result<(), SheetsError> {
        let range = format!("{}:append", sheet_range(worksheet));
        let url = self.url(
            &["spreadsheets", spreadsheet_id, "values", &range],
            &[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")],
        )?;
        let request = self
            .http_client
            .post(url)
            .bearer_auth(token.secret())
            .json(&AppendBody { values: [row] });

        let _: serde_json::Value = Self::send_json(request).await?;
        Ok(())
    }
}

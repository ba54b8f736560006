//! Hosted job store behind a PostgREST-style table API.
//!
//! ```text
//! POST  /rest/v1/{table}                         insert (Prefer: return=representation)
//! GET   /rest/v1/{table}?title=eq.…&limit=1      duplicate lookup
//! PATCH /rest/v1/{table}?id=eq.{id}              expiry refresh
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{DedupKey, PersistedJob};
use crate::storage::{JobStore, expiry_from};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RestStore {
    client: reqwest::Client,
    endpoint: Url,
    service_key: String,
    expiry_days: i64,
}

impl RestStore {
    pub fn new(base_url: &str, service_key: &str, table: &str, expiry_days: i64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: table_endpoint(base_url, table)?,
            service_key: service_key.to_string(),
            expiry_days,
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send and return the body of a successful response.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(AppError::store(format!(
                "{action} failed ({}): {}",
                status.as_u16(),
                String::from_utf8_lossy(&body).trim()
            )));
        }
        Ok(body.to_vec())
    }
}

/// `{base}/rest/v1/{table}`
pub fn table_endpoint(base_url: &str, table: &str) -> Result<Url> {
    if table.trim().is_empty() {
        return Err(AppError::config("store table name is empty"));
    }
    Ok(Url::parse(&format!(
        "{}/rest/v1/{}",
        base_url.trim_end_matches('/'),
        table
    ))?)
}

/// Lookup URL for a dedup key; company is filtered only when present.
pub fn lookup_url(endpoint: &Url, key: &DedupKey<'_>) -> Url {
    let mut url = endpoint.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("select", "id")
            .append_pair("title", &format!("eq.{}", key.title))
            .append_pair("location", &format!("eq.{}", key.location))
            .append_pair("user_id", &format!("eq.{}", key.user_id));
        if let Some(company) = key.company {
            query.append_pair("company", &format!("eq.{company}"));
        }
        query.append_pair("limit", "1");
    }
    url
}

/// Id of the first returned row, if any. Other columns are ignored.
pub fn first_row_id(body: &[u8]) -> Result<Option<String>> {
    let rows: Vec<Value> = serde_json::from_slice(body)?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };
    match row.get("id") {
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        _ => Err(AppError::store("returned row carried no id")),
    }
}

/// Id of the first row in an insert's representation.
pub fn inserted_id(body: &[u8]) -> Result<String> {
    first_row_id(body)?.ok_or_else(|| AppError::store("insert response carried no rows"))
}

#[async_trait]
impl JobStore for RestStore {
    async fn insert(&self, job: &PersistedJob) -> Result<String> {
        let body = serde_json::to_vec(job)?;
        let request = self
            .request(Method::POST, self.endpoint.clone())
            .header("Prefer", "return=representation")
            .body(body);

        let response = self.send(request, "insert").await?;
        inserted_id(&response)
    }

    async fn find_existing(&self, key: &DedupKey<'_>) -> Result<Option<String>> {
        let request = self.request(Method::GET, lookup_url(&self.endpoint, key));
        let response = self.send(request, "lookup").await?;
        first_row_id(&response)
    }

    async fn refresh_expiration(&self, id: &str) -> Result<()> {
        let now = Utc::now();
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));

        let body = json!({
            "expires_at": expiry_from(now, self.expiry_days),
            "updated_at": now,
        });
        let request = self
            .request(Method::PATCH, url)
            .body(serde_json::to_vec(&body)?);

        self.send(request, "refresh").await?;
        Ok(())
    }
}

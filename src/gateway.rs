use crate::errors::GatewayError;
use crate::models::{Entry, EntryPayload, SaveMode, StatsPayload};
use crate::window::WindowSelector;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

/// Boundary to the remote entries/statistics API.
pub trait DataGateway: Send + Sync + 'static {
    /// All entries, or only those inside `window`.
    fn fetch_entries(
        &self,
        window: WindowSelector,
    ) -> impl Future<Output = Result<Vec<Entry>, GatewayError>> + Send;

    /// Aggregates for `window`. A 404 means the window holds no data.
    fn fetch_statistics(
        &self,
        window: WindowSelector,
    ) -> impl Future<Output = Result<StatsPayload, GatewayError>> + Send;

    /// The entry recorded on `date`, if any.
    fn fetch_entry(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<Entry>, GatewayError>> + Send;

    /// POST, falling back to PUT when the date already has an entry.
    fn create_or_update_entry(
        &self,
        payload: &EntryPayload,
    ) -> impl Future<Output = Result<SaveMode, GatewayError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| transport(url, source))?;
        ensure_success(url, response)
            .await?
            .json::<Value>()
            .await
            .map_err(|err| decode(url, err))
    }
}

impl DataGateway for HttpGateway {
    async fn fetch_entries(&self, window: WindowSelector) -> Result<Vec<Entry>, GatewayError> {
        let url = self.url("/api/entries");
        let payload = self.get_json(&url, &window_query(window)).await?;

        let items = match &payload {
            Value::Array(items) => items,
            Value::Object(object) => match object.get("entries") {
                Some(Value::Array(items)) => items,
                _ => return Err(decode(&url, "missing entries array")),
            },
            _ => return Err(decode(&url, "expected an array or an object")),
        };

        let entries: Vec<Entry> = items
            .iter()
            .filter_map(|item| {
                let entry = Entry::from_value(item);
                if entry.is_none() {
                    warn!(%item, "skipping entry without a valid date");
                }
                entry
            })
            .collect();
        debug!(count = entries.len(), %window, "fetched entries");
        Ok(entries)
    }

    async fn fetch_statistics(&self, window: WindowSelector) -> Result<StatsPayload, GatewayError> {
        let url = self.url("/api/stats");
        let payload = self.get_json(&url, &window_query(window)).await?;
        serde_json::from_value(payload).map_err(|err| decode(&url, err))
    }

    async fn fetch_entry(&self, date: NaiveDate) -> Result<Option<Entry>, GatewayError> {
        let url = self.url("/api/entries");
        let payload = match self.get_json(&url, &[("date", date.to_string())]).await {
            Ok(payload) => payload,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        let succeeded = payload.get("success").and_then(Value::as_bool).unwrap_or(false);
        Ok(payload
            .get("entry")
            .filter(|_| succeeded)
            .and_then(Entry::from_value))
    }

    async fn create_or_update_entry(
        &self,
        payload: &EntryPayload,
    ) -> Result<SaveMode, GatewayError> {
        let url = self.url("/api/entries");
        let created = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| transport(&url, source))?;

        if created.status().is_success() {
            return Ok(SaveMode::Created);
        }
        if created.status() != StatusCode::CONFLICT {
            return Err(network_error(&url, created).await);
        }

        debug!(date = %payload.date, "entry exists, updating instead");
        let updated = self
            .client
            .put(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        ensure_success(&url, updated).await?;
        Ok(SaveMode::Updated)
    }
}

fn window_query(window: WindowSelector) -> Vec<(&'static str, String)> {
    if window.is_all_time() {
        Vec::new()
    } else {
        vec![("window", window.to_string())]
    }
}

async fn ensure_success(url: &str, response: Response) -> Result<Response, GatewayError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(network_error(url, response).await)
    }
}

async fn network_error(url: &str, response: Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Network {
        url: url.to_owned(),
        status,
        body,
    }
}

fn transport(url: &str, source: reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        url: url.to_owned(),
        source,
    }
}

fn decode(url: &str, reason: impl ToString) -> GatewayError {
    GatewayError::Decode {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

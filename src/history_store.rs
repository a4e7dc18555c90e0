use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::schemas::{HistoryItem, HistoryRecord};

pub const ANALYSIS_TABLE: &str = "eco_analysis";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected store payload: {0}")]
    Payload(String),
}

/// Per-user analysis history.
///
/// Every call carries the caller's access token; row-level security on the
/// store decides what the caller may read or write.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent `total_carbon_footprint` for the user, if any.
    async fn latest_total(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<Option<f64>, StoreError>;

    async fn insert(
        &self,
        record: &HistoryRecord<'_>,
        access_token: &str,
    ) -> Result<(), StoreError>;

    /// All rows visible to the caller, newest first.
    async fn list(&self, access_token: &str) -> Result<Vec<HistoryItem>, StoreError>;
}

/// PostgREST client for a Supabase project.
pub struct SupabaseStore {
    client: Client,
    table_url: String,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(
        project_url: &str,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                project_url.trim_end_matches('/'),
                ANALYSIS_TABLE
            ),
            anon_key: anon_key.into(),
        })
    }

    fn authorized(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        Err(StoreError::Status { status, body })
    }
}

/// `->>` projections come back as text; numeric columns as numbers.
fn parse_total(value: &Value) -> Result<Option<f64>, StoreError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(total) if total.is_finite() => Ok(Some(total)),
            _ => Err(StoreError::Payload(format!("total is not a number: {:?}", s))),
        },
        other => Err(StoreError::Payload(format!("unexpected total: {}", other))),
    }
}

#[async_trait]
impl HistoryStore for SupabaseStore {
    async fn latest_total(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<Option<f64>, StoreError> {
        let user_filter = format!("eq.{}", user_id);
        let request = self.client.get(&self.table_url).query(&[
            (
                "select",
                "total_carbon_footprint:ai_output->>total_carbon_footprint",
            ),
            ("user_id", user_filter.as_str()),
            ("order", "created_at.desc"),
            ("limit", "1"),
        ]);

        let response = check_status(self.authorized(request, access_token).send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        debug!(rows = rows.len(), "latest total lookup");

        match rows.first() {
            Some(row) => parse_total(row.get("total_carbon_footprint").unwrap_or(&Value::Null)),
            None => Ok(None),
        }
    }

    async fn insert(
        &self,
        record: &HistoryRecord<'_>,
        access_token: &str,
    ) -> Result<(), StoreError> {
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=minimal")
            .json(record);

        check_status(self.authorized(request, access_token).send().await?).await?;
        Ok(())
    }

    async fn list(&self, access_token: &str) -> Result<Vec<HistoryItem>, StoreError> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let response = check_status(self.authorized(request, access_token).send().await?).await?;
        let items = response.json::<Vec<HistoryItem>>().await?;
        Ok(items)
    }
}

use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ReplyError>,
}

#[derive(Debug, Deserialize)]
struct ReplyError {
    message: String,
}

/// HTTP client for the `/graphql` endpoint.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CrmClient {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs `operation` and decodes `data.<operation>` into `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        variables: Value,
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "operationName": operation, "variables": variables }))
            .send()
            .await
            .with_context(|| format!("{operation}: request to {} failed", self.endpoint))?;

        let status = response.status();
        let reply: Reply = response
            .json()
            .await
            .with_context(|| format!("{operation}: unreadable response ({status})"))?;

        if let Some(err) = reply.errors.first() {
            bail!("{operation}: {}", err.message);
        }
        if !status.is_success() {
            bail!("{operation}: server answered {status}");
        }

        let payload = reply
            .data
            .and_then(|mut data| data.get_mut(operation).map(Value::take))
            .with_context(|| format!("{operation}: response has no data"))?;
        serde_json::from_value(payload).with_context(|| format!("{operation}: unexpected payload"))
    }
}

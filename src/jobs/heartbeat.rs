use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{Job, client::CrmClient, sink::LogSink};
use crate::dto::customers::CustomerList;

/// Records that the CRM is alive and whether the API answers.
pub struct Heartbeat {
    client: CrmClient,
    sink: LogSink,
    every: Duration,
}

impl Heartbeat {
    pub fn new(client: CrmClient, sink: LogSink, every: Duration) -> Self {
        Self {
            client,
            sink,
            every,
        }
    }
}

pub fn alive_line(stamp: &str) -> String {
    format!("{stamp} CRM is alive")
}

pub fn probe_line(stamp: &str, probe: Result<usize, String>) -> String {
    match probe {
        Ok(count) => format!("{stamp} GraphQL endpoint responsive: {count} customers found"),
        Err(err) => format!("{stamp} GraphQL health check failed: {err}"),
    }
}

#[async_trait]
impl Job for Heartbeat {
    fn name(&self) -> &'static str {
        "heartbeat"
    }

    fn every(&self) -> Duration {
        self.every
    }

    fn sink(&self) -> &LogSink {
        &self.sink
    }

    async fn run(&self) -> anyhow::Result<()> {
        let stamp = self.sink.stamp_now();
        let probe = self
            .client
            .execute::<CustomerList>("allCustomers", json!({}))
            .await
            .map(|list| list.items.len())
            .map_err(|err| format!("{err:#}"));

        if let Err(err) = &probe {
            tracing::warn!(endpoint = self.client.endpoint(), error = %err, "graphql probe failed");
        }

        self.sink
            .append(&[alive_line(&stamp), probe_line(&stamp, probe)])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_lines() {
        let stamp = "05/03/2024-07:08:09";
        assert_eq!(alive_line(stamp), "05/03/2024-07:08:09 CRM is alive");
        assert_eq!(
            probe_line(stamp, Ok(4)),
            "05/03/2024-07:08:09 GraphQL endpoint responsive: 4 customers found"
        );
        assert_eq!(
            probe_line(stamp, Err("connection refused".into())),
            "05/03/2024-07:08:09 GraphQL health check failed: connection refused"
        );
    }
}

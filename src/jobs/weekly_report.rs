use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{Job, client::CrmClient, sink::LogSink};
use crate::dto::reports::CrmStats;

pub struct WeeklyReport {
    client: CrmClient,
    sink: LogSink,
    every: Duration,
}

impl WeeklyReport {
    pub fn new(client: CrmClient, sink: LogSink, every: Duration) -> Self {
        Self {
            client,
            sink,
            every,
        }
    }
}

pub fn report_lines(stamp: &str, stats: &CrmStats) -> [String; 2] {
    [
        format!(
            "{stamp} - Report: {} customers, {} orders, ${:.2} revenue",
            stats.customer_count, stats.order_count, stats.total_revenue
        ),
        "-".repeat(60),
    ]
}

#[async_trait]
impl Job for WeeklyReport {
    fn name(&self) -> &'static str {
        "weekly_report"
    }

    fn every(&self) -> Duration {
        self.every
    }

    fn sink(&self) -> &LogSink {
        &self.sink
    }

    async fn run(&self) -> anyhow::Result<()> {
        let stats: CrmStats = self.client.execute("crmStats", json!({})).await?;
        let stamp = self.sink.stamp_now();
        self.sink.append(&report_lines(&stamp, &stats)).await?;
        tracing::info!(
            customers = stats.customer_count,
            orders = stats.order_count,
            revenue = %stats.total_revenue,
            "weekly report written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn report_line_and_separator() {
        let stats = CrmStats {
            customer_count: 5,
            order_count: 3,
            total_revenue: Decimal::new(261997, 2),
        };
        let [line, rule] = report_lines("2024-03-04 06:00:00", &stats);
        assert_eq!(
            line,
            "2024-03-04 06:00:00 - Report: 5 customers, 3 orders, $2619.97 revenue"
        );
        assert_eq!(rule.len(), 60);
        assert!(rule.chars().all(|c| c == '-'));
    }
}

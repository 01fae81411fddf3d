use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{Job, client::CrmClient, sink::LogSink};
use crate::dto::inventory::UpdateLowStockProductsPayload;

/// Triggers `updateLowStockProducts` and logs every restocked product.
pub struct LowStockRestock {
    client: CrmClient,
    sink: LogSink,
    every: Duration,
}

impl LowStockRestock {
    pub fn new(client: CrmClient, sink: LogSink, every: Duration) -> Self {
        Self {
            client,
            sink,
            every,
        }
    }
}

pub fn restock_lines(stamp: &str, payload: &UpdateLowStockProductsPayload) -> Vec<String> {
    if payload.updated_products.is_empty() {
        return vec![format!("{stamp} {}", payload.message)];
    }
    payload
        .updated_products
        .iter()
        .map(|p| format!("{stamp} Updated {}: new stock {}", p.name, p.stock))
        .collect()
}

#[async_trait]
impl Job for LowStockRestock {
    fn name(&self) -> &'static str {
        "low_stock"
    }

    fn every(&self) -> Duration {
        self.every
    }

    fn sink(&self) -> &LogSink {
        &self.sink
    }

    async fn run(&self) -> anyhow::Result<()> {
        let payload: UpdateLowStockProductsPayload = self
            .client
            .execute("updateLowStockProducts", json!({}))
            .await?;
        if !payload.success {
            anyhow::bail!(payload.message);
        }

        let stamp = self.sink.stamp_now();
        self.sink.append(&restock_lines(&stamp, &payload)).await?;
        tracing::info!(updated = payload.updated_count, "low-stock run finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::models::Product;

    fn product(name: &str, stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            price: Decimal::new(999, 2),
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn one_line_per_restocked_product() {
        let payload = UpdateLowStockProductsPayload::restocked(vec![
            product("Cable", 13),
            product("Mouse", 19),
        ]);
        assert_eq!(
            restock_lines("S", &payload),
            vec!["S Updated Cable: new stock 13", "S Updated Mouse: new stock 19"]
        );
    }

    #[test]
    fn quiet_runs_log_the_message() {
        let payload = UpdateLowStockProductsPayload::restocked(Vec::new());
        assert_eq!(
            restock_lines("S", &payload),
            vec!["S No low-stock products found"]
        );
    }
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde_json::json;

use super::{Job, client::CrmClient, sink::LogSink};
use crate::models::Order;

/// Logs a reminder for every order placed within the lookback window.
pub struct OrderReminders {
    client: CrmClient,
    sink: LogSink,
    every: Duration,
    lookback_days: i64,
}

impl OrderReminders {
    pub fn new(client: CrmClient, sink: LogSink, every: Duration, lookback_days: i64) -> Self {
        Self {
            client,
            sink,
            every,
            lookback_days,
        }
    }

    /// First UTC day of the window, matching how `orderDateGte` is read.
    fn cutoff(&self) -> NaiveDate {
        cutoff_from(Utc::now().date_naive(), self.lookback_days)
    }
}

fn cutoff_from(today: NaiveDate, lookback_days: i64) -> NaiveDate {
    today - chrono::Duration::days(lookback_days)
}

pub fn reminder_line(stamp: &str, order: &Order) -> String {
    let products: Vec<&str> = order.products.iter().map(|p| p.name.as_str()).collect();
    format!(
        "{stamp} - ORDER REMINDER - Order ID: {}, Customer: {} ({}), Date: {}, Total: ${}, Products: {}",
        order.id,
        order.customer.name,
        order.customer.email,
        order.order_date.to_rfc3339_opts(SecondsFormat::Secs, true),
        order.total_amount,
        products.join(", ")
    )
}

#[async_trait]
impl Job for OrderReminders {
    fn name(&self) -> &'static str {
        "order_reminders"
    }

    fn every(&self) -> Duration {
        self.every
    }

    fn sink(&self) -> &LogSink {
        &self.sink
    }

    async fn run(&self) -> anyhow::Result<()> {
        let cutoff = self.cutoff();
        let orders: Vec<Order> = self
            .client
            .execute("filteredOrders", json!({ "orderDateGte": cutoff }))
            .await?;

        let stamp = self.sink.stamp_now();
        let lines: Vec<String> = orders.iter().map(|o| reminder_line(&stamp, o)).collect();
        if !lines.is_empty() {
            self.sink.append(&lines).await?;
        }
        tracing::info!(%cutoff, orders = orders.len(), "order reminders processed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::models::{Customer, Product};

    #[test]
    fn reminder_mentions_customer_total_and_products() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        let product = |name: &str| Product {
            id: Uuid::nil(),
            name: name.into(),
            price: Decimal::new(1000, 2),
            stock: 1,
            created_at: at,
            updated_at: at,
        };
        let order = Order {
            id: Uuid::nil(),
            customer: Customer {
                id: Uuid::nil(),
                name: "Alice".into(),
                email: "alice@example.com".into(),
                phone: None,
                created_at: at,
                updated_at: at,
            },
            products: vec![product("Laptop Pro"), product("USB-C Cable")],
            items: Vec::new(),
            order_date: at,
            total_amount: Decimal::new(1550, 2),
            created_at: at,
            updated_at: at,
        };

        assert_eq!(
            reminder_line("2024-03-06 08:00:00", &order),
            format!(
                "2024-03-06 08:00:00 - ORDER REMINDER - Order ID: {}, Customer: Alice (alice@example.com), \
                 Date: 2024-03-05T10:00:00Z, Total: $15.50, Products: Laptop Pro, USB-C Cable",
                Uuid::nil()
            )
        );
    }

    #[test]
    fn window_counts_whole_utc_days_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            cutoff_from(today, 7),
            NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()
        );
        assert_eq!(cutoff_from(today, 0), today);
    }
}

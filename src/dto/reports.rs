use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate figures used by the weekly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrmStats {
    pub customer_count: u64,
    pub order_count: u64,
    pub total_revenue: Decimal,
}

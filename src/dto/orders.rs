use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::CrmError, models::Order, response::Meta};

/// Repeated product ids are merged into one line with a summed quantity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub customer_id: Uuid,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

/// `createOrder` input as sent over the wire. Ids stay raw so that a
/// malformed id fails like an unknown one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_id: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub order: Option<Order>,
    pub message: String,
    pub success: bool,
}

impl CreateOrderPayload {
    pub fn created(order: Order) -> Self {
        Self {
            order: Some(order),
            message: "Order created successfully".into(),
            success: true,
        }
    }

    pub fn failed(err: &CrmError) -> Self {
        Self {
            order: None,
            message: err.to_string(),
            success: false,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFilter {
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<NaiveDate>,
    pub order_date_lte: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
    pub meta: Meta,
}

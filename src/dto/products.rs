use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::CrmError, models::Product, response::Meta};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub product: Option<Product>,
    pub message: String,
    pub success: bool,
}

impl CreateProductPayload {
    pub fn created(product: Product) -> Self {
        Self {
            product: Some(product),
            message: "Product created successfully".into(),
            success: true,
        }
    }

    pub fn failed(err: &CrmError) -> Self {
        Self {
            product: None,
            message: err.to_string(),
            success: false,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// `true` keeps only products below the low-stock threshold.
    pub low_stock: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
    pub meta: Meta,
}

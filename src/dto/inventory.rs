use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::CrmError, models::Product};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLowStockProductsPayload {
    pub updated_products: Vec<Product>,
    pub message: String,
    pub success: bool,
    pub updated_count: usize,
}

impl UpdateLowStockProductsPayload {
    pub fn restocked(updated_products: Vec<Product>) -> Self {
        let message = if updated_products.is_empty() {
            "No low-stock products found".to_string()
        } else {
            format!("Updated {} low-stock products", updated_products.len())
        };
        Self {
            updated_count: updated_products.len(),
            updated_products,
            message,
            success: true,
        }
    }

    pub fn failed(err: &CrmError) -> Self {
        Self {
            updated_products: Vec::new(),
            message: format!("Error updating low-stock products: {err}"),
            success: false,
            updated_count: 0,
        }
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::CrmError, models::Customer, response::Meta};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    pub customer: Option<Customer>,
    pub message: String,
    pub success: bool,
}

impl CreateCustomerPayload {
    pub fn created(customer: Customer) -> Self {
        Self {
            customer: Some(customer),
            message: "Customer created successfully".into(),
            success: true,
        }
    }

    pub fn failed(err: &CrmError) -> Self {
        Self {
            customer: None,
            message: err.to_string(),
            success: false,
        }
    }
}

/// Result of a bulk import. Invalid entries are reported in `errors`
/// without aborting the rest of the batch.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateCustomersPayload {
    pub customers: Vec<Customer>,
    pub errors: Vec<String>,
    pub success_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at_gte: Option<NaiveDate>,
    pub created_at_lte: Option<NaiveDate>,
    pub phone_pattern: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
    pub meta: Meta,
}

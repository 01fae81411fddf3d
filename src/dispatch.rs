//! Maps GraphQL operation names onto service calls.
//!
//! Every operation reads its arguments from the request `variables` and
//! produces the JSON payload placed under `data.<operationName>`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::{
        customers::{CreateCustomerPayload, CustomerFilter, CustomerInput},
        inventory::UpdateLowStockProductsPayload,
        orders::{CreateOrderPayload, OrderFilter, OrderRequest},
        products::{CreateProductPayload, ProductFilter, ProductInput},
    },
    error::{AppError, AppResult, CrmError, ErrorKind},
    routes::params::Pagination,
    services::{
        customer_service, inventory_service, order_service, product_service, report_service,
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Customer,
    AllCustomers,
    Product,
    AllProducts,
    Order,
    AllOrders,
    CustomerOrders,
    FilteredOrders,
    CrmStats,
    CreateCustomer,
    BulkCreateCustomers,
    CreateProduct,
    CreateOrder,
    UpdateLowStockProducts,
}

const OPERATIONS: &[(&str, Operation)] = &[
    ("customer", Operation::Customer),
    ("allCustomers", Operation::AllCustomers),
    ("product", Operation::Product),
    ("allProducts", Operation::AllProducts),
    ("order", Operation::Order),
    ("allOrders", Operation::AllOrders),
    ("customerOrders", Operation::CustomerOrders),
    ("filteredOrders", Operation::FilteredOrders),
    ("crmStats", Operation::CrmStats),
    ("createCustomer", Operation::CreateCustomer),
    ("bulkCreateCustomers", Operation::BulkCreateCustomers),
    ("createProduct", Operation::CreateProduct),
    ("createOrder", Operation::CreateOrder),
    ("updateLowStockProducts", Operation::UpdateLowStockProducts),
];

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, op)| *op)
    }

    pub fn name(self) -> &'static str {
        OPERATIONS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(n, _)| *n)
            .unwrap_or("unknown")
    }

    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Operation::CreateCustomer
                | Operation::BulkCreateCustomers
                | Operation::CreateProduct
                | Operation::CreateOrder
                | Operation::UpdateLowStockProducts
        )
    }

    pub fn all() -> impl Iterator<Item = Operation> {
        OPERATIONS.iter().map(|(_, op)| *op)
    }
}

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerIdArgs {
    customer_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct InputArgs<T> {
    input: T,
}

#[derive(Debug, Deserialize)]
struct BulkArgs {
    inputs: Vec<CustomerInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListArgs<F> {
    #[serde(default)]
    filter: Option<F>,
    #[serde(default)]
    order_by: Option<String>,
    #[serde(flatten)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilteredOrdersArgs {
    #[serde(flatten)]
    filter: OrderFilter,
    #[serde(default)]
    order_by: Option<String>,
}

fn args<T: DeserializeOwned>(op: Operation, variables: Value) -> AppResult<T> {
    let variables = match variables {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(variables)
        .map_err(|err| AppError::BadRequest(format!("invalid variables for {}: {err}", op.name())))
}

fn to_data<T: Serialize>(payload: T) -> AppResult<Value> {
    serde_json::to_value(payload).map_err(|err| AppError::Internal(err.into()))
}

/// Passes business failures back for inline reporting and escalates
/// infrastructure failures to the transport.
fn reject(op: Operation, err: CrmError) -> AppResult<CrmError> {
    if err.kind() == ErrorKind::Infrastructure {
        return Err(err.into());
    }
    tracing::warn!(operation = op.name(), kind = ?err.kind(), error = %err, "mutation rejected");
    Ok(err)
}

pub async fn dispatch(state: &AppState, op: Operation, variables: Value) -> AppResult<Value> {
    tracing::debug!(operation = op.name(), mutation = op.is_mutation(), "dispatching");

    match op {
        Operation::Customer => {
            let IdArgs { id } = args(op, variables)?;
            to_data(customer_service::get_customer(state, id).await?)
        }
        Operation::AllCustomers => {
            let list: ListArgs<CustomerFilter> = args(op, variables)?;
            to_data(
                customer_service::list_customers(
                    state,
                    &list.filter.unwrap_or_default(),
                    list.order_by.as_deref(),
                    &list.pagination,
                )
                .await?,
            )
        }
        Operation::Product => {
            let IdArgs { id } = args(op, variables)?;
            to_data(product_service::get_product(state, id).await?)
        }
        Operation::AllProducts => {
            let list: ListArgs<ProductFilter> = args(op, variables)?;
            to_data(
                product_service::list_products(
                    state,
                    &list.filter.unwrap_or_default(),
                    list.order_by.as_deref(),
                    &list.pagination,
                )
                .await?,
            )
        }
        Operation::Order => {
            let IdArgs { id } = args(op, variables)?;
            to_data(order_service::get_order(state, id).await?)
        }
        Operation::AllOrders => {
            let list: ListArgs<OrderFilter> = args(op, variables)?;
            to_data(
                order_service::list_orders(
                    state,
                    &list.filter.unwrap_or_default(),
                    list.order_by.as_deref(),
                    &list.pagination,
                )
                .await?,
            )
        }
        Operation::CustomerOrders => {
            let CustomerIdArgs { customer_id } = args(op, variables)?;
            to_data(order_service::customer_orders(state, customer_id).await?)
        }
        Operation::FilteredOrders => {
            let FilteredOrdersArgs { filter, order_by } = args(op, variables)?;
            to_data(order_service::filtered_orders(state, &filter, order_by.as_deref()).await?)
        }
        Operation::CrmStats => to_data(report_service::crm_stats(state).await?),
        Operation::CreateCustomer => {
            let InputArgs { input } = args::<InputArgs<CustomerInput>>(op, variables)?;
            let payload = match customer_service::create_customer(&state.orm, &input).await {
                Ok(customer) => CreateCustomerPayload::created(customer),
                Err(err) => CreateCustomerPayload::failed(&reject(op, err)?),
            };
            to_data(payload)
        }
        Operation::BulkCreateCustomers => {
            let BulkArgs { inputs } = args(op, variables)?;
            let payload = customer_service::bulk_create_customers(state, &inputs)
                .await
                .map_err(AppError::from)?;
            to_data(payload)
        }
        Operation::CreateProduct => {
            let InputArgs { input } = args::<InputArgs<ProductInput>>(op, variables)?;
            let payload = match product_service::create_product(&state.orm, &input).await {
                Ok(product) => CreateProductPayload::created(product),
                Err(err) => CreateProductPayload::failed(&reject(op, err)?),
            };
            to_data(payload)
        }
        Operation::CreateOrder => {
            let InputArgs { input } = args::<InputArgs<OrderRequest>>(op, variables)?;
            let payload = match order_service::create_order_request(state, &input).await {
                Ok(order) => CreateOrderPayload::created(order),
                Err(err) => CreateOrderPayload::failed(&reject(op, err)?),
            };
            to_data(payload)
        }
        Operation::UpdateLowStockProducts => {
            // Restock failures, store outages included, are always reported inline.
            let payload = match inventory_service::restock_low_stock(state).await {
                Ok(products) => UpdateLowStockProductsPayload::restocked(products),
                Err(err) => {
                    tracing::error!(error = %err, "low-stock replenishment failed");
                    UpdateLowStockProductsPayload::failed(&err)
                }
            };
            to_data(payload)
        }
    }
}

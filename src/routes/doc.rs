use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        customers::{
            BulkCreateCustomersPayload, CreateCustomerPayload, CustomerFilter, CustomerInput,
            CustomerList,
        },
        inventory::UpdateLowStockProductsPayload,
        orders::{CreateOrderPayload, OrderFilter, OrderInput, OrderList, OrderRequest},
        products::{CreateProductPayload, ProductFilter, ProductInput, ProductList},
        reports::CrmStats,
    },
    models::{Customer, Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    routes::{graphql, health, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(health::health_check, graphql::graphql),
    components(
        schemas(
            Customer,
            Product,
            Order,
            OrderItem,
            CustomerInput,
            ProductInput,
            OrderInput,
            OrderRequest,
            CustomerFilter,
            ProductFilter,
            OrderFilter,
            CustomerList,
            ProductList,
            OrderList,
            CreateCustomerPayload,
            BulkCreateCustomersPayload,
            CreateProductPayload,
            CreateOrderPayload,
            UpdateLowStockProductsPayload,
            CrmStats,
            params::Pagination,
            graphql::GraphQLRequest,
            graphql::GraphQLResponse,
            Meta,
            ApiResponse<health::HealthData>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "GraphQL", description = "CRM queries and mutations by operation name"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    dispatch::{Operation, dispatch},
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub operation_name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub variables: Value,
}

/// `data` holds a single key, the operation name, mapped to its payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct GraphQLResponse {
    #[schema(value_type = Object)]
    pub data: Value,
}

#[utoipa::path(
    post,
    path = "/graphql",
    request_body = GraphQLRequest,
    responses(
        (status = 200, description = "Operation payload", body = GraphQLResponse),
        (status = 400, description = "Unknown operation or invalid variables"),
        (status = 500, description = "Store unavailable"),
    ),
    tag = "GraphQL"
)]
pub async fn graphql(
    State(state): State<AppState>,
    Json(request): Json<GraphQLRequest>,
) -> AppResult<Json<GraphQLResponse>> {
    let op = Operation::from_name(&request.operation_name)
        .ok_or_else(|| AppError::UnknownOperation(request.operation_name.clone()))?;

    let payload = dispatch(&state, op, request.variables).await?;

    let mut data = serde_json::Map::new();
    data.insert(op.name().to_string(), payload);
    Ok(Json(GraphQLResponse {
        data: Value::Object(data),
    }))
}

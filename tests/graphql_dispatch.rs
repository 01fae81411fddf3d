mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};

use common::{setup_state, spawn_app};

async fn post(base: &str, operation: &str, variables: Value) -> anyhow::Result<(StatusCode, Value)> {
    let response = reqwest::Client::new()
        .post(format!("{base}/graphql"))
        .json(&json!({ "operationName": operation, "variables": variables }))
        .send()
        .await?;
    let status = response.status();
    Ok((status, response.json().await?))
}

#[tokio::test]
async fn mutations_report_business_failures_inline() -> anyhow::Result<()> {
    let base = spawn_app(setup_state().await?).await?;
    let input = json!({ "input": { "name": "Alice", "email": "alice@example.com", "phone": "+1234567890" } });

    let (status, body) = post(&base, "createCustomer", input.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    let payload = &body["data"]["createCustomer"];
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "Customer created successfully");
    assert_eq!(payload["customer"]["email"], "alice@example.com");

    let (status, body) = post(&base, "createCustomer", input).await?;
    assert_eq!(status, StatusCode::OK);
    let payload = &body["data"]["createCustomer"];
    assert_eq!(payload["success"], false);
    assert_eq!(payload["message"], "Email already exists");
    assert!(payload["customer"].is_null());
    Ok(())
}

#[tokio::test]
async fn order_mutation_and_queries() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let alice = common::customer(&state, "Alice", "alice@example.com").await?;
    let book = common::product(&state, "Book", "10.00", 5).await?;
    let pen = common::product(&state, "Pen", "5.50", 50).await?;
    let base = spawn_app(state).await?;

    let (_, body) = post(
        &base,
        "createOrder",
        json!({ "input": { "customerId": alice.id, "productIds": [book.id, pen.id] } }),
    )
    .await?;
    let payload = &body["data"]["createOrder"];
    assert_eq!(payload["success"], true);
    assert_eq!(payload["order"]["totalAmount"], "15.50");
    let order_id = payload["order"]["id"].clone();

    let (_, body) = post(&base, "createOrder", json!({ "input": { "customerId": alice.id } })).await?;
    assert_eq!(body["data"]["createOrder"]["success"], false);
    assert_eq!(
        body["data"]["createOrder"]["message"],
        "At least one product must be selected"
    );

    let (_, body) = post(&base, "order", json!({ "id": order_id })).await?;
    assert_eq!(body["data"]["order"]["customer"]["name"], "Alice");
    assert_eq!(body["data"]["order"]["products"].as_array().map(Vec::len), Some(2));

    let (_, body) = post(&base, "customerOrders", json!({ "customerId": alice.id })).await?;
    assert_eq!(body["data"]["customerOrders"].as_array().map(Vec::len), Some(1));

    let (_, body) = post(&base, "crmStats", Value::Null).await?;
    assert_eq!(body["data"]["crmStats"]["orderCount"], 1);
    assert_eq!(body["data"]["crmStats"]["totalRevenue"], "15.50");
    Ok(())
}

#[tokio::test]
async fn malformed_order_ids_fail_inline() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let alice = common::customer(&state, "Alice", "alice@example.com").await?;
    let book = common::product(&state, "Book", "10.00", 5).await?;
    let base = spawn_app(state).await?;

    let (status, body) = post(
        &base,
        "createOrder",
        json!({ "input": { "customerId": alice.id, "productIds": [book.id, "not-a-uuid"] } }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let payload = &body["data"]["createOrder"];
    assert_eq!(payload["success"], false);
    assert_eq!(payload["message"], "Product with ID not-a-uuid not found");
    assert!(payload["order"].is_null());

    let (status, body) = post(
        &base,
        "createOrder",
        json!({ "input": { "customerId": "nobody", "productIds": ["not-a-uuid"] } }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["createOrder"]["message"], "Customer not found");

    let (_, body) = post(&base, "crmStats", Value::Null).await?;
    assert_eq!(body["data"]["crmStats"]["orderCount"], 0);
    assert_eq!(body["data"]["crmStats"]["totalRevenue"], "0.00");
    Ok(())
}

#[tokio::test]
async fn list_queries_take_filter_sort_and_page() -> anyhow::Result<()> {
    let state = setup_state().await?;
    for (name, price) in [("A", "50"), ("B", "150"), ("C", "300"), ("D", "600")] {
        common::product(&state, name, price, 20).await?;
    }
    let base = spawn_app(state).await?;

    let (status, body) = post(
        &base,
        "allProducts",
        json!({
            "filter": { "priceGte": "100" },
            "orderBy": "-price",
            "page": 1,
            "perPage": 2
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let list = &body["data"]["allProducts"];
    let names: Vec<&str> = list["items"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, ["D", "C"]);
    assert_eq!(list["meta"]["total"], 3);
    assert_eq!(list["meta"]["perPage"], 2);
    Ok(())
}

#[tokio::test]
async fn bad_requests_use_the_error_envelope() -> anyhow::Result<()> {
    let base = spawn_app(setup_state().await?).await?;

    let (status, body) = post(&base, "dropDatabase", json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"].is_null());
    assert_eq!(body["errors"][0]["message"], "Unknown operation dropDatabase");

    let (status, body) = post(&base, "allCustomers", json!({ "orderBy": "password" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0]["message"].as_str().is_some());

    let (status, _) = post(&base, "customer", json!({ "id": "not-a-uuid" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = reqwest::get(format!("{base}/nowhere")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn restock_mutation_reports_quiet_runs() -> anyhow::Result<()> {
    let base = spawn_app(setup_state().await?).await?;
    let (_, body) = post(&base, "updateLowStockProducts", Value::Null).await?;
    let payload = &body["data"]["updateLowStockProducts"];
    assert_eq!(payload["success"], true);
    assert_eq!(payload["updatedCount"], 0);
    assert_eq!(payload["message"], "No low-stock products found");
    Ok(())
}

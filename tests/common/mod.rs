#![allow(dead_code)]

use std::str::FromStr;

use axum_crm_api::{
    db::{create_orm_conn, run_migrations},
    dto::{customers::CustomerInput, products::ProductInput},
    models::{Customer, Product},
    routes::create_router,
    services::{customer_service, product_service},
    state::AppState,
};
use rust_decimal::Decimal;

/// Fresh in-memory database with the schema applied.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:", 1).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm))
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_app(state: AppState) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, create_router(state)).await;
    });
    Ok(format!("http://{addr}"))
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal literal")
}

pub fn customer_input(name: &str, email: &str, phone: Option<&str>) -> CustomerInput {
    CustomerInput {
        name: name.into(),
        email: email.into(),
        phone: phone.map(Into::into),
    }
}

pub fn product_input(name: &str, price: &str, stock: Option<i32>) -> ProductInput {
    ProductInput {
        name: name.into(),
        price: dec(price),
        stock,
    }
}

pub async fn customer(state: &AppState, name: &str, email: &str) -> anyhow::Result<Customer> {
    let input = customer_input(name, email, None);
    Ok(customer_service::create_customer(&state.orm, &input).await?)
}

pub async fn product(
    state: &AppState,
    name: &str,
    price: &str,
    stock: i32,
) -> anyhow::Result<Product> {
    let input = product_input(name, price, Some(stock));
    Ok(product_service::create_product(&state.orm, &input).await?)
}

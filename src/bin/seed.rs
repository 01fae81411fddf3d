use std::str::FromStr;

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use axum_crm_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{customers::CustomerInput, orders::OrderInput, products::ProductInput},
    entity::{
        Customers, Orders, Products, customers::Column as CustomerCol,
        products::Column as ProductCol,
    },
    services::{customer_service, order_service, product_service},
    state::AppState,
};

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Alice Johnson", "alice.johnson@example.com", "+1234567890"),
    ("Bob Smith", "bob.smith@example.com", "1234567890"),
    ("Carol Davis", "carol.davis@example.com", "+442079460958"),
    ("David Wilson", "david.wilson@example.com", "5551234567"),
    ("Eva Brown", "eva.brown@example.com", "+15559876543"),
];

const PRODUCTS: &[(&str, &str, i32)] = &[
    ("Laptop Pro", "1299.99", 15),
    ("Smartphone X", "799.99", 25),
    ("Wireless Headphones", "199.99", 30),
    ("Tablet Air", "599.99", 20),
    ("Smart Watch", "299.99", 18),
    ("Gaming Console", "499.99", 12),
    ("Bluetooth Speaker", "89.99", 35),
    ("USB-C Cable", "19.99", 100),
];

/// (customer index, product indexes) into the tables above.
const ORDERS: &[(usize, &[usize])] = &[
    (0, &[0, 2]),
    (1, &[1, 4]),
    (2, &[3, 6]),
    (0, &[7]),
    (3, &[5, 2]),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, config.max_connections).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm);

    let customer_ids = seed_customers(&state).await?;
    let product_ids = seed_products(&state).await?;
    let orders = seed_orders(&state, &customer_ids, &product_ids).await?;

    println!(
        "Seed completed. {} customers, {} products, {} new orders",
        customer_ids.len(),
        product_ids.len(),
        orders
    );
    Ok(())
}

async fn seed_customers(state: &AppState) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, email, phone) in CUSTOMERS {
        let existing = Customers::find()
            .filter(CustomerCol::Email.eq(*email))
            .one(&state.orm)
            .await?;
        let id = match existing {
            Some(customer) => {
                println!("Customer already exists: {}", customer.name);
                customer.id
            }
            None => {
                let input = CustomerInput {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: Some(phone.to_string()),
                };
                let customer = customer_service::create_customer(&state.orm, &input)
                    .await
                    .with_context(|| format!("seeding customer {email}"))?;
                println!("Created customer: {}", customer.name);
                customer.id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

async fn seed_products(state: &AppState) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(PRODUCTS.len());
    for (name, price, stock) in PRODUCTS {
        let existing = Products::find()
            .filter(ProductCol::Name.eq(*name))
            .one(&state.orm)
            .await?;
        let id = match existing {
            Some(product) => {
                println!("Product already exists: {}", product.name);
                product.id
            }
            None => {
                let input = ProductInput {
                    name: name.to_string(),
                    price: Decimal::from_str(price)?,
                    stock: Some(*stock),
                };
                let product = product_service::create_product(&state.orm, &input)
                    .await
                    .with_context(|| format!("seeding product {name}"))?;
                println!("Created product: {} - ${}", product.name, product.price);
                product.id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

/// Sample orders are only placed into an empty order table.
async fn seed_orders(
    state: &AppState,
    customer_ids: &[Uuid],
    product_ids: &[Uuid],
) -> anyhow::Result<usize> {
    if Orders::find().count(&state.orm).await? > 0 {
        println!("Orders already present, skipping");
        return Ok(0);
    }

    for (customer, products) in ORDERS {
        let input = OrderInput {
            customer_id: customer_ids[*customer],
            product_ids: products.iter().map(|p| product_ids[*p]).collect(),
            order_date: None,
        };
        let order = order_service::create_order(state, &input)
            .await
            .context("seeding order")?;
        println!(
            "Created order {}: {} - ${}",
            order.id, order.customer.name, order.total_amount
        );
    }
    Ok(ORDERS.len())
}

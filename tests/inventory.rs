mod common;

use axum_crm_api::{
    dto::products::ProductFilter,
    routes::params::Pagination,
    services::{inventory_service, product_service},
};
use common::setup_state;

#[tokio::test]
async fn restock_tops_up_only_low_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    for (name, stock) in [("Cable", 3), ("Mouse", 9), ("Keyboard", 10), ("Monitor", 15)] {
        common::product(&state, name, "10.00", stock).await?;
    }

    let updated = inventory_service::restock_low_stock(&state).await?;
    let restocked: Vec<(&str, i32)> = updated.iter().map(|p| (p.name.as_str(), p.stock)).collect();
    assert_eq!(restocked, [("Cable", 13), ("Mouse", 19)]);

    let all = product_service::list_products(
        &state,
        &ProductFilter::default(),
        Some("name"),
        &Pagination::default(),
    )
    .await?;
    let stock: Vec<(&str, i32)> = all.items.iter().map(|p| (p.name.as_str(), p.stock)).collect();
    assert_eq!(
        stock,
        [("Cable", 13), ("Keyboard", 10), ("Monitor", 15), ("Mouse", 19)]
    );
    Ok(())
}

#[tokio::test]
async fn second_run_is_a_no_op() -> anyhow::Result<()> {
    let state = setup_state().await?;
    common::product(&state, "Cable", "10.00", 3).await?;

    assert_eq!(inventory_service::restock_low_stock(&state).await?.len(), 1);
    assert!(inventory_service::restock_low_stock(&state).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn concurrent_runs_restock_once() -> anyhow::Result<()> {
    let state = setup_state().await?;
    common::product(&state, "Cable", "10.00", 3).await?;

    let (a, b) = tokio::join!(
        inventory_service::restock_low_stock(&state),
        inventory_service::restock_low_stock(&state)
    );
    let mut reported: Vec<i32> = a?.into_iter().chain(b?).map(|p| p.stock).collect();
    reported.sort();
    assert_eq!(reported, [13]);

    let all = product_service::list_products(
        &state,
        &ProductFilter::default(),
        None,
        &Pagination::default(),
    )
    .await?;
    assert_eq!(all.items[0].stock, 13);
    Ok(())
}

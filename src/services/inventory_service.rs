use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, LockType},
};

use crate::{
    entity::{Products, products::Column as ProdCol},
    error::CrmError,
    models::Product,
    state::AppState,
};

/// Products with strictly less stock than this are restocked.
pub const LOW_STOCK_THRESHOLD: i32 = 10;
pub const RESTOCK_QUANTITY: i32 = 10;

/// Adds [`RESTOCK_QUANTITY`] to every product below [`LOW_STOCK_THRESHOLD`]
/// and returns them with their new stock, ordered by name.
///
/// The rows are locked for the whole transaction, so two concurrent runs
/// cannot restock the same product twice.
pub async fn restock_low_stock(state: &AppState) -> Result<Vec<Product>, CrmError> {
    let txn = state.orm.begin().await?;

    let ids: Vec<_> = Products::find()
        .filter(ProdCol::Stock.lt(LOW_STOCK_THRESHOLD))
        .order_by_asc(ProdCol::Name)
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    if ids.is_empty() {
        txn.commit().await.map_err(CrmError::transaction)?;
        return Ok(Vec::new());
    }

    Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(RESTOCK_QUANTITY))
        .col_expr(ProdCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(ProdCol::Id.is_in(ids.clone()))
        .filter(ProdCol::Stock.lt(LOW_STOCK_THRESHOLD))
        .exec(&txn)
        .await?;

    let updated: Vec<Product> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .order_by_asc(ProdCol::Name)
        .order_by_asc(ProdCol::Id)
        .all(&txn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    txn.commit().await.map_err(CrmError::transaction)?;

    tracing::info!(count = updated.len(), "restocked low-stock products");
    Ok(updated)
}

use rust_decimal::Decimal;
use sea_orm::{
    EntityTrait, PaginatorTrait, QuerySelect,
    sea_query::{Alias, Expr, Func},
};

use crate::{
    dto::reports::CrmStats,
    entity::{Customers, Orders, orders::Column as OrderCol},
    error::{AppError, AppResult},
    state::AppState,
};

/// Customer and order counts plus the sum of every order total.
pub async fn crm_stats(state: &AppState) -> AppResult<CrmStats> {
    let customer_count = Customers::find().count(&state.orm).await?;
    let order_count = Orders::find().count(&state.orm).await?;

    // Postgres widens SUM(bigint) to numeric, so the sum is read back as text.
    let summed: Option<Option<String>> = Orders::find()
        .select_only()
        .column_as(
            Expr::expr(Func::sum(Expr::col(OrderCol::TotalAmount))).cast_as(Alias::new("TEXT")),
            "revenue_cents",
        )
        .into_tuple()
        .one(&state.orm)
        .await?;
    let cents: i128 = match summed.flatten() {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Internal(anyhow::anyhow!("unreadable revenue {raw:?}: {err}")))?,
        None => 0,
    };
    let total_revenue = Decimal::try_from_i128_with_scale(cents, 2)
        .map_err(|err| AppError::Internal(anyhow::anyhow!("revenue out of range: {err}")))?;

    Ok(CrmStats {
        customer_count,
        order_count,
        total_revenue,
    })
}

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

use crate::{
    dto::products::{ProductFilter, ProductInput, ProductList},
    entity::products::{ActiveModel, Column, Entity as Products},
    error::{AppResult, CrmError},
    filters::{apply_sort, product_predicate, product_sort},
    models::Product,
    response::Meta,
    routes::params::Pagination,
    state::AppState,
    validation::validate_product,
};

pub async fn create_product<C: ConnectionTrait>(
    conn: &C,
    input: &ProductInput,
) -> Result<Product, CrmError> {
    let new = validate_product(input)?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name),
        price: Set(new.price_cents),
        stock: Set(new.stock),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok(Product::from(product))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Option<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Product::from);
    Ok(product)
}

pub async fn list_products(
    state: &AppState,
    filter: &ProductFilter,
    order_by: Option<&str>,
    pagination: &Pagination,
) -> AppResult<ProductList> {
    let sort = product_sort(order_by)?;
    let finder = apply_sort(
        Products::find().filter(product_predicate(filter).build()),
        sort,
        Column::Id,
    );

    let total = finder.clone().count(&state.orm).await?;

    let (rows, meta) = match pagination.normalize() {
        Some((page, per_page, offset)) => (
            finder.limit(per_page).offset(offset).all(&state.orm).await?,
            Meta::new(page, per_page, total),
        ),
        None => (finder.all(&state.orm).await?, Meta::total_only(total)),
    };

    Ok(ProductList {
        items: rows.into_iter().map(Product::from).collect(),
        meta,
    })
}

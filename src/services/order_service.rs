use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderFilter, OrderInput, OrderList, OrderRequest},
    entity::{
        Customers, OrderItems, Orders, Products,
        customers::Column as CustomerCol,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel},
        products::{Column as ProdCol, Model as ProductModel},
    },
    error::{AppResult, CrmError},
    filters::{apply_sort, order_predicate, order_sort},
    models::{Customer, Order, OrderItem, Product},
    response::Meta,
    routes::params::Pagination,
    state::AppState,
};

/// One line of an order before it is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    product_id: Uuid,
    quantity: i32,
}

/// Collapses repeated ids into one line each, keeping first-seen order.
fn merge_lines(product_ids: &[Uuid]) -> Result<Vec<Line>, CrmError> {
    let mut lines: Vec<Line> = Vec::with_capacity(product_ids.len());
    for id in product_ids {
        match lines.iter_mut().find(|line| line.product_id == *id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(1)
                    .ok_or(CrmError::AmountOutOfRange)?;
            }
            None => lines.push(Line {
                product_id: *id,
                quantity: 1,
            }),
        }
    }
    Ok(lines)
}

/// Parses the raw ids of a `createOrder` request, then creates the order.
///
/// A malformed id is reported as missing, in the same order of checks
/// `create_order` applies: customer, empty list, then products as listed.
pub async fn create_order_request(
    state: &AppState,
    request: &OrderRequest,
) -> Result<Order, CrmError> {
    let customer_id =
        Uuid::parse_str(request.customer_id.trim()).map_err(|_| CrmError::CustomerNotFound)?;

    let mut product_ids = Vec::with_capacity(request.product_ids.len());
    for raw in &request.product_ids {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => product_ids.push(id),
            Err(_) => {
                ensure_known(state, customer_id, &product_ids).await?;
                return Err(CrmError::UnknownProductId(raw.trim().to_string()));
            }
        }
    }

    let input = OrderInput {
        customer_id,
        product_ids,
        order_date: request.order_date,
    };
    create_order(state, &input).await
}

/// Fails on the customer or the first listed product that does not exist.
async fn ensure_known(
    state: &AppState,
    customer_id: Uuid,
    product_ids: &[Uuid],
) -> Result<(), CrmError> {
    if Customers::find_by_id(customer_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(CrmError::CustomerNotFound);
    }
    if product_ids.is_empty() {
        return Ok(());
    }

    let found: HashSet<Uuid> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids.to_vec()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    match product_ids.iter().find(|id| !found.contains(*id)) {
        Some(missing) => Err(CrmError::ProductNotFound(*missing)),
        None => Ok(()),
    }
}

/// Creates an order and its items in one transaction.
///
/// The customer and every product are read inside the transaction with a
/// shared lock, so the prices written to the items are the ones summed into
/// the total. Nothing is written unless every referenced row exists.
pub async fn create_order(state: &AppState, input: &OrderInput) -> Result<Order, CrmError> {
    let txn = state.orm.begin().await?;

    let customer = Customers::find_by_id(input.customer_id)
        .lock(LockType::Share)
        .one(&txn)
        .await?
        .ok_or(CrmError::CustomerNotFound)?;

    let lines = merge_lines(&input.product_ids)?;
    if lines.is_empty() {
        return Err(CrmError::NoProductsSpecified);
    }

    let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    let mut products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .lock(LockType::Share)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut priced: Vec<(Line, ProductModel)> = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;
    for line in lines {
        let product = products
            .remove(&line.product_id)
            .ok_or(CrmError::ProductNotFound(line.product_id))?;
        let subtotal = product
            .price
            .checked_mul(i64::from(line.quantity))
            .ok_or(CrmError::AmountOutOfRange)?;
        total = total
            .checked_add(subtotal)
            .ok_or(CrmError::AmountOutOfRange)?;
        priced.push((line, product));
    }

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        order_date: Set(input.order_date.unwrap_or(now).into()),
        total_amount: Set(total),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    let mut rows = Vec::with_capacity(priced.len());
    for (line, product) in priced {
        let item_id = Uuid::new_v4();
        rows.push(OrderItemActive {
            id: Set(item_id),
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(line.quantity),
            price_at_time: Set(product.price),
        });
        items.push(OrderItem::from_entity(
            OrderItemModel {
                id: item_id,
                order_id: order.id,
                product_id: product.id,
                quantity: line.quantity,
                price_at_time: product.price,
            },
            Product::from(product),
        ));
    }
    OrderItems::insert_many(rows).exec(&txn).await?;

    txn.commit().await.map_err(CrmError::transaction)?;

    sort_items(&mut items);
    tracing::info!(
        order_id = %order.id,
        customer_id = %customer.id,
        items = items.len(),
        total_cents = total,
        "order created"
    );
    Ok(Order::from_entity(order, Customer::from(customer), items))
}

fn sort_items(items: &mut [OrderItem]) {
    items.sort_by(|a, b| {
        a.product
            .name
            .cmp(&b.product.name)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Attaches customers and items to order rows, preserving their order.
async fn load_orders<C: ConnectionTrait>(
    conn: &C,
    models: Vec<OrderModel>,
) -> Result<Vec<Order>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = models.iter().map(|o| o.id).collect();
    let mut customer_ids: Vec<Uuid> = models.iter().map(|o| o.customer_id).collect();
    customer_ids.sort_unstable();
    customer_ids.dedup();

    let customers: HashMap<Uuid, Customer> = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, Customer::from(c)))
        .collect();

    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .find_also_related(Products)
        .all(conn)
        .await?;
    for (item, product) in rows {
        if let Some(product) = product {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from_entity(item, Product::from(product)));
        }
    }

    let mut orders = Vec::with_capacity(models.len());
    for model in models {
        let Some(customer) = customers.get(&model.customer_id).cloned() else {
            tracing::warn!(order_id = %model.id, "order without customer skipped");
            continue;
        };
        let mut items = items_by_order.remove(&model.id).unwrap_or_default();
        sort_items(&mut items);
        orders.push(Order::from_entity(model, customer, items));
    }
    Ok(orders)
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<Option<Order>> {
    let Some(model) = Orders::find_by_id(id).one(&state.orm).await? else {
        return Ok(None);
    };
    Ok(load_orders(&state.orm, vec![model]).await?.pop())
}

pub async fn list_orders(
    state: &AppState,
    filter: &OrderFilter,
    order_by: Option<&str>,
    pagination: &Pagination,
) -> AppResult<OrderList> {
    let sort = order_sort(order_by)?;
    let finder = apply_sort(
        Orders::find().filter(order_predicate(filter).build()),
        sort,
        OrderCol::Id,
    );

    let total = finder.clone().count(&state.orm).await?;

    let (rows, meta) = match pagination.normalize() {
        Some((page, per_page, offset)) => (
            finder.limit(per_page).offset(offset).all(&state.orm).await?,
            Meta::new(page, per_page, total),
        ),
        None => (finder.all(&state.orm).await?, Meta::total_only(total)),
    };

    Ok(OrderList {
        items: load_orders(&state.orm, rows).await?,
        meta,
    })
}

/// Orders placed by one customer, newest first. Unknown customers have none.
pub async fn customer_orders(state: &AppState, customer_id: Uuid) -> AppResult<Vec<Order>> {
    let rows = Orders::find()
        .filter(OrderCol::CustomerId.eq(customer_id))
        .order_by_desc(OrderCol::OrderDate)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;
    Ok(load_orders(&state.orm, rows).await?)
}

/// Unpaginated variant of [`list_orders`] used by the reminder job.
pub async fn filtered_orders(
    state: &AppState,
    filter: &OrderFilter,
    order_by: Option<&str>,
) -> AppResult<Vec<Order>> {
    let sort = order_sort(order_by)?;
    let rows = apply_sort(
        Orders::find().filter(order_predicate(filter).build()),
        sort,
        OrderCol::Id,
    )
    .all(&state.orm)
    .await?;
    Ok(load_orders(&state.orm, rows).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_products_collapse_into_one_line() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let lines = merge_lines(&[a, b, a, a]).unwrap();
        assert_eq!(
            lines,
            vec![
                Line {
                    product_id: a,
                    quantity: 3
                },
                Line {
                    product_id: b,
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn no_ids_means_no_lines() {
        assert!(merge_lines(&[]).unwrap().is_empty());
    }
}

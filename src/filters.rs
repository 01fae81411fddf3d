//! Predicate composition for list queries.
//!
//! A filter input is lowered into an ordered list of [`Criterion`]s, each a
//! field paired with a [`Comparison`]. [`PredicateBuilder::build`] ANDs them
//! into a single [`Condition`]; an empty list matches every row.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    Condition, EntityTrait, Order, QueryOrder, Select, Value,
    sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr},
};

use crate::{
    dto::{customers::CustomerFilter, orders::OrderFilter, products::ProductFilter},
    entity::{
        Customers, OrderItems, Orders, Products, customers::Column as CustomerCol,
        order_items::Column as OrderItemCol, orders::Column as OrderCol,
        products::Column as ProductCol,
    },
    error::{AppError, AppResult},
    money,
    routes::params::parse_order_by,
    services::inventory_service::LOW_STOCK_THRESHOLD,
};

const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// Case-insensitive substring match.
    Contains(String),
    StartsWith(String),
    Equals(Value),
    Gte(Value),
    Lte(Value),
    Lt(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Criterion<F> {
    pub field: F,
    pub comparison: Comparison,
}

/// A filterable field of one entity, possibly reached through a relation.
pub trait FilterField: Copy {
    fn predicate(self, comparison: Comparison) -> SimpleExpr;
}

#[derive(Debug, Clone)]
pub struct PredicateBuilder<F> {
    criteria: Vec<Criterion<F>>,
}

impl<F> Default for PredicateBuilder<F> {
    fn default() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }
}

impl<F: FilterField> PredicateBuilder<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion; `None` leaves the field unconstrained.
    pub fn with(mut self, field: F, comparison: Option<Comparison>) -> Self {
        if let Some(comparison) = comparison {
            self.criteria.push(Criterion { field, comparison });
        }
        self
    }

    pub fn criteria(&self) -> &[Criterion<F>] {
        &self.criteria
    }

    pub fn build(&self) -> Condition {
        self.criteria
            .iter()
            .fold(Condition::all(), |condition, criterion| {
                condition.add(criterion.field.predicate(criterion.comparison.clone()))
            })
    }
}

fn compare(column: Expr, comparison: Comparison) -> SimpleExpr {
    match comparison {
        Comparison::Contains(text) => {
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
        }
        Comparison::StartsWith(text) => {
            let pattern = format!("{}%", escape_like(&text));
            column.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
        }
        Comparison::Equals(value) => column.eq(value),
        Comparison::Gte(value) => column.gte(value),
        Comparison::Lte(value) => column.lte(value),
        Comparison::Lt(value) => column.lt(value),
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Email,
    Phone,
    CreatedAt,
}

impl FilterField for CustomerField {
    fn predicate(self, comparison: Comparison) -> SimpleExpr {
        let column = match self {
            CustomerField::Name => CustomerCol::Name,
            CustomerField::Email => CustomerCol::Email,
            CustomerField::Phone => CustomerCol::Phone,
            CustomerField::CreatedAt => CustomerCol::CreatedAt,
        };
        compare(Expr::col((Customers, column)), comparison)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Price,
    Stock,
}

impl FilterField for ProductField {
    fn predicate(self, comparison: Comparison) -> SimpleExpr {
        let column = match self {
            ProductField::Name => ProductCol::Name,
            ProductField::Price => ProductCol::Price,
            ProductField::Stock => ProductCol::Stock,
        };
        compare(Expr::col((Products, column)), comparison)
    }
}

/// Order fields. The relation fields match when ANY related row matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    TotalAmount,
    OrderDate,
    CustomerName,
    ProductName,
    ProductId,
}

impl FilterField for OrderField {
    fn predicate(self, comparison: Comparison) -> SimpleExpr {
        match self {
            OrderField::TotalAmount => {
                compare(Expr::col((Orders, OrderCol::TotalAmount)), comparison)
            }
            OrderField::OrderDate => compare(Expr::col((Orders, OrderCol::OrderDate)), comparison),
            OrderField::CustomerName => Expr::col((Orders, OrderCol::CustomerId)).in_subquery(
                Query::select()
                    .column((Customers, CustomerCol::Id))
                    .from(Customers)
                    .and_where(compare(Expr::col((Customers, CustomerCol::Name)), comparison))
                    .to_owned(),
            ),
            OrderField::ProductName => Expr::col((Orders, OrderCol::Id)).in_subquery(
                Query::select()
                    .column((OrderItems, OrderItemCol::OrderId))
                    .from(OrderItems)
                    .inner_join(
                        Products,
                        Expr::col((Products, ProductCol::Id))
                            .equals((OrderItems, OrderItemCol::ProductId)),
                    )
                    .and_where(compare(Expr::col((Products, ProductCol::Name)), comparison))
                    .to_owned(),
            ),
            OrderField::ProductId => Expr::col((Orders, OrderCol::Id)).in_subquery(
                Query::select()
                    .column((OrderItems, OrderItemCol::OrderId))
                    .from(OrderItems)
                    .and_where(compare(
                        Expr::col((OrderItems, OrderItemCol::ProductId)),
                        comparison,
                    ))
                    .to_owned(),
            ),
        }
    }
}

fn contains(text: Option<&str>) -> Option<Comparison> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Comparison::Contains(t.to_string()))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::from(at.fixed_offset())
}

/// On or after the start of `date` (UTC).
fn from_day(date: Option<NaiveDate>) -> Option<Comparison> {
    date.map(|d| Comparison::Gte(timestamp(day_start(d))))
}

/// Through the end of `date` (UTC).
fn through_day(date: Option<NaiveDate>) -> Option<Comparison> {
    let next = date?.checked_add_days(Days::new(1))?;
    Some(Comparison::Lt(timestamp(day_start(next))))
}

pub fn customer_predicate(filter: &CustomerFilter) -> PredicateBuilder<CustomerField> {
    PredicateBuilder::new()
        .with(CustomerField::Name, contains(filter.name.as_deref()))
        .with(CustomerField::Email, contains(filter.email.as_deref()))
        .with(CustomerField::CreatedAt, from_day(filter.created_at_gte))
        .with(CustomerField::CreatedAt, through_day(filter.created_at_lte))
        .with(
            CustomerField::Phone,
            filter
                .phone_pattern
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| Comparison::StartsWith(p.to_string())),
        )
}

pub fn product_predicate(filter: &ProductFilter) -> PredicateBuilder<ProductField> {
    PredicateBuilder::new()
        .with(ProductField::Name, contains(filter.name.as_deref()))
        .with(
            ProductField::Price,
            filter
                .price_gte
                .map(|p| Comparison::Gte(money::lower_bound_cents(p).into())),
        )
        .with(
            ProductField::Price,
            filter
                .price_lte
                .map(|p| Comparison::Lte(money::upper_bound_cents(p).into())),
        )
        .with(
            ProductField::Stock,
            filter.stock_gte.map(|s| Comparison::Gte(s.into())),
        )
        .with(
            ProductField::Stock,
            filter.stock_lte.map(|s| Comparison::Lte(s.into())),
        )
        .with(
            ProductField::Stock,
            filter
                .low_stock
                .filter(|low| *low)
                .map(|_| Comparison::Lt(LOW_STOCK_THRESHOLD.into())),
        )
}

pub fn order_predicate(filter: &OrderFilter) -> PredicateBuilder<OrderField> {
    PredicateBuilder::new()
        .with(
            OrderField::TotalAmount,
            filter
                .total_amount_gte
                .map(|t| Comparison::Gte(money::lower_bound_cents(t).into())),
        )
        .with(
            OrderField::TotalAmount,
            filter
                .total_amount_lte
                .map(|t| Comparison::Lte(money::upper_bound_cents(t).into())),
        )
        .with(OrderField::OrderDate, from_day(filter.order_date_gte))
        .with(OrderField::OrderDate, through_day(filter.order_date_lte))
        .with(OrderField::CustomerName, contains(filter.customer_name.as_deref()))
        .with(OrderField::ProductName, contains(filter.product_name.as_deref()))
        .with(
            OrderField::ProductId,
            filter.product_id.map(|id| Comparison::Equals(id.into())),
        )
}

/// Resolved ordering for a list query.
#[derive(Debug, Clone)]
pub struct Sort<C> {
    pub column: C,
    pub order: Order,
}

fn resolve_sort<C: Copy>(order_by: Option<&str>, keys: &[(&str, C)], default: C) -> AppResult<Sort<C>> {
    let Some(raw) = order_by.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Sort {
            column: default,
            order: Order::Desc,
        });
    };

    let (key, direction) = parse_order_by(raw)?;
    keys.iter()
        .find(|(name, _)| *name == key)
        .map(|(_, column)| Sort {
            column: *column,
            order: direction.into(),
        })
        .ok_or_else(|| AppError::BadRequest(format!("cannot order by {raw:?}")))
}

pub fn customer_sort(order_by: Option<&str>) -> AppResult<Sort<CustomerCol>> {
    resolve_sort(
        order_by,
        &[
            ("name", CustomerCol::Name),
            ("email", CustomerCol::Email),
            ("created_at", CustomerCol::CreatedAt),
        ],
        CustomerCol::CreatedAt,
    )
}

pub fn product_sort(order_by: Option<&str>) -> AppResult<Sort<ProductCol>> {
    resolve_sort(
        order_by,
        &[
            ("name", ProductCol::Name),
            ("price", ProductCol::Price),
            ("stock", ProductCol::Stock),
            ("created_at", ProductCol::CreatedAt),
        ],
        ProductCol::CreatedAt,
    )
}

pub fn order_sort(order_by: Option<&str>) -> AppResult<Sort<OrderCol>> {
    resolve_sort(
        order_by,
        &[
            ("order_date", OrderCol::OrderDate),
            ("total_amount", OrderCol::TotalAmount),
            ("created_at", OrderCol::CreatedAt),
        ],
        OrderCol::OrderDate,
    )
}

/// Applies `sort` and breaks ties on the primary key in the same direction.
pub fn apply_sort<E: EntityTrait>(select: Select<E>, sort: Sort<E::Column>, id: E::Column) -> Select<E> {
    select
        .order_by(sort.column, sort.order.clone())
        .order_by(id, sort.order)
}

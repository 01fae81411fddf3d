use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::customers::{BulkCreateCustomersPayload, CustomerFilter, CustomerInput, CustomerList},
    entity::customers::{ActiveModel, Column, Entity as Customers},
    error::{AppResult, CrmError, ErrorKind},
    filters::{apply_sort, customer_predicate, customer_sort},
    models::Customer,
    response::Meta,
    routes::params::Pagination,
    state::AppState,
    validation::validate_customer,
};

/// Validates and stores one customer. Emails are unique across customers.
pub async fn create_customer<C: ConnectionTrait>(
    conn: &C,
    input: &CustomerInput,
) -> Result<Customer, CrmError> {
    let new = validate_customer(input)?;

    let taken = Customers::find()
        .filter(Column::Email.eq(new.email.as_str()))
        .count(conn)
        .await?;
    if taken > 0 {
        return Err(CrmError::DuplicateEmail);
    }

    let now = Utc::now();
    let customer = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name),
        email: Set(new.email),
        phone: Set(new.phone),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await
    .map_err(|err| CrmError::on_conflict(err, CrmError::DuplicateEmail))?;

    tracing::info!(customer_id = %customer.id, "customer created");
    Ok(Customer::from(customer))
}

/// Creates each entry on its own. A rejected entry is reported in `errors`
/// and does not affect the others; only a store outage aborts the batch.
pub async fn bulk_create_customers(
    state: &AppState,
    inputs: &[CustomerInput],
) -> Result<BulkCreateCustomersPayload, CrmError> {
    let mut payload = BulkCreateCustomersPayload::default();

    for input in inputs {
        match create_customer(&state.orm, input).await {
            Ok(customer) => payload.customers.push(customer),
            Err(err) if err.kind() == ErrorKind::Infrastructure => return Err(err),
            Err(err) => payload.errors.push(bulk_entry_error(input, &err)),
        }
    }

    payload.success_count = payload.customers.len();
    payload.error_count = payload.errors.len();
    tracing::info!(
        created = payload.success_count,
        rejected = payload.error_count,
        "bulk customer import finished"
    );
    Ok(payload)
}

fn bulk_entry_error(input: &CustomerInput, err: &CrmError) -> String {
    let email = input.email.trim();
    match err {
        CrmError::DuplicateEmail => format!("Email {email} already exists"),
        CrmError::InvalidPhoneFormat => format!("Invalid phone format for {email}"),
        other => format!("Error creating customer {email}: {other}"),
    }
}

pub async fn get_customer(state: &AppState, id: Uuid) -> AppResult<Option<Customer>> {
    let customer = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Customer::from);
    Ok(customer)
}

pub async fn list_customers(
    state: &AppState,
    filter: &CustomerFilter,
    order_by: Option<&str>,
    pagination: &Pagination,
) -> AppResult<CustomerList> {
    let sort = customer_sort(order_by)?;
    let finder = apply_sort(
        Customers::find().filter(customer_predicate(filter).build()),
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

    Ok(CustomerList {
        items: rows.into_iter().map(Customer::from).collect(),
        meta,
    })
}

mod common;

use axum_crm_api::{
    dto::customers::CustomerFilter,
    error::CrmError,
    routes::params::Pagination,
    services::customer_service,
};
use common::{customer_input, setup_state};

#[tokio::test]
async fn emails_are_unique() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let alice = customer_input("Alice", "alice@example.com", Some("+1234567890"));
    let created = customer_service::create_customer(&state.orm, &alice).await?;
    assert_eq!(created.email, "alice@example.com");
    assert_eq!(created.phone.as_deref(), Some("+1234567890"));

    let again = customer_input("Alice Again", "alice@example.com", None);
    let err = customer_service::create_customer(&state.orm, &again)
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::DuplicateEmail));

    let all = customer_service::list_customers(
        &state,
        &CustomerFilter::default(),
        None,
        &Pagination::default(),
    )
    .await?;
    assert_eq!(all.meta.total, Some(1));
    assert_eq!(all.items[0].name, "Alice");
    Ok(())
}

#[tokio::test]
async fn phone_format_is_enforced() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let ok = customer_input("Bob", "bob@example.com", Some("1234567890"));
    assert!(customer_service::create_customer(&state.orm, &ok).await.is_ok());

    let bad = customer_input("Carol", "carol@example.com", Some("abc-123"));
    let err = customer_service::create_customer(&state.orm, &bad)
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::InvalidPhoneFormat));

    let none = customer_input("Dave", "dave@example.com", None);
    let dave = customer_service::create_customer(&state.orm, &none).await?;
    assert_eq!(dave.phone, None);
    Ok(())
}

#[tokio::test]
async fn bulk_import_keeps_valid_entries() -> anyhow::Result<()> {
    let state = setup_state().await?;
    common::customer(&state, "Existing", "taken@example.com").await?;

    let inputs = vec![
        customer_input("Eva", "eva@example.com", Some("+15559876543")),
        customer_input("Dup", "taken@example.com", None),
        customer_input("Bad Phone", "badphone@example.com", Some("phone")),
        customer_input("Frank", "frank@example.com", None),
    ];
    let payload = customer_service::bulk_create_customers(&state, &inputs).await?;

    assert_eq!(payload.success_count, 2);
    assert_eq!(payload.error_count, 2);
    let names: Vec<&str> = payload.customers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Eva", "Frank"]);
    assert_eq!(
        payload.errors,
        [
            "Email taken@example.com already exists",
            "Invalid phone format for badphone@example.com",
        ]
    );

    let all = customer_service::list_customers(
        &state,
        &CustomerFilter::default(),
        None,
        &Pagination::default(),
    )
    .await?;
    assert_eq!(all.items.len(), 3);
    Ok(())
}

#[tokio::test]
async fn list_filters_and_sorts() -> anyhow::Result<()> {
    let state = setup_state().await?;
    for (name, email, phone) in [
        ("Alice Johnson", "alice@example.com", Some("+1234567890")),
        ("Bob Smith", "bob@shop.io", Some("1234567890")),
        ("Carol Davis", "carol@example.com", Some("+442079460958")),
        ("alicia keys", "keys@music.com", None),
    ] {
        let input = customer_input(name, email, phone);
        customer_service::create_customer(&state.orm, &input).await?;
    }

    let by_name = CustomerFilter {
        name: Some("ALIC".into()),
        ..Default::default()
    };
    let list =
        customer_service::list_customers(&state, &by_name, Some("name"), &Pagination::default())
            .await?;
    let names: Vec<&str> = list.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Alice Johnson", "alicia keys"]);
    assert_eq!(list.meta.total, Some(2));

    let by_phone = CustomerFilter {
        phone_pattern: Some("+".into()),
        email: Some("example".into()),
        ..Default::default()
    };
    let list =
        customer_service::list_customers(&state, &by_phone, Some("-email"), &Pagination::default())
            .await?;
    let emails: Vec<&str> = list.items.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, ["carol@example.com", "alice@example.com"]);
    Ok(())
}

#[tokio::test]
async fn list_pages_when_asked() -> anyhow::Result<()> {
    let state = setup_state().await?;
    for i in 0..5 {
        common::customer(&state, &format!("Customer {i}"), &format!("c{i}@example.com")).await?;
    }

    let page = Pagination {
        page: Some(2),
        per_page: Some(2),
    };
    let list =
        customer_service::list_customers(&state, &CustomerFilter::default(), Some("email"), &page)
            .await?;
    let emails: Vec<&str> = list.items.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, ["c2@example.com", "c3@example.com"]);
    assert_eq!(list.meta.page, Some(2));
    assert_eq!(list.meta.per_page, Some(2));
    assert_eq!(list.meta.total, Some(5));
    Ok(())
}

#[tokio::test]
async fn pages_past_the_end_are_empty() -> anyhow::Result<()> {
    let state = setup_state().await?;
    common::customer(&state, "Alice", "alice@example.com").await?;

    let page = Pagination {
        page: Some(u64::MAX),
        per_page: Some(100),
    };
    let list =
        customer_service::list_customers(&state, &CustomerFilter::default(), None, &page).await?;
    assert!(list.items.is_empty());
    assert_eq!(list.meta.total, Some(1));
    Ok(())
}

#[tokio::test]
async fn unknown_sort_keys_are_rejected() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let result = customer_service::list_customers(
        &state,
        &CustomerFilter::default(),
        Some("password"),
        &Pagination::default(),
    )
    .await;
    assert!(result.is_err());
    Ok(())
}

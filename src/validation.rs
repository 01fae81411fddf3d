//! Field checks run by the workflows before anything is written.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidateEmail;

use crate::{
    dto::{customers::CustomerInput, products::ProductInput},
    error::CrmError,
    money,
};

pub const NAME_MAX_LEN: usize = 200;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[1-9][0-9]{0,15}$").expect("Invalid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
}

pub fn validate_name(name: &str) -> Result<String, CrmError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CrmError::EmptyName);
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(CrmError::NameTooLong { max: NAME_MAX_LEN });
    }
    Ok(name.to_string())
}

pub fn validate_email(email: &str) -> Result<String, CrmError> {
    let email = email.trim();
    if !email.validate_email() {
        return Err(CrmError::InvalidEmail);
    }
    Ok(email.to_string())
}

/// An absent or blank phone is valid and normalised to `None`.
pub fn validate_phone(phone: Option<&str>) -> Result<Option<String>, CrmError> {
    match phone.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(p) if PHONE_RE.is_match(p) => Ok(Some(p.to_string())),
        Some(_) => Err(CrmError::InvalidPhoneFormat),
    }
}

pub fn validate_price(price: Decimal) -> Result<i64, CrmError> {
    if price <= Decimal::ZERO {
        return Err(CrmError::InvalidPrice);
    }
    money::to_cents(price)
}

pub fn validate_stock(stock: Option<i32>) -> Result<i32, CrmError> {
    match stock {
        None => Ok(0),
        Some(s) if s < 0 => Err(CrmError::InvalidStock),
        Some(s) => Ok(s),
    }
}

pub fn validate_customer(input: &CustomerInput) -> Result<NewCustomer, CrmError> {
    Ok(NewCustomer {
        name: validate_name(&input.name)?,
        email: validate_email(&input.email)?,
        phone: validate_phone(input.phone.as_deref())?,
    })
}

pub fn validate_product(input: &ProductInput) -> Result<NewProduct, CrmError> {
    Ok(NewProduct {
        name: validate_name(&input.name)?,
        price_cents: validate_price(input.price)?,
        stock: validate_stock(input.stock)?,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn phone_pattern() {
        for ok in ["+1234567890", "5551234567", "1", "+442079460958", "1234567890123456"] {
            assert_eq!(validate_phone(Some(ok)).unwrap().as_deref(), Some(ok), "{ok}");
        }
        for bad in ["abc123", "0123", "+0123", "++1", "12345678901234567", "555-123-4567"] {
            assert!(
                matches!(validate_phone(Some(bad)), Err(CrmError::InvalidPhoneFormat)),
                "{bad}"
            );
        }
    }

    #[test]
    fn missing_or_blank_phone_is_valid() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("  ")).unwrap(), None);
    }

    #[test]
    fn price_must_be_positive() {
        let dec = |s: &str| Decimal::from_str(s).unwrap();
        assert!(matches!(validate_price(dec("0")), Err(CrmError::InvalidPrice)));
        assert!(matches!(validate_price(dec("-3.50")), Err(CrmError::InvalidPrice)));
        assert_eq!(validate_price(dec("0.01")).unwrap(), 1);
    }

    #[test]
    fn stock_defaults_to_zero_and_rejects_negatives() {
        assert_eq!(validate_stock(None).unwrap(), 0);
        assert_eq!(validate_stock(Some(7)).unwrap(), 7);
        assert!(matches!(validate_stock(Some(-1)), Err(CrmError::InvalidStock)));
    }

    #[test]
    fn names_and_emails_are_trimmed_and_checked() {
        assert_eq!(validate_name("  Alice ").unwrap(), "Alice");
        assert!(matches!(validate_name("   "), Err(CrmError::EmptyName)));
        assert!(matches!(
            validate_name(&"x".repeat(NAME_MAX_LEN + 1)),
            Err(CrmError::NameTooLong { .. })
        ));
        assert_eq!(
            validate_email(" alice@example.com ").unwrap(),
            "alice@example.com"
        );
        assert!(matches!(validate_email("not-an-email"), Err(CrmError::InvalidEmail)));
    }
}

use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;

/// Explicit page selection. Omitting both fields returns every row.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl Pagination {
    pub fn normalize(&self) -> Option<(u64, u64, u64)> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        // The store binds offsets as signed 64-bit integers.
        let last_page = i64::MAX as u64 / per_page + 1;
        let page = self.page.unwrap_or(1).clamp(1, last_page);
        let offset = (page - 1).saturating_mul(per_page);
        Some((page, per_page, offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

/// Splits an `orderBy` value such as `-price` or `createdAt` into a
/// snake_case key and a direction.
pub fn parse_order_by(raw: &str) -> Result<(String, SortOrder), AppError> {
    let raw = raw.trim();
    let (key, order) = match raw.strip_prefix('-') {
        Some(rest) => (rest, SortOrder::Desc),
        None => (raw.strip_prefix('+').unwrap_or(raw), SortOrder::Asc),
    };
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::BadRequest(format!("invalid orderBy value {raw:?}")));
    }

    let mut snake = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            snake.push('_');
            snake.push(c.to_ascii_lowercase());
        } else {
            snake.push(c);
        }
    }
    Ok((snake, order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_opt_in() {
        assert_eq!(Pagination::default().normalize(), None);
        let page = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(page.normalize(), Some((3, 10, 20)));
        let clamped = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(clamped.normalize(), Some((1, 100, 0)));
    }

    #[test]
    fn offset_fits_a_signed_bigint() {
        let huge = Pagination {
            page: Some(u64::MAX),
            per_page: Some(100),
        };
        let (page, per_page, offset) = huge.normalize().unwrap();
        assert_eq!(per_page, 100);
        assert_eq!(page, i64::MAX as u64 / 100 + 1);
        assert!(offset <= i64::MAX as u64);
        assert_eq!(offset, (page - 1) * per_page);
    }

    #[test]
    fn order_by_accepts_prefix_and_camel_case() {
        assert_eq!(
            parse_order_by("-createdAt").unwrap(),
            ("created_at".to_string(), SortOrder::Desc)
        );
        assert_eq!(
            parse_order_by("price").unwrap(),
            ("price".to_string(), SortOrder::Asc)
        );
        assert_eq!(
            parse_order_by("order_date").unwrap(),
            ("order_date".to_string(), SortOrder::Asc)
        );
        assert!(parse_order_by("-").is_err());
        assert!(parse_order_by("price; drop").is_err());
    }
}

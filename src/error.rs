use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Business-rule failure of a CRM workflow.
///
/// Everything except [`CrmError::Store`] with an infrastructure cause is
/// reported inline in the mutation payload.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Phone number must contain only digits and optionally start with +")]
    InvalidPhoneFormat,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Price must be greater than 0")]
    InvalidPrice,

    #[error("Price must have at most two decimal places")]
    InvalidPricePrecision,

    #[error("Amount is out of range")]
    AmountOutOfRange,

    #[error("Stock cannot be negative")]
    InvalidStock,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("At least one product must be selected")]
    NoProductsSpecified,

    #[error("Product with ID {0} not found")]
    ProductNotFound(Uuid),

    #[error("Product with ID {0} not found")]
    UnknownProductId(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Store error: {0}")]
    Store(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Transaction,
    Infrastructure,
}

impl CrmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrmError::EmptyName
            | CrmError::NameTooLong { .. }
            | CrmError::InvalidEmail
            | CrmError::InvalidPhoneFormat
            | CrmError::InvalidPrice
            | CrmError::InvalidPricePrecision
            | CrmError::AmountOutOfRange
            | CrmError::InvalidStock
            | CrmError::NoProductsSpecified => ErrorKind::Validation,
            CrmError::CustomerNotFound
            | CrmError::ProductNotFound(_)
            | CrmError::UnknownProductId(_) => ErrorKind::NotFound,
            CrmError::DuplicateEmail => ErrorKind::Conflict,
            CrmError::Transaction(_) => ErrorKind::Transaction,
            CrmError::Store(err) if is_unreachable(err) => ErrorKind::Infrastructure,
            CrmError::Store(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => ErrorKind::Conflict,
                _ => ErrorKind::Transaction,
            },
        }
    }

    /// Maps a unique violation raised by an insert onto `conflict`.
    pub fn on_conflict(err: DbErr, conflict: CrmError) -> CrmError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => conflict,
            _ => CrmError::Store(err),
        }
    }

    pub fn transaction(err: DbErr) -> CrmError {
        if is_unreachable(&err) {
            CrmError::Store(err)
        } else {
            CrmError::Transaction(err.to_string())
        }
    }
}

/// True when the store itself could not be reached.
fn is_unreachable(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx_err)) => matches!(
            sqlx_err,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ),
        _ => false,
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unknown operation {0}")]
    UnknownOperation(String),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::Store(db) => AppError::OrmError(db),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorEntry {
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    data: Option<()>,
    errors: Vec<ErrorEntry>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::UnknownOperation(_) => StatusCode::BAD_REQUEST,
            AppError::OrmError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            AppError::OrmError(err) => tracing::error!(error = %err, "store failure"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal failure"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let body = ErrorBody {
            data: None,
            errors: vec![ErrorEntry {
                message: self.to_string(),
            }],
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use http::StatusCode;
use thiserror::Error;

/// Failure of a single store operation. Absence of a row is never an error;
/// callers get `Option`/`bool` for that.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} rejected by unique constraint [{}]", diagnostic(.source))]
    ConstraintViolation {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("{op} failed [{}]", diagnostic(.source))]
    Storage {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Classifies a driver error raised while running `op`.
    pub fn wrap(op: &'static str, source: sqlx::Error) -> Self {
        let unique = source
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique {
            StoreError::ConstraintViolation { op, source }
        } else {
            StoreError::Storage { op, source }
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation { .. })
    }

    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::ConstraintViolation { op, .. } | StoreError::Storage { op, .. } => op,
        }
    }
}

fn diagnostic(err: &sqlx::Error) -> String {
    match err.as_database_error() {
        Some(db) => format!(
            "code={}, message={}",
            db.code().as_deref().unwrap_or("none"),
            db.message()
        ),
        None => format!("message={}", err),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("Invalid SQLite URL: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Invalid {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed, use {0}")]
    MethodNotAllowed(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::MethodNotAllowed(allowed) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::ALLOW, HeaderValue::from_static(allowed));
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    headers,
                    format!("Method Not Allowed. Use {}", allowed),
                )
                    .into_response()
            }
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_storage_failures() {
        let err = StoreError::wrap("select by name", sqlx::Error::PoolTimedOut);
        assert!(!err.is_constraint_violation());
        assert_eq!(err.operation(), "select by name");
        assert!(err.to_string().starts_with("select by name failed [message="));
    }

    #[test]
    fn test_method_not_allowed_names_allowed_method() {
        let response = AppError::MethodNotAllowed("POST").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }

    #[test]
    fn test_store_errors_hide_details() {
        let err = AppError::from(StoreError::wrap("insert", sqlx::Error::PoolClosed));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

use std::num::ParseIntError;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("id parameter is required")]
    MissingId,
    #[error("invalid id format")]
    InvalidId {
        #[from]
        source: ParseIntError,
    },
    #[error("invalid request body: {source}")]
    InvalidBody {
        #[from]
        source: JsonRejection,
    },
    #[error("paste not found")]
    NotFound,
    #[error("database error")]
    Database { source: sqlx::Error },
    #[error("store did not respond within {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            // body limit violations surface through the json extractor
            ApiError::InvalidBody { source } if source.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            match &self {
                ApiError::Database { source } => error!("store failure: {source}"),
                _ => error!("{self}"),
            }
        }

        (status_code, format!("{self}")).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            _ => ApiError::Database { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_no_rows_is_not_found() {
        let error = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, ApiError::NotFound));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_driver_errors_are_server_errors() {
        let error = ApiError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, ApiError::Database { .. }));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_ids_are_client_errors() {
        let error = ApiError::from("abc".parse::<i64>().unwrap_err());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "invalid id format");
        assert_eq!(ApiError::MissingId.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeouts_are_server_errors() {
        let error = ApiError::Timeout(Duration::from_secs(10));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "store did not respond within 10s");
    }
}

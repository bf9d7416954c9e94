use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dineflow_core::{
    CartError, DbError, MenuServiceError, OfferServiceError, OrderServiceError, RepoError,
};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with the current state, e.g. a backwards status change.
    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(ref message) => {
                error!("Request failed: {message}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(_) => AppError::BadRequest(err.to_string()),
            RepoError::NotFound { .. } => AppError::NotFound(err.to_string()),
            RepoError::StaleStatus { .. } => AppError::Conflict(err.to_string()),
            RepoError::Db(_) | RepoError::InvalidData(_) | RepoError::MissingRequiredTable(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<MenuServiceError> for AppError {
    fn from(err: MenuServiceError) -> Self {
        match err {
            MenuServiceError::RestaurantNotFound(_)
            | MenuServiceError::MenuNotFound(_)
            | MenuServiceError::ItemNotFound(_) => AppError::NotFound(err.to_string()),
            MenuServiceError::Validation(_) => AppError::BadRequest(err.to_string()),
            MenuServiceError::Repo(inner) => inner.into(),
        }
    }
}

impl From<OfferServiceError> for AppError {
    fn from(err: OfferServiceError) -> Self {
        match err {
            OfferServiceError::TargetNotFound(_) => AppError::NotFound(err.to_string()),
            OfferServiceError::Validation(_) => AppError::BadRequest(err.to_string()),
            OfferServiceError::Repo(inner) => inner.into(),
        }
    }
}

impl From<OrderServiceError> for AppError {
    fn from(err: OrderServiceError) -> Self {
        match err {
            OrderServiceError::RestaurantNotFound(_)
            | OrderServiceError::MenuNotFound(_)
            | OrderServiceError::OrderNotFound(_) => AppError::NotFound(err.to_string()),
            OrderServiceError::RestaurantClosed(_) | OrderServiceError::InvalidTransition { .. } => {
                AppError::Conflict(err.to_string())
            }
            OrderServiceError::EmptyCart
            | OrderServiceError::UnknownItem(_)
            | OrderServiceError::ItemUnavailable(_)
            | OrderServiceError::Pricing(_)
            | OrderServiceError::Validation(_) => AppError::BadRequest(err.to_string()),
            OrderServiceError::Repo(inner) => inner.into(),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        AppError::Internal(format!("database task failed: {err}"))
    }
}

/// Errors that stop the server before it accepts requests.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("Failed to open database: {0}")]
    Database(#[from] DbError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Error surface of the API. Every variant maps to one status code and the
/// `{"success": false, "error": ...}` envelope the admin dashboard expects.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("A submission already exists for this participant")]
    DuplicateSubmission,
    #[error("No active quiz found")]
    NoActiveQuiz,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Storage unavailable")]
    StoreUnavailable(anyhow::Error),
    #[error("Internal error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    /// Classify a db-layer failure: pool checkout problems are transient store
    /// unavailability the caller may retry; anything else is internal.
    pub fn from_db(err: anyhow::Error) -> Self {
        if err.downcast_ref::<r2d2::Error>().is_some() {
            ApiError::StoreUnavailable(err)
        } else {
            ApiError::Internal(err)
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::NoActiveQuiz => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::DuplicateSubmission => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::StoreUnavailable(source) => {
                tracing::error!("Store unavailable: {source:#}");
            }
            ApiError::Internal(source) => {
                tracing::error!("Internal error: {source:#}");
            }
            _ => {}
        }
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_query_failures_stay_internal() {
        let other = anyhow::anyhow!("query went wrong");
        assert!(matches!(ApiError::from_db(other), ApiError::Internal(_)));
    }
}

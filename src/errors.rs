use alloy::primitives::Address;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::providers::ProviderError;

/// Failures raised by the analytics engine.
///
/// Only `Provider` aborts a wallet's analysis. `NoData` means the token or
/// wallet is skipped, `InvalidSwap` means the candidate swap is discarded.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no data: {0}")]
    NoData(String),

    #[error("invalid swap: input and output token are both {token}")]
    InvalidSwap { token: Address },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors surfaced by the HTTP layer as a `{ success: false, error }` body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Analysis(AnalysisError::NoData(_)) => StatusCode::NOT_FOUND,
            AppError::Analysis(AnalysisError::InvalidSwap { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Analysis(AnalysisError::Provider(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let provider = AppError::from(AnalysisError::Provider(ProviderError::Unavailable(
            "indexer down".into(),
        )));
        assert_eq!(provider.status(), StatusCode::BAD_GATEWAY);

        let no_data = AppError::from(AnalysisError::NoData("empty".into()));
        assert_eq!(no_data.status(), StatusCode::NOT_FOUND);

        assert_eq!(AppError::Unauthorized("nope").status(), StatusCode::UNAUTHORIZED);
    }
}

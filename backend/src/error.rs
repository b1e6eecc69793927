use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;

use crate::store::StoreError;
use crate::wallet::WalletError;

/// Field name → message, one entry per offending field.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error("{1}")]
    BadRequest(StatusCode, String),
    #[error("{0}")]
    AuthenticationRequired(&'static str),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Please install MetaMask or another Web3 wallet to connect.")]
    NoProvider,
    #[error("{0}")]
    Cancelled(&'static str),
    #[error("{0}")]
    WalletFailed(&'static str),
    #[error("A signature request is already in progress")]
    Busy,
    #[error("Property not found")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Store(StoreError),
}

impl AppError {
    /// Maps a wallet failure onto the caller's wording for a cancelled prompt
    /// versus any other failure.
    pub fn from_wallet(err: WalletError, cancelled: &'static str, failed: &'static str) -> Self {
        if err.is_user_rejection() {
            AppError::Cancelled(cancelled)
        } else {
            AppError::WalletFailed(failed)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(status, _) => *status,
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            AppError::NoProvider => StatusCode::PRECONDITION_FAILED,
            AppError::Cancelled(_) | AppError::Busy => StatusCode::CONFLICT,
            AppError::WalletFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            other => AppError::Store(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(errors) => json!({ "error": self.to_string(), "errors": errors }),
            AppError::NotFound(id) => json!({ "error": self.to_string(), "id": id, "back": "/" }),
            AppError::Store(e) => {
                log::error!("{}", e);
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

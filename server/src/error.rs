use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use countdown_engine::{DeductionError, SessionError};
use countdown_types::ObservationError;
use thiserror::Error;

use crate::ApiResponse;

/// Failure of one API call. The display text is the wire `msg`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad format")]
    BadFormat,
    #[error("The sequence isn't found")]
    SequenceNotFound,
    #[error("The red observation should be the last")]
    AfterRed,
    #[error("There isn't enough data")]
    NotEnoughData,
    #[error("No solutions found")]
    NoSolutions,
    #[error("Internal storage error")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}

impl From<ObservationError> for ApiError {
    fn from(err: ObservationError) -> Self {
        tracing::debug!(error = %err, "Malformed observation");
        Self::BadFormat
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownSession(_) => Self::SequenceNotFound,
            SessionError::Deduction(DeductionError::SessionTerminal) => Self::AfterRed,
            SessionError::Deduction(DeductionError::InsufficientData) => Self::NotEnoughData,
            SessionError::Deduction(DeductionError::NoSolutions) => Self::NoSolutions,
            other @ (SessionError::Corrupt { .. } | SessionError::Storage(_)) => {
                Self::Internal(format!("{other:#}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(detail = %detail, "Request failed on session storage");
        }
        (self.status_code(), ApiResponse::err(&self.to_string())).into_response()
    }
}

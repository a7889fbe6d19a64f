use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::services::activities_service::ActivityError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error("Field required: {0}")]
    MissingRequiredField(&'static str),
}

/// Error body. The front end shows `detail` to the user.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Activity(ActivityError::ActivityNotFound) => StatusCode::NOT_FOUND,
            ApiError::Activity(ActivityError::ParticipantNotFound) => StatusCode::NOT_FOUND,
            ApiError::Activity(ActivityError::DuplicateParticipant) => StatusCode::BAD_REQUEST,
            ApiError::Activity(ActivityError::ActivityFull) => StatusCode::BAD_REQUEST,
            ApiError::MissingRequiredField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        warn!(status = %status, detail = %detail, "request rejected");

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

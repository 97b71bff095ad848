use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::views;

/// Failures that end a request with one of the dedicated error pages.
///
/// Write handlers catch their own store errors and answer with a flash
/// message instead; only reads propagate `Database` here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("no such page")]
    NoRoute,

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } | AppError::NoRoute => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = match &self {
            AppError::NotFound { .. } | AppError::NoRoute => {
                tracing::debug!(error = %self, "not found");
                views::errors::not_found()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "request failed");
                views::errors::server_error()
            }
        };
        (status, Html(page)).into_response()
    }
}

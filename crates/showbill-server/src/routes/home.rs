use axum::response::Response;

use crate::error::AppError;
use crate::flash::IncomingFlash;
use crate::views;

/// GET /
pub async fn index(flash: IncomingFlash) -> Response {
    flash.page(views::home::index(flash.message()))
}

/// Fallback for every unmatched path.
pub async fn not_found() -> AppError {
    AppError::NoRoute
}

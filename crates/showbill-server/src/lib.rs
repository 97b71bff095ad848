//! Showbill: list, search and book venues, artists and shows.

pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod routes;
pub mod views;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use showbill_db::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        // Venues
        .route(
            "/venues",
            get(routes::venues::list_venues).post(routes::venues::list_venues),
        )
        .route(
            "/venues/search",
            get(routes::venues::search_venues).post(routes::venues::search_venues_form),
        )
        .route(
            "/venues/create",
            get(routes::venues::new_venue_form).post(routes::venues::create_venue),
        )
        .route(
            "/venues/{id}",
            get(routes::venues::show_venue).delete(routes::venues::delete_venue),
        )
        .route(
            "/venues/{id}/edit",
            get(routes::venues::edit_venue_form).post(routes::venues::update_venue),
        )
        .route("/venues/{id}/delete", post(routes::venues::delete_venue))
        // Artists
        .route(
            "/artists",
            get(routes::artists::list_artists).post(routes::artists::list_artists),
        )
        .route(
            "/artists/search",
            get(routes::artists::search_artists).post(routes::artists::search_artists_form),
        )
        .route(
            "/artists/create",
            get(routes::artists::new_artist_form).post(routes::artists::create_artist),
        )
        .route("/artists/{id}", get(routes::artists::show_artist))
        .route(
            "/artists/{id}/edit",
            get(routes::artists::edit_artist_form).post(routes::artists::update_artist),
        )
        // Shows
        .route(
            "/shows",
            get(routes::shows::list_shows).post(routes::shows::list_shows),
        )
        .route(
            "/shows/create",
            get(routes::shows::new_show_form).post(routes::shows::create_show),
        )
        .fallback(routes::home::not_found)
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

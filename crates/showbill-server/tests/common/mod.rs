// Shared test utilities for integration tests
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use sea_orm::{prelude::DateTimeWithTimeZone, DatabaseConnection};
use std::sync::Arc;

use showbill_db::entities::{artist, show, venue};
use showbill_db::AppState;

/// Create a test AppState around a mock database
pub fn test_app_state(db: DatabaseConnection) -> Arc<AppState> {
    Arc::new(AppState { db })
}

pub fn test_app(db: DatabaseConnection) -> Router {
    showbill_server::router(test_app_state(db))
}

/// Router over a state the test keeps, so the mock can be inspected after
/// the request.
pub fn shared_app(state: &Arc<AppState>) -> Router {
    showbill_server::router(Arc::clone(state))
}

/// Take the mock connection back once the router has been dropped.
pub fn into_db(state: Arc<AppState>) -> DatabaseConnection {
    match Arc::try_unwrap(state) {
        Ok(state) => state.db,
        Err(_) => panic!("router still holds the app state"),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

/// Decoded `showbill_flash` cookie set by a response.
pub fn flash_cookie(resp: &Response<Body>) -> String {
    let raw = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    let value = raw
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches("showbill_flash=");
    urlencoding::decode(value).unwrap().into_owned()
}

/// Every statement the mock saw, with Debug quoting stripped.
pub fn sql_log(state: Arc<AppState>) -> String {
    format!("{:?}", into_db(state).into_transaction_log()).replace('\\', "")
}

pub fn days_from_now(days: i64) -> DateTimeWithTimeZone {
    (Utc::now() + Duration::days(days)).fixed_offset()
}

pub fn venue(id: i32, name: &str, city: &str, state: &str) -> venue::Model {
    venue::Model {
        id,
        name: name.into(),
        city: city.into(),
        state: state.into(),
        address: "1015 Folsom Street".into(),
        phone: "123-123-1234".into(),
        image_link: None,
        facebook_link: None,
        website_link: Some("https://www.themusicalhop.com".into()),
        genres: vec!["Jazz".into(), "Reggae".into()],
        seeking_talent: true,
        seeking_description: Some("We are on the lookout for a local artist".into()),
    }
}

pub fn artist(id: i32, name: &str) -> artist::Model {
    artist::Model {
        id,
        name: name.into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: "326-123-5000".into(),
        genres: vec!["Rock n Roll".into()],
        image_link: Some("https://images.example.com/petals.jpg".into()),
        facebook_link: None,
        website_link: None,
        seeking_description: None,
        looking_for_venues: false,
    }
}

pub fn show(id: i32, artist_id: i32, venue_id: i32, start_time: DateTimeWithTimeZone) -> show::Model {
    show::Model {
        id,
        artist_id,
        venue_id,
        start_time,
    }
}

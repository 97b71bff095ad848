mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, MockDatabase};
use tower::util::ServiceExt;

use showbill_db::entities::artist;

use common::*;

#[tokio::test]
async fn test_list_shows_newest_first() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            show(
                2,
                5,
                3,
                Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap().fixed_offset(),
            ),
            show(
                1,
                4,
                1,
                Utc.with_ymd_and_hms(2019, 5, 21, 21, 30, 0).unwrap().fixed_offset(),
            ),
        ]])
        .append_query_results([vec![
            venue(1, "The Musical Hop", "San Francisco", "CA"),
            venue(3, "Park Square Live Music & Coffee", "San Francisco", "CA"),
        ]])
        .append_query_results([vec![artist(4, "Guns N Petals"), artist(5, "Matt Quevedo")]])
        .into_connection();
    let state = test_app_state(db);

    let resp = shared_app(&state).oneshot(get("/shows")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    let newer = html.find("Matt Quevedo").unwrap();
    let older = html.find("Guns N Petals").unwrap();
    assert!(newer < older);
    assert!(html.contains("Tuesday May, 21, 2019 at 9:30PM"));

    let sql = sql_log(state);
    assert!(sql.contains(r#"ORDER BY "Show"."start_time" DESC"#), "{sql}");
}

#[tokio::test]
async fn test_create_show() {
    let start = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap().fixed_offset();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![artist(4, "Guns N Petals")]])
        .append_query_results([vec![venue(1, "The Musical Hop", "San Francisco", "CA")]])
        .append_query_results([vec![show(10, 4, 1, start)]])
        .into_connection();
    let state = test_app_state(db);

    let resp = shared_app(&state)
        .oneshot(post_form(
            "/shows/create",
            "artist_id=4&venue_id=1&start_time=2035-04-01+20%3A00",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/shows");
    assert_eq!(flash_cookie(&resp), "success:Show was successfully listed!");

    let sql = sql_log(state);
    assert!(sql.contains(r#"INSERT INTO "Show""#), "{sql}");
}

#[tokio::test]
async fn test_create_show_with_unknown_artist() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<artist::Model>::new()])
        .append_query_results([vec![venue(1, "The Musical Hop", "San Francisco", "CA")]])
        .into_connection();
    let state = test_app_state(db);

    let resp = shared_app(&state)
        .oneshot(post_form(
            "/shows/create",
            "artist_id=4&venue_id=1&start_time=2035-04-01T20%3A00%3A00Z",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(resp).await;
    assert!(html.contains("No artist with id 4"));
    assert!(html.contains("An error occurred. Show could not be listed."));

    let sql = sql_log(state);
    assert!(!sql.contains("INSERT"), "{sql}");
}

#[tokio::test]
async fn test_create_show_with_bad_time() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let resp = test_app(db)
        .oneshot(post_form(
            "/shows/create",
            "artist_id=4&venue_id=1&start_time=next+friday",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains("Expected a date and time"));
}

#[tokio::test]
async fn test_new_show_form_prefills_start_time() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let resp = test_app(db).oneshot(get("/shows/create")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(r#"name="start_time" value="20"#));
}

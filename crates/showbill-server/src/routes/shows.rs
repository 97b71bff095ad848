use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use showbill_db::entities::{artist, show, venue};
use showbill_db::AppState;

use crate::error::AppError;
use crate::flash::{redirect, Flash, IncomingFlash};
use crate::forms::{FieldErrors, FormData, ShowInput};
use crate::views;

const LISTED: &str = "Show was successfully listed!";
const NOT_LISTED: &str = "An error occurred. Show could not be listed.";

/// A show seen from one side of the booking: the other party and the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: i32,
    pub name: String,
    pub image_link: Option<String>,
    pub start_time: DateTimeWithTimeZone,
}

/// Past shows latest first, upcoming shows soonest first.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub past: Vec<Booking>,
    pub upcoming: Vec<Booking>,
}

pub(crate) fn split_timeline(bookings: Vec<Booking>, now: DateTimeWithTimeZone) -> Timeline {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) =
        bookings.into_iter().partition(|b| b.start_time > now);
    past.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    upcoming.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    Timeline { past, upcoming }
}

/// Upcoming show count per key (a venue or artist id).
pub(crate) fn upcoming_counts(
    shows: &[show::Model],
    now: DateTimeWithTimeZone,
    key: impl Fn(&show::Model) -> i32,
) -> HashMap<i32, usize> {
    let mut counts = HashMap::new();
    for s in shows.iter().filter(|s| s.is_upcoming(now)) {
        *counts.entry(key(s)).or_insert(0) += 1;
    }
    counts
}

/// Shows whose `column` is one of `ids`.
pub(crate) async fn shows_for<C: ConnectionTrait>(
    db: &C,
    column: show::Column,
    ids: &[i32],
) -> Result<Vec<show::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    show::Entity::find()
        .filter(column.is_in(ids.iter().copied()))
        .all(db)
        .await
}

pub(crate) async fn artists_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, artist::Model>, DbErr> {
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let artists = artist::Entity::find()
        .filter(artist::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(artists.into_iter().map(|a| (a.id, a)).collect())
}

pub(crate) async fn venues_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, venue::Model>, DbErr> {
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let venues = venue::Entity::find()
        .filter(venue::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(venues.into_iter().map(|v| (v.id, v)).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowRow {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTimeWithTimeZone,
}

/// GET|POST /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let shows = show::Entity::find()
        .order_by_desc(show::Column::StartTime)
        .all(&state.db)
        .await?;
    let venues = venues_by_id(&state.db, shows.iter().map(|s| s.venue_id)).await?;
    let artists = artists_by_id(&state.db, shows.iter().map(|s| s.artist_id)).await?;

    let rows: Vec<ShowRow> = shows
        .into_iter()
        .filter_map(|s| {
            let venue = venues.get(&s.venue_id)?;
            let artist = artists.get(&s.artist_id)?;
            Some(ShowRow {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: s.start_time,
            })
        })
        .collect();

    Ok(flash.page(views::shows::list(&rows, flash.message())))
}

/// GET /shows/create
pub async fn new_show_form(flash: IncomingFlash) -> Response {
    let mut form = FormData::default();
    form.push(
        "start_time",
        Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    flash.page(views::forms::show_form(
        &form,
        &FieldErrors::default(),
        flash.message(),
    ))
}

/// POST /shows/create
pub async fn create_show(State(state): State<Arc<AppState>>, form: FormData) -> Response {
    let input = match ShowInput::parse(&form) {
        Ok(input) => input,
        Err(errors) => {
            tracing::debug!(%errors, "show form rejected");
            return form_page(StatusCode::UNPROCESSABLE_ENTITY, &form, &errors);
        }
    };

    let result = state
        .db
        .transaction::<_, Result<show::Model, FieldErrors>, DbErr>(|txn| {
            Box::pin(async move {
                let mut errors = FieldErrors::default();
                if artist::Entity::find_by_id(input.artist_id)
                    .one(txn)
                    .await?
                    .is_none()
                {
                    errors.add("artist_id", format!("No artist with id {}", input.artist_id));
                }
                if venue::Entity::find_by_id(input.venue_id)
                    .one(txn)
                    .await?
                    .is_none()
                {
                    errors.add("venue_id", format!("No venue with id {}", input.venue_id));
                }
                if !errors.is_empty() {
                    return Ok(Err(errors));
                }
                let created = input.into_active_model().insert(txn).await?;
                Ok(Ok(created))
            })
        })
        .await;

    match result {
        Ok(Ok(created)) => {
            tracing::info!(
                show_id = created.id,
                artist_id = created.artist_id,
                venue_id = created.venue_id,
                "show listed"
            );
            redirect("/shows", Flash::success(LISTED))
        }
        Ok(Err(errors)) => {
            tracing::debug!(%errors, "show references missing records");
            form_page(StatusCode::UNPROCESSABLE_ENTITY, &form, &errors)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list show");
            form_page(StatusCode::INTERNAL_SERVER_ERROR, &form, &FieldErrors::default())
        }
    }
}

fn form_page(status: StatusCode, form: &FormData, errors: &FieldErrors) -> Response {
    let flash = Flash::error(NOT_LISTED);
    (
        status,
        Html(views::forms::show_form(form, errors, Some(&flash))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2030, 1, 1, hour, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    fn booking(id: i32, start_time: DateTimeWithTimeZone) -> Booking {
        Booking {
            id,
            name: format!("Artist {id}"),
            image_link: None,
            start_time,
        }
    }

    fn show_at(id: i32, venue_id: i32, start_time: DateTimeWithTimeZone) -> show::Model {
        show::Model {
            id,
            artist_id: 1,
            venue_id,
            start_time,
        }
    }

    #[test]
    fn test_split_timeline_orders_each_side() {
        let now = at(12);
        let timeline = split_timeline(
            vec![
                booking(1, at(9)),
                booking(2, at(20)),
                booking(3, at(11)),
                booking(4, at(14)),
                booking(5, now),
            ],
            now,
        );
        let past: Vec<i32> = timeline.past.iter().map(|b| b.id).collect();
        let upcoming: Vec<i32> = timeline.upcoming.iter().map(|b| b.id).collect();
        assert_eq!(past, vec![5, 3, 1]);
        assert_eq!(upcoming, vec![4, 2]);
    }

    #[test]
    fn test_split_timeline_empty() {
        assert_eq!(split_timeline(Vec::new(), at(0)), Timeline::default());
    }

    #[test]
    fn test_upcoming_counts_by_venue() {
        let now = at(12);
        let shows = vec![
            show_at(1, 1, now + Duration::hours(1)),
            show_at(2, 1, now + Duration::days(3)),
            show_at(3, 1, now - Duration::hours(1)),
            show_at(4, 2, now),
            show_at(5, 3, now + Duration::minutes(5)),
        ];
        let counts = upcoming_counts(&shows, now, |s| s.venue_id);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), None);
        assert_eq!(counts.get(&3), Some(&1));
    }

    #[test]
    fn test_show_row_serialization() {
        let row = ShowRow {
            venue_id: 1,
            venue_name: "The Musical Hop".into(),
            artist_id: 4,
            artist_name: "Guns N Petals".into(),
            artist_image_link: None,
            start_time: Utc
                .with_ymd_and_hms(2019, 5, 21, 21, 30, 0)
                .unwrap()
                .fixed_offset(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["venue_name"], "The Musical Hop");
        assert_eq!(json["artist_id"], 4);
        assert!(json["artist_image_link"].is_null());
        assert_eq!(json["start_time"], "2019-05-21T21:30:00Z");
    }
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use showbill_db::entities::{show, venue};
use showbill_db::AppState;

use super::shows::{artists_by_id, shows_for, split_timeline, upcoming_counts, Booking};
use super::{like_pattern, not_listed, EntityId, RecordSummary, SearchParams, SearchResults};
use crate::error::AppError;
use crate::flash::{redirect, Flash, IncomingFlash};
use crate::forms::{FieldErrors, FormData, VenueChanges, VenueInput};
use crate::views::{self, forms::FormAction};

/// Venues sharing one (city, state) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<RecordSummary>,
}

/// Areas in (city, state) order; venues by name, then id.
pub(crate) fn group_by_area(venues: Vec<venue::Model>, counts: &HashMap<i32, usize>) -> Vec<Area> {
    let mut areas: BTreeMap<(String, String), Vec<RecordSummary>> = BTreeMap::new();
    for v in venues {
        areas
            .entry((v.city, v.state))
            .or_default()
            .push(RecordSummary {
                id: v.id,
                name: v.name,
                num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            });
    }
    areas
        .into_iter()
        .map(|((city, state), mut venues)| {
            venues.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Area {
                city,
                state,
                venues,
            }
        })
        .collect()
}

/// GET|POST /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let venues = venue::Entity::find().all(&state.db).await?;
    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let shows = shows_for(&state.db, show::Column::VenueId, &ids).await?;
    let counts = upcoming_counts(&shows, Utc::now().fixed_offset(), |s| s.venue_id);
    let areas = group_by_area(venues, &counts);

    Ok(flash.page(views::venues::list(&areas, flash.message())))
}

pub(crate) async fn search<C: ConnectionTrait>(db: &C, term: &str) -> Result<SearchResults, DbErr> {
    let venues = venue::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((venue::Entity, venue::Column::Name))))
                .like(like_pattern(term)),
        )
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?;
    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let shows = shows_for(db, show::Column::VenueId, &ids).await?;
    let counts = upcoming_counts(&shows, Utc::now().fixed_offset(), |s| s.venue_id);

    Ok(venues
        .into_iter()
        .map(|v| RecordSummary {
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            id: v.id,
            name: v.name,
        })
        .collect::<Vec<_>>()
        .into())
}

/// GET /venues/search?search_term=...
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let term = params.search_term.unwrap_or_default();
    let results = search(&state.db, &term).await?;
    Ok(flash.page(views::search::page(
        views::Section::Venues,
        &term,
        &results,
        flash.message(),
    )))
}

/// POST /venues/search
pub async fn search_venues_form(
    State(state): State<Arc<AppState>>,
    flash: IncomingFlash,
    form: FormData,
) -> Result<Response, AppError> {
    let term = form.get("search_term").unwrap_or_default().to_string();
    let results = search(&state.db, &term).await?;
    Ok(flash.page(views::search::page(
        views::Section::Venues,
        &term,
        &results,
        flash.message(),
    )))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: venue::Model,
    pub past_shows: Vec<Booking>,
    pub upcoming_shows: Vec<Booking>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub(crate) async fn load_detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
    now: DateTimeWithTimeZone,
) -> Result<VenueDetail, AppError> {
    let venue = find_venue(db, id).await?;
    let shows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .all(db)
        .await?;
    let artists = artists_by_id(db, shows.iter().map(|s| s.artist_id)).await?;
    let bookings = shows
        .into_iter()
        .filter_map(|s| {
            let artist = artists.get(&s.artist_id)?;
            Some(Booking {
                id: artist.id,
                name: artist.name.clone(),
                image_link: artist.image_link.clone(),
                start_time: s.start_time,
            })
        })
        .collect();
    let timeline = split_timeline(bookings, now);

    Ok(VenueDetail {
        venue,
        past_shows_count: timeline.past.len(),
        upcoming_shows_count: timeline.upcoming.len(),
        past_shows: timeline.past,
        upcoming_shows: timeline.upcoming,
    })
}

async fn find_venue<C: ConnectionTrait>(db: &C, id: i32) -> Result<venue::Model, AppError> {
    venue::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound {
            entity: "Venue",
            id,
        })
}

/// GET /venues/{id}
pub async fn show_venue(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let detail = load_detail(&state.db, id, Utc::now().fixed_offset()).await?;
    Ok(flash.page(views::venues::detail(&detail, flash.message())))
}

/// GET /venues/create
pub async fn new_venue_form(flash: IncomingFlash) -> Response {
    flash.page(views::forms::venue_form(
        FormAction::Create,
        &FormData::default(),
        &FieldErrors::default(),
        flash.message(),
    ))
}

/// POST /venues/create
pub async fn create_venue(State(state): State<Arc<AppState>>, form: FormData) -> Response {
    let name = form.get("name").unwrap_or_default().trim().to_string();
    let failed = || not_listed("Venue", &name);

    let input = match VenueInput::parse(&form) {
        Ok(input) => input,
        Err(errors) => {
            tracing::debug!(%errors, "venue form rejected");
            return form_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                FormAction::Create,
                &form,
                &errors,
                &failed(),
            );
        }
    };

    let result = state
        .db
        .transaction::<_, venue::Model, DbErr>(|txn| {
            Box::pin(async move { input.into_active_model().insert(txn).await })
        })
        .await;

    match result {
        Ok(created) => {
            tracing::info!(venue_id = created.id, name = %created.name, "venue listed");
            redirect(
                &format!("/venues/{}", created.id),
                Flash::success(format!("Venue {} was successfully listed!", created.name)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, name = %name, "failed to list venue");
            form_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                FormAction::Create,
                &form,
                &FieldErrors::default(),
                &failed(),
            )
        }
    }
}

/// GET /venues/{id}/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let current = find_venue(&state.db, id).await?;
    Ok(flash.page(views::forms::venue_form(
        FormAction::Edit {
            id,
            name: &current.name,
        },
        &FormData::from(&current),
        &FieldErrors::default(),
        flash.message(),
    )))
}

/// POST /venues/{id}/edit
pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    submitted: FormData,
) -> Result<Response, AppError> {
    let current = find_venue(&state.db, id).await?;
    let action = FormAction::Edit {
        id,
        name: &current.name,
    };
    let failed = Flash::error(format!(
        "An error occurred. Venue {} could not be updated.",
        current.name
    ));
    let form = FormData::from(&current).overlaid_with(&submitted);

    let changes = match VenueChanges::parse(&submitted) {
        Ok(changes) => changes,
        Err(errors) => {
            tracing::debug!(venue_id = id, %errors, "venue edit rejected");
            return Ok(form_page(
                StatusCode::UNPROCESSABLE_ENTITY,
                action,
                &form,
                &errors,
                &failed,
            ));
        }
    };

    let active = changes.apply(&current);
    if !active.is_changed() {
        return Ok(redirect(
            &format!("/venues/{id}"),
            Flash::success(format!("No changes to Venue {}.", current.name)),
        ));
    }

    let result = state
        .db
        .transaction::<_, venue::Model, DbErr>(|txn| Box::pin(async move { active.update(txn).await }))
        .await;

    Ok(match result {
        Ok(updated) => {
            tracing::info!(venue_id = id, name = %updated.name, "venue updated");
            redirect(
                &format!("/venues/{id}"),
                Flash::success(format!("Venue {} was successfully updated!", updated.name)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, venue_id = id, "failed to update venue");
            form_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                action,
                &form,
                &FieldErrors::default(),
                &failed,
            )
        }
    })
}

/// DELETE /venues/{id}, POST /venues/{id}/delete
///
/// The venue's shows go with it.
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let current = find_venue(&state.db, id).await?;

    let result = state
        .db
        .transaction::<_, (), DbErr>(|txn| {
            Box::pin(async move {
                show::Entity::delete_many()
                    .filter(show::Column::VenueId.eq(id))
                    .exec(txn)
                    .await?;
                venue::Entity::delete_by_id(id).exec(txn).await?;
                Ok(())
            })
        })
        .await;

    Ok(match result {
        Ok(()) => {
            tracing::info!(venue_id = id, name = %current.name, "venue deleted");
            redirect(
                "/",
                Flash::success(format!("Venue {} was successfully deleted!", current.name)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, venue_id = id, "failed to delete venue");
            redirect(
                &format!("/venues/{id}"),
                Flash::error(format!(
                    "An error occurred. Venue {} could not be deleted.",
                    current.name
                )),
            )
        }
    })
}

fn form_page(
    status: StatusCode,
    action: FormAction<'_>,
    form: &FormData,
    errors: &FieldErrors,
    flash: &Flash,
) -> Response {
    (
        status,
        Html(views::forms::venue_form(action, form, errors, Some(flash))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: i32, name: &str, city: &str, state: &str) -> venue::Model {
        venue::Model {
            id,
            name: name.into(),
            city: city.into(),
            state: state.into(),
            address: "1 Main St".into(),
            phone: "555-555-5555".into(),
            image_link: None,
            facebook_link: None,
            website_link: None,
            genres: vec!["Jazz".into()],
            seeking_talent: false,
            seeking_description: None,
        }
    }

    #[test]
    fn test_group_by_area() {
        let venues = vec![
            venue(3, "Park Square Live Music & Coffee", "San Francisco", "CA"),
            venue(2, "The Dueling Pianos Bar", "New York", "NY"),
            venue(1, "The Musical Hop", "San Francisco", "CA"),
        ];
        let counts = HashMap::from([(3, 1)]);
        let areas = group_by_area(venues, &counts);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "New York");
        assert_eq!(areas[0].venues.len(), 1);
        assert_eq!(areas[1].city, "San Francisco");
        let names: Vec<&str> = areas[1].venues.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Park Square Live Music & Coffee", "The Musical Hop"]
        );
        assert_eq!(areas[1].venues[0].num_upcoming_shows, 1);
        assert_eq!(areas[1].venues[1].num_upcoming_shows, 0);
    }

    #[test]
    fn test_group_by_area_same_city_different_state() {
        let venues = vec![
            venue(1, "A", "Portland", "OR"),
            venue(2, "B", "Portland", "ME"),
        ];
        let areas = group_by_area(venues, &HashMap::new());
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].state, "ME");
        assert_eq!(areas[1].state, "OR");
    }

    #[test]
    fn test_group_by_area_ties_on_name_use_id() {
        let venues = vec![venue(9, "Same", "X", "CA"), venue(4, "Same", "X", "CA")];
        let areas = group_by_area(venues, &HashMap::new());
        let ids: Vec<i32> = areas[0].venues.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_venue_detail_serialization_flattens_record() {
        let detail = VenueDetail {
            venue: venue(1, "The Musical Hop", "San Francisco", "CA"),
            past_shows: Vec::new(),
            upcoming_shows: Vec::new(),
            past_shows_count: 0,
            upcoming_shows_count: 0,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "The Musical Hop");
        assert_eq!(json["genres"][0], "Jazz");
        assert_eq!(json["upcoming_shows_count"], 0);
    }
}

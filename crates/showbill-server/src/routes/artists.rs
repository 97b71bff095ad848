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
use std::sync::Arc;

use showbill_db::entities::{artist, show};
use showbill_db::AppState;

use super::shows::{shows_for, split_timeline, upcoming_counts, venues_by_id, Booking};
use super::{like_pattern, not_listed, EntityId, RecordSummary, SearchParams, SearchResults};
use crate::error::AppError;
use crate::flash::{redirect, Flash, IncomingFlash};
use crate::forms::{ArtistChanges, ArtistInput, FieldErrors, FormData};
use crate::views::{self, forms::FormAction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistEntry {
    pub id: i32,
    pub name: String,
}

/// GET|POST /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let artists: Vec<ArtistEntry> = artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| ArtistEntry {
            id: a.id,
            name: a.name,
        })
        .collect();

    Ok(flash.page(views::artists::list(&artists, flash.message())))
}

pub(crate) async fn search<C: ConnectionTrait>(db: &C, term: &str) -> Result<SearchResults, DbErr> {
    let artists = artist::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((artist::Entity, artist::Column::Name))))
                .like(like_pattern(term)),
        )
        .order_by_asc(artist::Column::Name)
        .all(db)
        .await?;
    let ids: Vec<i32> = artists.iter().map(|a| a.id).collect();
    let shows = shows_for(db, show::Column::ArtistId, &ids).await?;
    let counts = upcoming_counts(&shows, Utc::now().fixed_offset(), |s| s.artist_id);

    Ok(artists
        .into_iter()
        .map(|a| RecordSummary {
            num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
            id: a.id,
            name: a.name,
        })
        .collect::<Vec<_>>()
        .into())
}

/// GET /artists/search?search_term=...
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let term = params.search_term.unwrap_or_default();
    let results = search(&state.db, &term).await?;
    Ok(flash.page(views::search::page(
        views::Section::Artists,
        &term,
        &results,
        flash.message(),
    )))
}

/// POST /artists/search
pub async fn search_artists_form(
    State(state): State<Arc<AppState>>,
    flash: IncomingFlash,
    form: FormData,
) -> Result<Response, AppError> {
    let term = form.get("search_term").unwrap_or_default().to_string();
    let results = search(&state.db, &term).await?;
    Ok(flash.page(views::search::page(
        views::Section::Artists,
        &term,
        &results,
        flash.message(),
    )))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: artist::Model,
    pub past_shows: Vec<Booking>,
    pub upcoming_shows: Vec<Booking>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub(crate) async fn load_detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
    now: DateTimeWithTimeZone,
) -> Result<ArtistDetail, AppError> {
    let artist = find_artist(db, id).await?;
    let shows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .all(db)
        .await?;
    let venues = venues_by_id(db, shows.iter().map(|s| s.venue_id)).await?;
    let bookings = shows
        .into_iter()
        .filter_map(|s| {
            let venue = venues.get(&s.venue_id)?;
            Some(Booking {
                id: venue.id,
                name: venue.name.clone(),
                image_link: venue.image_link.clone(),
                start_time: s.start_time,
            })
        })
        .collect();
    let timeline = split_timeline(bookings, now);

    Ok(ArtistDetail {
        artist,
        past_shows_count: timeline.past.len(),
        upcoming_shows_count: timeline.upcoming.len(),
        past_shows: timeline.past,
        upcoming_shows: timeline.upcoming,
    })
}

async fn find_artist<C: ConnectionTrait>(db: &C, id: i32) -> Result<artist::Model, AppError> {
    artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound {
            entity: "Artist",
            id,
        })
}

/// GET /artists/{id}
pub async fn show_artist(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let detail = load_detail(&state.db, id, Utc::now().fixed_offset()).await?;
    Ok(flash.page(views::artists::detail(&detail, flash.message())))
}

/// GET /artists/create
pub async fn new_artist_form(flash: IncomingFlash) -> Response {
    flash.page(views::forms::artist_form(
        FormAction::Create,
        &FormData::default(),
        &FieldErrors::default(),
        flash.message(),
    ))
}

/// POST /artists/create
pub async fn create_artist(State(state): State<Arc<AppState>>, form: FormData) -> Response {
    let name = form.get("name").unwrap_or_default().trim().to_string();
    let failed = || not_listed("Artist", &name);

    let input = match ArtistInput::parse(&form) {
        Ok(input) => input,
        Err(errors) => {
            tracing::debug!(%errors, "artist form rejected");
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
        .transaction::<_, artist::Model, DbErr>(|txn| {
            Box::pin(async move { input.into_active_model().insert(txn).await })
        })
        .await;

    match result {
        Ok(created) => {
            tracing::info!(artist_id = created.id, name = %created.name, "artist listed");
            redirect(
                &format!("/artists/{}", created.id),
                Flash::success(format!("Artist {} was successfully listed!", created.name)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, name = %name, "failed to list artist");
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

/// GET /artists/{id}/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let current = find_artist(&state.db, id).await?;
    Ok(flash.page(views::forms::artist_form(
        FormAction::Edit {
            id,
            name: &current.name,
        },
        &FormData::from(&current),
        &FieldErrors::default(),
        flash.message(),
    )))
}

/// POST /artists/{id}/edit
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    submitted: FormData,
) -> Result<Response, AppError> {
    let current = find_artist(&state.db, id).await?;
    let action = FormAction::Edit {
        id,
        name: &current.name,
    };
    let failed = Flash::error(format!(
        "An error occurred. Artist {} could not be updated.",
        current.name
    ));
    let form = FormData::from(&current).overlaid_with(&submitted);

    let changes = match ArtistChanges::parse(&submitted) {
        Ok(changes) => changes,
        Err(errors) => {
            tracing::debug!(artist_id = id, %errors, "artist edit rejected");
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
            &format!("/artists/{id}"),
            Flash::success(format!("No changes to Artist {}.", current.name)),
        ));
    }

    let result = state
        .db
        .transaction::<_, artist::Model, DbErr>(|txn| Box::pin(async move { active.update(txn).await }))
        .await;

    Ok(match result {
        Ok(updated) => {
            tracing::info!(artist_id = id, name = %updated.name, "artist updated");
            redirect(
                &format!("/artists/{id}"),
                Flash::success(format!("Artist {} was successfully updated!", updated.name)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, artist_id = id, "failed to update artist");
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

fn form_page(
    status: StatusCode,
    action: FormAction<'_>,
    form: &FormData,
    errors: &FieldErrors,
    flash: &Flash,
) -> Response {
    (
        status,
        Html(views::forms::artist_form(action, form, errors, Some(flash))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_detail_serialization() {
        let detail = ArtistDetail {
            artist: artist::Model {
                id: 4,
                name: "Guns N Petals".into(),
                city: "San Francisco".into(),
                state: "CA".into(),
                phone: "326-123-5000".into(),
                genres: vec!["Rock n Roll".into()],
                image_link: None,
                facebook_link: Some("https://www.facebook.com/GunsNPetals".into()),
                website_link: None,
                seeking_description: None,
                looking_for_venues: true,
            },
            past_shows: Vec::new(),
            upcoming_shows: Vec::new(),
            past_shows_count: 0,
            upcoming_shows_count: 0,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["looking_for_venues"], true);
        assert_eq!(json["past_shows"].as_array().unwrap().len(), 0);
    }
}

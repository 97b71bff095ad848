pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::flash::Flash;

/// Numeric `{id}` path segment; anything else is treated as an unknown page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i32);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NoRoute)?;
        raw.parse::<i32>()
            .map(EntityId)
            .map_err(|_| AppError::NoRoute)
    }
}

/// One row of a listing or search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<RecordSummary>,
}

impl From<Vec<RecordSummary>> for SearchResults {
    fn from(data: Vec<RecordSummary>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Case-folded `LIKE` pattern matching `term` anywhere, with the term's own
/// wildcards escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Failure notice for a create; a blank name is left out.
pub(crate) fn not_listed(entity: &str, name: &str) -> Flash {
    if name.is_empty() {
        Flash::error(format!("An error occurred. {entity} could not be listed."))
    } else {
        Flash::error(format!("An error occurred. {entity} {name} could not be listed."))
    }
}

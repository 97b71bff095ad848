//! Typed, validated form input.
//!
//! Request bodies are parsed into [`FormData`] (repeated keys allowed, as
//! sent by multi-selects) and then into one of the input structs below.
//! Validation happens before any record is built; problems come back as
//! [`FieldErrors`] keyed by form field.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use sea_orm::{ActiveValue, NotSet, Set, Value};
use std::collections::BTreeMap;
use std::fmt;

use showbill_db::entities::{artist, show, venue};

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

const REQUIRED: &str = "This field is required.";

/// Hidden field sent with every genre select. Browsers omit a multi-select
/// with nothing chosen, so this tells an emptied selection from an absent one.
pub const GENRES_MARKER: &str = "genres_present";

// ─── Raw form data ──────────────────────────────────────────────────

/// URL-encoded form body, in submission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value submitted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Values from `submitted` replace every value of the same key here.
    pub fn overlaid_with(&self, submitted: &FormData) -> FormData {
        let mut pairs: Vec<(String, String)> = self
            .pairs
            .iter()
            .filter(|(k, _)| !submitted.contains(k))
            .filter(|(k, _)| !(k == "genres" && submitted.contains(GENRES_MARKER)))
            .cloned()
            .collect();
        pairs.extend(submitted.pairs.iter().cloned());
        FormData { pairs }
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = BytesRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        Ok(Self::parse(&body))
    }
}

impl From<&venue::Model> for FormData {
    fn from(v: &venue::Model) -> Self {
        let mut form = FormData::default();
        form.push("name", &v.name);
        form.push("city", &v.city);
        form.push("state", &v.state);
        form.push("address", &v.address);
        form.push("phone", &v.phone);
        for genre in &v.genres {
            form.push("genres", genre);
        }
        form.push("image_link", v.image_link.clone().unwrap_or_default());
        form.push("facebook_link", v.facebook_link.clone().unwrap_or_default());
        form.push("website_link", v.website_link.clone().unwrap_or_default());
        form.push("seeking_talent", flag_value(v.seeking_talent));
        form.push(
            "seeking_description",
            v.seeking_description.clone().unwrap_or_default(),
        );
        form
    }
}

impl From<&artist::Model> for FormData {
    fn from(a: &artist::Model) -> Self {
        let mut form = FormData::default();
        form.push("name", &a.name);
        form.push("city", &a.city);
        form.push("state", &a.state);
        form.push("phone", &a.phone);
        for genre in &a.genres {
            form.push("genres", genre);
        }
        form.push("image_link", a.image_link.clone().unwrap_or_default());
        form.push("facebook_link", a.facebook_link.clone().unwrap_or_default());
        form.push("website_link", a.website_link.clone().unwrap_or_default());
        form.push("seeking_venue", flag_value(a.looking_for_venues));
        form.push(
            "seeking_description",
            a.seeking_description.clone().unwrap_or_default(),
        );
        form
    }
}

fn flag_value(b: bool) -> &'static str {
    if b {
        "y"
    } else {
        "n"
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Validation messages keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ─── Field rules ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Free text, optionally capped at a column width.
    Text(Option<usize>),
    State,
    Phone,
    Link(Option<usize>),
}

impl Rule {
    fn check(self, value: &str) -> Result<String, String> {
        match self {
            Rule::Text(max) => within(value, max),
            Rule::State => {
                let upper = value.to_ascii_uppercase();
                if STATES.contains(&upper.as_str()) {
                    Ok(upper)
                } else {
                    Err("Not a valid choice.".into())
                }
            }
            Rule::Phone => check_phone(value),
            Rule::Link(max) => {
                let link = within(value, max)?;
                match url::Url::parse(&link) {
                    Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => Ok(link),
                    _ => Err("Must be a full http(s) URL.".into()),
                }
            }
        }
    }
}

fn within(value: &str, max: Option<usize>) -> Result<String, String> {
    match max {
        Some(max) if value.chars().count() > max => {
            Err(format!("Must be at most {max} characters."))
        }
        _ => Ok(value.to_string()),
    }
}

fn check_phone(value: &str) -> Result<String, String> {
    let allowed = |c: char| c.is_ascii_digit() || " +-().".contains(c);
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !value.chars().all(allowed) || !(7..=15).contains(&digits) {
        return Err("Invalid phone number.".into());
    }
    within(value, Some(120))
}

/// Checkbox and y/n select values.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "on" | "1"
    )
}

fn check_genres(values: &[&str]) -> Result<Vec<String>, String> {
    let mut genres: Vec<String> = Vec::new();
    for raw in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        let Some(known) = GENRES.iter().find(|g| g.eq_ignore_ascii_case(raw)) else {
            return Err(format!("'{raw}' is not a valid choice."));
        };
        if !genres.iter().any(|g| g == known) {
            genres.push(known.to_string());
        }
    }
    if genres.is_empty() {
        return Err(REQUIRED.into());
    }
    Ok(genres)
}

/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM[:SS]` with a space or `T`;
/// times without an offset are taken as UTC.
pub fn parse_start_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    .map(|naive| naive.and_utc().fixed_offset())
}

// ─── Field reader ───────────────────────────────────────────────────

/// Reads fields off a form while collecting every problem found.
struct FieldReader<'a> {
    form: &'a FormData,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    fn new(form: &'a FormData) -> Self {
        Self {
            form,
            errors: FieldErrors::default(),
        }
    }

    fn trimmed(&self, field: &str) -> Option<&'a str> {
        self.form
            .get(field)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn required(&mut self, field: &'static str, rule: Rule) -> Option<String> {
        let Some(value) = self.trimmed(field) else {
            self.errors.add(field, REQUIRED);
            return None;
        };
        rule.check(value)
            .map_err(|e| self.errors.add(field, e))
            .ok()
    }

    fn optional(&mut self, field: &'static str, rule: Rule) -> Option<String> {
        let value = self.trimmed(field)?;
        rule.check(value)
            .map_err(|e| self.errors.add(field, e))
            .ok()
    }

    /// Absent → no change; present → validated like `required`.
    fn changed_required(&mut self, field: &'static str, rule: Rule) -> Option<String> {
        if !self.form.contains(field) {
            return None;
        }
        self.required(field, rule)
    }

    /// Absent → no change; blank → cleared; otherwise validated.
    fn changed_optional(&mut self, field: &'static str, rule: Rule) -> Option<Option<String>> {
        if !self.form.contains(field) {
            return None;
        }
        match self.trimmed(field) {
            None => Some(None),
            Some(value) => match rule.check(value) {
                Ok(v) => Some(Some(v)),
                Err(e) => {
                    self.errors.add(field, e);
                    None
                }
            },
        }
    }

    fn genres(&mut self) -> Option<Vec<String>> {
        check_genres(&self.form.get_all("genres"))
            .map_err(|e| self.errors.add("genres", e))
            .ok()
    }

    fn changed_genres(&mut self) -> Option<Vec<String>> {
        if !self.form.contains("genres") && !self.form.contains(GENRES_MARKER) {
            return None;
        }
        self.genres()
    }

    fn flag(&self, field: &str) -> bool {
        self.form.get(field).is_some_and(parse_flag)
    }

    fn changed_flag(&self, field: &str) -> Option<bool> {
        self.form.get(field).map(parse_flag)
    }

    fn id(&mut self, field: &'static str) -> Option<i32> {
        let Some(raw) = self.trimmed(field) else {
            self.errors.add(field, REQUIRED);
            return None;
        };
        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.errors.add(field, "Must be a positive whole number.");
                None
            }
        }
    }

    fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Overwrite `slot` only when `next` is given and differs from `current`.
fn set_if_changed<T>(slot: &mut ActiveValue<T>, current: &T, next: Option<T>)
where
    T: PartialEq + Into<Value>,
{
    if let Some(next) = next {
        if &next != current {
            *slot = Set(next);
        }
    }
}

// ─── Venue ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenueInput {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let mut r = FieldReader::new(form);
        let name = r.required("name", Rule::Text(None));
        let city = r.required("city", Rule::Text(Some(120)));
        let state = r.required("state", Rule::State);
        let address = r.required("address", Rule::Text(Some(120)));
        let phone = r.required("phone", Rule::Phone);
        let genres = r.genres();
        let image_link = r.optional("image_link", Rule::Link(None));
        let facebook_link = r.optional("facebook_link", Rule::Link(Some(120)));
        let website_link = r.optional("website_link", Rule::Link(Some(120)));
        let seeking_talent = r.flag("seeking_talent");
        let seeking_description = r.optional("seeking_description", Rule::Text(Some(200)));
        r.finish()?;

        Ok(Self {
            name: name.unwrap_or_default(),
            city: city.unwrap_or_default(),
            state: state.unwrap_or_default(),
            address: address.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            genres: genres.unwrap_or_default(),
            image_link,
            facebook_link,
            website_link,
            seeking_talent,
            seeking_description,
        })
    }

    pub fn into_active_model(self) -> venue::ActiveModel {
        venue::ActiveModel {
            id: NotSet,
            name: Set(self.name),
            city: Set(self.city),
            state: Set(self.state),
            address: Set(self.address),
            phone: Set(self.phone),
            image_link: Set(self.image_link),
            facebook_link: Set(self.facebook_link),
            website_link: Set(self.website_link),
            genres: Set(self.genres),
            seeking_talent: Set(self.seeking_talent),
            seeking_description: Set(self.seeking_description),
        }
    }
}

/// Partial update of a venue; `None` leaves the stored value alone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VenueChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Vec<String>>,
    pub image_link: Option<Option<String>>,
    pub facebook_link: Option<Option<String>>,
    pub website_link: Option<Option<String>>,
    pub seeking_talent: Option<bool>,
    pub seeking_description: Option<Option<String>>,
}

impl VenueChanges {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let mut r = FieldReader::new(form);
        let changes = Self {
            name: r.changed_required("name", Rule::Text(None)),
            city: r.changed_required("city", Rule::Text(Some(120))),
            state: r.changed_required("state", Rule::State),
            address: r.changed_required("address", Rule::Text(Some(120))),
            phone: r.changed_required("phone", Rule::Phone),
            genres: r.changed_genres(),
            image_link: r.changed_optional("image_link", Rule::Link(None)),
            facebook_link: r.changed_optional("facebook_link", Rule::Link(Some(120))),
            website_link: r.changed_optional("website_link", Rule::Link(Some(120))),
            seeking_talent: r.changed_flag("seeking_talent"),
            seeking_description: r
                .changed_optional("seeking_description", Rule::Text(Some(200))),
        };
        r.finish()?;
        Ok(changes)
    }

    /// Active model with only the columns whose value actually changes set.
    pub fn apply(self, current: &venue::Model) -> venue::ActiveModel {
        let mut active: venue::ActiveModel = current.clone().into();
        set_if_changed(&mut active.name, &current.name, self.name);
        set_if_changed(&mut active.city, &current.city, self.city);
        set_if_changed(&mut active.state, &current.state, self.state);
        set_if_changed(&mut active.address, &current.address, self.address);
        set_if_changed(&mut active.phone, &current.phone, self.phone);
        set_if_changed(&mut active.genres, &current.genres, self.genres);
        set_if_changed(&mut active.image_link, &current.image_link, self.image_link);
        set_if_changed(
            &mut active.facebook_link,
            &current.facebook_link,
            self.facebook_link,
        );
        set_if_changed(
            &mut active.website_link,
            &current.website_link,
            self.website_link,
        );
        set_if_changed(
            &mut active.seeking_talent,
            &current.seeking_talent,
            self.seeking_talent,
        );
        set_if_changed(
            &mut active.seeking_description,
            &current.seeking_description,
            self.seeking_description,
        );
        active
    }
}

// ─── Artist ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl ArtistInput {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let mut r = FieldReader::new(form);
        let name = r.required("name", Rule::Text(None));
        let city = r.required("city", Rule::Text(Some(120)));
        let state = r.required("state", Rule::State);
        let phone = r.required("phone", Rule::Phone);
        let genres = r.genres();
        let image_link = r.optional("image_link", Rule::Link(None));
        let facebook_link = r.optional("facebook_link", Rule::Link(Some(120)));
        let website_link = r.optional("website_link", Rule::Link(Some(120)));
        let seeking_venue = r.flag("seeking_venue");
        let seeking_description = r.optional("seeking_description", Rule::Text(Some(200)));
        r.finish()?;

        Ok(Self {
            name: name.unwrap_or_default(),
            city: city.unwrap_or_default(),
            state: state.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            genres: genres.unwrap_or_default(),
            image_link,
            facebook_link,
            website_link,
            seeking_venue,
            seeking_description,
        })
    }

    pub fn into_active_model(self) -> artist::ActiveModel {
        artist::ActiveModel {
            id: NotSet,
            name: Set(self.name),
            city: Set(self.city),
            state: Set(self.state),
            phone: Set(self.phone),
            genres: Set(self.genres),
            image_link: Set(self.image_link),
            facebook_link: Set(self.facebook_link),
            website_link: Set(self.website_link),
            seeking_description: Set(self.seeking_description),
            looking_for_venues: Set(self.seeking_venue),
        }
    }
}

/// Partial update of an artist; `None` leaves the stored value alone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArtistChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Vec<String>>,
    pub image_link: Option<Option<String>>,
    pub facebook_link: Option<Option<String>>,
    pub website_link: Option<Option<String>>,
    pub seeking_venue: Option<bool>,
    pub seeking_description: Option<Option<String>>,
}

impl ArtistChanges {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let mut r = FieldReader::new(form);
        let changes = Self {
            name: r.changed_required("name", Rule::Text(None)),
            city: r.changed_required("city", Rule::Text(Some(120))),
            state: r.changed_required("state", Rule::State),
            phone: r.changed_required("phone", Rule::Phone),
            genres: r.changed_genres(),
            image_link: r.changed_optional("image_link", Rule::Link(None)),
            facebook_link: r.changed_optional("facebook_link", Rule::Link(Some(120))),
            website_link: r.changed_optional("website_link", Rule::Link(Some(120))),
            seeking_venue: r.changed_flag("seeking_venue"),
            seeking_description: r
                .changed_optional("seeking_description", Rule::Text(Some(200))),
        };
        r.finish()?;
        Ok(changes)
    }

    pub fn apply(self, current: &artist::Model) -> artist::ActiveModel {
        let mut active: artist::ActiveModel = current.clone().into();
        set_if_changed(&mut active.name, &current.name, self.name);
        set_if_changed(&mut active.city, &current.city, self.city);
        set_if_changed(&mut active.state, &current.state, self.state);
        set_if_changed(&mut active.phone, &current.phone, self.phone);
        set_if_changed(&mut active.genres, &current.genres, self.genres);
        set_if_changed(&mut active.image_link, &current.image_link, self.image_link);
        set_if_changed(
            &mut active.facebook_link,
            &current.facebook_link,
            self.facebook_link,
        );
        set_if_changed(
            &mut active.website_link,
            &current.website_link,
            self.website_link,
        );
        set_if_changed(
            &mut active.looking_for_venues,
            &current.looking_for_venues,
            self.seeking_venue,
        );
        set_if_changed(
            &mut active.seeking_description,
            &current.seeking_description,
            self.seeking_description,
        );
        active
    }
}

// ─── Show ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInput {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<FixedOffset>,
}

impl ShowInput {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let mut r = FieldReader::new(form);
        let artist_id = r.id("artist_id");
        let venue_id = r.id("venue_id");
        let start_time = match r.trimmed("start_time") {
            None => {
                r.errors.add("start_time", REQUIRED);
                None
            }
            Some(raw) => {
                let parsed = parse_start_time(raw);
                if parsed.is_none() {
                    r.errors
                        .add("start_time", "Expected a date and time like 2025-06-01 20:00.");
                }
                parsed
            }
        };
        match (artist_id, venue_id, start_time) {
            (Some(artist_id), Some(venue_id), Some(start_time)) if r.errors.is_empty() => {
                Ok(Self {
                    artist_id,
                    venue_id,
                    start_time,
                })
            }
            _ => Err(r.errors),
        }
    }

    pub fn into_active_model(self) -> show::ActiveModel {
        show::ActiveModel {
            id: NotSet,
            artist_id: Set(self.artist_id),
            venue_id: Set(self.venue_id),
            start_time: Set(self.start_time),
        }
    }
}

//! Create and edit forms. Values come from [`FormData`] so a rejected
//! submission is shown back exactly as typed.

use super::{escape, layout, Section};
use crate::flash::Flash;
use crate::forms::{FieldErrors, FormData, GENRES, GENRES_MARKER, STATES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction<'a> {
    Create,
    Edit { id: i32, name: &'a str },
}

impl FormAction<'_> {
    fn target(&self, base: &str) -> String {
        match self {
            FormAction::Create => format!("{base}/create"),
            FormAction::Edit { id, .. } => format!("{base}/{id}/edit"),
        }
    }
}

pub fn venue_form(
    action: FormAction<'_>,
    form: &FormData,
    errors: &FieldErrors,
    flash: Option<&Flash>,
) -> String {
    let (title, submit) = match action {
        FormAction::Create => ("List a new venue".to_string(), "Create Venue"),
        FormAction::Edit { name, .. } => (format!("Edit venue {name}"), "Edit Venue"),
    };
    let fields = [
        text_field("Name", "name", form, errors),
        text_field("City", "city", form, errors),
        state_field(form, errors),
        text_field("Address", "address", form, errors),
        text_field("Phone", "phone", form, errors),
        genre_field(form, errors),
        text_field("Image link", "image_link", form, errors),
        text_field("Facebook link", "facebook_link", form, errors),
        text_field("Website link", "website_link", form, errors),
        flag_field("Looking for talent", "seeking_talent", form),
        text_field("Seeking description", "seeking_description", form, errors),
    ]
    .concat();

    let body = format!(
        r#"<h1>{}</h1>
<form method="post" action="{}">
{fields}
<p><button type="submit">{submit}</button></p>
</form>"#,
        escape(&title),
        action.target("/venues"),
    );
    layout(&title, Section::Venues, flash, &body)
}

pub fn artist_form(
    action: FormAction<'_>,
    form: &FormData,
    errors: &FieldErrors,
    flash: Option<&Flash>,
) -> String {
    let (title, submit) = match action {
        FormAction::Create => ("List a new artist".to_string(), "Create Artist"),
        FormAction::Edit { name, .. } => (format!("Edit artist {name}"), "Edit Artist"),
    };
    let fields = [
        text_field("Name", "name", form, errors),
        text_field("City", "city", form, errors),
        state_field(form, errors),
        text_field("Phone", "phone", form, errors),
        genre_field(form, errors),
        text_field("Image link", "image_link", form, errors),
        text_field("Facebook link", "facebook_link", form, errors),
        text_field("Website link", "website_link", form, errors),
        flag_field("Looking for venues", "seeking_venue", form),
        text_field("Seeking description", "seeking_description", form, errors),
    ]
    .concat();

    let body = format!(
        r#"<h1>{}</h1>
<form method="post" action="{}">
{fields}
<p><button type="submit">{submit}</button></p>
</form>"#,
        escape(&title),
        action.target("/artists"),
    );
    layout(&title, Section::Artists, flash, &body)
}

pub fn show_form(form: &FormData, errors: &FieldErrors, flash: Option<&Flash>) -> String {
    let fields = [
        text_field("Artist ID", "artist_id", form, errors),
        text_field("Venue ID", "venue_id", form, errors),
        text_field("Start time", "start_time", form, errors),
    ]
    .concat();
    let body = format!(
        r#"<h1>List a new show</h1>
<form method="post" action="/shows/create">
{fields}
<p><button type="submit">Create Show</button></p>
</form>"#
    );
    layout("List a new show", Section::Shows, flash, &body)
}

fn field_error(name: &str, errors: &FieldErrors) -> String {
    errors
        .get(name)
        .map(|e| format!(r#"<span class="field-error">{}</span>"#, escape(e)))
        .unwrap_or_default()
}

fn text_field(label: &str, name: &str, form: &FormData, errors: &FieldErrors) -> String {
    format!(
        r#"<label>{label} <input type="text" name="{name}" value="{}"></label>{}
"#,
        escape(form.get(name).unwrap_or_default()),
        field_error(name, errors),
    )
}

fn state_field(form: &FormData, errors: &FieldErrors) -> String {
    let current = form.get("state").unwrap_or_default().to_ascii_uppercase();
    let options: String = STATES
        .iter()
        .map(|s| {
            let selected = if *s == current { " selected" } else { "" };
            format!(r#"<option value="{s}"{selected}>{s}</option>"#)
        })
        .collect();
    format!(
        r#"<label>State <select name="state"><option value=""></option>{options}</select></label>{}
"#,
        field_error("state", errors),
    )
}

fn genre_field(form: &FormData, errors: &FieldErrors) -> String {
    let chosen = form.get_all("genres");
    let options: String = GENRES
        .iter()
        .map(|g| {
            let selected = if chosen.iter().any(|c| c.eq_ignore_ascii_case(g)) {
                " selected"
            } else {
                ""
            };
            let g = escape(g);
            format!(r#"<option value="{g}"{selected}>{g}</option>"#)
        })
        .collect();
    format!(
        r#"<input type="hidden" name="{GENRES_MARKER}" value="1">
<label>Genres <select name="genres" multiple>{options}</select></label>{}
"#,
        field_error("genres", errors),
    )
}

/// Always submitted, so an edit can switch the flag off.
fn flag_field(label: &str, name: &str, form: &FormData) -> String {
    let on = form.get(name).is_some_and(crate::forms::parse_flag);
    let (yes, no) = if on {
        (" selected", "")
    } else {
        ("", " selected")
    };
    format!(
        r#"<label>{label} <select name="{name}"><option value="y"{yes}>Yes</option><option value="n"{no}>No</option></select></label>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_form_keeps_submitted_values_and_errors() {
        let form = FormData::parse(b"name=%3CHop%3E&state=ny&genres=Jazz&genres=Folk&seeking_talent=y");
        let mut errors = FieldErrors::default();
        errors.add("phone", "Invalid phone number.");
        let html = venue_form(FormAction::Create, &form, &errors, None);

        assert!(html.contains(r#"action="/venues/create""#));
        assert!(html.contains(r#"value="&lt;Hop&gt;""#));
        assert!(html.contains(r#"<option value="NY" selected>NY</option>"#));
        assert!(html.contains(r#"<option value="Jazz" selected>Jazz</option>"#));
        assert!(html.contains(r#"<option value="Folk" selected>Folk</option>"#));
        assert!(html.contains(r#"<option value="Blues">Blues</option>"#));
        assert!(html.contains(r#"<option value="y" selected>Yes</option>"#));
        assert!(html.contains("Invalid phone number."));
    }

    #[test]
    fn test_genre_select_carries_presence_marker() {
        let html = genre_field(&FormData::default(), &FieldErrors::default());
        assert!(html.contains(r#"<input type="hidden" name="genres_present" value="1">"#));
        assert!(html.contains(r#"<select name="genres" multiple>"#));
    }

    #[test]
    fn test_artist_edit_form_targets_record() {
        let html = artist_form(
            FormAction::Edit {
                id: 5,
                name: "Matt Quevedo",
            },
            &FormData::default(),
            &FieldErrors::default(),
            None,
        );
        assert!(html.contains(r#"action="/artists/5/edit""#));
        assert!(html.contains("Edit artist Matt Quevedo"));
        assert!(html.contains(r#"<option value="n" selected>No</option>"#));
        assert!(html.contains(r#"name="seeking_venue""#));
    }

    #[test]
    fn test_show_form_escapes_values_and_shows_flash() {
        let html = show_form(
            &FormData::parse(b"artist_id=1&venue_id=%22x%22"),
            &FieldErrors::default(),
            Some(&Flash::error("An error occurred. Show could not be listed.")),
        );
        assert!(html.contains(r#"value="&quot;x&quot;""#));
        assert!(html.contains("Show could not be listed."));
    }
}

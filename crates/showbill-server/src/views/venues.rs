use super::{bookings_section, escape, genre_tags, layout, optional_link, Section};
use crate::flash::Flash;
use crate::routes::venues::{Area, VenueDetail};

pub fn list(areas: &[Area], flash: Option<&Flash>) -> String {
    let sections: String = areas
        .iter()
        .map(|area| {
            let venues: String = area
                .venues
                .iter()
                .map(|v| {
                    format!(
                        r#"<li><a href="/venues/{}">{}</a> <small>{} upcoming</small></li>"#,
                        v.id,
                        escape(&v.name),
                        v.num_upcoming_shows
                    )
                })
                .collect();
            format!(
                r#"<h2>{}, {}</h2>
<ul class="items">{venues}</ul>
"#,
                escape(&area.city),
                escape(&area.state)
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Venues</h1>
<p><a href="/venues/create">List a new venue</a></p>
{sections}"#
    );
    layout("Venues", Section::Venues, flash, &body)
}

pub fn detail(detail: &VenueDetail, flash: Option<&Flash>) -> String {
    let v = &detail.venue;
    let image = v
        .image_link
        .as_deref()
        .map(|src| format!(r#"<img src="{}" alt="" width="300">"#, escape(src)))
        .unwrap_or_default();
    let seeking = if v.seeking_talent {
        format!(
            "<p><strong>Currently seeking talent</strong> {}</p>",
            escape(v.seeking_description.as_deref().unwrap_or_default())
        )
    } else {
        "<p>Not currently seeking talent</p>".to_string()
    };

    let body = format!(
        r#"<h1>{name}</h1>
<p class="genres">{genres}</p>
<p>{address}<br>{city}, {state}</p>
<p>{phone}</p>
{website}{facebook}{seeking}
{image}
{upcoming}
{past}
<p><a href="/venues/{id}/edit">Edit</a></p>
<form method="post" action="/venues/{id}/delete"><button type="submit">Delete venue</button></form>"#,
        name = escape(&v.name),
        genres = genre_tags(&v.genres),
        address = escape(&v.address),
        city = escape(&v.city),
        state = escape(&v.state),
        phone = escape(&v.phone),
        website = optional_link("Website", v.website_link.as_deref()),
        facebook = optional_link("Facebook", v.facebook_link.as_deref()),
        upcoming = bookings_section("Upcoming Shows", "/artists", &detail.upcoming_shows),
        past = bookings_section("Past Shows", "/artists", &detail.past_shows),
        id = v.id,
    );
    layout(&v.name, Section::Venues, flash, &body)
}

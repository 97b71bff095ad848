use super::{bookings_section, escape, genre_tags, layout, optional_link, Section};
use crate::flash::Flash;
use crate::routes::artists::{ArtistDetail, ArtistEntry};

pub fn list(artists: &[ArtistEntry], flash: Option<&Flash>) -> String {
    let items: String = artists
        .iter()
        .map(|a| format!(r#"<li><a href="/artists/{}">{}</a></li>"#, a.id, escape(&a.name)))
        .collect();
    let body = format!(
        r#"<h1>Artists</h1>
<p><a href="/artists/create">List a new artist</a></p>
<ul class="items">{items}</ul>"#
    );
    layout("Artists", Section::Artists, flash, &body)
}

pub fn detail(detail: &ArtistDetail, flash: Option<&Flash>) -> String {
    let a = &detail.artist;
    let image = a
        .image_link
        .as_deref()
        .map(|src| format!(r#"<img src="{}" alt="" width="300">"#, escape(src)))
        .unwrap_or_default();
    let seeking = if a.looking_for_venues {
        format!(
            "<p><strong>Currently seeking performance venues</strong> {}</p>",
            escape(a.seeking_description.as_deref().unwrap_or_default())
        )
    } else {
        "<p>Not currently seeking performance venues</p>".to_string()
    };

    let body = format!(
        r#"<h1>{name}</h1>
<p class="genres">{genres}</p>
<p>{city}, {state}</p>
<p>{phone}</p>
{website}{facebook}{seeking}
{image}
{upcoming}
{past}
<p><a href="/artists/{id}/edit">Edit</a></p>"#,
        name = escape(&a.name),
        genres = genre_tags(&a.genres),
        city = escape(&a.city),
        state = escape(&a.state),
        phone = escape(&a.phone),
        website = optional_link("Website", a.website_link.as_deref()),
        facebook = optional_link("Facebook", a.facebook_link.as_deref()),
        upcoming = bookings_section("Upcoming Shows", "/venues", &detail.upcoming_shows),
        past = bookings_section("Past Shows", "/venues", &detail.past_shows),
        id = a.id,
    );
    layout(&a.name, Section::Artists, flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_links_each_artist() {
        let artists = vec![
            ArtistEntry {
                id: 4,
                name: "Guns N Petals".into(),
            },
            ArtistEntry {
                id: 6,
                name: "The Wild Sax Band".into(),
            },
        ];
        let html = list(&artists, None);
        assert!(html.contains(r#"<a href="/artists/4">Guns N Petals</a>"#));
        assert!(html.contains(r#"<a href="/artists/6">The Wild Sax Band</a>"#));
    }
}

use super::{layout, Section};
use crate::flash::Flash;

pub fn index(flash: Option<&Flash>) -> String {
    let body = r#"<h1>Showbill</h1>
<p>Find venues and artists, and book shows.</p>
<ul class="items">
    <li><a href="/venues/create">Post a venue</a></li>
    <li><a href="/artists/create">Post an artist</a></li>
    <li><a href="/shows/create">Post a show</a></li>
</ul>"#;
    layout("Home", Section::Home, flash, body)
}

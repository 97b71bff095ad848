use super::{escape, format_datetime, layout, DateStyle, Section};
use crate::flash::Flash;
use crate::routes::shows::ShowRow;

pub fn list(rows: &[ShowRow], flash: Option<&Flash>) -> String {
    let items: String = rows
        .iter()
        .map(|row| {
            let image = row
                .artist_image_link
                .as_deref()
                .map(|src| format!(r#"<img src="{}" alt="" width="60"> "#, escape(src)))
                .unwrap_or_default();
            format!(
                r#"<li>{image}<a href="/artists/{}">{}</a> at <a href="/venues/{}">{}</a> <time>{}</time></li>"#,
                row.artist_id,
                escape(&row.artist_name),
                row.venue_id,
                escape(&row.venue_name),
                format_datetime(&row.start_time, DateStyle::Full),
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Shows</h1>
<p><a href="/shows/create">List a new show</a></p>
<ul class="items">{items}</ul>"#
    );
    layout("Shows", Section::Shows, flash, &body)
}

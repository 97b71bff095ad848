use super::{escape, layout, Section};
use crate::flash::Flash;
use crate::routes::SearchResults;

/// Results page for venue or artist search.
pub fn page(
    section: Section,
    term: &str,
    results: &SearchResults,
    flash: Option<&Flash>,
) -> String {
    let base = match section {
        Section::Artists => "/artists",
        _ => "/venues",
    };
    let items: String = results
        .data
        .iter()
        .map(|r| {
            format!(
                r#"<li><a href="{base}/{}">{}</a> <small>{} upcoming</small></li>"#,
                r.id,
                escape(&r.name),
                r.num_upcoming_shows
            )
        })
        .collect();
    let noun = if results.count == 1 { "result" } else { "results" };
    let body = format!(
        r#"<h1>Search: "{}"</h1>
<p>{} {noun}</p>
<ul class="items">{items}</ul>"#,
        escape(term),
        results.count,
    );
    layout("Search", section, flash, &body)
}

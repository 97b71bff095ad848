//! Server-rendered HTML pages.
//!
//! Every page goes through [`layout`], which adds the navigation bar, the
//! search box for the current section and the flash area. Text taken from
//! records or requests must pass through [`escape`] before interpolation.

use chrono::{DateTime, FixedOffset};

use crate::flash::Flash;

pub mod artists;
pub mod errors;
pub mod forms;
pub mod home;
pub mod search;
pub mod shows;
pub mod venues;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Medium,
    Full,
}

pub fn format_datetime(dt: &DateTime<FixedOffset>, style: DateStyle) -> String {
    let pattern = match style {
        DateStyle::Medium => "%a %m, %d, %Y %-I:%M%p",
        DateStyle::Full => "%A %B, %-d, %Y at %-I:%M%p",
    };
    dt.format(pattern).to_string()
}

/// HTML-escape text for element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Which search box the navigation bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Venues,
    Artists,
    Shows,
}

pub fn layout(title: &str, section: Section, flash: Option<&Flash>, body: &str) -> String {
    let search = match section {
        Section::Artists => search_box("/artists/search", "Find an artist"),
        Section::Venues | Section::Home => search_box("/venues/search", "Find a venue"),
        Section::Shows => String::new(),
    };
    let flash = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}" role="alert">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Showbill</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; color: #222; }}
        nav {{ background: #2a2a2a; padding: 12px 20px; display: flex; gap: 16px; align-items: center; }}
        nav a {{ color: #eee; text-decoration: none; }}
        nav form {{ margin-left: auto; }}
        main {{ padding: 20px; max-width: 960px; }}
        .flash {{ padding: 10px 14px; margin-bottom: 16px; border-radius: 4px; }}
        .flash-success {{ background: #e3f6e5; border: 1px solid #8fcf96; }}
        .flash-error {{ background: #fbe4e4; border: 1px solid #e29a9a; }}
        .field-error {{ color: #b00020; font-size: 0.9em; }}
        .genres span {{ background: #eee; padding: 2px 8px; margin-right: 4px; border-radius: 10px; }}
        ul.items {{ list-style: none; padding: 0; }}
        ul.items li {{ padding: 6px 0; border-bottom: 1px solid #eee; }}
        label {{ display: block; margin-top: 10px; }}
    </style>
</head>
<body>
<nav>
    <a href="/">Showbill</a>
    <a href="/venues">Venues</a>
    <a href="/artists">Artists</a>
    <a href="/shows">Shows</a>
    {search}
</nav>
<main>
    {flash}
    {body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

fn search_box(action: &str, placeholder: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
        <input type="search" name="search_term" placeholder="{placeholder}">
    </form>"#
    )
}

/// `<span>` per genre, in stored order.
pub(crate) fn genre_tags(genres: &[String]) -> String {
    genres
        .iter()
        .map(|g| format!("<span>{}</span>", escape(g)))
        .collect::<Vec<_>>()
        .join("")
}

/// Link rendered only when the record has one.
pub(crate) fn optional_link(label: &str, href: Option<&str>) -> String {
    match href {
        Some(href) => format!(
            r#"<p><a href="{}" rel="noopener">{}</a></p>"#,
            escape(href),
            escape(label)
        ),
        None => String::new(),
    }
}

/// A past or upcoming show list on a detail page; `base` is where the
/// counterpart records live.
pub(crate) fn bookings_section(
    heading: &str,
    base: &str,
    bookings: &[crate::routes::shows::Booking],
) -> String {
    let items: String = bookings
        .iter()
        .map(|b| {
            let image = b
                .image_link
                .as_deref()
                .map(|src| format!(r#"<img src="{}" alt="" width="60"> "#, escape(src)))
                .unwrap_or_default();
            format!(
                r#"<li>{image}<a href="{base}/{}">{}</a> <time>{}</time></li>"#,
                b.id,
                escape(&b.name),
                format_datetime(&b.start_time, DateStyle::Medium),
            )
        })
        .collect();
    format!(
        r#"<h2>{} {heading}</h2>
<ul class="items">{items}</ul>"#,
        bookings.len()
    )
}

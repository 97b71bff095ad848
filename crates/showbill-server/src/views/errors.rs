use super::{layout, Section};

pub fn not_found() -> String {
    layout(
        "Not found",
        Section::Home,
        None,
        r#"<h1>404</h1><p>That page does not exist. <a href="/">Back home</a></p>"#,
    )
}

pub fn server_error() -> String {
    layout(
        "Server error",
        Section::Home,
        None,
        r#"<h1>500</h1><p>Something went wrong on our side. Please try again.</p>"#,
    )
}

//! One-shot user notifications carried across a redirect in a cookie.
//!
//! A handler that finishes a write redirects with [`redirect`], which stores
//! the message in the `showbill_flash` cookie. The next page that renders
//! takes the message out through [`IncomingFlash`] and clears the cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;

pub const COOKIE_NAME: &str = "showbill_flash";

const CLEAR_COOKIE: &str = "showbill_flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// `Set-Cookie` value carrying this message to the next request.
    pub fn to_set_cookie(&self) -> String {
        let payload = format!("{}:{}", self.level.as_str(), self.message);
        format!(
            "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
            urlencoding::encode(&payload)
        )
    }

    /// Find and decode the flash cookie in a `Cookie` request header.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        let raw = header
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(COOKIE_NAME)?.strip_prefix('='))?;
        if raw.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(raw).ok()?;
        let (level, message) = decoded.split_once(':')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: message.to_string(),
        })
    }
}

/// Flash message left by the previous response, if any.
#[derive(Debug, Default, Clone)]
pub struct IncomingFlash(pub Option<Flash>);

impl IncomingFlash {
    pub fn message(&self) -> Option<&Flash> {
        self.0.as_ref()
    }

    /// Render a page, consuming the pending message.
    pub fn page(&self, html: String) -> Response {
        if self.0.is_some() {
            ([(header::SET_COOKIE, CLEAR_COOKIE)], Html(html)).into_response()
        } else {
            Html(html).into_response()
        }
    }
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(Flash::from_cookie_header);
        Ok(Self(flash))
    }
}

/// 303 redirect that leaves `flash` for the page at `to`.
pub fn redirect(to: &str, flash: Flash) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, to.to_string()),
            (header::SET_COOKIE, flash.to_set_cookie()),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_roundtrip_keeps_punctuation() {
        let flash = Flash::success("Venue Park Square Live Music & Coffee was successfully listed!");
        let cookie = flash.to_set_cookie();
        assert!(cookie.starts_with("showbill_flash="));

        let value = cookie.split(';').next().unwrap();
        assert_eq!(Flash::from_cookie_header(value), Some(flash));
    }

    #[test]
    fn test_from_cookie_header_among_other_cookies() {
        let header = "theme=dark; showbill_flash=error%3AShow%20could%20not%20be%20listed.; lang=en";
        let flash = Flash::from_cookie_header(header).unwrap();
        assert_eq!(flash.level, FlashLevel::Error);
        assert_eq!(flash.message, "Show could not be listed.");
    }

    #[test]
    fn test_cleared_cookie_is_ignored() {
        assert_eq!(Flash::from_cookie_header("showbill_flash="), None);
        assert_eq!(Flash::from_cookie_header("theme=dark"), None);
    }

    #[test]
    fn test_unknown_level_is_ignored() {
        assert_eq!(Flash::from_cookie_header("showbill_flash=info%3Ahello"), None);
    }

    #[test]
    fn test_similar_cookie_name_is_not_matched() {
        assert_eq!(
            Flash::from_cookie_header("showbill_flash_old=success%3Ahi"),
            None
        );
    }

    #[test]
    fn test_redirect_sets_location_and_cookie() {
        let resp = redirect("/venues/3", Flash::success("done"));
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/venues/3");
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("showbill_flash=success%3Adone"));
    }

    #[test]
    fn test_page_clears_consumed_flash() {
        let incoming = IncomingFlash(Some(Flash::error("nope")));
        let resp = incoming.page("<p>hi</p>".into());
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));

        let resp = IncomingFlash::default().page("<p>hi</p>".into());
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }
}

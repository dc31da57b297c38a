// middleware/cookies.rs - Attributes shared by the session and flash cookies

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Site-wide `HttpOnly; SameSite=Lax` cookie. `None` makes a browser-session cookie.
pub fn site_cookie(
    name: &'static str,
    value: String,
    secure: bool,
    max_age: Option<Duration>,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    if let Some(max_age) = max_age {
        builder = builder.max_age(max_age);
    }
    builder.build()
}

/// Handed to `CookieJar::remove`; the path must match `site_cookie`.
pub fn site_cookie_removal(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_cookie_attributes() {
        let cookie = site_cookie("session", "tok".to_string(), true, Some(Duration::hours(1)));
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::hours(1)));

        let browser_session = site_cookie("flash", "m=hi".to_string(), false, None);
        assert_eq!(browser_session.max_age(), None);
        assert_ne!(browser_session.secure(), Some(true));
    }

    #[test]
    fn removal_matches_site_path() {
        let removal = site_cookie_removal("flash");
        assert_eq!(removal.name(), "flash");
        assert_eq!(removal.path(), Some("/"));
    }
}

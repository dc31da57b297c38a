// middleware/flash.rs - One-shot messages carried between a redirect and the next page

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::cookies::{site_cookie, site_cookie_removal};

pub const FLASH_COOKIE: &str = "flash";

/// Messages queued by the previous request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flash {
    messages: Vec<String>,
}

impl Flash {
    pub fn from_jar(jar: &CookieJar) -> Self {
        let messages = jar
            .get(FLASH_COOKIE)
            .map(|cookie| {
                url::form_urlencoded::parse(cookie.value_trimmed().as_bytes())
                    .filter(|(key, _)| key == "m")
                    .map(|(_, value)| value.into_owned())
                    .collect()
            })
            .unwrap_or_default();
        Self { messages }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_jar(&CookieJar::from_headers(headers))
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Expire the cookie once the messages have been shown.
    pub fn consume(&self, jar: CookieJar) -> CookieJar {
        if self.is_empty() {
            jar
        } else {
            jar.remove(site_cookie_removal(FLASH_COOKIE))
        }
    }
}

pub fn encode(messages: &[&str]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for message in messages {
        serializer.append_pair("m", message);
    }
    serializer.finish()
}

/// Cookie queueing `messages` for the next page.
pub fn flash_cookie(messages: &[&str]) -> Cookie<'static> {
    site_cookie(FLASH_COOKIE, encode(messages), false, None)
}

/// 303 redirect to `to` with a flash message queued.
pub fn redirect_with_flash(to: &str, message: &str) -> Response {
    redirect_with_flash_in(CookieJar::new(), to, message)
}

/// Same as [`redirect_with_flash`], keeping other changes already made to `jar`.
pub fn redirect_with_flash_in(jar: CookieJar, to: &str, message: &str) -> Response {
    (jar.add(flash_cookie(&[message])), Redirect::to(to)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};

    /// Replay a response's Set-Cookie pairs as the next request's Cookie header.
    fn next_request_headers(response: &Response) -> HeaderMap {
        let pairs: Vec<&str> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pairs.join("; ")).unwrap());
        headers
    }

    #[test]
    fn messages_survive_the_cookie() {
        let response = redirect_with_flash("/dashboard", "a&b=c; d \"quoted\" 100%");
        let flash = Flash::from_headers(&next_request_headers(&response));
        assert_eq!(flash.messages(), ["a&b=c; d \"quoted\" 100%".to_string()]);
    }

    #[test]
    fn reads_quoted_cookie_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("flash=\"m=Data+loaded\""));
        assert_eq!(Flash::from_headers(&headers).messages(), ["Data loaded".to_string()]);
    }

    #[test]
    fn redirect_sets_cookie_and_location() {
        let response = redirect_with_flash("/login", "Invalid username or password");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn consume_clears_only_when_shown() {
        let empty = Flash::default().consume(CookieJar::new());
        assert_eq!(empty.iter().count(), 0);
        let response = (empty, StatusCode::OK).into_response();
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let shown = redirect_with_flash("/", "hi");
        let headers = next_request_headers(&shown);
        let flash = Flash::from_headers(&headers);
        let response = (flash.consume(CookieJar::from_headers(&headers)), StatusCode::OK).into_response();
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("flash=;"));
        assert!(cleared.contains("Max-Age=0"));
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use spend_dashboard::testing::{fixtures, memory_state, test_config, MemoryReferenceStore};

/// In-process application over in-memory stores and a scratch data directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryReferenceStore>,
    pub data_dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let data_dir = tempfile::tempdir().context("failed to create data dir")?;
        let (state, store) = memory_state(test_config(data_dir.path()));
        Ok(Self {
            router: spend_dashboard::app(state),
            store,
            data_dir,
        })
    }

    /// Drop the three fixture extracts into the data directory.
    pub fn seed_extracts(&self) -> Result<()> {
        self.write_extract("400_households.csv", fixtures::HOUSEHOLDS_CSV)?;
        self.write_extract("400_products.csv", fixtures::PRODUCTS_CSV)?;
        self.write_extract("400_transactions.csv", fixtures::TRANSACTIONS_CSV)
    }

    pub fn write_extract(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::write(self.data_dir.path().join(name), contents)?;
        Ok(())
    }

    pub async fn get(&self, path: &str, cookies: &[String]) -> Result<Response> {
        let mut request = Request::builder().method("GET").uri(path);
        if !cookies.is_empty() {
            request = request.header(header::COOKIE, cookies.join("; "));
        }
        Ok(self.router.clone().oneshot(request.body(Body::empty())?).await?)
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)], cookies: &[String]) -> Result<Response> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if !cookies.is_empty() {
            request = request.header(header::COOKIE, cookies.join("; "));
        }
        Ok(self.router.clone().oneshot(request.body(Body::from(body))?).await?)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Response> {
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", email),
                ("password", password),
                ("password2", password),
            ],
            &[],
        )
        .await
    }

    /// Register and log in, returning the session cookie pair.
    pub async fn signed_in(&self, username: &str) -> Result<String> {
        let email = format!("{}@example.com", username);
        let registered = self.register(username, &email, "correct horse").await?;
        assert_eq!(registered.status(), StatusCode::SEE_OTHER);

        let login = self
            .post_form("/login", &[("username", username), ("password", "correct horse")], &[])
            .await?;
        assert_eq!(location(&login), Some("/dashboard"));
        cookie_pair(&login, "session").context("login did not set a session cookie")
    }
}

/// `name=value` of the Set-Cookie header for `name`, if the response set one.
pub fn cookie_pair(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.split_once('=').map(|(k, _)| k) == Some(name))
        .map(str::to_string)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_string(response: Response) -> Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub async fn body_json(response: Response) -> Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

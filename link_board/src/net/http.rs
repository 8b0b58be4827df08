//! HTTP client and request decoration.
//!
//! The client is constructed once with a base URL and a chain of request
//! decorators; every outbound request builder passes through the chain
//! before it is sent. Decoration is a pure request-side transform: nothing
//! here blocks, retries, or inspects responses beyond the status check in
//! [`send_json`].

use reqwest::{RequestBuilder, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::errors::{ApiError, ErrorBody};
use crate::storage::{AUTH_TOKEN_KEY, Storage};

/// A request-side transform composed into the client at construction time.
pub trait Decorate: Send + Sync {
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Attaches the stored bearer credential to outbound requests.
///
/// Reads the credential from storage on every request; when present, adds
/// exactly `Authorization: Token <value>`. When absent the request is
/// passed through untouched. Stateless across calls.
pub struct AuthTokenHeader {
    storage: Storage,
}

impl AuthTokenHeader {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl Decorate for AuthTokenHeader {
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get_item::<String>(AUTH_TOKEN_KEY) {
            Some(token) => request.header(header::AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }
}

/// HTTP client for the REST backend.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    decorators: Vec<Arc<dyn Decorate>>,
}

impl HttpClient {
    /// Create a client for the given base URL.
    ///
    /// The underlying client keeps a cookie store so ambient credentials
    /// ride along with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder().cookie_store(true).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            inner,
            base_url,
            decorators: Vec::new(),
        })
    }

    /// Compose a decorator into the request pipeline.
    pub fn with(mut self, decorator: impl Decorate + 'static) -> Self {
        self.decorators.push(Arc::new(decorator));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.apply(self.inner.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.apply(self.inner.post(self.url(path)))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.apply(self.inner.put(self.url(path)))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        self.decorators
            .iter()
            .fold(request, |request, decorator| decorator.decorate(request))
    }
}

/// Send a request and decode a JSON success body.
///
/// Non-success statuses become [`ApiError::Rejected`] with whatever
/// structured body the server provided; transport failures and undecodable
/// success bodies become [`ApiError::Network`].
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let text = response.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&text).unwrap_or_default();
        Err(ApiError::Rejected { status, body })
    }
}

/// Send a request, discarding any success body.
pub async fn send_unit(request: RequestBuilder) -> Result<(), ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let text = response.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&text).unwrap_or_default();
        Err(ApiError::Rejected { status, body })
    }
}

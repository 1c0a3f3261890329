//! Bearer-authenticated client for the Freelance Manager REST API.
//!
//! DESIGN
//! ======
//! The client holds no token of its own. Every request is built through
//! [`ApiClient::request`], which asks the [`TokenSource`] for the current
//! token at dispatch time and attaches `Authorization: Bearer <token>` only
//! when one is held. A token change committed to the source is therefore
//! visible to the very next request, and nothing has to remember to update a
//! default header.
//!
//! ERROR HANDLING
//! ==============
//! Transport and decode failures surface as [`ApiError::Http`]. Any
//! non-success status is read as text, parsed as the API's error body when
//! possible, and returned as [`ApiError::Status`]. A path that cannot be
//! built from the base URL is [`ApiError::InvalidUrl`].

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorBody};

/// Anything that can report the bearer token to attach to the next request.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A token source that never changes. Used for one-off clients.
#[derive(Debug, Clone, Default)]
pub struct FixedToken(pub Option<String>);

impl TokenSource for FixedToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.has_token())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client for `config.base_url` that authenticates with `tokens`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self { http, base_url: config.base_url.clone(), tokens })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.tokens.bearer_token().is_some()
    }

    /// The `Authorization` header value the next request would carry.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.tokens.bearer_token().map(|token| format!("Bearer {token}"))
    }

    /// The base URL extended by `segments`, each percent-encoded as a
    /// single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn segment_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request against `path`, with the current bearer token attached.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(self.http.request(method, self.url(path)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or undecodable body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        send(self.request(Method::GET, path)).await
    }

    /// GET a path built from caller-supplied segments, such as a username.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on a bad URL, transport failure, non-success status, or undecodable body.
    pub async fn get_segments<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.segment_url(segments)?;
        send(self.authorize(self.http.get(url))).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or undecodable body.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        send(self.request(Method::GET, path).query(query)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or undecodable body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        send(self.request(Method::POST, path).json(body)).await
    }

    /// POST without a body, ignoring whatever the server answers on success.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-success status.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        send_empty(self.request(Method::POST, path)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or undecodable body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        send(self.request(Method::PUT, path).json(body)).await
    }

    /// PUT a JSON body, ignoring whatever the server answers on success.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-success status.
    pub async fn put_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        send_empty(self.request(Method::PUT, path).json(body)).await
    }
}

// =============================================================================
// RESPONSE HANDLING
// =============================================================================

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    let response = check(builder.send().await?).await?;
    Ok(response.json::<T>().await?)
}

async fn send_empty(builder: RequestBuilder) -> Result<(), ApiError> {
    check(builder.send().await?).await?;
    Ok(())
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), body: ErrorBody::parse(&text) })
}

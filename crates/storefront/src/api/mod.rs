//! Commerce REST API client.
//!
//! # Architecture
//!
//! - JSON over HTTP via `reqwest`; the backend is the source of truth
//! - Catalog reads are cached in memory via `moka` (TTL from config)
//! - Cart calls are never cached here; the cart layer owns that state
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! // Get a product
//! let product = client.get_product("linen-shirt").await?;
//!
//! // Add its first variant to the cart
//! let cart = client.add_item(product.variants[0].id, 1).await?;
//! ```

mod cache;
mod cart;
mod catalog;
pub mod types;

pub use types::*;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend returned a non-success status.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details provided"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, if any.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ApiError {
    /// The backend-provided message suitable for shoppers, if any.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the commerce REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and the
/// catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(config.catalog_cache_capacity)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: with_trailing_slash(config.base_url.clone()),
                access_token: config.access_token.clone(),
                cache,
            }),
        })
    }

    /// The API base URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an authenticated request for `path` relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");

        Ok(match &self.inner.access_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let url = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(server_error(status, &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Map a non-success response to `ApiError::Server`, keeping the body's
/// message when it has one.
fn server_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message);

    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

//! Application state shared across front-end entry points.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartSync;
use crate::config::StorefrontConfig;
use crate::notify::{LogNavigator, LogNotifier, Navigator, Notifier};

/// Application state shared across commands and views.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// API client and the synchronized cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartSync,
}

impl AppState {
    /// Create state that reports through the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        Self::with_collaborators(config, Arc::new(LogNotifier), Arc::new(LogNavigator))
    }

    /// Create state with front-end specific notification and navigation.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_collaborators(
        config: StorefrontConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let cart = CartSync::new(Arc::new(api.clone()), notifier, navigator)
            .with_timeout(config.api.request_timeout);

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api, cart }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the synchronized cart.
    #[must_use]
    pub fn cart(&self) -> &CartSync {
        &self.inner.cart
    }
}

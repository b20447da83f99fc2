//! Shopper-facing side effects of cart operations.
//!
//! The cart layer reports outcomes through [`Notifier`] (toasts) and moves
//! the shopper through [`Navigator`]. Front ends plug in their own
//! implementations; [`LogNotifier`] and [`LogNavigator`] serve headless use.

use vitrine_core::OrderId;

use crate::error::add_breadcrumb;

/// Receives short status messages meant for the shopper.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// A storefront location the shopper can be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Confirmation page of a freshly placed order.
    OrderConfirmation(OrderId),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::OrderConfirmation(id) => format!("/orders/{id}/confirmation"),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Writes notifications to the log and the Sentry breadcrumb trail.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!(text = message, "Notification");
        add_breadcrumb("cart", message, Some(&[("outcome", "success")]));
    }

    fn error(&self, message: &str) {
        tracing::warn!(text = message, "Error notification");
        add_breadcrumb("cart", message, Some(&[("outcome", "error")]));
    }
}

/// Logs navigation targets instead of routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &Route) {
        let path = route.path();
        tracing::info!(path = %path, "Navigate");
        add_breadcrumb("navigation", "Navigated", Some(&[("path", path.as_str())]));
    }
}

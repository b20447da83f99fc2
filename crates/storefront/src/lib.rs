//! Vitrine storefront library.
//!
//! Keeps the shopper's cart in step with the commerce backend using
//! optimistic updates, and provides the HTTP client for catalog and cart
//! endpoints.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod notify;
pub mod state;

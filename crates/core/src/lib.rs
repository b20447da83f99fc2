//! Vitrine Core - Shared types and variant resolution.
//!
//! This crate provides the types shared by every Vitrine component:
//! - `storefront` - Cart synchronization and catalog/cart API clients
//! - `cli` - Command-line driver for the storefront layer
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere, including in tests that never touch the network.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and statuses
//! - [`variant`] - Product variants, option selection and price summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod variant;

pub use types::*;
pub use variant::{
    OptionChoice, OptionKind, PriceSummary, Product, Selection, Variant, VariantPicker,
    compute_price_summary, initialize_selection, is_option_available, is_out_of_stock,
    option_values, resolve_variant,
};

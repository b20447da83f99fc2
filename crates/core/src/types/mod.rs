//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{discount_percent, format_amount};
pub use status::*;

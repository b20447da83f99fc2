//! Product variants and option selection.
//!
//! A product is sold as a set of variants, each a combination of up to four
//! attributes (size, color, measurement, age). This module resolves the
//! shopper's [`Selection`] to a single [`Variant`], reports which option
//! values remain purchasable given the other choices, and summarizes the
//! product's price range.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use vitrine_core::{OptionChoice, Variant, VariantId, VariantPicker};
//!
//! let mut small = Variant::new(VariantId::new(1), Decimal::from(20), 0);
//! small.size = Some("S".to_string());
//! let mut medium = Variant::new(VariantId::new(2), Decimal::from(25), 3);
//! medium.size = Some("M".to_string());
//!
//! let mut picker = VariantPicker::new(vec![small, medium]);
//! // Starts on the first in-stock variant
//! assert_eq!(picker.selected_variant().map(|v| v.id), Some(VariantId::new(2)));
//!
//! let small_choice = OptionChoice::Size("S".to_string());
//! assert!(!picker.is_available(&small_choice));
//! picker.toggle(&small_choice);
//! assert!(!picker.can_purchase());
//! ```

mod model;
mod picker;
mod pricing;
mod resolve;
mod selection;

pub use model::{OptionChoice, OptionKind, Product, Variant};
pub use picker::VariantPicker;
pub use pricing::{PriceSummary, compute_price_summary};
pub use resolve::{
    initialize_selection, is_option_available, is_out_of_stock, option_values, resolve_variant,
};
pub use selection::Selection;

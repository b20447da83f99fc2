//! Aggregate price facts across a product's variants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::discount_percent;

use super::Variant;

/// Price range and discount facts for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Lowest variant price.
    pub min_price: Decimal,
    /// Highest variant price.
    pub max_price: Decimal,
    /// Lowest compare-at price (`old_price`, or `price` when not on sale).
    pub min_compare_at_price: Decimal,
    /// Highest compare-at price.
    pub max_compare_at_price: Decimal,
    /// At least one variant has `old_price > price`.
    pub has_discount: bool,
    /// Every variant has `old_price > price`.
    pub all_discounted: bool,
    /// `round((max_compare_at_price - min_price) / max_compare_at_price * 100)`.
    pub max_discount_percent: u32,
}

impl PriceSummary {
    /// Whether the product has a single price point.
    #[must_use]
    pub fn is_single_price(&self) -> bool {
        self.min_price == self.max_price
    }
}

/// Summarize the prices of `variants`.
///
/// Returns `None` for an empty list: there is no meaningful min or max
/// price for a product without variants.
#[must_use]
pub fn compute_price_summary(variants: &[Variant]) -> Option<PriceSummary> {
    let first = variants.first()?;

    let mut summary = PriceSummary {
        min_price: first.price,
        max_price: first.price,
        min_compare_at_price: first.compare_at_price(),
        max_compare_at_price: first.compare_at_price(),
        has_discount: false,
        all_discounted: true,
        max_discount_percent: 0,
    };

    for variant in variants {
        let compare_at = variant.compare_at_price();
        summary.min_price = summary.min_price.min(variant.price);
        summary.max_price = summary.max_price.max(variant.price);
        summary.min_compare_at_price = summary.min_compare_at_price.min(compare_at);
        summary.max_compare_at_price = summary.max_compare_at_price.max(compare_at);

        let discounted = variant.is_discounted();
        summary.has_discount |= discounted;
        summary.all_discounted &= discounted;
    }

    summary.max_discount_percent =
        discount_percent(summary.max_compare_at_price, summary.min_price);

    Some(summary)
}

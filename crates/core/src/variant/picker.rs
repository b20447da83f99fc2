//! Stateful variant picker for a product detail view.

use super::{
    OptionChoice, OptionKind, PriceSummary, Selection, Variant, compute_price_summary,
    initialize_selection, is_option_available, is_out_of_stock, option_values, resolve_variant,
};

/// Selection state bound to one product's variants.
///
/// The selection starts from [`initialize_selection`] and changes only via
/// [`toggle`](Self::toggle). The price summary is recomputed whenever the
/// variant list is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPicker {
    variants: Vec<Variant>,
    selection: Selection,
    summary: Option<PriceSummary>,
}

impl VariantPicker {
    /// Create a picker with the default selection for `variants`.
    #[must_use]
    pub fn new(variants: Vec<Variant>) -> Self {
        let selection = initialize_selection(&variants);
        let summary = compute_price_summary(&variants);
        Self {
            variants,
            selection,
            summary,
        }
    }

    /// Swap in a new variant list (another product, or a refreshed snapshot).
    ///
    /// The selection is re-initialized from the new list.
    pub fn replace_variants(&mut self, variants: Vec<Variant>) {
        *self = Self::new(variants);
    }

    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The variant the current selection resolves to.
    #[must_use]
    pub fn selected_variant(&self) -> Option<&Variant> {
        resolve_variant(&self.variants, &self.selection)
    }

    /// Toggle `choice` and return the newly resolved variant.
    pub fn toggle(&mut self, choice: &OptionChoice) -> Option<&Variant> {
        self.selection = self.selection.toggle(choice);
        self.selected_variant()
    }

    /// Whether `choice` can be picked alongside the other current choices.
    #[must_use]
    pub fn is_available(&self, choice: &OptionChoice) -> bool {
        is_option_available(choice, &self.variants, &self.selection)
    }

    /// Distinct values offered for `kind`.
    #[must_use]
    pub fn values(&self, kind: OptionKind) -> Vec<OptionChoice> {
        option_values(&self.variants, kind)
    }

    /// Price summary, `None` when the product has no variants.
    #[must_use]
    pub const fn price_summary(&self) -> Option<&PriceSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        is_out_of_stock(&self.variants)
    }

    /// Whether the current selection can be added to a cart.
    #[must_use]
    pub fn can_purchase(&self) -> bool {
        self.selected_variant().is_some_and(Variant::is_in_stock)
    }
}

//! Variant resolution and option availability.
//!
//! All functions here are pure: they take a variant list in catalog order
//! and a [`Selection`], and never fail. Absence is `None` or `false`.

use super::{OptionChoice, OptionKind, Selection, Variant};

/// The selection a product page starts with.
///
/// Uses the first in-stock variant's attributes, falling back to the first
/// variant when everything is sold out, and to an empty selection when
/// there are no variants at all.
#[must_use]
pub fn initialize_selection(variants: &[Variant]) -> Selection {
    variants
        .iter()
        .find(|v| v.is_in_stock())
        .or_else(|| variants.first())
        .map(Variant::selection)
        .unwrap_or_default()
}

/// The variant identified by `selection`.
///
/// - No variants: `None`.
/// - Exactly one variant: that variant, whatever the selection says.
/// - Empty selection: the first in-stock variant, if any.
/// - Otherwise: the first variant whose four attributes equal the
///   selection pairwise.
#[must_use]
pub fn resolve_variant<'a>(variants: &'a [Variant], selection: &Selection) -> Option<&'a Variant> {
    match variants {
        [] => None,
        [only] => Some(only),
        _ if selection.is_empty() => variants.iter().find(|v| v.is_in_stock()),
        _ => variants.iter().find(|v| selection.matches(v)),
    }
}

/// Whether `choice` can be picked given the other chosen attributes.
///
/// True iff some in-stock variant carries `choice` and agrees with every
/// other attribute the shopper has already chosen.
#[must_use]
pub fn is_option_available(choice: &OptionChoice, variants: &[Variant], selection: &Selection) -> bool {
    let kind = choice.kind();
    variants
        .iter()
        .any(|v| v.is_in_stock() && v.has_choice(choice) && selection.permits(v, kind))
}

/// True when there are no variants or none has stock.
#[must_use]
pub fn is_out_of_stock(variants: &[Variant]) -> bool {
    !variants.iter().any(Variant::is_in_stock)
}

/// Distinct values of `kind` across `variants`, in first-seen order.
#[must_use]
pub fn option_values(variants: &[Variant], kind: OptionKind) -> Vec<OptionChoice> {
    let mut values: Vec<OptionChoice> = Vec::new();
    for choice in variants.iter().filter_map(|v| v.choice(kind)) {
        if !values.contains(&choice) {
            values.push(choice);
        }
    }
    values
}
